//! Identifier types for MarkSync.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The identifier naming one sync record on the server.
///
/// 128 bits of randomness (UUID v4), rendered as the 36-character
/// hyphenated token. Possession of the token is the only credential,
/// so `Debug` truncates it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncId(uuid::Uuid);

impl SyncId {
    /// Generate a fresh random SyncId.
    ///
    /// No collision check is performed against existing records; with
    /// 122 random bits the probability is negligible.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse a SyncId from its 36-character hyphenated text form.
    ///
    /// Rejects every other rendering (braced, simple, URN) so that the
    /// server-side file name derived from the token is unambiguous.
    pub fn parse(s: &str) -> Result<Self, ParseSyncIdError> {
        if s.len() != 36 {
            return Err(ParseSyncIdError::WrongLength { actual: s.len() });
        }
        let uuid = uuid::Uuid::try_parse(s).map_err(|_| ParseSyncIdError::Malformed)?;
        Ok(Self(uuid))
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl FromStr for SyncId {
    type Err = ParseSyncIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SyncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for SyncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyncId({})", &self.to_string()[..8])
    }
}

/// Errors from parsing a [`SyncId`] token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseSyncIdError {
    /// The token was not exactly 36 characters long.
    #[error("sync id must be 36 characters, got {actual}")]
    WrongLength {
        /// Length of the rejected token.
        actual: usize,
    },
    /// The token had the right length but is not a valid UUID.
    #[error("sync id is not a valid identifier")]
    Malformed,
}
