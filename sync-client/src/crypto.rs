//! Cryptographic primitives for MarkSync.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 key derivation (100,000 iterations, fixed salt)
//! - ChaCha20-Poly1305 sealed envelopes with 96-bit nonces
//!
//! # Security Notes
//!
//! - The salt is a fixed application-wide constant. Per-user separation
//!   comes from the unguessable sync id, not from the salt; the accepted
//!   trade-off is that weak passphrases are subject to pre-computed
//!   dictionary attacks.
//! - Nonces are generated fresh from the OS RNG for every `seal` call.
//!   There is no counter anywhere that could repeat across restarts.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use sha2::Sha256;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Nonce size for ChaCha20-Poly1305 (96 bits = 12 bytes).
pub const NONCE_SIZE: usize = 12;

/// Key size for ChaCha20-Poly1305 (256 bits = 32 bytes).
pub const KEY_SIZE: usize = 32;

/// PBKDF2 iteration count.
pub const KDF_ITERATIONS: u32 = 100_000;

/// Fixed application-wide KDF salt.
const KDF_SALT: &[u8] = b"marksync-key-derivation-v1";

/// Crypto errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Envelope rejected: too short, tampered, or sealed with another key.
    #[error("authentication failed: wrong passphrase or corrupted data")]
    AuthenticationFailed,
}

/// A symmetric key derived from the user's passphrase.
///
/// Deterministic: the same passphrase always yields the same key, on any
/// device, with no salt exchange. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SyncKey([u8; KEY_SIZE]);

impl SyncKey {
    /// Derive a key from a passphrase via PBKDF2-HMAC-SHA256.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut output = [0u8; KEY_SIZE];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            passphrase.as_bytes(),
            KDF_SALT,
            KDF_ITERATIONS,
            &mut output,
        );
        Self(output)
    }

    /// Create a random key (for testing).
    pub fn random() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        getrandom::getrandom(&mut bytes).expect("getrandom failed");
        Self(bytes)
    }

    /// Get the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Seal a plaintext into an envelope: `nonce || ciphertext+tag`.
    ///
    /// A fresh random 96-bit nonce is generated per call.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::EncryptionFailed("aead encrypt failed".into()))?;

        let mut envelope = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        envelope.extend_from_slice(&nonce_bytes);
        envelope.extend_from_slice(&ciphertext);
        Ok(envelope)
    }

    /// Open an envelope produced by [`SyncKey::seal`].
    ///
    /// Fails with [`CryptoError::AuthenticationFailed`] when the envelope
    /// is shorter than the nonce or when tag verification fails (wrong
    /// passphrase, tampering, corruption).
    pub fn open(&self, envelope: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if envelope.len() < NONCE_SIZE {
            return Err(CryptoError::AuthenticationFailed);
        }
        let (nonce_bytes, ciphertext) = envelope.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}

// Don't leak key material in debug output
impl std::fmt::Debug for SyncKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyncKey([REDACTED])")
    }
}
