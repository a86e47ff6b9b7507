//! Mock remote store for testing.
//!
//! Behaves like an in-memory server: records carry server-assigned
//! timestamps, writes fully replace, and every call is recorded so tests
//! can assert exactly which requests a sync attempt issued.

use super::{RemoteStore, TransportError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use sync_types::{StatusResponse, SyncId, Timestamp, MAX_SYNC_SIZE};

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// `create()` was invoked.
    Create,
    /// `get(id)` was invoked.
    Get(SyncId),
    /// `put(id, _)` was invoked.
    Put(SyncId),
    /// `info(id)` was invoked.
    Info(SyncId),
    /// `delete(id)` was invoked.
    Delete(SyncId),
    /// `status()` was invoked.
    Status,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    records: HashMap<SyncId, (Vec<u8>, Timestamp)>,
    calls: Vec<RemoteCall>,
    fail_next: Option<TransportErrorKind>,
    fail_next_put: Option<TransportErrorKind>,
}

/// Cloneable description of a failure to inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportErrorKind {
    Network,
    RateLimited,
}

impl TransportErrorKind {
    fn to_error(self) -> TransportError {
        match self {
            Self::Network => TransportError::Network("injected failure".into()),
            Self::RateLimited => TransportError::RateLimited,
        }
    }
}

/// In-memory [`RemoteStore`] with call capture and failure injection.
#[derive(Debug, Default)]
pub struct MockRemoteStore {
    inner: Arc<Mutex<MockRemoteInner>>,
}

impl MockRemoteStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record with an explicit server-side timestamp.
    pub fn insert_record(&self, id: SyncId, body: Vec<u8>, last_modified: Timestamp) {
        let mut inner = self.inner.lock().unwrap();
        inner.records.insert(id, (body, last_modified));
    }

    /// Get the stored record, if any.
    pub fn record(&self, id: &SyncId) -> Option<(Vec<u8>, Timestamp)> {
        let inner = self.inner.lock().unwrap();
        inner.records.get(id).cloned()
    }

    /// All calls issued so far, in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        let inner = self.inner.lock().unwrap();
        inner.calls.clone()
    }

    /// Clear the recorded calls (keeps the stored records).
    pub fn clear_calls(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.clear();
    }

    /// Make the next call fail with a network error.
    pub fn fail_next_with_network_error(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next = Some(TransportErrorKind::Network);
    }

    /// Make the next call fail with a rate-limit rejection.
    pub fn fail_next_with_rate_limit(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next = Some(TransportErrorKind::RateLimited);
    }

    /// Make the next `put` (only) fail with a rate-limit rejection.
    ///
    /// Other calls pass through, so a test can let the info probe succeed
    /// and reject just the write, like the server's limiter does.
    pub fn fail_next_put_with_rate_limit(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_put = Some(TransportErrorKind::RateLimited);
    }

    fn record_call(
        inner: &mut MockRemoteInner,
        call: RemoteCall,
    ) -> Result<(), TransportError> {
        inner.calls.push(call);
        if let Some(kind) = inner.fail_next.take() {
            return Err(kind.to_error());
        }
        Ok(())
    }
}

impl Clone for MockRemoteStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn create(&self) -> Result<SyncId, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record_call(&mut inner, RemoteCall::Create)?;
        Ok(SyncId::generate())
    }

    async fn get(&self, id: &SyncId) -> Result<(Vec<u8>, Timestamp), TransportError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record_call(&mut inner, RemoteCall::Get(*id))?;
        inner
            .records
            .get(id)
            .cloned()
            .ok_or(TransportError::NotFound)
    }

    async fn put(&self, id: &SyncId, body: &[u8]) -> Result<Timestamp, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record_call(&mut inner, RemoteCall::Put(*id))?;
        if let Some(kind) = inner.fail_next_put.take() {
            return Err(kind.to_error());
        }
        if body.len() > MAX_SYNC_SIZE {
            return Err(TransportError::PayloadTooLarge);
        }
        // Server clock is authoritative; guarantee monotonicity even when
        // two writes land within the same millisecond.
        let previous = inner.records.get(id).map(|(_, ts)| *ts);
        let mut now = Timestamp::now();
        if let Some(prev) = previous {
            if now <= prev {
                now = Timestamp::from_millis(prev.as_millis() + 1);
            }
        }
        inner.records.insert(*id, (body.to_vec(), now));
        Ok(now)
    }

    async fn info(&self, id: &SyncId) -> Result<Option<Timestamp>, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record_call(&mut inner, RemoteCall::Info(*id))?;
        Ok(inner.records.get(id).map(|(_, ts)| *ts))
    }

    async fn delete(&self, id: &SyncId) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record_call(&mut inner, RemoteCall::Delete(*id))?;
        inner.records.remove(id);
        Ok(())
    }

    async fn status(&self) -> Result<StatusResponse, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record_call(&mut inner, RemoteCall::Status)?;
        Ok(StatusResponse {
            status: "online".to_string(),
            version: "mock".to_string(),
            max_sync_size: MAX_SYNC_SIZE,
        })
    }
}
