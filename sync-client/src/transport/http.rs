//! HTTP implementation of [`RemoteStore`] using reqwest.

use super::{RemoteStore, TransportError};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use sync_types::{CreateResponse, InfoResponse, PutResponse, StatusResponse, SyncId, Timestamp};

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`RemoteStore`] backed by the server's HTTP surface.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    base_url: String,
    http: reqwest::Client,
}

impl HttpRemoteStore {
    /// Create a store talking to `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn sync_url(&self, id: &SyncId) -> String {
        format!("{}/sync/{}", self.base_url, id)
    }

    /// Map a non-success response to the transport error taxonomy.
    ///
    /// 400 covers both a malformed id and an oversize body; the server
    /// tells them apart only in the plain-text response body.
    async fn error_from_response(resp: reqwest::Response) -> TransportError {
        let status = resp.status();
        if status == StatusCode::BAD_REQUEST {
            let text = resp.text().await.unwrap_or_default();
            return Self::error_for_bad_request(&text);
        }
        Self::error_for_status(status)
    }

    fn error_for_bad_request(body: &str) -> TransportError {
        if body.trim() == "body too large" {
            TransportError::PayloadTooLarge
        } else {
            TransportError::InvalidId
        }
    }

    fn error_for_status(status: StatusCode) -> TransportError {
        match status {
            StatusCode::NOT_FOUND => TransportError::NotFound,
            StatusCode::BAD_REQUEST => TransportError::InvalidId,
            StatusCode::TOO_MANY_REQUESTS => TransportError::RateLimited,
            StatusCode::PAYLOAD_TOO_LARGE => TransportError::PayloadTooLarge,
            other => TransportError::Server {
                status: other.as_u16(),
            },
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn create(&self) -> Result<SyncId, TransportError> {
        let resp = self
            .http
            .post(format!("{}/sync", self.base_url))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        let body: CreateResponse = resp
            .json()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(body.id)
    }

    async fn get(&self, id: &SyncId) -> Result<(Vec<u8>, Timestamp), TransportError> {
        let resp = self
            .http
            .get(self.sync_url(id))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }

        // The Last-Modified header carries whole seconds only; it is
        // informational here. Ordering decisions use the info probe.
        let last_modified = resp
            .headers()
            .get(reqwest::header::LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| chrono::DateTime::parse_from_rfc2822(s).ok())
            .map(|dt| Timestamp::from_millis(dt.timestamp_millis()))
            .unwrap_or_default();

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok((bytes.to_vec(), last_modified))
    }

    async fn put(&self, id: &SyncId, body: &[u8]) -> Result<Timestamp, TransportError> {
        let resp = self
            .http
            .put(self.sync_url(id))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        let body: PutResponse = resp
            .json()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(body.last_modified)
    }

    async fn info(&self, id: &SyncId) -> Result<Option<Timestamp>, TransportError> {
        let resp = self
            .http
            .get(format!("{}/info", self.sync_url(id)))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        let body: InfoResponse = resp
            .json()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Some(body.last_modified))
    }

    async fn delete(&self, id: &SyncId) -> Result<(), TransportError> {
        let resp = self
            .http
            .delete(self.sync_url(id))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        Ok(())
    }

    async fn status(&self) -> Result<StatusResponse, TransportError> {
        let resp = self
            .http
            .get(format!("{}/status", self.base_url))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        resp.json()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = HttpRemoteStore::new("http://localhost:8080/").unwrap();
        let id = SyncId::parse("11111111-1111-4111-8111-111111111111").unwrap();
        assert_eq!(
            store.sync_url(&id),
            "http://localhost:8080/sync/11111111-1111-4111-8111-111111111111"
        );
    }

    #[test]
    fn status_codes_map_to_taxonomy() {
        assert!(matches!(
            HttpRemoteStore::error_for_status(StatusCode::NOT_FOUND),
            TransportError::NotFound
        ));
        assert!(matches!(
            HttpRemoteStore::error_for_status(StatusCode::BAD_REQUEST),
            TransportError::InvalidId
        ));
        assert!(matches!(
            HttpRemoteStore::error_for_status(StatusCode::TOO_MANY_REQUESTS),
            TransportError::RateLimited
        ));
        assert!(matches!(
            HttpRemoteStore::error_for_status(StatusCode::INTERNAL_SERVER_ERROR),
            TransportError::Server { status: 500 }
        ));
    }

    #[test]
    fn bad_request_body_tells_oversize_apart_from_invalid_id() {
        assert!(matches!(
            HttpRemoteStore::error_for_bad_request("body too large"),
            TransportError::PayloadTooLarge
        ));
        assert!(matches!(
            HttpRemoteStore::error_for_bad_request("body too large\n"),
            TransportError::PayloadTooLarge
        ));
        assert!(matches!(
            HttpRemoteStore::error_for_bad_request("invalid id"),
            TransportError::InvalidId
        ));
        assert!(matches!(
            HttpRemoteStore::error_for_bad_request(""),
            TransportError::InvalidId
        ));
    }
}
