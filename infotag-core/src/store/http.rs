//! Remote document store client
//!
//! Talks to the patient record store over HTTP/HTTPS with a bounded
//! request timeout. Timeouts and connection failures are surfaced as
//! `StoreError::Unavailable` so callers can treat them as transient.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::error::StoreError;
use crate::store::{RecordStore, SecurityPatch, StoreKind};
use crate::types::PatientRecord;

/// Record store adapter backed by a remote document store REST API
///
/// Records live at `<endpoint>/records/<patient_id>`; security merges are
/// PATCHed to `<endpoint>/records/<patient_id>/security`.
#[derive(Debug)]
pub struct HttpRecordStore {
    client: Client,
    base_url: Url,
}

impl HttpRecordStore {
    /// Create a new remote store client
    ///
    /// # Arguments
    /// * `endpoint` - base URL of the document store (http:// or https://)
    /// * `timeout` - maximum duration to wait for any single request
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidEndpoint` if the URL does not parse or
    /// uses a scheme other than HTTP/HTTPS.
    #[tracing::instrument(skip(timeout), fields(endpoint = %endpoint, timeout_ms = timeout.as_millis()))]
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, StoreError> {
        let mut base_url = Url::parse(&endpoint).map_err(|e| StoreError::InvalidEndpoint {
            message: format!("Failed to parse URL: {}", e),
        })?;

        match base_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(StoreError::InvalidEndpoint {
                    message: format!("Only HTTP/HTTPS schemes are supported, got: {}", scheme),
                });
            }
        }

        // Url::join treats a path without a trailing slash as a file
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| StoreError::InvalidEndpoint {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, base_url })
    }

    fn record_url(&self, patient_id: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(&format!("records/{}", patient_id))
            .map_err(|e| StoreError::InvalidEndpoint {
                message: format!("Failed to build record URL: {}", e),
            })
    }

    fn classify(e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Unavailable {
                message: "request timeout".to_string(),
            }
        } else if e.is_connect() {
            StoreError::Unavailable {
                message: "connection refused or unreachable".to_string(),
            }
        } else {
            StoreError::Backend {
                message: format!("request failed: {}", e),
            }
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    #[tracing::instrument(skip(self), fields(patient_id = %patient_id))]
    async fn get(&self, patient_id: &str) -> Result<Option<PatientRecord>, StoreError> {
        let url = self.record_url(patient_id)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(Self::classify)?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(patient_id, "record not found in remote store");
                Ok(None)
            }
            status if status.is_success() => {
                let record = response.json::<PatientRecord>().await.map_err(|e| {
                    StoreError::InvalidRecord {
                        message: format!("failed to decode record body: {}", e),
                    }
                })?;
                Ok(Some(record))
            }
            status => {
                warn!(patient_id, %status, "remote store returned error status");
                Err(StoreError::Backend {
                    message: format!("unexpected status code: {}", status),
                })
            }
        }
    }

    #[tracing::instrument(skip(self, patch), fields(patient_id = %patient_id))]
    async fn update_security(
        &self,
        patient_id: &str,
        patch: SecurityPatch,
    ) -> Result<(), StoreError> {
        let url = self
            .base_url
            .join(&format!("records/{}/security", patient_id))
            .map_err(|e| StoreError::InvalidEndpoint {
                message: format!("Failed to build security URL: {}", e),
            })?;

        let response = self
            .client
            .patch(url)
            .json(&patch.to_json())
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            warn!(patient_id, %status, "security merge rejected by remote store");
            Err(StoreError::Backend {
                message: format!("unexpected status code: {}", status),
            })
        }
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Remote
    }
}
