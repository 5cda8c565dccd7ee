//! Bearer-token identity verification
//!
//! The administrative PIN reset and the responder unlock are gated by a
//! verified caller identity. Verification is delegated to an external
//! token-introspection service; simulated mode substitutes a permissive
//! verifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::IdentityError;
use crate::types::CallerIdentity;

/// Identity verification capability gating privileged operations
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a bearer token and return the caller it attests to
    async fn verify(&self, bearer_token: &str) -> Result<CallerIdentity, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    active: bool,
    #[serde(default)]
    sub: Option<String>,
}

/// Identity verifier backed by an HTTP token-introspection endpoint
#[derive(Debug)]
pub struct HttpIdentityVerifier {
    client: Client,
    endpoint: Url,
}

impl HttpIdentityVerifier {
    /// Create a new introspection client
    ///
    /// # Arguments
    /// * `endpoint` - URL of the token introspection endpoint
    /// * `timeout` - maximum duration to wait for a response
    #[tracing::instrument(skip(timeout), fields(endpoint = %endpoint, timeout_ms = timeout.as_millis()))]
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, IdentityError> {
        let endpoint = Url::parse(&endpoint).map_err(|e| IdentityError::InvalidEndpoint {
            message: format!("Failed to parse URL: {}", e),
        })?;

        match endpoint.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(IdentityError::InvalidEndpoint {
                    message: format!("Only HTTP/HTTPS schemes are supported, got: {}", scheme),
                });
            }
        }

        let client = Client::builder()
            .timeout(timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| IdentityError::InvalidEndpoint {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    #[tracing::instrument(skip(self, bearer_token))]
    async fn verify(&self, bearer_token: &str) -> Result<CallerIdentity, IdentityError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&serde_json::json!({ "token": bearer_token }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    IdentityError::Unavailable {
                        message: "introspection request failed to reach the service".to_string(),
                    }
                } else {
                    IdentityError::Unavailable {
                        message: format!("introspection request failed: {}", e),
                    }
                }
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("identity service rejected the token");
                Err(IdentityError::Rejected)
            }
            status if status.is_success() => {
                let body =
                    response
                        .json::<IntrospectionResponse>()
                        .await
                        .map_err(|e| IdentityError::Unavailable {
                            message: format!("malformed introspection response: {}", e),
                        })?;

                if body.active {
                    let subject = body.sub.unwrap_or_else(|| "unknown".to_string());
                    debug!(subject = %subject, "token verified");
                    Ok(CallerIdentity { subject })
                } else {
                    warn!("token introspection returned inactive");
                    Err(IdentityError::Rejected)
                }
            }
            status => Err(IdentityError::Unavailable {
                message: format!("unexpected status code: {}", status),
            }),
        }
    }
}

/// Permissive verifier used in simulated mode
///
/// Accepts any non-empty token. Never use outside of local development.
#[derive(Debug, Default)]
pub struct AllowAllVerifier;

#[async_trait]
impl IdentityVerifier for AllowAllVerifier {
    async fn verify(&self, bearer_token: &str) -> Result<CallerIdentity, IdentityError> {
        if bearer_token.trim().is_empty() {
            return Err(IdentityError::Rejected);
        }
        Ok(CallerIdentity {
            subject: "simulated".to_string(),
        })
    }
}
