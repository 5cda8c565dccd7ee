//! Configuration module
//!
//! Handles loading and saving service configuration from TOML files.
//! Collaborator endpoints are optional; leaving them out runs the
//! service in simulated mode against an in-memory store.

use serde::{Deserialize, Serialize};

use crate::unlock::policy::LockoutPolicy;

pub mod toml_config;

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Record store collaborator
    #[serde(default)]
    pub store: StoreConfig,

    /// Identity verification collaborator
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Brute-force lockout policy
    #[serde(default)]
    pub lockout: LockoutPolicy,
}

/// Record store connection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the remote document store; absent means simulated mode
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Identity verification service parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Token introspection endpoint; absent means any token is accepted
    /// (simulated mode only)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), String> {
    match url::Url::parse(endpoint) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(format!("URL scheme must be http or https, got: {}", scheme)),
        },
        Err(e) => Err(format!("Failed to parse URL: {}", e)),
    }
}

impl ServiceConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError;

        if let Some(endpoint) = &self.store.endpoint {
            validate_endpoint(endpoint).map_err(|_| ConfigError::InvalidUrl {
                url: endpoint.clone(),
            })?;
        }
        if self.store.timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "store timeout cannot be zero".to_string(),
            });
        }

        if let Some(endpoint) = &self.identity.endpoint {
            validate_endpoint(endpoint).map_err(|_| ConfigError::InvalidUrl {
                url: endpoint.clone(),
            })?;
        }
        if self.identity.timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "identity timeout cannot be zero".to_string(),
            });
        }

        self.lockout.validate().map_err(|e| ConfigError::ValidationError {
            message: format!("Invalid lockout policy: {}", e),
        })?;

        Ok(())
    }
}
