//! Lockout policy configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the brute-force lockout behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutPolicy {
    /// Consecutive failures that trigger a lockout
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,

    /// How long a lockout lasts, in seconds
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,
}

fn default_max_failures() -> u32 {
    3
}
fn default_lockout_secs() -> u64 {
    60
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failures: default_max_failures(),
            lockout_secs: default_lockout_secs(),
        }
    }
}

impl LockoutPolicy {
    /// Validate the policy
    ///
    /// # Returns
    ///
    /// * `Ok(())` if all fields are valid
    /// * `Err(PolicyValidationError)` with the first validation error encountered
    pub fn validate(&self) -> Result<(), PolicyValidationError> {
        if self.max_failures < 1 || self.max_failures > 10 {
            return Err(PolicyValidationError::InvalidMaxFailures(self.max_failures));
        }
        if self.lockout_secs < 1 || self.lockout_secs > 3600 {
            return Err(PolicyValidationError::InvalidLockoutSecs(self.lockout_secs));
        }
        Ok(())
    }

    /// The lockout duration as a chrono duration
    pub fn lockout_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.lockout_secs as i64)
    }
}

/// Validation errors for LockoutPolicy
#[derive(Debug, Error)]
pub enum PolicyValidationError {
    #[error("max_failures must be between 1 and 10, got: {0}")]
    InvalidMaxFailures(u32),

    #[error("lockout_secs must be between 1 and 3600, got: {0}")]
    InvalidLockoutSecs(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.max_failures, 3);
        assert_eq!(policy.lockout_secs, 60);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_parse_with_defaults() {
        let policy: LockoutPolicy = toml::from_str("").unwrap();
        assert_eq!(policy.max_failures, 3);
        assert_eq!(policy.lockout_secs, 60);
    }

    #[test]
    fn test_parse_with_all_fields() {
        let policy: LockoutPolicy = toml::from_str(
            r#"
            max_failures = 5
            lockout_secs = 120
        "#,
        )
        .unwrap();
        assert_eq!(policy.max_failures, 5);
        assert_eq!(policy.lockout_secs, 120);
    }

    #[test]
    fn test_validate_max_failures_range() {
        let mut policy = LockoutPolicy::default();
        policy.max_failures = 0;
        assert!(policy.validate().is_err());
        policy.max_failures = 11;
        assert!(policy.validate().is_err());
        policy.max_failures = 10;
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_validate_lockout_secs_range() {
        let mut policy = LockoutPolicy::default();
        policy.lockout_secs = 0;
        assert!(policy.validate().is_err());
        policy.lockout_secs = 3601;
        assert!(policy.validate().is_err());
        policy.lockout_secs = 3600;
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_lockout_duration() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.lockout_duration(), chrono::Duration::seconds(60));
    }
}
