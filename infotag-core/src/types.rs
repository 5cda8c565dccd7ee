//! Type definitions and wrappers for secure data handling
//!
//! This module provides the patient record document model and type-safe
//! wrappers for sensitive data using the secrecy crate to prevent
//! accidental exposure in logs or debug output.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wrapper for a supplied unlock PIN
///
/// This type ensures PINs are never accidentally logged or exposed in
/// debug output while they transit through the service.
#[derive(Clone, Debug)]
pub struct Pin(Secret<String>);

impl Pin {
    /// Create a new Pin from a plaintext string
    pub fn new(pin: String) -> Self {
        Self(Secret::new(pin))
    }

    /// Expose the PIN value (use with caution!)
    ///
    /// This should only be called when passing the plaintext to the
    /// secret hasher for digestion or verification.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the supplied PIN is empty
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl From<String> for Pin {
    fn from(pin: String) -> Self {
        Self::new(pin)
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// A patient record held in the document store, keyed by patient id
///
/// The public and private payloads are opaque JSON documents owned by
/// the administrative side of the system. The unlock protocol reads them
/// but never writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Freely readable section, shown without any authentication
    #[serde(default = "empty_object")]
    pub public_info: Value,

    /// Protected section, released only through a successful unlock
    #[serde(default = "empty_object")]
    pub private_info: Value,

    /// State governing the PIN unlock protocol for this record
    #[serde(default)]
    pub security: SecurityRecord,
}

impl Default for PatientRecord {
    fn default() -> Self {
        Self {
            public_info: empty_object(),
            private_info: empty_object(),
            security: SecurityRecord::default(),
        }
    }
}

/// The subset of a patient record governing unlock
///
/// Field presence is modeled with `Option`, never sentinel values, so
/// "absent" and "present but zero" can never be confused.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecurityRecord {
    /// Salted one-way digest of the PIN in PHC string format.
    /// Absence is a server misconfiguration, not a user error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_hash: Option<String>,

    /// Consecutive failed unlock attempts since the last success
    #[serde(default)]
    pub failure_count: u32,

    /// Present only while a lockout is active. Once the clock passes it
    /// the lockout is over even if the field has not been cleared yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lockout_until: Option<DateTime<Utc>>,
}

/// A verified caller identity, as attested by the identity collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Stable subject identifier of the verified caller
    pub subject: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_debug_does_not_leak() {
        let pin = Pin::new("1234".to_string());
        let debug = format!("{:?}", pin);
        assert!(!debug.contains("1234"));
    }

    #[test]
    fn test_pin_expose() {
        let pin = Pin::new("0000".to_string());
        assert_eq!(pin.expose(), "0000");
        assert!(!pin.is_empty());
        assert!(Pin::new(String::new()).is_empty());
    }

    #[test]
    fn test_patient_record_deserializes_with_missing_sections() {
        let record: PatientRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.public_info, serde_json::json!({}));
        assert_eq!(record.private_info, serde_json::json!({}));
        assert_eq!(record.security.failure_count, 0);
        assert!(record.security.pin_hash.is_none());
        assert!(record.security.lockout_until.is_none());
    }

    #[test]
    fn test_security_record_omits_absent_fields() {
        let json = serde_json::to_value(SecurityRecord::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "failure_count": 0 }));
    }
}
