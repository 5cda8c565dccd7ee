//! Patient record store adapters
//!
//! The unlock protocol talks to the document store through the
//! [`RecordStore`] trait: fetch by key, and merge partial security
//! updates without touching unrelated fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::StoreError;
use crate::types::PatientRecord;

pub mod http;
pub mod memory;

// Public re-exports
pub use http::HttpRecordStore;
pub use memory::MemoryRecordStore;

/// Which backend a store adapter talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Remote document store over HTTP
    Remote,
    /// In-memory store used when no backend is configured
    Simulated,
}

impl StoreKind {
    /// Human-readable backend name for health reporting
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Remote => "connected",
            StoreKind::Simulated => "simulated",
        }
    }
}

/// A single field of a partial update
///
/// `Clear` is distinct from `Keep` so an optional field can be set back
/// to absent explicitly rather than merely omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// Leave the stored value untouched
    Keep,
    /// Replace the stored value
    Set(T),
    /// Remove the stored value (reset to default for counters)
    Clear,
}

// Manual impl so the default carries no `T: Default` bound
impl<T> Default for FieldPatch<T> {
    fn default() -> Self {
        FieldPatch::Keep
    }
}

/// Partial update of a security record
///
/// Applied field-wise; fields left at `Keep` are never written, so the
/// patient payloads and any untouched security fields survive the update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityPatch {
    pub pin_hash: FieldPatch<String>,
    pub failure_count: FieldPatch<u32>,
    pub lockout_until: FieldPatch<DateTime<Utc>>,
}

impl SecurityPatch {
    /// Apply this patch to a security record in place
    pub fn apply(&self, security: &mut crate::types::SecurityRecord) {
        match &self.pin_hash {
            FieldPatch::Keep => {}
            FieldPatch::Set(hash) => security.pin_hash = Some(hash.clone()),
            FieldPatch::Clear => security.pin_hash = None,
        }
        match &self.failure_count {
            FieldPatch::Keep => {}
            FieldPatch::Set(count) => security.failure_count = *count,
            FieldPatch::Clear => security.failure_count = 0,
        }
        match &self.lockout_until {
            FieldPatch::Keep => {}
            FieldPatch::Set(until) => security.lockout_until = Some(*until),
            FieldPatch::Clear => security.lockout_until = None,
        }
    }

    /// Wire representation for the remote store: `Set` becomes the value,
    /// `Clear` becomes an explicit null, `Keep` is omitted entirely.
    pub fn to_json(&self) -> Value {
        let mut fields = serde_json::Map::new();
        match &self.pin_hash {
            FieldPatch::Keep => {}
            FieldPatch::Set(hash) => {
                fields.insert("pin_hash".to_string(), Value::String(hash.clone()));
            }
            FieldPatch::Clear => {
                fields.insert("pin_hash".to_string(), Value::Null);
            }
        }
        match &self.failure_count {
            FieldPatch::Keep => {}
            FieldPatch::Set(count) => {
                fields.insert("failure_count".to_string(), Value::from(*count));
            }
            FieldPatch::Clear => {
                fields.insert("failure_count".to_string(), Value::Null);
            }
        }
        match &self.lockout_until {
            FieldPatch::Keep => {}
            FieldPatch::Set(until) => {
                fields.insert(
                    "lockout_until".to_string(),
                    Value::String(until.to_rfc3339()),
                );
            }
            FieldPatch::Clear => {
                fields.insert("lockout_until".to_string(), Value::Null);
            }
        }
        Value::Object(fields)
    }
}

/// Document store access as the unlock protocol requires it
///
/// Adapters are invoked concurrently for unrelated patient ids with no
/// cross-key locking. Within one patient id, `update_security` carries
/// absolute values rather than increments, so an adapter backed by a
/// store with compare-and-swap support could add stronger atomicity
/// without changing callers.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a patient record by id, `None` if no such record exists
    async fn get(&self, patient_id: &str) -> Result<Option<PatientRecord>, StoreError>;

    /// Merge the given security fields into the stored record
    async fn update_security(
        &self,
        patient_id: &str,
        patch: SecurityPatch,
    ) -> Result<(), StoreError>;

    /// Which backend this adapter talks to
    fn kind(&self) -> StoreKind;
}
