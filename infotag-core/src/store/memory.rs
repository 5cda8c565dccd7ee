//! In-memory record store
//!
//! Backs simulated mode when no remote store is configured, and serves
//! as the test double for the unlock protocol.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::store::{RecordStore, SecurityPatch, StoreKind};
use crate::types::PatientRecord;

/// Record store holding patient documents in process memory
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, PatientRecord>>,
}

impl MemoryRecordStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a patient record
    pub fn insert(&self, patient_id: &str, record: PatientRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Backend {
            message: "record store mutex poisoned".to_string(),
        })?;
        records.insert(patient_id.to_string(), record);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, patient_id: &str) -> Result<Option<PatientRecord>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Backend {
            message: "record store mutex poisoned".to_string(),
        })?;
        Ok(records.get(patient_id).cloned())
    }

    async fn update_security(
        &self,
        patient_id: &str,
        patch: SecurityPatch,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Backend {
            message: "record store mutex poisoned".to_string(),
        })?;
        let record = records.get_mut(patient_id).ok_or_else(|| StoreError::Backend {
            message: format!("no record for patient {}", patient_id),
        })?;
        patch.apply(&mut record.security);
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Simulated
    }
}
