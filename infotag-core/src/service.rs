//! Service facade wiring the collaborators together
//!
//! `TagService` owns the injected record store, secret hasher, identity
//! verifier, and lockout policy, and exposes the operations the
//! transport layer serves: PIN unlock, administrative PIN reset,
//! public info lookup, responder unlock, and health reporting.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::hasher::{Argon2SecretHasher, SecretHasher};
use crate::auth::identity::{AllowAllVerifier, HttpIdentityVerifier, IdentityVerifier};
use crate::config::ServiceConfig;
use crate::error::{IdentityError, InfotagError, UnlockError};
use crate::store::{HttpRecordStore, MemoryRecordStore, RecordStore};
use crate::types::{CallerIdentity, PatientRecord, Pin, SecurityRecord};
use crate::unlock::{Authenticator, LockoutPolicy, UnlockOutcome};

/// Patient id of the record seeded in simulated mode
pub const DEMO_PATIENT_ID: &str = "demo-patient";

/// PIN of the record seeded in simulated mode
pub const DEMO_PATIENT_PIN: &str = "1234";

/// Service health report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub store: &'static str,
}

/// The emergency tag service
///
/// Every collaborator is constructed up front and injected; there is no
/// process-wide singleton state, and test doubles slot in through the
/// store, hasher, and identity traits.
pub struct TagService {
    authenticator: Authenticator,
    store: Arc<dyn RecordStore>,
    identity: Arc<dyn IdentityVerifier>,
}

impl TagService {
    /// Assemble a service from explicit collaborators
    pub fn new(
        store: Arc<dyn RecordStore>,
        hasher: Arc<dyn SecretHasher>,
        identity: Arc<dyn IdentityVerifier>,
        policy: LockoutPolicy,
    ) -> Self {
        Self {
            authenticator: Authenticator::new(Arc::clone(&store), hasher, policy),
            store,
            identity,
        }
    }

    /// Build a service from configuration
    ///
    /// A missing store endpoint selects simulated mode: an in-memory
    /// store seeded with one demo patient, and an identity verifier that
    /// accepts any non-empty token.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, InfotagError> {
        config.validate()?;

        let hasher: Arc<dyn SecretHasher> = Arc::new(Argon2SecretHasher::new());

        let store: Arc<dyn RecordStore> = match &config.store.endpoint {
            Some(endpoint) => Arc::new(HttpRecordStore::new(
                endpoint.clone(),
                Duration::from_secs(config.store.timeout_secs),
            )?),
            None => {
                info!("no record store endpoint configured, running in simulated mode");
                Arc::new(seeded_store(hasher.as_ref())?)
            }
        };

        let identity: Arc<dyn IdentityVerifier> = match &config.identity.endpoint {
            Some(endpoint) => Arc::new(HttpIdentityVerifier::new(
                endpoint.clone(),
                Duration::from_secs(config.identity.timeout_secs),
            )?),
            None => Arc::new(AllowAllVerifier),
        };

        Ok(Self::new(store, hasher, identity, config.lockout.clone()))
    }

    /// Build a simulated-mode service with the given lockout policy
    pub fn simulated(policy: LockoutPolicy) -> Result<Self, InfotagError> {
        let hasher: Arc<dyn SecretHasher> = Arc::new(Argon2SecretHasher::new());
        let store: Arc<dyn RecordStore> = Arc::new(seeded_store(hasher.as_ref())?);
        Ok(Self::new(store, hasher, Arc::new(AllowAllVerifier), policy))
    }

    /// Attempt a PIN unlock for a patient record
    pub async fn attempt_unlock(
        &self,
        patient_id: &str,
        supplied_pin: &Pin,
    ) -> Result<UnlockOutcome, InfotagError> {
        Ok(self
            .authenticator
            .attempt_unlock(patient_id, supplied_pin)
            .await?)
    }

    /// Reset a patient's PIN (administrative path)
    ///
    /// Requires a verified caller identity; unverified callers are
    /// rejected before the authenticator is invoked at all.
    #[tracing::instrument(skip(self, bearer_token, new_pin), fields(patient_id = %patient_id))]
    pub async fn reset_secret(
        &self,
        bearer_token: &str,
        patient_id: &str,
        new_pin: &Pin,
    ) -> Result<(), InfotagError> {
        let caller = self.verify_caller(bearer_token).await?;
        self.authenticator.reset_secret(patient_id, new_pin).await?;
        info!(caller = %caller.subject, patient_id, "PIN reset by verified caller");
        Ok(())
    }

    /// Fetch the unguarded public section of a patient record
    pub async fn public_info(&self, patient_id: &str) -> Result<Value, InfotagError> {
        if patient_id.trim().is_empty() {
            return Err(UnlockError::InvalidRequest { field: "patientId" }.into());
        }
        let record = self
            .store
            .get(patient_id)
            .await?
            .ok_or(UnlockError::NotFound)?;
        Ok(record.public_info)
    }

    /// Release the protected payload to a verified responder
    ///
    /// Bypasses the PIN entirely and never touches the security record.
    /// Every responder access is logged.
    #[tracing::instrument(skip(self, bearer_token), fields(patient_id = %patient_id))]
    pub async fn responder_unlock(
        &self,
        bearer_token: &str,
        patient_id: &str,
    ) -> Result<Value, InfotagError> {
        let caller = self.verify_caller(bearer_token).await?;
        if patient_id.trim().is_empty() {
            return Err(UnlockError::InvalidRequest { field: "patientId" }.into());
        }
        let record = self
            .store
            .get(patient_id)
            .await?
            .ok_or(UnlockError::NotFound)?;
        info!(
            responder = %caller.subject,
            patient_id,
            "responder accessed protected payload"
        );
        Ok(record.private_info)
    }

    /// Report service status and the active store backend
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "online",
            store: self.store.kind().as_str(),
        }
    }

    async fn verify_caller(&self, bearer_token: &str) -> Result<CallerIdentity, IdentityError> {
        if bearer_token.trim().is_empty() {
            warn!("privileged call without a bearer token");
            return Err(IdentityError::Rejected);
        }
        self.identity.verify(bearer_token).await
    }
}

/// Build the in-memory store simulated mode runs against
fn seeded_store(hasher: &dyn SecretHasher) -> Result<MemoryRecordStore, InfotagError> {
    let store = MemoryRecordStore::new();
    let record = PatientRecord {
        public_info: serde_json::json!({
            "name": "Test Patient (simulated)",
            "age": 45,
            "blood_type": "O+",
            "emergency_contact": "Maria Silva - (11) 98765-4321",
        }),
        private_info: serde_json::json!({
            "allergies": "Penicillin",
            "medications": "Losartan 50mg, Metformin 850mg",
            "conditions": "Hypertension, type 2 diabetes",
            "notes": "History of controlled cardiac arrhythmia",
        }),
        security: SecurityRecord {
            pin_hash: Some(hasher.hash(DEMO_PATIENT_PIN)?),
            failure_count: 0,
            lockout_until: None,
        },
    };
    store.insert(DEMO_PATIENT_ID, record)?;
    Ok(store)
}
