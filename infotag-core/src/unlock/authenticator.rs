//! The unlock authenticator state machine
//!
//! Implements the PIN verification flow against a patient's security
//! record: lockout check before any hash work, constant-time PIN
//! verification, failure counting, and lockout imposition at the
//! threshold. Lockout expiry is lazy; nothing sweeps expired lockouts,
//! the next attempt simply bypasses the check once the clock has passed.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::auth::hasher::SecretHasher;
use crate::error::UnlockError;
use crate::store::{FieldPatch, RecordStore, SecurityPatch};
use crate::types::Pin;
use crate::unlock::outcome::UnlockOutcome;
use crate::unlock::policy::LockoutPolicy;

/// Verifies PINs and maintains the per-patient lockout state
///
/// All collaborators are injected; there is no process-wide state, so
/// independent patient ids are handled fully in parallel.
pub struct Authenticator {
    store: Arc<dyn RecordStore>,
    hasher: Arc<dyn SecretHasher>,
    policy: LockoutPolicy,
}

impl Authenticator {
    /// Create a new authenticator from its collaborators
    pub fn new(
        store: Arc<dyn RecordStore>,
        hasher: Arc<dyn SecretHasher>,
        policy: LockoutPolicy,
    ) -> Self {
        Self {
            store,
            hasher,
            policy,
        }
    }

    /// Attempt to unlock a patient's protected payload with a PIN
    ///
    /// Within one patient id, concurrent attempts race on the failure
    /// counter's read-modify-write; last write wins and two simultaneous
    /// failures may undercount. The store adapter carries absolute values
    /// so a compare-and-swap capable store can tighten this later.
    #[tracing::instrument(skip(self, supplied_pin), fields(patient_id = %patient_id))]
    pub async fn attempt_unlock(
        &self,
        patient_id: &str,
        supplied_pin: &Pin,
    ) -> Result<UnlockOutcome, UnlockError> {
        if patient_id.trim().is_empty() {
            return Err(UnlockError::InvalidRequest { field: "patientId" });
        }
        if supplied_pin.is_empty() {
            return Err(UnlockError::InvalidRequest {
                field: "suppliedPin",
            });
        }

        let record = self
            .store
            .get(patient_id)
            .await?
            .ok_or(UnlockError::NotFound)?;
        let security = &record.security;

        let pin_hash = match security.pin_hash.as_deref() {
            Some(hash) => hash,
            None => {
                error!(patient_id, "security record has no PIN hash, rejecting");
                return Err(UnlockError::Misconfigured);
            }
        };

        // Lockout check comes before any hash work. A locked-out caller
        // never causes a comparison and never moves the failure counter.
        let now = Utc::now();
        if let Some(until) = security.lockout_until {
            if until > now {
                let retry_after_secs = (until - now).num_seconds().max(1) as u64;
                warn!(patient_id, retry_after_secs, "attempt while locked out");
                return Ok(UnlockOutcome::LockedOut { retry_after_secs });
            }
        }

        if self.hasher.verify(supplied_pin.expose(), pin_hash) {
            let patch = SecurityPatch {
                failure_count: FieldPatch::Set(0),
                lockout_until: FieldPatch::Clear,
                ..SecurityPatch::default()
            };
            self.store.update_security(patient_id, patch).await?;
            info!(patient_id, "unlock succeeded, counters cleared");
            return Ok(UnlockOutcome::Success {
                data: record.private_info,
            });
        }

        // Increment relative to the value read above; last write wins.
        let attempt = security.failure_count + 1;
        let mut patch = SecurityPatch {
            failure_count: FieldPatch::Set(attempt),
            ..SecurityPatch::default()
        };

        if attempt >= self.policy.max_failures {
            let until = now + self.policy.lockout_duration();
            patch.lockout_until = FieldPatch::Set(until);
            self.store.update_security(patient_id, patch).await?;
            warn!(
                patient_id,
                attempt,
                lockout_secs = self.policy.lockout_secs,
                "failure threshold reached, lockout imposed"
            );
            return Ok(UnlockOutcome::LockedOutJustNow {
                lockout_secs: self.policy.lockout_secs,
            });
        }

        self.store.update_security(patient_id, patch).await?;
        warn!(
            patient_id,
            attempt,
            threshold = self.policy.max_failures,
            "unlock denied"
        );
        Ok(UnlockOutcome::Denied {
            attempt,
            threshold: self.policy.max_failures,
        })
    }

    /// Replace a patient's PIN and clear all lockout state
    ///
    /// Administrative path; identity verification happens upstream.
    #[tracing::instrument(skip(self, new_pin), fields(patient_id = %patient_id))]
    pub async fn reset_secret(&self, patient_id: &str, new_pin: &Pin) -> Result<(), UnlockError> {
        if patient_id.trim().is_empty() {
            return Err(UnlockError::InvalidRequest { field: "patientId" });
        }
        if new_pin.is_empty() {
            return Err(UnlockError::InvalidRequest { field: "newPin" });
        }

        if self.store.get(patient_id).await?.is_none() {
            return Err(UnlockError::NotFound);
        }

        let digest = self.hasher.hash(new_pin.expose())?;
        let patch = SecurityPatch {
            pin_hash: FieldPatch::Set(digest),
            failure_count: FieldPatch::Set(0),
            lockout_until: FieldPatch::Clear,
        };
        self.store.update_security(patient_id, patch).await?;
        info!(patient_id, "PIN reset, failure state cleared");
        Ok(())
    }
}
