//! Integration tests for the unlock protocol and its lockout behavior

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use infotag_core::auth::hasher::SecretHasher;
use infotag_core::error::{HasherError, StoreError, UnlockError};
use infotag_core::store::{MemoryRecordStore, RecordStore, SecurityPatch, StoreKind};
use infotag_core::types::{PatientRecord, Pin, SecurityRecord};
use infotag_core::unlock::{Authenticator, LockoutPolicy, UnlockOutcome};

/// Deterministic hasher so tests do not pay Argon2 cost per attempt
struct PlainHasher;

impl SecretHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HasherError> {
        Ok(format!("plain${}", plaintext))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        digest == format!("plain${}", plaintext)
    }
}

/// Hasher double that counts verification calls
struct CountingHasher {
    inner: PlainHasher,
    verify_calls: AtomicUsize,
}

impl CountingHasher {
    fn new() -> Self {
        Self {
            inner: PlainHasher,
            verify_calls: AtomicUsize::new(0),
        }
    }
}

impl SecretHasher for CountingHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HasherError> {
        self.inner.hash(plaintext)
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(plaintext, digest)
    }
}

/// Store double whose calls always fail as unavailable
struct UnavailableStore;

#[async_trait]
impl RecordStore for UnavailableStore {
    async fn get(&self, _patient_id: &str) -> Result<Option<PatientRecord>, StoreError> {
        Err(StoreError::Unavailable {
            message: "request timeout".to_string(),
        })
    }

    async fn update_security(
        &self,
        _patient_id: &str,
        _patch: SecurityPatch,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable {
            message: "request timeout".to_string(),
        })
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Simulated
    }
}

const PATIENT: &str = "patient-1";

fn record(pin: &str, failure_count: u32, lockout_offset_secs: Option<i64>) -> PatientRecord {
    PatientRecord {
        public_info: serde_json::json!({ "name": "Test Patient" }),
        private_info: serde_json::json!({ "allergies": "penicillin" }),
        security: SecurityRecord {
            pin_hash: Some(format!("plain${}", pin)),
            failure_count,
            lockout_until: lockout_offset_secs.map(|secs| Utc::now() + Duration::seconds(secs)),
        },
    }
}

fn authenticator(store: &Arc<MemoryRecordStore>) -> Authenticator {
    Authenticator::new(
        store.clone(),
        Arc::new(PlainHasher),
        LockoutPolicy::default(),
    )
}

async fn stored_security(store: &MemoryRecordStore) -> SecurityRecord {
    store.get(PATIENT).await.unwrap().unwrap().security
}

#[tokio::test]
async fn test_correct_pin_with_clean_counters_returns_private_data() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert(PATIENT, record("1234", 0, None)).unwrap();
    let auth = authenticator(&store);

    let outcome = auth
        .attempt_unlock(PATIENT, &Pin::new("1234".to_string()))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UnlockOutcome::Success {
            data: serde_json::json!({ "allergies": "penicillin" })
        }
    );
    let security = stored_security(&store).await;
    assert_eq!(security.failure_count, 0);
    assert!(security.lockout_until.is_none());
}

#[tokio::test]
async fn test_wrong_pin_below_threshold_increments_counter() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert(PATIENT, record("1234", 0, None)).unwrap();
    let auth = authenticator(&store);

    let outcome = auth
        .attempt_unlock(PATIENT, &Pin::new("0000".to_string()))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UnlockOutcome::Denied {
            attempt: 1,
            threshold: 3
        }
    );
    let security = stored_security(&store).await;
    assert_eq!(security.failure_count, 1);
    assert!(security.lockout_until.is_none());
}

#[tokio::test]
async fn test_third_failure_imposes_lockout() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert(PATIENT, record("1234", 2, None)).unwrap();
    let auth = authenticator(&store);

    let before = Utc::now();
    let outcome = auth
        .attempt_unlock(PATIENT, &Pin::new("0000".to_string()))
        .await
        .unwrap();
    let after = Utc::now();

    assert_eq!(outcome, UnlockOutcome::LockedOutJustNow { lockout_secs: 60 });
    let security = stored_security(&store).await;
    assert_eq!(security.failure_count, 3);
    let until = security.lockout_until.expect("lockout must be set");
    assert!(until >= before + Duration::seconds(60));
    assert!(until <= after + Duration::seconds(60));
}

#[tokio::test]
async fn test_active_lockout_denies_without_hash_comparison() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert(PATIENT, record("1234", 3, Some(30))).unwrap();
    let hasher = Arc::new(CountingHasher::new());
    let auth = Authenticator::new(store.clone(), hasher.clone(), LockoutPolicy::default());

    // Even the correct PIN is refused while the lockout is active
    let outcome = auth
        .attempt_unlock(PATIENT, &Pin::new("1234".to_string()))
        .await
        .unwrap();

    match outcome {
        UnlockOutcome::LockedOut { retry_after_secs } => {
            assert!(retry_after_secs >= 1 && retry_after_secs <= 30);
        }
        other => panic!("expected LockedOut, got {:?}", other),
    }
    assert_eq!(hasher.verify_calls.load(Ordering::SeqCst), 0);
    assert_eq!(stored_security(&store).await.failure_count, 3);
}

#[tokio::test]
async fn test_expired_lockout_allows_correct_pin_and_clears_state() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert(PATIENT, record("1234", 3, Some(-5))).unwrap();
    let auth = authenticator(&store);

    let outcome = auth
        .attempt_unlock(PATIENT, &Pin::new("1234".to_string()))
        .await
        .unwrap();

    assert!(outcome.is_success());
    let security = stored_security(&store).await;
    assert_eq!(security.failure_count, 0);
    assert!(security.lockout_until.is_none());
}

#[tokio::test]
async fn test_expired_lockout_wrong_pin_relocks() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert(PATIENT, record("1234", 3, Some(-5))).unwrap();
    let auth = authenticator(&store);

    let outcome = auth
        .attempt_unlock(PATIENT, &Pin::new("0000".to_string()))
        .await
        .unwrap();

    assert_eq!(outcome, UnlockOutcome::LockedOutJustNow { lockout_secs: 60 });
    let security = stored_security(&store).await;
    assert_eq!(security.failure_count, 4);
    assert!(security.lockout_until.expect("relocked") > Utc::now());
}

#[tokio::test]
async fn test_remaining_seconds_is_at_least_one() {
    let store = Arc::new(MemoryRecordStore::new());
    let mut rec = record("1234", 3, None);
    rec.security.lockout_until = Some(Utc::now() + Duration::milliseconds(500));
    store.insert(PATIENT, rec).unwrap();
    let auth = authenticator(&store);

    let outcome = auth
        .attempt_unlock(PATIENT, &Pin::new("1234".to_string()))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UnlockOutcome::LockedOut {
            retry_after_secs: 1
        }
    );
}

#[tokio::test]
async fn test_unknown_patient_is_not_found() {
    let store = Arc::new(MemoryRecordStore::new());
    let auth = authenticator(&store);

    let result = auth
        .attempt_unlock("no-such-patient", &Pin::new("1234".to_string()))
        .await;

    assert!(matches!(result, Err(UnlockError::NotFound)));
}

#[tokio::test]
async fn test_empty_inputs_are_invalid_requests() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert(PATIENT, record("1234", 0, None)).unwrap();
    let auth = authenticator(&store);

    let result = auth.attempt_unlock("", &Pin::new("1234".to_string())).await;
    assert!(matches!(
        result,
        Err(UnlockError::InvalidRequest { field: "patientId" })
    ));

    let result = auth.attempt_unlock(PATIENT, &Pin::new(String::new())).await;
    assert!(matches!(
        result,
        Err(UnlockError::InvalidRequest {
            field: "suppliedPin"
        })
    ));

    // Neither rejection touched the stored counters
    assert_eq!(stored_security(&store).await.failure_count, 0);
}

#[tokio::test]
async fn test_missing_pin_hash_is_misconfigured_and_mutates_nothing() {
    let store = Arc::new(MemoryRecordStore::new());
    let mut rec = record("1234", 1, None);
    rec.security.pin_hash = None;
    store.insert(PATIENT, rec).unwrap();
    let auth = authenticator(&store);

    let result = auth
        .attempt_unlock(PATIENT, &Pin::new("1234".to_string()))
        .await;

    assert!(matches!(result, Err(UnlockError::Misconfigured)));
    assert_eq!(stored_security(&store).await.failure_count, 1);
}

#[tokio::test]
async fn test_store_outage_surfaces_as_transient() {
    let auth = Authenticator::new(
        Arc::new(UnavailableStore),
        Arc::new(PlainHasher),
        LockoutPolicy::default(),
    );

    let result = auth
        .attempt_unlock(PATIENT, &Pin::new("1234".to_string()))
        .await;

    assert!(matches!(
        result,
        Err(UnlockError::Store(StoreError::Unavailable { .. }))
    ));
}

#[tokio::test]
async fn test_failed_attempts_never_touch_payloads() {
    let store = Arc::new(MemoryRecordStore::new());
    let rec = record("1234", 0, None);
    store.insert(PATIENT, rec.clone()).unwrap();
    let auth = authenticator(&store);

    auth.attempt_unlock(PATIENT, &Pin::new("0000".to_string()))
        .await
        .unwrap();

    let stored = store.get(PATIENT).await.unwrap().unwrap();
    assert_eq!(stored.public_info, rec.public_info);
    assert_eq!(stored.private_info, rec.private_info);
}

#[tokio::test]
async fn test_custom_policy_threshold_and_duration() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert(PATIENT, record("1234", 0, None)).unwrap();
    let policy = LockoutPolicy {
        max_failures: 2,
        lockout_secs: 120,
    };
    let auth = Authenticator::new(store.clone(), Arc::new(PlainHasher), policy);

    let first = auth
        .attempt_unlock(PATIENT, &Pin::new("0000".to_string()))
        .await
        .unwrap();
    assert_eq!(
        first,
        UnlockOutcome::Denied {
            attempt: 1,
            threshold: 2
        }
    );

    let second = auth
        .attempt_unlock(PATIENT, &Pin::new("0000".to_string()))
        .await
        .unwrap();
    assert_eq!(second, UnlockOutcome::LockedOutJustNow { lockout_secs: 120 });
}

/// Full lockout scenario: two prior failures, a third failure locks,
/// and the correct PIN is then refused until the lockout elapses.
#[tokio::test]
async fn test_lockout_scenario_end_to_end() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert(PATIENT, record("1234", 2, None)).unwrap();
    let auth = authenticator(&store);

    let outcome = auth
        .attempt_unlock(PATIENT, &Pin::new("0000".to_string()))
        .await
        .unwrap();
    assert_eq!(outcome, UnlockOutcome::LockedOutJustNow { lockout_secs: 60 });

    let security = stored_security(&store).await;
    assert_eq!(security.failure_count, 3);
    assert!(security.lockout_until.expect("locked") > Utc::now());

    let outcome = auth
        .attempt_unlock(PATIENT, &Pin::new("1234".to_string()))
        .await
        .unwrap();
    match outcome {
        UnlockOutcome::LockedOut { retry_after_secs } => {
            assert!(retry_after_secs >= 1 && retry_after_secs <= 60);
        }
        other => panic!("expected LockedOut, got {:?}", other),
    }
    assert_eq!(stored_security(&store).await.failure_count, 3);
}
