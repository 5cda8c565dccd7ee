//! Unlock attempt outcomes

use serde_json::Value;

/// Result of an unlock attempt
///
/// Denials are expected user-facing outcomes, not errors; failures of
/// the protocol itself are reported as [`crate::error::UnlockError`].
#[derive(Debug, Clone, PartialEq)]
pub enum UnlockOutcome {
    /// The PIN matched; carries the protected payload
    Success { data: Value },

    /// The PIN did not match and the failure counter was incremented
    Denied { attempt: u32, threshold: u32 },

    /// An earlier lockout is still active; verification was skipped
    LockedOut { retry_after_secs: u64 },

    /// This attempt reached the failure threshold and imposed the lockout
    LockedOutJustNow { lockout_secs: u64 },
}

impl UnlockOutcome {
    /// Whether the protected payload was released
    pub fn is_success(&self) -> bool {
        matches!(self, UnlockOutcome::Success { .. })
    }

    /// User-facing denial message, `None` for successful unlocks
    pub fn denial_message(&self) -> Option<String> {
        match self {
            UnlockOutcome::Success { .. } => None,
            UnlockOutcome::Denied { attempt, threshold } => {
                Some(format!("invalid PIN, attempt {}/{}", attempt, threshold))
            }
            UnlockOutcome::LockedOut { retry_after_secs } => {
                Some(format!("locked out, retry in {} seconds", retry_after_secs))
            }
            UnlockOutcome::LockedOutJustNow { lockout_secs } => {
                Some(format!("locked for {} seconds", lockout_secs))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_denial_message() {
        let outcome = UnlockOutcome::Success {
            data: serde_json::json!({}),
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.denial_message(), None);
    }

    #[test]
    fn test_denied_message() {
        let outcome = UnlockOutcome::Denied {
            attempt: 2,
            threshold: 3,
        };
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.denial_message().unwrap(),
            "invalid PIN, attempt 2/3"
        );
    }

    #[test]
    fn test_locked_out_message() {
        let outcome = UnlockOutcome::LockedOut {
            retry_after_secs: 42,
        };
        assert_eq!(
            outcome.denial_message().unwrap(),
            "locked out, retry in 42 seconds"
        );
    }

    #[test]
    fn test_locked_out_just_now_message() {
        let outcome = UnlockOutcome::LockedOutJustNow { lockout_secs: 60 };
        assert_eq!(outcome.denial_message().unwrap(), "locked for 60 seconds");
    }
}
