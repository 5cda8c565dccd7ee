//! PIN unlock protocol with brute-force lockout
//!
//! The authenticator checks a supplied PIN against a patient's security
//! record, counts consecutive failures, and imposes a time-boxed lockout
//! once the failure threshold is reached.

pub mod authenticator;
pub mod outcome;
pub mod policy;

// Public re-exports
pub use authenticator::Authenticator;
pub use outcome::UnlockOutcome;
pub use policy::LockoutPolicy;
