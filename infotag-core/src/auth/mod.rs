//! Authentication collaborators
//!
//! Secret hashing for PINs at rest and bearer-token identity
//! verification for the administrative and responder paths.

pub mod hasher;
pub mod identity;

// Public re-exports
pub use hasher::{Argon2SecretHasher, SecretHasher};
pub use identity::{AllowAllVerifier, HttpIdentityVerifier, IdentityVerifier};
