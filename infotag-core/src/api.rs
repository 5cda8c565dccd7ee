//! Transport-agnostic boundary types
//!
//! Maps unlock outcomes and errors onto the response envelope and status
//! code any transport layer serves. Unexpected faults always become a
//! generic 500-class envelope rather than crossing the boundary raw.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::error::{IdentityError, InfotagError, UnlockError};
use crate::unlock::UnlockOutcome;

/// Inbound unlock request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockRequest {
    pub patient_id: String,
    pub supplied_pin: String,
}

/// Response envelope shared by all operations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// Successful envelope carrying a payload
    pub fn data(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Successful envelope with no payload (acknowledgements)
    pub fn ack() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// Failure envelope with a user-facing message
    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// A status code plus envelope, ready for any transport
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Envelope,
}

/// Map an unlock outcome to its boundary response
pub fn unlock_response(outcome: &UnlockOutcome) -> ApiResponse {
    match outcome {
        UnlockOutcome::Success { data } => ApiResponse {
            status: 200,
            body: Envelope::data(data.clone()),
        },
        UnlockOutcome::Denied { .. } => ApiResponse {
            status: 401,
            body: Envelope::failure(outcome.denial_message().unwrap_or_default()),
        },
        UnlockOutcome::LockedOut { .. } | UnlockOutcome::LockedOutJustNow { .. } => ApiResponse {
            status: 429,
            body: Envelope::failure(outcome.denial_message().unwrap_or_default()),
        },
    }
}

/// Successful data response for lookups
pub fn data_response(data: Value) -> ApiResponse {
    ApiResponse {
        status: 200,
        body: Envelope::data(data),
    }
}

/// Acknowledgement response for administrative operations
pub fn ack_response() -> ApiResponse {
    ApiResponse {
        status: 200,
        body: Envelope::ack(),
    }
}

/// Map an error to its boundary response
///
/// Caller errors keep their message; server-side failures are collapsed
/// into a generic envelope and logged for operators.
pub fn error_response(err: &InfotagError) -> ApiResponse {
    match err {
        InfotagError::Unlock(UnlockError::InvalidRequest { .. }) => ApiResponse {
            status: 400,
            body: Envelope::failure(err.to_string()),
        },
        InfotagError::Unlock(UnlockError::NotFound) => ApiResponse {
            status: 404,
            body: Envelope::failure("patient record not found".to_string()),
        },
        InfotagError::Identity(IdentityError::Rejected) => ApiResponse {
            status: 401,
            body: Envelope::failure("unauthorized".to_string()),
        },
        _ => {
            error!(%err, "request failed with a server-side error");
            ApiResponse {
                status: 500,
                body: Envelope::failure("internal error".to_string()),
            }
        }
    }
}
