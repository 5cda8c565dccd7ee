//! Unlock command implementation
//!
//! Runs a PIN unlock attempt for a patient record. The response
//! envelope goes to stdout (machine-parsable); the boundary status code
//! is returned so main can map it to an exit code.

use infotag_core::api;
use infotag_core::error::InfotagError;

use crate::cli::{build_service, read_pin_from_stdin};

/// Run the unlock command
pub async fn run_unlock(patient_id: &str) -> Result<u16, InfotagError> {
    let service = build_service()?;
    let pin = read_pin_from_stdin()?;

    let response = match service.attempt_unlock(patient_id, &pin).await {
        Ok(outcome) => api::unlock_response(&outcome),
        Err(e) => api::error_response(&e),
    };

    println!("{}", serde_json::to_string(&response.body)?);
    Ok(response.status)
}
