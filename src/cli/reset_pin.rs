//! Reset-pin command implementation
//!
//! Administrative PIN reset, gated by a bearer token. The new PIN is
//! read from stdin so it never appears in the process argument list.

use infotag_core::api;
use infotag_core::error::InfotagError;

use crate::cli::{build_service, read_pin_from_stdin};

/// Run the reset-pin command
pub async fn run_reset_pin(patient_id: &str, token: &str) -> Result<u16, InfotagError> {
    let service = build_service()?;
    let new_pin = read_pin_from_stdin()?;

    let response = match service.reset_secret(token, patient_id, &new_pin).await {
        Ok(()) => api::ack_response(),
        Err(e) => api::error_response(&e),
    };

    println!("{}", serde_json::to_string(&response.body)?);
    Ok(response.status)
}
