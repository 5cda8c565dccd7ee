//! Public-info command implementation
//!
//! Fetches the unguarded public section of a patient record. No PIN,
//! no token, and no security state is touched.

use infotag_core::api;
use infotag_core::error::InfotagError;

use crate::cli::build_service;

/// Run the public-info command
pub async fn run_public_info(patient_id: &str) -> Result<u16, InfotagError> {
    let service = build_service()?;

    let response = match service.public_info(patient_id).await {
        Ok(info) => api::data_response(info),
        Err(e) => api::error_response(&e),
    };

    println!("{}", serde_json::to_string(&response.body)?);
    Ok(response.status)
}
