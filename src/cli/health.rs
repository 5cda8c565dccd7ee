//! Health command implementation
//!
//! Reports service status and which store backend is active.

use infotag_core::error::InfotagError;

use crate::cli::build_service;

/// Run the health command
pub async fn run_health() -> Result<u16, InfotagError> {
    let service = build_service()?;
    let health = service.health();

    println!("{}", serde_json::to_string(&health)?);
    Ok(200)
}
