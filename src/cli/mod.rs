//! CLI command implementations
//!
//! This module contains the implementation of all CLI subcommands plus
//! the shared service construction and stdin helpers.

use infotag_core::config::toml_config::{config_exists, get_config_path, load_config};
use infotag_core::config::ServiceConfig;
use infotag_core::error::InfotagError;
use infotag_core::service::TagService;
use infotag_core::types::Pin;

pub mod health;
pub mod public_info;
pub mod reset_pin;
pub mod unlock;

/// Build the service from the user's configuration file
///
/// A missing configuration file is not an error; the service then runs
/// in simulated mode against the seeded in-memory store.
pub fn build_service() -> Result<TagService, InfotagError> {
    let config = if config_exists()? {
        let path = get_config_path()?;
        tracing::debug!(path = ?path, "loading service configuration");
        load_config()?
    } else {
        tracing::debug!("no configuration file found, using defaults");
        ServiceConfig::default()
    };
    TagService::from_config(&config)
}

/// Read a PIN from the first line of stdin
pub fn read_pin_from_stdin() -> Result<Pin, InfotagError> {
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(Pin::new(line.trim_end_matches(['\r', '\n']).to_string()))
}
