//! infotag - Emergency Medical Tag Service CLI
//!
//! A command-line front end for the emergency medical information
//! service: PIN-guarded unlock of patient records with brute-force
//! lockout, public info lookup, administrative PIN reset, and health
//! reporting.

use clap::{Parser, Subcommand};
use infotag_core::{error::InfotagError, init_logging};

mod cli;

#[derive(Parser)]
#[command(name = "infotag")]
#[command(about = "Emergency medical tag service with PIN-guarded unlock")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attempt a PIN unlock for a patient record (PIN read from stdin)
    Unlock {
        /// Patient record key, as read from the tag
        patient_id: String,
    },
    /// Reset a patient's PIN (administrative; new PIN read from stdin)
    ResetPin {
        /// Patient record key
        patient_id: String,
        /// Bearer token attesting the caller's identity
        #[arg(long)]
        token: String,
    },
    /// Fetch the unguarded public section of a patient record
    PublicInfo {
        /// Patient record key
        patient_id: String,
    },
    /// Report service status and the active store backend
    Health,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Unlock { patient_id } => cli::unlock::run_unlock(&patient_id).await,
        Commands::ResetPin { patient_id, token } => {
            cli::reset_pin::run_reset_pin(&patient_id, &token).await
        }
        Commands::PublicInfo { patient_id } => cli::public_info::run_public_info(&patient_id).await,
        Commands::Health => cli::health::run_health().await,
    };

    match result {
        // Denials and lookup failures still print their envelope; only a
        // 200-class boundary status exits zero
        Ok(status) => std::process::exit(if status == 200 { 0 } else { 1 }),
        Err(e) => {
            let exit_code = match e {
                // Configuration errors (exit code 2)
                InfotagError::Config(_) | InfotagError::Toml(_) | InfotagError::TomlSerialize(_) => {
                    2
                }
                // Runtime errors (exit code 1)
                _ => 1,
            };

            eprintln!("{}", e);
            std::process::exit(exit_code);
        }
    }
}
