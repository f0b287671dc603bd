//! # Consistency Audit Tool
//!
//! Opens the configured store and reports any rental/car invariant that
//! doesn't hold. Exits non-zero when violations are found.
//!
//! ```bash
//! AUTORENT_DATABASE_PATH=./autorent_dev.db cargo run -p autorent-engine --bin autorent-audit
//! ```

use std::process::ExitCode;

use autorent_engine::{telemetry, EngineConfig, RentalEngine};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match EngineConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(2);
        }
    };

    telemetry::init_tracing(&config.log_filter);
    info!(path = %config.database_path.display(), "Starting consistency audit");

    let engine = match RentalEngine::connect(&config).await {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "Could not open store");
            return ExitCode::from(2);
        }
    };

    let violations = match engine.verify_consistency().await {
        Ok(violations) => violations,
        Err(e) => {
            error!(error = %e, "Audit failed");
            return ExitCode::from(2);
        }
    };

    engine.database().close().await;

    if violations.is_empty() {
        println!("✓ No violations");
        return ExitCode::SUCCESS;
    }

    println!("✗ {} violation(s):", violations.len());
    for violation in &violations {
        println!("  - {violation}");
    }
    ExitCode::FAILURE
}
