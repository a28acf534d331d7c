//! Shipment Cost Sync CLI
//!
//! Command-line interface for reconciling vendor shipment cost exports into
//! the shipments database.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- all > report.csv
//! cargo run -- 8 > report.csv
//! cargo run -- discover > column_mappings.toml
//! RUST_LOG=debug RECONCILE_CSV_DIR=/data/exports cargo run -- all
//! ```
//!
//! The program reads `<csv_dir>/<fileId>.csv` for the selected file(s),
//! applies each row to the matching `ShipmentCosts` record, and writes a
//! per-file summary to stdout. Logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success (individual files or records may still have been skipped)
//! - 1: Fatal error (configuration, mapping table, database connection, ...)
//! - 2: Invalid command-line arguments

use shipment_cost_sync::cli;
use shipment_cost_sync::config::AppConfig;
use shipment_cost_sync::core::PgCostStore;
use shipment_cost_sync::io::{discover_file, write_report_csv};
use shipment_cost_sync::pipeline::{Pipeline, Target};
use shipment_cost_sync::types::ReconcileError;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // Parse command-line arguments using clap; invalid input exits here
    let args = cli::parse_args();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: Failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(args.target)) {
        error!(error = %e, "run aborted");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(target: Target) -> Result<(), ReconcileError> {
    let config = AppConfig::load()?;

    if target == Target::Discover {
        let table = discover_file(&config.discovery_path()).await?;
        info!(files = table.len(), "mapping table discovered");
        print!("{}", table.to_toml_string()?);
        return Ok(());
    }

    let mappings = config.mapping_table()?;
    if let Target::File(file_id) = target {
        mappings.require(file_id)?;
    }

    // Blocked files are reported without touching the database
    let store = if target.needs_database(&mappings) {
        PgCostStore::connect(&config.database).await?
    } else {
        info!(%target, "no file to reconcile, database not contacted");
        PgCostStore::connect_lazy(&config.database)?
    };
    let store = Arc::new(store);
    info!(%target, files = mappings.len(), "starting reconciliation");

    let pipeline = Pipeline::new(config, mappings, Arc::clone(&store));
    let reports = pipeline.run(target).await;
    store.close().await;

    let mut output = std::io::stdout();
    write_report_csv(&reports?, &mut output)
}
