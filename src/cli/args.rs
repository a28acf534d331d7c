use crate::pipeline::Target;
use clap::Parser;

/// Reconcile vendor shipment cost exports into the shipments database
#[derive(Parser, Debug)]
#[command(name = "shipment-cost-sync")]
#[command(
    about = "Reconcile vendor shipment cost exports into the shipments database",
    long_about = None
)]
pub struct CliArgs {
    /// What to process: `all`, a file identifier (1-39), or `discover`
    #[arg(
        value_name = "TARGET",
        value_parser = parse_target,
        help = "'all' for every configured file, a file identifier between 1 and 39, or 'discover' to print a mapping table derived from main.csv"
    )]
    pub target: Target,
}

fn parse_target(value: &str) -> Result<Target, String> {
    value.parse().map_err(|e: crate::types::ReconcileError| e.to_string())
}
