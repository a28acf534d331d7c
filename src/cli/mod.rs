// CLI module
// Command-line interface and argument parsing

mod args;

pub use args::CliArgs;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// If parsing fails (unknown target, missing argument, or `--help`), clap
/// prints the error or help text and exits the process before any work
/// starts.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
