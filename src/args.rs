use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "kaspa-roi",
    version,
    about = "Annualized return of Kaspa versus benchmark assets"
)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "KASPA_ROI_CONFIG", default_value = "config.yml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Print annualized returns and, for an amount, projected values
    Report {
        /// Hypothetical investment in USD
        #[arg(short, long)]
        amount: Option<String>,
        /// Also write the returns table to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Fetch current prices and rewrite the price snapshot
    Refresh {
        /// Resolve prices without writing the snapshot
        #[arg(long)]
        dry_run: bool,
    },
    /// Print share text and share-intent links
    Share {
        /// Hypothetical investment in USD to quote in the share text
        #[arg(short, long)]
        amount: Option<String>,
    },
}

/// Arguments of the `server` binary.
#[derive(Parser, Debug)]
#[command(
    name = "server",
    version,
    about = "Serve the Kaspa ROI page and JSON API"
)]
pub struct ServerArgs {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "KASPA_ROI_CONFIG", default_value = "config.yml")]
    pub config: PathBuf,
}
