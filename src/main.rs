use std::error::Error;

use chrono::Utc;
use clap::Parser;
use kaspa_roi::{
    args::{Args, Command},
    config::RoiConfig,
    logging::setup_tracing,
    prices::PriceSnapshot,
    refresh::refresh,
    report::{format_projections, parse_investment, ReturnsReport, ShareLinks},
    util::format_utils::format_usd,
};
use tracing::{error, warn};

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let log_dir = RoiConfig::log_dir_for(&args.config);
    let (_writer, _guard) = setup_tracing(Some(&log_dir))?;
    let config = RoiConfig::read_config(Some(&args.config))?;

    match args.command {
        Command::Refresh { dry_run } => {
            let outcome = refresh(&config, dry_run).await.map_err(|e| {
                error!("Failed to update prices: {}", e);
                e
            })?;
            println!("{}", outcome);
        }
        Command::Report { amount, csv } => {
            let prices = PriceSnapshot::load(&config.prices_file)?;
            let report = ReturnsReport::compute(&config, &prices, Utc::now())?;
            println!("{}", report);
            if let Some(raw) = amount {
                match parse_investment(&raw) {
                    Some(value) => {
                        let projections = report.projections(value, &config.horizons);
                        println!(
                            "Projected value of {} at {:.2}% per year:",
                            format_usd(value),
                            report.tracked.rate
                        );
                        println!("{}", format_projections(&projections));
                    }
                    None => {
                        warn!(input = %raw, "Ignoring invalid investment amount");
                        println!("Enter an amount greater than zero to see projections.");
                    }
                }
            }
            if let Some(path) = csv {
                report.save_csv(path)?;
            }
        }
        Command::Share { amount } => {
            let prices = PriceSnapshot::load(&config.prices_file)?;
            let report = ReturnsReport::compute(&config, &prices, Utc::now())?;
            let investment = amount.as_deref().and_then(|raw| {
                let parsed = parse_investment(raw);
                if parsed.is_none() {
                    warn!(input = %raw, "Ignoring invalid investment amount");
                    println!("Enter an amount greater than zero to share a projection.\n");
                }
                parsed
            });
            let links = ShareLinks::new(&report, &config.share_site, investment);
            println!("{}\n", links.text);
            if let Some(text) = &links.investment_text {
                println!("{}\n", text);
            }
            println!("X:        {}", links.x_url);
            println!("WhatsApp: {}", links.whatsapp_url);
            println!("Discord:  {}", links.discord_url);
        }
    }
    Ok(())
}
