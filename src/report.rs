//! Annualized returns of the tracked asset and its benchmarks.
//!
//! A report is always computed from scratch out of the configuration, the
//! current price snapshot and a caller-supplied "now". Nothing is cached.

use std::{fmt, io, path::Path};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    calculator::{annualized_return, projected_value},
    config::{AssetConfig, RoiConfig},
    data::{Period, PricePoint},
    error::RoiError,
    prices::PriceSnapshot,
    util::{
        date_utils::display_date,
        format_utils::{format_percent, format_price, format_usd},
    },
};

const X_INTENT_URL: &str = "https://x.com/intent/tweet?text=";
const WHATSAPP_URL: &str = "https://web.whatsapp.com/send?text=";
const DISCORD_URL: &str = "https://discord.com/channels/@me";
const INVESTMENT_HASHTAGS: &str = "#Kaspa #Crypto #ROI #BlockDAG";

/// Horizon quoted in the investment share text.
pub const SHARE_HORIZON_YEARS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetReturn {
    pub key: String,
    pub name: String,
    pub initial: PricePoint,
    pub current: f64,
    pub years: Period,
    /// Annualized return in percent.
    pub rate: f64,
}

impl AssetReturn {
    pub fn compute(
        asset: &AssetConfig,
        prices: &PriceSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Self, RoiError> {
        let initial = asset.initial_point()?;
        let current = prices.current_price(asset);
        let years = Period::since(&initial, now);
        if years.is_degenerate() || !initial.is_positive() {
            warn!(
                asset = %asset.key,
                initial = initial.value,
                years = years.years(),
                "Reference price or period is degenerate; annualized return is not meaningful"
            );
        }
        let rate = annualized_return(initial.value, current, years.years());
        debug!(asset = %asset.key, initial = initial.value, current, years = years.years(), rate, "Computed annualized return");
        Ok(Self {
            key: asset.key.clone(),
            name: asset.name.clone(),
            initial,
            current,
            years,
            rate,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    pub horizon_years: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnsReport {
    pub as_of: DateTime<Utc>,
    pub tracked: AssetReturn,
    pub benchmarks: Vec<AssetReturn>,
}

impl ReturnsReport {
    /**
    Computes every asset's annualized return from its reference price up to `now`.

    ## Arguments
    - `config`: Assets and their reference prices.
    - `prices`: Current prices; missing entries use each asset's default.
    - `now`: The end of the measured period.

    ## Returns
    The report, or an error if a reference date cannot be parsed.
     */
    pub fn compute(
        config: &RoiConfig,
        prices: &PriceSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Self, RoiError> {
        let tracked = AssetReturn::compute(&config.tracked, prices, now)?;
        let benchmarks = config
            .benchmarks
            .iter()
            .map(|asset| AssetReturn::compute(asset, prices, now))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            as_of: now,
            tracked,
            benchmarks,
        })
    }

    /// The tracked asset first, then the benchmarks.
    pub fn assets(&self) -> impl Iterator<Item = &AssetReturn> {
        std::iter::once(&self.tracked).chain(self.benchmarks.iter())
    }

    /// What `amount` grows to over each horizon at the tracked asset's rate.
    pub fn projections(&self, amount: f64, horizons: &[u32]) -> Vec<Projection> {
        horizons
            .iter()
            .map(|&horizon_years| self.projection(amount, horizon_years))
            .collect()
    }

    pub fn projection(&self, amount: f64, horizon_years: u32) -> Projection {
        Projection {
            horizon_years,
            value: projected_value(amount, self.tracked.rate, f64::from(horizon_years)),
        }
    }

    /// Writes one CSV row per asset.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), RoiError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            "key",
            "name",
            "initial_date",
            "initial_price",
            "current_price",
            "years",
            "annualized_return_pct",
        ])?;
        for asset in self.assets() {
            csv_writer.write_record([
                asset.key.clone(),
                asset.name.clone(),
                asset.initial.timestamp.format("%Y-%m-%d").to_string(),
                asset.initial.value.to_string(),
                asset.current.to_string(),
                format!("{:.6}", asset.years.years()),
                format!("{:.4}", asset.rate),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), RoiError> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_csv(file)?;
        info!("Report written to {}", path.as_ref().display());
        Ok(())
    }
}

impl fmt::Display for ReturnsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} annualized ROI since inception ({} - {}): {}",
            self.tracked.name,
            display_date(self.tracked.initial.timestamp),
            display_date(self.as_of),
            format_percent(self.tracked.rate)
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<10} | {:>12} | {:>12} | {:>12}",
            "Asset", "Initial", "Current", "Annualized"
        )?;
        writeln!(f, "{}", "-".repeat(55))?;
        for asset in self.assets() {
            writeln!(
                f,
                "{:<10} | {:>12} | {:>12} | {:>12}",
                asset.name,
                format_price(asset.initial.value),
                format_price(asset.current),
                format_percent(asset.rate)
            )?;
        }
        Ok(())
    }
}

/// Renders projections as `1 year: $1,234.56` lines.
pub fn format_projections(projections: &[Projection]) -> String {
    projections
        .iter()
        .map(|p| {
            let unit = if p.horizon_years == 1 { "year" } else { "years" };
            format!("{} {}: {}", p.horizon_years, unit, format_usd(p.value))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/**
Parses a user-entered investment amount.

An optional leading `$` is allowed, and commas only as thousands separators
(`1,000` or `12,345.50`, never `1,0,0`). Only finite amounts greater than
zero are accepted; everything else yields `None` and the caller should skip
projections.
 */
pub fn parse_investment(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let number = trimmed.strip_prefix('$').unwrap_or(trimmed);
    if number.contains(',') && !has_valid_grouping(number) {
        return None;
    }
    match number.replace(',', "").parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Some(amount),
        _ => None,
    }
}

/// `\d{1,3}(,\d{3})*(\.\d+)?`
fn has_valid_grouping(number: &str) -> bool {
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (number, None),
    };
    let mut groups = whole.split(',');
    let leading_ok = groups
        .next()
        .is_some_and(|first| first.len() <= 3 && all_digits(first));
    leading_ok
        && groups.all(|group| group.len() == 3 && all_digits(group))
        && fraction.map_or(true, all_digits)
}

/// Ready-made share text and share-intent links for the tracked asset's rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareLinks {
    pub text: String,
    pub x_url: String,
    pub whatsapp_url: String,
    pub discord_url: String,
    /// Present only when a valid investment amount was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_text: Option<String>,
}

impl ShareLinks {
    pub fn new(report: &ReturnsReport, site: &str, amount: Option<f64>) -> Self {
        let text = format!(
            "{}'s wild growth 🚀\nAnnualized ROI since inception: {:.2}%.\n(From {} to {})\nData: {}",
            report.tracked.name,
            report.tracked.rate,
            display_date(report.tracked.initial.timestamp),
            display_date(report.as_of),
            site
        );
        let encoded = urlencoding::encode(&text);
        Self {
            x_url: format!("{}{}", X_INTENT_URL, encoded),
            whatsapp_url: format!("{}{}", WHATSAPP_URL, encoded),
            discord_url: DISCORD_URL.to_string(),
            investment_text: amount.map(|amount| investment_share_text(report, site, amount)),
            text,
        }
    }
}

/// Share text quoting what `amount` would grow to over `SHARE_HORIZON_YEARS`.
pub fn investment_share_text(report: &ReturnsReport, site: &str, amount: f64) -> String {
    let projection = report.projection(amount, SHARE_HORIZON_YEARS);
    format!(
        "🚀 {}'s Annualized ROI: {:.2}%! 💎 If invested {} today, it could be worth {} in {} years (based on historical growth). {}\n\nCheck it out here: {}",
        report.tracked.name,
        report.tracked.rate,
        format_usd(amount),
        format_usd(projection.value),
        projection.horizon_years,
        INVESTMENT_HASHTAGS,
        site
    )
}
