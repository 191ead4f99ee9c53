use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{data::PricePoint, util::date_utils::years_between};

/// Elapsed time in fractional years, measured with a 365.25-day year.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(f64);

impl Period {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self(years_between(start, end))
    }

    /// The period from a reference price's timestamp up to `now`.
    pub fn since(point: &PricePoint, now: DateTime<Utc>) -> Self {
        Self::between(point.timestamp, now)
    }

    pub fn years(&self) -> f64 {
        self.0
    }

    /// A zero or negative period has no meaningful growth rate.
    pub fn is_degenerate(&self) -> bool {
        self.0 <= 0.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} years", self.0)
    }
}
