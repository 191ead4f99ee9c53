use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A price observed at a point in time.
///
/// Growth rates are only meaningful for `value > 0`; the type does not
/// enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl PricePoint {
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }

    pub fn is_positive(&self) -> bool {
        self.value > 0.0
    }
}
