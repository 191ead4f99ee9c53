pub mod period;
pub mod price_point;

pub use period::Period;
pub use price_point::PricePoint;
