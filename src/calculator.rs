//! Compound annual growth rate and forward compounding.
//!
//! Both functions are total: every input, including degenerate ones, yields a
//! number. Input validation belongs to the caller.

/**
Annualized compound growth rate between two prices, in percent.

Returns exactly `0.0` when `initial_value` is zero or `years` is not positive.
Negative prices are not guarded against and propagate whatever `powf` produces
(usually `NaN`).

## Arguments
- `initial_value`: The starting price.
- `final_value`: The ending price.
- `years`: Elapsed time between the two prices, in fractional years.

## Returns
The growth rate as a percentage, e.g. `42.5` for 42.5% per year.
 */
pub fn annualized_return(initial_value: f64, final_value: f64, years: f64) -> f64 {
    if initial_value == 0.0 || years <= 0.0 {
        return 0.0;
    }
    ((final_value / initial_value).powf(1.0 / years) - 1.0) * 100.0
}

/**
Value of `principal` after compounding at `annual_rate_percent` for
`horizon_years`.

## Arguments
- `principal`: The starting amount.
- `annual_rate_percent`: Growth per year in percent, e.g. `20.0`.
- `horizon_years`: Number of years to compound over. Fractional values are allowed.

## Returns
`principal * (1 + annual_rate_percent / 100) ^ horizon_years`.
 */
pub fn projected_value(principal: f64, annual_rate_percent: f64, horizon_years: f64) -> f64 {
    principal * (1.0 + annual_rate_percent / 100.0).powf(horizon_years)
}
