/**
Format an amount as US dollars with thousands separators and two decimals,
e.g. `$1,234.56` or `-$12.00`.

Non-finite amounts are rendered as-is (`$NaN`, `$inf`) rather than hidden.
 */
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${}", amount);
    }
    let rounded = format!("{:.2}", amount.abs());
    let (whole, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let sign = if amount < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// Formats a rate with two decimals and a percent sign, e.g. `42.50%`.
pub fn format_percent(rate: f64) -> String {
    format!("{:.2}%", rate)
}

/// Formats a price without trailing zeros, keeping small prices readable.
pub fn format_price(price: f64) -> String {
    if price.is_finite() && price.abs() < 1.0 {
        format!("${}", price)
    } else {
        format_usd(price)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
