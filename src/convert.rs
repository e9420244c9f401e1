//! Currency conversion arithmetic.

/// Rounds a monetary amount half away from zero to two decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts a USD price with the given exchange rate, rounded to cents.
pub fn convert(price_usd: f64, rate: f64) -> f64 {
    round_cents(price_usd * rate)
}
