use super::ray::ray_to_number;
use super::SECONDS_IN_YEAR;

/// Seconds between two unix timestamps given as decimal strings. 0 when either
/// side does not parse or the end precedes the start.
pub fn compute_duration_seconds(start: &str, end: &str) -> u64 {
    match (start.trim().parse::<u64>(), end.trim().parse::<u64>()) {
        (Ok(start), Ok(end)) => end.saturating_sub(start),
        _ => 0,
    }
}

/// Simple (non-compounding) interest accrued on `principal_usd` at a RAY APR.
pub fn compute_interest_usd(principal_usd: f64, apr_ray: &str, duration_seconds: u64) -> f64 {
    if !principal_usd.is_finite() || principal_usd <= 0.0 {
        return 0.0;
    }
    let apr = ray_to_number(apr_ray);
    principal_usd * apr * (duration_seconds as f64 / SECONDS_IN_YEAR as f64)
}
