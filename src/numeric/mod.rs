//! Fixed-point helpers for on-chain values.
//!
//! Rates and USD figures arrive from the indexer as RAY integers (27 decimals),
//! thresholds as basis points. Everything here is pure and never fails: input
//! that does not parse converts to zero.

pub mod interest;
pub mod ray;

pub use interest::{compute_duration_seconds, compute_interest_usd};
pub use ray::{
    bps_to_percent, bps_to_ratio, format_bps, format_percent, format_units, format_usd,
    install_cache_capacity, parse_bps, ray_to_number, to_usd, RayConverter,
};

pub const RAY_DECIMALS: u32 = 27;
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;

pub const BPS_DENOMINATOR: u32 = 10_000; // 100%

/// 365 days; the indexer quotes APRs on this basis.
pub const SECONDS_IN_YEAR: u64 = 31_536_000;
