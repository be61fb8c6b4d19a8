// Convert fixed-point decimal strings (RAY, token base units) into floats.
// Values are split on digit position instead of being parsed into an integer,
// so anything past u128 still converts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use ahash::AHashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use super::{BPS_DENOMINATOR, RAY_DECIMALS};

pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

static CONVERTER: OnceLock<RayConverter> = OnceLock::new();

/// Memoizing converter. One table per decimal scale, cleared wholesale once it
/// holds `capacity` entries.
pub struct RayConverter {
    tables: RwLock<AHashMap<u32, AHashMap<String, f64>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RayConverter {
    pub fn new(capacity: usize) -> Self {
        Self {
            tables: RwLock::new(AHashMap::new()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ray_to_number(&self, value: &str) -> f64 {
        self.convert(value, RAY_DECIMALS)
    }

    pub fn convert(&self, value: &str, decimals: u32) -> f64 {
        if let Some(v) = self
            .tables
            .read()
            .get(&decimals)
            .and_then(|table| table.get(value))
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return *v;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = scaled_to_f64(value, decimals).unwrap_or_else(|| {
            trace!(value, decimals, "unparseable fixed-point value, using 0");
            0.0
        });

        let mut tables = self.tables.write();
        let table = tables.entry(decimals).or_default();
        if table.len() >= self.capacity {
            debug!(decimals, entries = table.len(), "converter cache full, clearing");
            table.clear();
        }
        table.insert(value.to_string(), result);
        result
    }

    /// Cached entries across all scales.
    pub fn len(&self) -> usize {
        self.tables.read().values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for RayConverter {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// Size the process-wide cache. Only effective before the first conversion;
/// returns false if the converter already exists.
pub fn install_cache_capacity(capacity: usize) -> bool {
    CONVERTER.set(RayConverter::new(capacity)).is_ok()
}

fn converter() -> &'static RayConverter {
    CONVERTER.get_or_init(RayConverter::default)
}

pub fn ray_to_number(value: &str) -> f64 {
    converter().ray_to_number(value)
}

/// RAY value as a percentage with two decimals: 10^27 -> "100.00".
pub fn format_percent(value: &str) -> String {
    let percent = ray_to_number(value) * 100.0;
    // anything that rounds to zero prints unsigned
    if !percent.is_finite() || percent.abs() < 0.005 {
        return "0.00".to_string();
    }
    format!("{:.2}", percent)
}

/// RAY-scaled USD amount in dollars.
pub fn to_usd(value: &str) -> f64 {
    ray_to_number(value)
}

pub fn format_units(raw: &str, decimals: u32) -> f64 {
    converter().convert(raw, decimals)
}

pub fn parse_bps(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

pub fn bps_to_percent(bps: u32) -> f64 {
    bps as f64 / 100.0
}

pub fn bps_to_ratio(bps: u32) -> f64 {
    bps as f64 / BPS_DENOMINATOR as f64
}

pub fn format_bps(bps: u32) -> String {
    format!("{:.2}", bps_to_percent(bps))
}

/// Dollars with cents and thousands separators, e.g. "-$1,234.50".
pub fn format_usd(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

// "-123456" with 3 decimals -> -123.456. None for anything that is not an
// optionally signed run of ASCII digits.
fn scaled_to_f64(s: &str, decimals: u32) -> Option<f64> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = digits.trim_start_matches('0');
    let scale = decimals as usize;
    let text = if digits.is_empty() {
        "0".to_string()
    } else if scale == 0 {
        digits.to_string()
    } else if digits.len() > scale {
        let split = digits.len() - scale;
        format!("{}.{}", &digits[..split], &digits[split..])
    } else {
        format!("0.{:0>width$}", digits, width = scale)
    };

    let magnitude: f64 = text.parse().ok()?;
    if !magnitude.is_finite() {
        return None;
    }
    if magnitude == 0.0 {
        return Some(0.0);
    }
    Some(if negative { -magnitude } else { magnitude })
}
