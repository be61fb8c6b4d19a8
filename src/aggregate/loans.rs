use serde::Serialize;

use crate::model::{network_name, LoanRecord, LoanStatus, Token};
use crate::numeric::{compute_duration_seconds, compute_interest_usd, format_percent, to_usd};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub id: String,
    pub chain_id: u64,
    pub network: &'static str,
    pub market_id: String,
    pub token: Token,
    pub principal_usd: f64,
    pub apr: String,
    pub start_timestamp: String,
    pub end_timestamp: Option<String>,
    pub duration_seconds: u64,
    pub interest_usd: f64,
    pub total_owed_usd: f64,
    pub status: LoanStatus,
    pub is_open: bool,
    pub tx_hash: Option<String>,
}

impl LoanView {
    /// Open loans accrue up to `now`; closed loans up to their end timestamp.
    pub fn from_record(l: &LoanRecord, now: u64) -> Self {
        let principal_usd = to_usd(&l.principal_usd_ray);
        let duration_seconds = accrual_seconds(l, now);
        let interest_usd = compute_interest_usd(principal_usd, &l.apr_ray, duration_seconds);
        Self {
            id: l.id.clone(),
            chain_id: l.chain_id,
            network: network_name(l.chain_id),
            market_id: l.market_id.clone(),
            token: l.token.clone(),
            principal_usd,
            apr: format_percent(&l.apr_ray),
            start_timestamp: l.start_timestamp.clone(),
            end_timestamp: l.end_timestamp.clone(),
            duration_seconds,
            interest_usd,
            total_owed_usd: principal_usd + interest_usd,
            status: l.status,
            is_open: l.is_open(),
            tx_hash: l.tx_hash.clone(),
        }
    }
}

pub(crate) fn accrual_seconds(l: &LoanRecord, now: u64) -> u64 {
    match (&l.end_timestamp, l.status) {
        (_, LoanStatus::Open) => compute_duration_seconds(&l.start_timestamp, &now.to_string()),
        (Some(end), _) => compute_duration_seconds(&l.start_timestamp, end),
        // closed without a recorded end: nothing we can accrue
        (None, _) => 0,
    }
}

fn started_at(l: &LoanRecord) -> u64 {
    l.start_timestamp.trim().parse().unwrap_or(0)
}

/// Newest loans first, ties by id, at most `limit` rows.
pub fn loan_history(records: &[LoanRecord], now: u64, limit: usize) -> Vec<LoanView> {
    let mut sorted: Vec<&LoanRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        started_at(b)
            .cmp(&started_at(a))
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted
        .into_iter()
        .take(limit)
        .map(|l| LoanView::from_record(l, now))
        .collect()
}
