// Merges per-market position legs with open loans into one row per
// (chain, market), then rolls the rows up into a portfolio summary.

use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use serde::Serialize;

use crate::model::{network_name, LoanRecord, MarketRecord, PositionEntry, PositionKind, Token};
use crate::numeric::{bps_to_ratio, compute_interest_usd, format_percent, to_usd};

use super::loans::accrual_seconds;

type MarketKey = (u64, String);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionView {
    pub chain_id: u64,
    pub network: &'static str,
    pub market_id: String,
    pub loan_token: Option<Token>,
    pub collateral_token: Option<Token>,
    pub supplied_usd: f64,
    pub collateral_usd: f64,
    pub borrowed_usd: f64,
    pub accrued_interest_usd: f64,
    pub debt_usd: f64,
    pub supply_apy: Option<String>,
    pub borrow_apr: Option<String>,
    pub health_factor: Option<f64>,
    pub open_loans: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_supplied_usd: f64,
    pub total_collateral_usd: f64,
    pub total_borrowed_usd: f64,
    pub total_accrued_interest_usd: f64,
    pub net_worth_usd: f64,
    pub chain_count: usize,
    pub lowest_health_factor: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub positions: Vec<PositionView>,
    pub summary: PortfolioSummary,
}

#[derive(Default)]
struct Legs {
    supplied_usd: f64,
    collateral_usd: f64,
    borrowed_usd: f64,
    loan_token: Option<Token>,
    collateral_token: Option<Token>,
}

/// Build the portfolio view. Only markets the account has position legs in
/// produce rows; open loans contribute accrued interest to their row.
pub fn aggregate_portfolio(
    entries: &[PositionEntry],
    loans: &[LoanRecord],
    markets: &[MarketRecord],
    now: u64,
) -> Portfolio {
    let mut legs: BTreeMap<MarketKey, Legs> = BTreeMap::new();
    for e in entries {
        if e.kind == PositionKind::Other {
            continue;
        }
        let usd = to_usd(&e.amount_usd_ray);
        let slot = legs.entry((e.chain_id, e.market_id.clone())).or_default();
        match e.kind {
            PositionKind::Supply => {
                slot.supplied_usd += usd;
                slot.loan_token.get_or_insert_with(|| e.token.clone());
            }
            PositionKind::Borrow => {
                slot.borrowed_usd += usd;
                slot.loan_token.get_or_insert_with(|| e.token.clone());
            }
            PositionKind::Collateral => {
                slot.collateral_usd += usd;
                slot.collateral_token.get_or_insert_with(|| e.token.clone());
            }
            PositionKind::Other => {}
        }
    }

    let open_loans: HashMap<MarketKey, Vec<&LoanRecord>> = loans
        .iter()
        .filter(|l| l.is_open())
        .into_group_map_by(|l| (l.chain_id, l.market_id.clone()));

    let market_index: HashMap<(u64, &str), &MarketRecord> = markets
        .iter()
        .map(|m| ((m.chain_id, m.id.as_str()), m))
        .collect();

    let positions: Vec<PositionView> = legs
        .into_iter()
        .map(|(key, leg)| {
            let market = market_index.get(&(key.0, key.1.as_str())).copied();
            let row_loans = open_loans.get(&key).map(Vec::as_slice).unwrap_or(&[]);
            build_row(key, leg, market, row_loans, now)
        })
        .collect();

    let summary = summarize(&positions);
    Portfolio { positions, summary }
}

fn build_row(
    (chain_id, market_id): MarketKey,
    leg: Legs,
    market: Option<&MarketRecord>,
    loans: &[&LoanRecord],
    now: u64,
) -> PositionView {
    let accrued_interest_usd: f64 = loans
        .iter()
        .map(|l| {
            compute_interest_usd(to_usd(&l.principal_usd_ray), &l.apr_ray, accrual_seconds(l, now))
        })
        .sum();
    let debt_usd = leg.borrowed_usd + accrued_interest_usd;

    let health_factor = market.and_then(|m| {
        if debt_usd > 0.0 {
            Some(leg.collateral_usd * bps_to_ratio(m.liquidation_threshold_bps) / debt_usd)
        } else {
            None
        }
    });

    PositionView {
        chain_id,
        network: network_name(chain_id),
        market_id,
        loan_token: market.map(|m| m.loan_token.clone()).or(leg.loan_token),
        collateral_token: market.map(|m| m.collateral_token.clone()).or(leg.collateral_token),
        supplied_usd: leg.supplied_usd,
        collateral_usd: leg.collateral_usd,
        borrowed_usd: leg.borrowed_usd,
        accrued_interest_usd,
        debt_usd,
        supply_apy: market.map(|m| format_percent(&m.supply_rate_ray)),
        borrow_apr: market.map(|m| format_percent(&m.borrow_rate_ray)),
        health_factor,
        open_loans: loans.len(),
    }
}

fn summarize(rows: &[PositionView]) -> PortfolioSummary {
    let mut s = PortfolioSummary::default();
    for r in rows {
        s.total_supplied_usd += r.supplied_usd;
        s.total_collateral_usd += r.collateral_usd;
        s.total_borrowed_usd += r.borrowed_usd;
        s.total_accrued_interest_usd += r.accrued_interest_usd;
    }
    s.net_worth_usd = s.total_supplied_usd + s.total_collateral_usd
        - s.total_borrowed_usd
        - s.total_accrued_interest_usd;
    s.chain_count = rows.iter().map(|r| r.chain_id).unique().count();
    s.lowest_health_factor = rows
        .iter()
        .filter_map(|r| r.health_factor)
        .min_by(|a, b| a.total_cmp(b));
    s
}
