use serde::Serialize;

use crate::model::{network_name, MarketRecord, Token};
use crate::numeric::{format_bps, format_percent, to_usd};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketView {
    pub id: String,
    pub chain_id: u64,
    pub network: &'static str,
    pub address: String,
    pub loan_token: Token,
    pub collateral_token: Token,
    pub supply_apy: String,
    pub borrow_apr: String,
    pub utilization: String,
    pub total_supply_usd: f64,
    pub total_borrow_usd: f64,
    pub available_liquidity_usd: f64,
    pub ltv: String,
    pub liquidation_threshold: String,
}

impl MarketView {
    pub fn from_record(m: &MarketRecord) -> Self {
        let total_supply_usd = to_usd(&m.total_supply_usd_ray);
        let total_borrow_usd = to_usd(&m.total_borrow_usd_ray);
        Self {
            id: m.id.clone(),
            chain_id: m.chain_id,
            network: network_name(m.chain_id),
            address: m.address.clone(),
            loan_token: m.loan_token.clone(),
            collateral_token: m.collateral_token.clone(),
            supply_apy: format_percent(&m.supply_rate_ray),
            borrow_apr: format_percent(&m.borrow_rate_ray),
            utilization: format_percent(&m.utilization_ray),
            total_supply_usd,
            total_borrow_usd,
            available_liquidity_usd: (total_supply_usd - total_borrow_usd).max(0.0),
            ltv: format_bps(m.ltv_bps),
            liquidation_threshold: format_bps(m.liquidation_threshold_bps),
        }
    }
}
