// Records as the indexer serves them. Every field is defaulted: the indexer
// omits columns freely, sends null for empty ones, and big integers arrive as
// strings or numbers.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Token {
    #[serde(deserialize_with = "de_or_default")]
    pub address: String,
    #[serde(deserialize_with = "de_or_default")]
    pub symbol: String,
    #[serde(deserialize_with = "de_u32")]
    pub decimals: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketRecord {
    #[serde(deserialize_with = "de_or_default")]
    pub id: String,
    #[serde(deserialize_with = "de_u64")]
    pub chain_id: u64,
    #[serde(deserialize_with = "de_or_default")]
    pub address: String,
    #[serde(deserialize_with = "de_or_default")]
    pub loan_token: Token,
    #[serde(deserialize_with = "de_or_default")]
    pub collateral_token: Token,
    #[serde(deserialize_with = "de_big")]
    pub supply_rate_ray: String,
    #[serde(deserialize_with = "de_big")]
    pub borrow_rate_ray: String,
    #[serde(deserialize_with = "de_big")]
    pub utilization_ray: String,
    #[serde(deserialize_with = "de_big")]
    pub total_supply_usd_ray: String,
    #[serde(deserialize_with = "de_big")]
    pub total_borrow_usd_ray: String,
    #[serde(deserialize_with = "de_u32")]
    pub ltv_bps: u32,
    #[serde(deserialize_with = "de_u32")]
    pub liquidation_threshold_bps: u32,
    #[serde(deserialize_with = "de_big")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PositionKind {
    Supply,
    Collateral,
    Borrow,
    #[default]
    Other,
}

impl From<String> for PositionKind {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "supply" | "lend" | "liquidity" => PositionKind::Supply,
            "collateral" => PositionKind::Collateral,
            "borrow" | "debt" => PositionKind::Borrow,
            _ => PositionKind::Other,
        }
    }
}

/// One leg of a user's position in a market.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionEntry {
    #[serde(deserialize_with = "de_or_default")]
    pub id: String,
    #[serde(deserialize_with = "de_or_default")]
    pub account: String,
    #[serde(deserialize_with = "de_u64")]
    pub chain_id: u64,
    #[serde(deserialize_with = "de_or_default")]
    pub market_id: String,
    #[serde(deserialize_with = "de_or_default")]
    pub kind: PositionKind,
    #[serde(deserialize_with = "de_or_default")]
    pub token: Token,
    #[serde(deserialize_with = "de_big")]
    pub amount: String,
    #[serde(deserialize_with = "de_big")]
    pub amount_usd_ray: String,
    #[serde(deserialize_with = "de_big")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum LoanStatus {
    Open,
    Repaid,
    Liquidated,
    #[default]
    Other,
}

impl LoanStatus {
    /// Wire word for the status. The indexer filter and the record parser both
    /// go through this table.
    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Open => "open",
            LoanStatus::Repaid => "repaid",
            LoanStatus::Liquidated => "liquidated",
            LoanStatus::Other => "other",
        }
    }
}

impl From<String> for LoanStatus {
    fn from(s: String) -> Self {
        [LoanStatus::Open, LoanStatus::Repaid, LoanStatus::Liquidated]
            .into_iter()
            .find(|status| status.as_str() == s)
            .unwrap_or(LoanStatus::Other)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanRecord {
    #[serde(deserialize_with = "de_or_default")]
    pub id: String,
    #[serde(deserialize_with = "de_or_default")]
    pub account: String,
    #[serde(deserialize_with = "de_u64")]
    pub chain_id: u64,
    #[serde(deserialize_with = "de_or_default")]
    pub market_id: String,
    #[serde(deserialize_with = "de_or_default")]
    pub token: Token,
    #[serde(deserialize_with = "de_big")]
    pub principal_usd_ray: String,
    #[serde(deserialize_with = "de_big")]
    pub apr_ray: String,
    #[serde(deserialize_with = "de_big")]
    pub start_timestamp: String,
    #[serde(deserialize_with = "de_opt_big")]
    pub end_timestamp: Option<String>,
    #[serde(deserialize_with = "de_or_default")]
    pub status: LoanStatus,
    pub tx_hash: Option<String>,
}

impl LoanRecord {
    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Open
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BigValue {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl BigValue {
    fn into_string(self) -> String {
        match self {
            BigValue::Text(s) => s,
            BigValue::Unsigned(n) => n.to_string(),
            BigValue::Signed(n) => n.to_string(),
            // integral floats only; anything else fails to parse downstream and becomes 0
            BigValue::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{:.0}", f),
            BigValue::Float(f) => f.to_string(),
        }
    }
}

fn de_or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn de_opt_big<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<BigValue>::deserialize(d)?.map(BigValue::into_string))
}

fn de_big<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(de_opt_big(d)?.unwrap_or_default())
}

fn de_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(de_big(d)?.trim().parse().unwrap_or(0))
}

fn de_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(de_big(d)?.trim().parse().unwrap_or(0))
}
