// Query-string parameters shared by every route. Values are taken as raw
// strings so malformed input gets our JSON error body instead of axum's
// plain-text rejection.

use serde::Deserialize;

use super::error::ApiError;
use super::Limits;
use crate::model::Network;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ApiQuery {
    pub account: Option<String>,
    pub chain: Option<String>,
    pub limit: Option<String>,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn is_address(s: &str) -> bool {
    s.len() == 42
        && (s.starts_with("0x") || s.starts_with("0X"))
        && s[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

impl ApiQuery {
    /// Required, `0x` + 40 hex chars, returned lowercased.
    pub fn account(&self) -> Result<String, ApiError> {
        let account = non_empty(&self.account)
            .ok_or_else(|| ApiError::BadRequest("Missing account parameter".into()))?;
        if !is_address(account) {
            return Err(ApiError::BadRequest(format!("Invalid account address: {}", account)));
        }
        Ok(account.to_ascii_lowercase())
    }

    /// Known network name/id, or any positive chain id.
    pub fn chain_id(&self) -> Result<Option<u64>, ApiError> {
        let Some(chain) = non_empty(&self.chain) else {
            return Ok(None);
        };
        if let Some(network) = Network::parse(chain) {
            return Ok(Some(network.chain_id()));
        }
        match chain.parse::<u64>() {
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(ApiError::BadRequest(format!("Unsupported chain: {}", chain))),
        }
    }

    pub fn limit(&self, limits: Limits) -> Result<usize, ApiError> {
        let Some(raw) = non_empty(&self.limit) else {
            return Ok(limits.default_limit);
        };
        let n: usize = raw
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("Invalid limit: {}", raw)))?;
        Ok(n.clamp(1, limits.max_limit))
    }
}
