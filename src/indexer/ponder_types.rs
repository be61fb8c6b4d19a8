// GraphQL envelope served by Ponder at POST /graphql.
// List fields come back as { "<field>": { "items": [...] } }.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    // locations/path ignored
}

const TOKEN_FIELDS: &str = "address symbol decimals";

pub fn markets_query() -> String {
    format!(
        r#"query Markets($where: marketFilter, $limit: Int) {{
  markets(where: $where, limit: $limit, orderBy: "id", orderDirection: "asc") {{
    items {{
      id chainId address
      loanToken {{ {t} }}
      collateralToken {{ {t} }}
      supplyRateRay borrowRateRay utilizationRay
      totalSupplyUsdRay totalBorrowUsdRay
      ltvBps liquidationThresholdBps updatedAt
    }}
  }}
}}"#,
        t = TOKEN_FIELDS
    )
}

pub fn positions_query() -> String {
    format!(
        r#"query Positions($where: positionFilter, $limit: Int) {{
  positions(where: $where, limit: $limit, orderBy: "updatedAt", orderDirection: "desc") {{
    items {{
      id account chainId marketId kind
      token {{ {t} }}
      amount amountUsdRay updatedAt
    }}
  }}
}}"#,
        t = TOKEN_FIELDS
    )
}

pub fn loans_query() -> String {
    format!(
        r#"query Loans($where: loanFilter, $limit: Int) {{
  loans(where: $where, limit: $limit, orderBy: "startTimestamp", orderDirection: "desc") {{
    items {{
      id account chainId marketId
      token {{ {t} }}
      principalUsdRay aprRay startTimestamp endTimestamp status txHash
    }}
  }}
}}"#,
        t = TOKEN_FIELDS
    )
}
