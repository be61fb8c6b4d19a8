// Ponder GraphQL client

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument, warn};

use super::ponder_types::{loans_query, markets_query, positions_query, GraphQlRequest, GraphQlResponse};
use super::{AccountFilter, Indexer, IndexerError, IndexerResult, LoanFilter, MarketFilter};
use crate::model::{LoanRecord, LoanStatus, MarketRecord, PositionEntry};

// Error bodies are echoed into logs, keep them short.
const MAX_ERROR_BODY: usize = 512;

pub struct PonderClient {
    http: reqwest::Client,
    graphql_url: String,
}

impl PonderClient {
    pub fn new(graphql_url: impl Into<String>, timeout: Duration) -> IndexerResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()?;
        Ok(Self { http, graphql_url: graphql_url.into() })
    }

    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    #[instrument(skip(self, query, variables), fields(url = %self.graphql_url))]
    async fn fetch_items<T: DeserializeOwned>(
        &self,
        field: &'static str,
        query: &str,
        variables: Value,
    ) -> IndexerResult<Vec<T>> {
        let started = Instant::now();
        let result = self.post_query(field, query, variables).await;
        let elapsed = started.elapsed();

        metrics::histogram!("nusa_indexer_request_seconds", "query" => field)
            .record(elapsed.as_secs_f64());
        match &result {
            Ok(items) => {
                debug!(field, items = items.len(), elapsed_ms = elapsed.as_millis() as u64, "indexer query ok");
            }
            Err(e) => {
                metrics::counter!("nusa_indexer_errors_total", "query" => field).increment(1);
                warn!(field, error = %e, "indexer query failed");
            }
        }
        result
    }

    async fn post_query<T: DeserializeOwned>(
        &self,
        field: &'static str,
        query: &str,
        variables: Value,
    ) -> IndexerResult<Vec<T>> {
        let res = self
            .http
            .post(&self.graphql_url)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            let mut body = text;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(IndexerError::Status { status: status.as_u16(), body });
        }

        let body: GraphQlResponse =
            serde_json::from_str(&text).map_err(|e| IndexerError::Decode(e.to_string()))?;
        extract_items(field, body)
    }
}

fn extract_items<T: DeserializeOwned>(field: &'static str, body: GraphQlResponse) -> IndexerResult<Vec<T>> {
    if let Some(first) = body.errors.into_iter().next() {
        return Err(IndexerError::GraphQl(first.message));
    }
    let mut data = body.data.ok_or(IndexerError::MissingField("data"))?;
    let items = data
        .get_mut(field)
        .and_then(|page| page.get_mut("items"))
        .map(Value::take)
        .ok_or(IndexerError::MissingField(field))?;
    serde_json::from_value(items).map_err(|e| IndexerError::Decode(e.to_string()))
}

// `where` object holding only the filters that are set
fn where_clause(account: Option<&str>, chain_id: Option<u64>) -> Value {
    let mut clause = Map::new();
    if let Some(account) = account {
        clause.insert("account".into(), Value::String(account.to_ascii_lowercase()));
    }
    if let Some(chain_id) = chain_id {
        clause.insert("chainId".into(), json!(chain_id));
    }
    Value::Object(clause)
}

#[async_trait::async_trait]
impl Indexer for PonderClient {
    async fn markets(&self, filter: &MarketFilter) -> IndexerResult<Vec<MarketRecord>> {
        let variables = json!({
            "where": where_clause(None, filter.chain_id),
            "limit": filter.limit,
        });
        self.fetch_items("markets", &markets_query(), variables).await
    }

    async fn positions(&self, filter: &AccountFilter) -> IndexerResult<Vec<PositionEntry>> {
        let variables = json!({
            "where": where_clause(Some(&filter.account), filter.chain_id),
            "limit": filter.limit,
        });
        self.fetch_items("positions", &positions_query(), variables).await
    }

    async fn loans(&self, filter: &LoanFilter) -> IndexerResult<Vec<LoanRecord>> {
        let variables = json!({ "where": loans_where(filter), "limit": filter.limit });
        self.fetch_items("loans", &loans_query(), variables).await
    }
}

fn loans_where(filter: &LoanFilter) -> Value {
    let mut clause = where_clause(Some(&filter.account), filter.chain_id);
    if filter.open_only {
        clause["status"] = json!(LoanStatus::Open.as_str());
    }
    clause
}
