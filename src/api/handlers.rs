use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use tracing::{debug, instrument};

use super::error::ApiError;
use super::params::ApiQuery;
use super::AppState;
use crate::aggregate::{aggregate_portfolio, loan_history, LoanView, MarketView, Portfolio};
use crate::indexer::{AccountFilter, LoanFilter, MarketFilter};

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

pub type ApiResult<T> = Result<Json<DataResponse<T>>, ApiError>;

// Rejections are taken as a value so they render as `{ error }` too.
type QueryParams = Result<Query<ApiQuery>, QueryRejection>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(DataResponse { data }))
}

fn count_request(route: &'static str) {
    metrics::counter!("nusa_api_requests_total", "route" => route).increment(1);
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

pub async fn health() -> ApiResult<Health> {
    ok(Health { status: "ok" })
}

#[instrument(skip(state))]
pub async fn markets(State(state): State<AppState>, query: QueryParams) -> ApiResult<Vec<MarketView>> {
    count_request("markets");
    let Query(q) = query?;
    let filter = MarketFilter { chain_id: q.chain_id()?, limit: q.limit(state.limits)? };
    let records = state.indexer.markets(&filter).await?;
    debug!(count = records.len(), "markets fetched");
    ok(records.iter().map(MarketView::from_record).collect())
}

#[instrument(skip(state))]
pub async fn positions(State(state): State<AppState>, query: QueryParams) -> ApiResult<Portfolio> {
    count_request("positions");
    let Query(q) = query?;
    let account = q.account()?;
    let chain_id = q.chain_id()?;
    let limit = q.limit(state.limits)?;

    let position_filter = AccountFilter { account: account.clone(), chain_id, limit };
    let loan_filter = LoanFilter { account, chain_id, open_only: true, limit };
    let market_filter = MarketFilter { chain_id, limit: state.limits.max_limit };

    let (entries, loans, markets) = futures::try_join!(
        state.indexer.positions(&position_filter),
        state.indexer.loans(&loan_filter),
        state.indexer.markets(&market_filter),
    )?;
    debug!(entries = entries.len(), loans = loans.len(), markets = markets.len(), "portfolio inputs fetched");

    ok(aggregate_portfolio(&entries, &loans, &markets, (state.clock)()))
}

#[instrument(skip(state))]
pub async fn loans(State(state): State<AppState>, query: QueryParams) -> ApiResult<Vec<LoanView>> {
    count_request("loans");
    let Query(q) = query?;
    let filter = LoanFilter {
        account: q.account()?,
        chain_id: q.chain_id()?,
        open_only: true,
        limit: q.limit(state.limits)?,
    };
    let records = state.indexer.loans(&filter).await?;
    let now = (state.clock)();
    ok(records.iter().map(|l| LoanView::from_record(l, now)).collect())
}

#[instrument(skip(state))]
pub async fn history(State(state): State<AppState>, query: QueryParams) -> ApiResult<Vec<LoanView>> {
    count_request("history");
    let Query(q) = query?;
    let limit = q.limit(state.limits)?;
    let filter = LoanFilter {
        account: q.account()?,
        chain_id: q.chain_id()?,
        open_only: false,
        limit,
    };
    let records = state.indexer.loans(&filter).await?;
    ok(loan_history(&records, (state.clock)(), limit))
}
