// End-to-end: gateway router in front of a fake Ponder GraphQL server, both on
// ephemeral ports, exercised over real HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use nusa_gateway::api::{self, AppState, Limits};
use nusa_gateway::indexer::PonderClient;
use nusa_gateway::numeric::SECONDS_IN_YEAR;

const NOW: u64 = 1_700_000_000;
const ALICE: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

#[derive(Clone, Copy)]
enum Mode {
    Healthy,
    ServerError,
    QueryError,
}

struct FakePonder {
    mode: Mode,
    seen: Mutex<Vec<Value>>,
}

fn usd(dollars: u64) -> String {
    format!("{}{}", dollars, "0".repeat(27))
}

fn market_items() -> Value {
    json!([{
        "id": "usdc-weth",
        "chainId": 8453,
        "address": "0x0000000000000000000000000000000000000001",
        "loanToken": { "address": "0xa", "symbol": "USDC", "decimals": 6 },
        "collateralToken": { "address": "0xb", "symbol": "WETH", "decimals": "18" },
        "supplyRateRay": "45000000000000000000000000",
        "borrowRateRay": "62500000000000000000000000",
        "utilizationRay": "720000000000000000000000000",
        "totalSupplyUsdRay": usd(1_000_000),
        "totalBorrowUsdRay": usd(720_000),
        "ltvBps": 7500,
        "liquidationThresholdBps": "8000"
    }])
}

fn position_items() -> Value {
    let leg = |kind: &str, dollars: u64| {
        let symbol = if kind == "collateral" { "WETH" } else { "USDC" };
        json!({
            "id": format!("{}-{}", kind, dollars),
            "account": ALICE.to_ascii_lowercase(),
            "chainId": "8453",
            "marketId": "usdc-weth",
            "kind": kind,
            "token": { "symbol": symbol },
            "amountUsdRay": usd(dollars)
        })
    };
    json!([leg("supply", 500), leg("collateral", 2_000), leg("borrow", 1_000)])
}

fn loan_items() -> Vec<Value> {
    vec![
        json!({
            "id": "l1",
            "chainId": 8453,
            "marketId": "usdc-weth",
            "principalUsdRay": usd(400),
            "aprRay": "100000000000000000000000000",
            "startTimestamp": (NOW - 2 * SECONDS_IN_YEAR).to_string(),
            "endTimestamp": (NOW - SECONDS_IN_YEAR).to_string(),
            "status": "repaid"
        }),
        json!({
            "id": "l2",
            "chainId": 8453,
            "marketId": "usdc-weth",
            "principalUsdRay": usd(1_000),
            "aprRay": "100000000000000000000000000",
            "startTimestamp": (NOW - SECONDS_IN_YEAR).to_string(),
            "endTimestamp": null,
            "status": "open",
            "txHash": "0xfeed"
        }),
    ]
}

async fn graphql(State(up): State<Arc<FakePonder>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    up.seen.lock().push(body.clone());
    match up.mode {
        Mode::ServerError => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "db down" })));
        }
        Mode::QueryError => {
            return (StatusCode::OK, Json(json!({ "data": null, "errors": [{ "message": "bad filter" }] })));
        }
        Mode::Healthy => {}
    }

    let query = body["query"].as_str().unwrap_or_default();
    let data = if query.contains("markets(") {
        json!({ "markets": { "items": market_items() } })
    } else if query.contains("positions(") {
        json!({ "positions": { "items": position_items() } })
    } else {
        let open_only = body["variables"]["where"]["status"] == "open";
        let items: Vec<Value> = loan_items()
            .into_iter()
            .filter(|l| !open_only || l["status"] == "open")
            .collect();
        json!({ "loans": { "items": items } })
    };
    (StatusCode::OK, Json(json!({ "data": data })))
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

struct Harness {
    gateway: SocketAddr,
    upstream: Arc<FakePonder>,
}

impl Harness {
    async fn start(mode: Mode) -> Self {
        let upstream = Arc::new(FakePonder { mode, seen: Mutex::new(Vec::new()) });
        let ponder = spawn(
            Router::new()
                .route("/graphql", post(graphql))
                .with_state(upstream.clone()),
        )
        .await;

        let client = PonderClient::new(format!("http://{}/graphql", ponder), Duration::from_secs(5)).unwrap();
        let state = AppState::new(Arc::new(client), Limits { default_limit: 100, max_limit: 1000 })
            .with_clock(|| NOW);
        let gateway = spawn(api::router(state, "*")).await;
        Self { gateway, upstream }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = reqwest::get(format!("http://{}{}", self.gateway, path)).await.unwrap();
        let status = StatusCode::from_u16(res.status().as_u16()).unwrap();
        (status, res.json().await.unwrap())
    }

    fn seen(&self) -> Vec<Value> {
        self.upstream.seen.lock().clone()
    }
}

fn approx(v: &Value, expected: f64) -> bool {
    v.as_f64().map_or(false, |x| (x - expected).abs() < 1e-6)
}

#[tokio::test]
async fn test_health() {
    let h = Harness::start(Mode::Healthy).await;
    let (status, body) = h.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": { "status": "ok" } }));
}

#[tokio::test]
async fn test_markets_reshaped() {
    let h = Harness::start(Mode::Healthy).await;
    let (status, body) = h.get("/api/markets?chain=base&limit=5").await;
    assert_eq!(status, StatusCode::OK);

    let m = &body["data"][0];
    assert_eq!(m["network"], "base");
    assert_eq!(m["supplyApy"], "4.50");
    assert_eq!(m["borrowApr"], "6.25");
    assert_eq!(m["utilization"], "72.00");
    assert_eq!(m["liquidationThreshold"], "80.00");
    assert!(approx(&m["availableLiquidityUsd"], 280_000.0));
    assert_eq!(m["collateralToken"]["decimals"], 18);

    let seen = h.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["variables"], json!({ "where": { "chainId": 8453 }, "limit": 5 }));
}

#[tokio::test]
async fn test_positions_merge_loans() {
    let h = Harness::start(Mode::Healthy).await;
    let (status, body) = h.get(&format!("/api/positions?account={}", ALICE)).await;
    assert_eq!(status, StatusCode::OK);

    let row = &body["data"]["positions"][0];
    assert_eq!(row["marketId"], "usdc-weth");
    assert!(approx(&row["suppliedUsd"], 500.0));
    assert!(approx(&row["collateralUsd"], 2_000.0));
    assert!(approx(&row["borrowedUsd"], 1_000.0));
    // the repaid loan must not accrue into the position
    assert!(approx(&row["accruedInterestUsd"], 100.0));
    assert!(approx(&row["debtUsd"], 1_100.0));
    assert!(approx(&row["healthFactor"], 2_000.0 * 0.8 / 1_100.0));
    assert_eq!(row["openLoans"], 1);

    let summary = &body["data"]["summary"];
    assert!(approx(&summary["netWorthUsd"], 1_400.0));
    assert_eq!(summary["chainCount"], 1);

    let seen = h.seen();
    assert_eq!(seen.len(), 3);
    let loan_query = seen
        .iter()
        .find(|b| b["query"].as_str().unwrap().contains("loans("))
        .unwrap();
    assert_eq!(loan_query["variables"]["where"]["status"], "open");
    assert_eq!(loan_query["variables"]["where"]["account"], ALICE.to_ascii_lowercase());
}

#[tokio::test]
async fn test_open_loans() {
    let h = Harness::start(Mode::Healthy).await;
    let (status, body) = h.get(&format!("/api/loans?account={}&chain=8453", ALICE)).await;
    assert_eq!(status, StatusCode::OK);

    let loans = body["data"].as_array().unwrap();
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0]["id"], "l2");
    assert_eq!(loans[0]["apr"], "10.00");
    assert_eq!(loans[0]["durationSeconds"], SECONDS_IN_YEAR);
    assert!(approx(&loans[0]["interestUsd"], 100.0));
    assert_eq!(loans[0]["isOpen"], true);
    assert_eq!(loans[0]["status"], "open");
}

#[tokio::test]
async fn test_history_newest_first() {
    let h = Harness::start(Mode::Healthy).await;
    let (status, body) = h.get(&format!("/api/history?account={}", ALICE)).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["l2", "l1"]);
    // repaid a year after it opened
    assert!(approx(&body["data"][1]["interestUsd"], 40.0));
    assert_eq!(body["data"][1]["status"], "repaid");

    let (_, limited) = h.get(&format!("/api/history?account={}&limit=1", ALICE)).await;
    assert_eq!(limited["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bad_params_are_400() {
    let h = Harness::start(Mode::Healthy).await;

    let (status, body) = h.get("/api/positions").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing account parameter");

    let (status, _) = h.get("/api/loans?account=0x123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h.get("/api/markets?chain=solana").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h.get(&format!("/api/history?account={}&limit=many", ALICE)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // rejected before reaching the indexer
    assert!(h.seen().is_empty());
}

#[tokio::test]
async fn test_unreadable_query_string_is_json_400() {
    let h = Harness::start(Mode::Healthy).await;

    for path in [
        "/api/markets?limit=1&limit=2".to_string(),
        format!("/api/loans?account={0}&account={0}", ALICE),
    ] {
        let res = reqwest::get(format!("http://{}{}", h.gateway, path)).await.unwrap();
        assert_eq!(res.status().as_u16(), 400, "{path}");
        assert_eq!(
            res.headers().get("content-type").and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        let body: Value = res.json().await.unwrap();
        assert!(body["error"].as_str().is_some_and(|m| m.contains("duplicate field")), "{body}");
    }

    assert!(h.seen().is_empty());
}

#[tokio::test]
async fn test_upstream_http_failure_is_502() {
    let h = Harness::start(Mode::ServerError).await;
    let (status, body) = h.get("/api/markets").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": "Failed to fetch data from indexer" }));
}

#[tokio::test]
async fn test_upstream_query_error_is_502() {
    let h = Harness::start(Mode::QueryError).await;
    let (status, body) = h.get(&format!("/api/positions?account={}", ALICE)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch data from indexer");
}

#[tokio::test]
async fn test_cors_headers() {
    let h = Harness::start(Mode::Healthy).await;
    let res = reqwest::Client::new()
        .get(format!("http://{}/api/markets", h.gateway))
        .header("Origin", "https://app.nusa.example")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(
        res.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
