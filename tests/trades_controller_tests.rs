use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use trader_gateway::{
    config::Settings,
    error::VenueError,
    models::{Trade, TradeCommand, TransactionKind, TransactionRequest},
    routes,
    services::{
        capabilities::{ExecutionEngine, MarketData},
        paper_venue::PaperVenue,
    },
    AppState,
};

/// Forwards to the paper venue and keeps every request it was handed.
struct RecordingEngine {
    venue: Arc<PaperVenue>,
    seen: Mutex<Vec<TransactionRequest>>,
    reject: Option<String>,
}

impl RecordingEngine {
    fn calls(&self) -> Vec<TransactionRequest> {
        self.seen.lock().unwrap().clone()
    }

    fn record(&self, request: &TransactionRequest) -> Result<(), VenueError> {
        self.seen.lock().unwrap().push(request.clone());
        match &self.reject {
            Some(msg) => Err(VenueError::new(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExecutionEngine for RecordingEngine {
    async fn submit(&self, request: &TransactionRequest) -> Result<Trade, VenueError> {
        self.record(request)?;
        self.venue.submit(request).await
    }

    async fn modify(&self, request: &TransactionRequest) -> Result<Trade, VenueError> {
        self.record(request)?;
        self.venue.modify(request).await
    }
}

struct TestApp {
    app: Router,
    engine: Arc<RecordingEngine>,
    venue: Arc<PaperVenue>,
}

fn test_app() -> TestApp {
    test_app_rejecting(None)
}

fn test_app_rejecting(reject: Option<&str>) -> TestApp {
    let settings = Settings::default();

    let mut venue = PaperVenue::new().with_hash_cost(4);
    venue.add_account(42, "secret").unwrap();
    venue.add_account(99, "other").unwrap();
    for q in &settings.paper_quotes {
        venue.set_quote(q.clone());
    }
    let venue = Arc::new(venue);

    let engine = Arc::new(RecordingEngine {
        venue: venue.clone(),
        seen: Mutex::new(Vec::new()),
        reject: reject.map(str::to_string),
    });

    let state = AppState::new(settings, venue.clone(), venue.clone(), engine.clone());

    TestApp {
        app: routes::app(state),
        engine,
        venue,
    }
}

async fn response_json(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, login: i64, password: &str) -> String {
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(r#"{{"login":{login},"password":"{password}"}}"#)))
        .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    response_json(res).await["token"].as_str().unwrap().to_string()
}

fn json_request(method: &str, uri: &str, token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

// Opens a trade for `login` straight on the venue, bypassing the gateway.
async fn seed_trade(venue: &PaperVenue, login: i64) -> i64 {
    let trade = venue
        .submit(&TransactionRequest {
            order_by: login,
            kind: TransactionKind::Open,
            order: 0,
            cmd: Some(TradeCommand::Sell),
            symbol: "EURUSD".into(),
            volume: 3,
            price: 1.1000,
            sl: 0.0,
            tp: 0.0,
        })
        .await
        .unwrap();
    trade.ticket
}

#[tokio::test]
async fn open_buy_end_to_end() {
    let t = test_app();
    let token = login(&t.app, 42, "secret").await;

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/trades/add",
            &token,
            r#"{"command":0,"symbol":"EURUSD","volume":0.1,"price":1.5}"#,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let trade = response_json(res).await;
    assert_eq!(trade["login"], 42);
    assert_eq!(trade["symbol"], "EURUSD");
    assert_eq!(trade["volume"], 1);

    let calls = t.engine.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, TransactionKind::Open);
    assert_eq!(calls[0].symbol, "EURUSD");
    assert_eq!(calls[0].volume, 1);
    assert_eq!(calls[0].price, 1.1002);
    assert_eq!(calls[0].order_by, 42);
}

#[tokio::test]
async fn update_of_foreign_trade_is_forbidden_before_engine() {
    let t = test_app();
    let foreign = seed_trade(&t.venue, 99).await;
    let token = login(&t.app, 42, "secret").await;

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/v1/trades/update",
            &token,
            &format!(r#"{{"ticket":{foreign},"sl":1.2}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body = response_json(res).await;
    assert_eq!(body["code"], 403);
    assert!(t.engine.calls().is_empty());
}

#[tokio::test]
async fn close_of_foreign_trade_is_forbidden_before_engine() {
    let t = test_app();
    let foreign = seed_trade(&t.venue, 99).await;
    let token = login(&t.app, 42, "secret").await;

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/v1/trades/close",
            &token,
            &format!(r#"{{"ticket":{foreign},"volume":0.1}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(t.engine.calls().is_empty());
    assert_eq!(t.venue.trades(&|_: &Trade| true).await.len(), 1);
}

#[tokio::test]
async fn update_and_close_own_trade() {
    let t = test_app();
    let own = seed_trade(&t.venue, 42).await;
    let token = login(&t.app, 42, "secret").await;

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/v1/trades/update",
            &token,
            &format!(r#"{{"ticket":{own},"sl":1.2,"tp":1.05}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(response_json(res).await["message"], "updated");

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/v1/trades/close",
            &token,
            &format!(r#"{{"ticket":{own},"volume":0.3}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(response_json(res).await["message"], "closed");

    let calls = t.engine.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].kind, TransactionKind::Modify);
    assert_eq!((calls[0].sl, calls[0].tp), (1.2, 1.05));
    assert_eq!(calls[1].kind, TransactionKind::Close);
    // the seeded trade is a sell, closed at the ask
    assert_eq!(calls[1].price, 1.1002);
    assert_eq!(calls[1].volume, 3);

    assert!(t.venue.trade(own).await.is_none());
}

#[tokio::test]
async fn listing_only_shows_callers_trades() {
    let t = test_app();
    let mine = seed_trade(&t.venue, 42).await;
    seed_trade(&t.venue, 99).await;
    let token = login(&t.app, 42, "secret").await;

    // the path value is ignored; the session decides whose trades are listed
    let req = Request::builder()
        .uri(format!("/api/v1/trades/99?token={token}"))
        .body(Body::empty())
        .unwrap();

    let res = t.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let trades = response_json(res).await;
    let trades = trades.as_array().unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0]["ticket"], mine);
    assert_eq!(trades[0]["login"], 42);
}

#[tokio::test]
async fn invalid_command_is_bad_request() {
    let t = test_app();
    let token = login(&t.app, 42, "secret").await;

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/trades/add",
            &token,
            r#"{"command":6,"symbol":"EURUSD","volume":0.1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_json(res).await;
    assert!(body["message"].as_str().unwrap().contains("command"));
    assert!(t.engine.calls().is_empty());
}

#[tokio::test]
async fn untradable_symbol_is_bad_request() {
    let t = test_app();
    let token = login(&t.app, 42, "secret").await;

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/trades/add",
            &token,
            r#"{"command":1,"symbol":"XAUUSD","volume":1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(t.engine.calls().is_empty());
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let t = test_app();
    let token = login(&t.app, 42, "secret").await;

    let res = t
        .app
        .clone()
        .oneshot(json_request("PATCH", "/api/v1/trades/close", &token, "{ticket:"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_json(res).await;
    assert!(body["message"].as_str().unwrap().starts_with("invalid body"));
}

#[tokio::test]
async fn engine_rejection_is_passed_through() {
    let t = test_app_rejecting(Some("trade is disabled"));
    let token = login(&t.app, 42, "secret").await;

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/trades/add",
            &token,
            r#"{"command":0,"symbol":"EURUSD","volume":0.1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response_json(res).await["message"], "trade is disabled");

    // single attempt, no retry
    assert_eq!(t.engine.calls().len(), 1);
}

#[tokio::test]
async fn closed_ticket_cannot_be_closed_twice() {
    let t = test_app();
    let own = seed_trade(&t.venue, 42).await;
    let token = login(&t.app, 42, "secret").await;

    let close = format!(r#"{{"ticket":{own}}}"#);

    let res = t
        .app
        .clone()
        .oneshot(json_request("PATCH", "/api/v1/trades/close", &token, &close))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = t
        .app
        .clone()
        .oneshot(json_request("PATCH", "/api/v1/trades/close", &token, &close))
        .await
        .unwrap();
    // a closed ticket is no longer visible, so the ownership check fails
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(t.engine.calls().len(), 1);
}

#[tokio::test]
async fn pending_open_rests_at_client_price() {
    let t = test_app();
    let token = login(&t.app, 42, "secret").await;

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/trades/add",
            &token,
            r#"{"command":2,"symbol":"EURUSD","volume":0.2,"price":1.0950}"#,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(response_json(res).await["open_price"], 1.0950);

    let calls = t.engine.calls();
    assert_eq!(calls[0].cmd, Some(TradeCommand::BuyLimit));
    assert_eq!((calls[0].price, calls[0].volume), (1.0950, 2));
}

#[tokio::test]
async fn close_below_one_unit_keeps_the_position() {
    let t = test_app();
    let own = seed_trade(&t.venue, 42).await;
    let token = login(&t.app, 42, "secret").await;

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/v1/trades/close",
            &token,
            &format!(r#"{{"ticket":{own},"volume":0.04}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_json(res).await;
    assert!(body["message"].as_str().unwrap().starts_with("invalid volume"));
    assert!(t.engine.calls().is_empty());
    assert_eq!(t.venue.trade(own).await.unwrap().volume, 3);
}

#[tokio::test]
async fn oversized_open_is_bad_request() {
    let t = test_app();
    let token = login(&t.app, 42, "secret").await;

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/trades/add",
            &token,
            r#"{"command":0,"symbol":"EURUSD","volume":1e12}"#,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(res).await["message"], "invalid volume: out of range");
    assert!(t.engine.calls().is_empty());
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let t = test_app();

    let req = Request::builder()
        .uri("/api/v1/trades/42")
        .body(Body::empty())
        .unwrap();
    let res = t.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let challenge = res.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert!(challenge.to_str().unwrap().starts_with("JWT realm="));

    let res = t
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/trades/add",
            "forged.token.value",
            r#"{"command":0,"symbol":"EURUSD","volume":0.1}"#,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(t.engine.calls().is_empty());
}
