mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use stream_api::tips::codec;

fn bearer() -> String {
    format!("Bearer {}", common::ALICE_TOKEN)
}

async fn tip(server: &TestServer, body: Value) -> Value {
    let resp = server
        .post("/api/v1/tips")
        .add_header(AUTHORIZATION, bearer())
        .json(&body)
        .await;
    resp.assert_status(StatusCode::CREATED);
    resp.json()
}

// ===========================================================================
// POST /api/v1/tips
// ===========================================================================

#[tokio::test]
async fn create_tip_with_settled_transaction() {
    let (app, ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let body = tip(
        &server,
        json!({
            "amount": 75.0,
            "streamer_id": common::BOB_ID,
            "transaction_hash": "5xSettled",
        }),
    )
    .await;

    assert!(body["id"].as_str().unwrap().starts_with("tip_"));
    assert_eq!(body["amount"], 75.0);
    assert_eq!(body["token_type"], "USDC");
    assert_eq!(body["tipper"]["username"], "alice");
    assert_eq!(body["streamer"]["username"], "bob");
    assert_eq!(body["transaction_hash"], "5xSettled");
    // Client-settled tips never touch the executor.
    assert!(ctx.payments.calls.lock().is_empty());
}

#[tokio::test]
async fn create_tip_executes_payment_to_streamer_wallet() {
    let (app, ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let body = tip(
        &server,
        json!({ "amount": 2.5, "token_type": "SOL", "streamer_id": common::BOB_ID }),
    )
    .await;

    assert_eq!(body["transaction_hash"], "sig_1");
    assert_eq!(body["token_type"], "SOL");
    let calls = ctx.payments.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].2, common::BOB_WALLET);
    assert_eq!(calls[0].0.micros(), 2_500_000);
}

#[tokio::test]
async fn failed_payment_persists_nothing() {
    let (app, ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();
    *ctx.payments.fail.lock() = true;

    let resp = server
        .post("/api/v1/tips")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({ "amount": 10, "streamer_id": common::BOB_ID }))
        .await;
    resp.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "PAYMENT_FAILED");

    let list: Vec<Value> = server
        .get(&format!("/api/v1/streamers/{}/tips", common::BOB_ID))
        .await
        .json();
    assert!(list.is_empty());
}

#[tokio::test]
async fn streamer_without_wallet_cannot_be_paid() {
    let (app, _ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    // alice has no wallet address.
    let resp = server
        .post("/api/v1/tips")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({ "amount": 10, "streamer_id": common::ALICE_ID }))
        .await;
    resp.assert_status(StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn create_tip_requires_auth() {
    let (app, ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server
        .post("/api/v1/tips")
        .json(&json!({ "amount": 10, "streamer_id": common::BOB_ID }))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    ctx.identity.revoke(common::ALICE_TOKEN);
    let resp = server
        .post("/api/v1/tips")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({ "amount": 10, "streamer_id": common::BOB_ID }))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn create_tip_validates_input() {
    let (app, _ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server
        .post("/api/v1/tips")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({ "amount": 0, "streamer_id": "  " }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["amount", "streamer_id"]);

    let resp = server
        .post("/api/v1/tips")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({ "amount": -3, "streamer_id": common::BOB_ID }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_streamer_is_not_found() {
    let (app, _ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server
        .post("/api/v1/tips")
        .add_header(AUTHORIZATION, bearer())
        .json(&json!({ "amount": 1, "streamer_id": "usr_ghost", "transaction_hash": "x" }))
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_tip_is_announced_in_the_stream_room() {
    let (app, ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();
    let mut room = ctx.state.rooms.subscribe("str_live");
    let mut streamer_room = ctx.state.rooms.subscribe(common::BOB_ID);

    let body = tip(
        &server,
        json!({
            "amount": 20,
            "streamer_id": common::BOB_ID,
            "stream_id": "str_live",
            "gift_type": "vibes",
            "gift_name": "Vibes",
            "transaction_hash": "sig",
        }),
    )
    .await;

    let message = room.recv().await.unwrap();
    assert_eq!(message.sender_id, common::ALICE_ID);
    let event = codec::decode(&message.payload).unwrap();
    assert_eq!(event.id, body["id"].as_str().unwrap());
    assert_eq!(event.amount, 20.0);
    assert_eq!(event.gift_name.as_deref(), Some("Vibes"));
    assert_eq!(event.tipper_username, "alice");

    // Only the stream room hears it.
    assert!(streamer_room.try_recv().is_err());
}

#[tokio::test]
async fn tip_succeeds_when_nobody_is_watching() {
    let (app, ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    tip(
        &server,
        json!({ "amount": 1, "streamer_id": common::BOB_ID, "transaction_hash": "sig" }),
    )
    .await;
    assert_eq!(ctx.state.rooms.room_count(), 0);
}

// ===========================================================================
// GET /api/v1/streamers/:streamer_id/tips
// ===========================================================================

#[tokio::test]
async fn list_tips_is_newest_first_and_paged() {
    let (app, _ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let mut ids = Vec::new();
    for amount in [1, 2, 3] {
        let body = tip(
            &server,
            json!({ "amount": amount, "streamer_id": common::BOB_ID, "transaction_hash": "sig" }),
        )
        .await;
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    let resp = server
        .get(&format!("/api/v1/streamers/{}/tips", common::BOB_ID))
        .await;
    resp.assert_status_ok();
    let list: Vec<Value> = resp.json();
    let listed: Vec<&str> = list.iter().map(|t| t["id"].as_str().unwrap()).collect();
    assert_eq!(listed, vec![ids[2].as_str(), ids[1].as_str(), ids[0].as_str()]);

    let page: Vec<Value> = server
        .get(&format!("/api/v1/streamers/{}/tips", common::BOB_ID))
        .add_query_param("limit", 1)
        .add_query_param("offset", 1)
        .await
        .json();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["id"], ids[1]);
}

#[tokio::test]
async fn list_tips_rejects_bad_limit() {
    let (app, _ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    for limit in [0, 101] {
        let resp = server
            .get(&format!("/api/v1/streamers/{}/tips", common::BOB_ID))
            .add_query_param("limit", limit)
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }
}

// ===========================================================================
// GET /api/v1/streamers/:streamer_id/tips/stats
// ===========================================================================

#[tokio::test]
async fn stats_aggregate_by_token() {
    let (app, _ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    for (amount, token) in [(10.0, "USDC"), (5.5, "USDC"), (1.0, "SOL")] {
        tip(
            &server,
            json!({
                "amount": amount,
                "token_type": token,
                "streamer_id": common::BOB_ID,
                "transaction_hash": "sig",
            }),
        )
        .await;
    }

    let resp = server
        .get(&format!("/api/v1/streamers/{}/tips/stats", common::BOB_ID))
        .add_query_param("time_range", "24h")
        .await;
    resp.assert_status_ok();
    let stats: Value = resp.json();
    assert_eq!(stats["total_tips"], 3);
    assert_eq!(stats["total_amount"], 16.5);
    assert_eq!(stats["time_range"], "24h");
    assert_eq!(stats["recent_tips"].as_array().unwrap().len(), 3);

    let by_token = stats["by_token"].as_array().unwrap();
    let usdc = by_token.iter().find(|b| b["token_type"] == "USDC").unwrap();
    assert_eq!(usdc["total_amount"], 15.5);
    assert_eq!(usdc["count"], 2);
}

#[tokio::test]
async fn stats_reject_unknown_range() {
    let (app, _ctx) = common::test_app();
    let server = TestServer::new(app).unwrap();

    let resp = server
        .get(&format!("/api/v1/streamers/{}/tips/stats", common::BOB_ID))
        .add_query_param("time_range", "1y")
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = server
        .get(&format!("/api/v1/streamers/{}/tips/stats", common::BOB_ID))
        .await;
    resp.assert_status_ok();
    let stats: Value = resp.json();
    assert_eq!(stats["time_range"], "all");
    assert_eq!(stats["total_tips"], 0);
}
