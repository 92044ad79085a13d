#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use parking_lot::Mutex;

use stream_api::auth::identity::{Identity, MemoryIdentityProvider};
use stream_api::config::Config;
use stream_api::db::store::MemoryTipStore;
use stream_api::gateway::fanout::RoomHub;
use stream_api::models::tip::{Amount, TokenType};
use stream_api::models::user::UserProfile;
use stream_api::payments::{PaymentError, PaymentExecutor, TransactionRef};
use stream_api::AppState;

pub const ALICE_TOKEN: &str = "alice-token";
pub const ALICE_ID: &str = "usr_alice";
pub const BOB_ID: &str = "usr_bob";
pub const BOB_WALLET: &str = "BobWa11et1111111111111111111111111111111111";

/// Payment executor that records every transfer and can be told to fail.
#[derive(Default)]
pub struct FakePayments {
    pub calls: Mutex<Vec<(Amount, TokenType, String)>>,
    pub fail: Mutex<bool>,
}

#[async_trait]
impl PaymentExecutor for FakePayments {
    async fn execute(
        &self,
        amount: Amount,
        token_type: TokenType,
        destination: &str,
    ) -> Result<TransactionRef, PaymentError> {
        if *self.fail.lock() {
            return Err(PaymentError::InsufficientFunds);
        }
        let mut calls = self.calls.lock();
        calls.push((amount, token_type, destination.to_string()));
        Ok(TransactionRef(format!("sig_{}", calls.len())))
    }
}

/// Handles on the in-memory collaborators behind a test [`AppState`].
pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MemoryTipStore>,
    pub identity: Arc<MemoryIdentityProvider>,
    pub payments: Arc<FakePayments>,
}

/// Build a test AppState seeded with alice (tipper, token `alice-token`) and
/// bob (streamer with a wallet).
pub fn test_state() -> TestContext {
    let store = Arc::new(MemoryTipStore::new());
    store.upsert_user(UserProfile {
        id: ALICE_ID.to_string(),
        username: "alice".to_string(),
        image_url: "https://img.example/alice.png".to_string(),
        wallet_address: None,
    });
    store.upsert_user(UserProfile {
        id: BOB_ID.to_string(),
        username: "bob".to_string(),
        image_url: "https://img.example/bob.png".to_string(),
        wallet_address: Some(BOB_WALLET.to_string()),
    });

    let identity = Arc::new(MemoryIdentityProvider::new());
    identity.insert(
        ALICE_TOKEN,
        Identity {
            id: ALICE_ID.to_string(),
            username: "alice".to_string(),
            image_url: "https://img.example/alice.png".to_string(),
        },
    );

    let payments = Arc::new(FakePayments::default());
    let config = Config::default();

    let state = AppState {
        tips: store.clone(),
        identity: identity.clone(),
        payments: payments.clone(),
        rooms: Arc::new(RoomHub::new(config.room_channel_capacity)),
        config: Arc::new(config),
    };

    TestContext {
        state,
        store,
        identity,
        payments,
    }
}

pub fn test_app() -> (Router, TestContext) {
    let ctx = test_state();
    let app = stream_api::routes::router().with_state(ctx.state.clone());
    (app, ctx)
}
