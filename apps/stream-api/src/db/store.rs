use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tipcast_common::PrefixedId;

use crate::models::tip::{NewTip, TipFilter, TipRecord};
use crate::models::user::UserProfile;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Abstraction over tip persistence.
///
/// Backed by the relational store in production and an in-memory map in tests.
/// Records come back with tipper and streamer display identity joined in.
#[async_trait]
pub trait TipStore: Send + Sync {
    async fn create_tip(&self, tip: NewTip) -> Result<TipRecord, StoreError>;
    async fn query_tips(&self, filter: TipFilter) -> Result<Vec<TipRecord>, StoreError>;
    async fn find_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

pub struct MemoryTipStore {
    users: Mutex<HashMap<String, UserProfile>>,
    tips: Mutex<Vec<TipRecord>>,
}

impl MemoryTipStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            tips: Mutex::new(Vec::new()),
        }
    }

    /// Insert or replace a user profile.
    pub fn upsert_user(&self, user: UserProfile) {
        self.users.lock().insert(user.id.clone(), user);
    }
}

impl Default for MemoryTipStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TipStore for MemoryTipStore {
    async fn create_tip(&self, tip: NewTip) -> Result<TipRecord, StoreError> {
        let (tipper, streamer) = {
            let users = self.users.lock();
            let tipper = users
                .get(&tip.tipper_id)
                .ok_or_else(|| StoreError::UnknownUser(tip.tipper_id.clone()))?
                .summary();
            let streamer = users
                .get(&tip.streamer_id)
                .ok_or_else(|| StoreError::UnknownUser(tip.streamer_id.clone()))?
                .summary();
            (tipper, streamer)
        };

        let record = TipRecord {
            id: TipRecord::generate(),
            amount: tip.amount,
            token_type: tip.token_type,
            gift_type: tip.gift_type,
            gift_name: tip.gift_name,
            tipper,
            streamer,
            stream_id: tip.stream_id,
            transaction_hash: tip.transaction_hash,
            created_at: Utc::now(),
        };

        self.tips.lock().push(record.clone());
        Ok(record)
    }

    async fn query_tips(&self, filter: TipFilter) -> Result<Vec<TipRecord>, StoreError> {
        let tips = self.tips.lock();
        // Walk in reverse insertion order so the stable sort keeps ties newest first.
        let mut matching: Vec<TipRecord> = tips
            .iter()
            .rev()
            .filter(|t| t.streamer.id == filter.streamer_id)
            .filter(|t| filter.since.map_or(true, |since| t.created_at >= since))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(matching
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users.lock().get(user_id).cloned())
    }
}
