//! Tip events as they travel over a room's side channel, and the
//! receiver-side view of them.

use serde::{Deserialize, Serialize};

use crate::models::tip::TokenType;

/// A tip or gift as broadcast to every participant of a room.
///
/// `is_large_tip` / `is_mega_tip` are not part of the wire format; receivers
/// derive them from their own thresholds (see [`TipNotification`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipEvent {
    pub id: String,
    pub amount: f64,
    pub token_type: TokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift_name: Option<String>,
    #[serde(default)]
    pub tipper_id: String,
    pub tipper_username: String,
    #[serde(default)]
    pub tipper_image_url: String,
    #[serde(default)]
    pub streamer_id: String,
    pub streamer_username: String,
    /// Epoch millis assigned when the tip was persisted.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl TipEvent {
    /// Key used to recognize redelivery of the same logical tip.
    pub fn dedup_key(&self) -> String {
        format!("{}-{}", self.id, self.timestamp)
    }

    /// Both a gift skin id and a display name are present.
    pub fn is_gift(&self) -> bool {
        self.gift_type.is_some() && self.gift_name.is_some()
    }

    /// One-line chat text for this tip.
    pub fn chat_message(&self) -> String {
        let gift = match (&self.gift_type, &self.gift_name) {
            (Some(_), Some(name)) => format!(" with {name}"),
            _ => String::new(),
        };
        format!(
            "💰 {} tipped ${} {}{} to {}!",
            self.tipper_username, self.amount, self.token_type, gift, self.streamer_username
        )
    }
}

/// Amount thresholds that decide overlay escalation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub large: f64,
    pub mega: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            large: 50.0,
            mega: 200.0,
        }
    }
}

/// A decoded, accepted tip event plus the flags this receiver derived for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TipNotification {
    #[serde(flatten)]
    pub event: TipEvent,
    pub is_large_tip: bool,
    pub is_mega_tip: bool,
    pub message: String,
}

impl TipNotification {
    pub fn classify(event: TipEvent, thresholds: Thresholds) -> Self {
        let is_large_tip = event.amount >= thresholds.large;
        let is_mega_tip = event.amount >= thresholds.mega;
        let message = event.chat_message();
        Self {
            event,
            is_large_tip,
            is_mega_tip,
            message,
        }
    }

    pub fn id(&self) -> &str {
        &self.event.id
    }

    /// Qualifies for the large-tip overlay.
    pub fn is_large_tier(&self) -> bool {
        self.is_large_tip || self.is_mega_tip
    }

    /// Qualifies for the gift overlay. Large gifts use the large-tip overlay.
    pub fn is_gift_tier(&self) -> bool {
        self.event.is_gift() && !self.is_large_tier()
    }
}
