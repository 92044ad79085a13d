//! Sends one tip notification into a room after the tip is persisted.

use crate::gateway::fanout::DataChannel;
use crate::models::tip::TipRecord;

use super::codec;

/// What `broadcast` did. Informational only; never an error for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    Sent,
    Skipped(String),
    Failed(String),
}

/// Encode `tip` and send it exactly once. Precondition and transport
/// failures are logged and swallowed; there is no retry.
pub async fn broadcast(channel: &dyn DataChannel, tip: &TipRecord) -> BroadcastOutcome {
    let payload = match codec::encode(tip) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(tip_id = %tip.id, error = %e, "skipping tip broadcast");
            return BroadcastOutcome::Skipped(e.to_string());
        }
    };

    match channel.send(payload).await {
        Ok(()) => {
            tracing::info!(tip_id = %tip.id, amount = %tip.amount, "tip notification broadcast");
            BroadcastOutcome::Sent
        }
        Err(e) => {
            tracing::warn!(tip_id = %tip.id, error = %e, "tip broadcast failed");
            BroadcastOutcome::Failed(e.to_string())
        }
    }
}
