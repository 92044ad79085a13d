//! Wire envelope for tip notifications.
//!
//! ```json
//! { "type": "tip_notification", "tip": { "type": "tip", "id": "...", ... } }
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::models::tip::TipRecord;

use super::event::TipEvent;

pub const ENVELOPE_TYPE: &str = "tip_notification";
pub const TIP_TYPE: &str = "tip";

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("tip record has no id")]
    MissingId,
    #[error("tip amount must be a positive finite number")]
    InvalidAmount,
    #[error("tipper identity is not resolved")]
    MissingTipper,
    #[error("streamer identity is not resolved")]
    MissingStreamer,
    #[error("failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why an incoming payload was not accepted as a tip notification.
#[derive(Debug, thiserror::Error)]
pub enum Rejection {
    #[error("payload is not valid JSON: {0}")]
    MalformedJson(serde_json::Error),
    #[error("payload is not a tip notification")]
    WrongType,
    #[error("tip body is missing or has the wrong type tag")]
    MissingTip,
    #[error("invalid tip body: {0}")]
    InvalidTip(serde_json::Error),
    #[error("tip id is empty")]
    EmptyId,
    #[error("tip amount must be positive, got {0}")]
    NonPositiveAmount(f64),
    #[error("tipper or streamer username is empty")]
    MissingIdentity,
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    tip: TaggedTip<'a>,
}

#[derive(Serialize)]
struct TaggedTip<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    event: &'a TipEvent,
}

/// Map a persisted tip onto the broadcast event, validating it on the way.
pub fn event_from_record(tip: &TipRecord) -> Result<TipEvent, EncodeError> {
    if tip.id.is_empty() {
        return Err(EncodeError::MissingId);
    }
    let amount = tip.amount.to_display();
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EncodeError::InvalidAmount);
    }
    if tip.tipper.id.is_empty() || tip.tipper.username.is_empty() {
        return Err(EncodeError::MissingTipper);
    }
    if tip.streamer.id.is_empty() || tip.streamer.username.is_empty() {
        return Err(EncodeError::MissingStreamer);
    }

    Ok(TipEvent {
        id: tip.id.clone(),
        amount,
        token_type: tip.token_type,
        gift_type: tip.gift_type.clone().filter(|s| !s.is_empty()),
        gift_name: tip.gift_name.clone().filter(|s| !s.is_empty()),
        tipper_id: tip.tipper.id.clone(),
        tipper_username: tip.tipper.username.clone(),
        tipper_image_url: tip.tipper.image_url.clone(),
        streamer_id: tip.streamer.id.clone(),
        streamer_username: tip.streamer.username.clone(),
        timestamp: tip.created_at.timestamp_millis(),
        transaction_hash: tip.transaction_hash.clone().filter(|s| !s.is_empty()),
    })
}

/// Serialize an event inside the tip notification envelope.
pub fn encode_event(event: &TipEvent) -> Result<Vec<u8>, EncodeError> {
    let envelope = Envelope {
        kind: ENVELOPE_TYPE,
        tip: TaggedTip {
            kind: TIP_TYPE,
            event,
        },
    };
    Ok(serde_json::to_vec(&envelope)?)
}

pub fn encode(tip: &TipRecord) -> Result<Vec<u8>, EncodeError> {
    encode_event(&event_from_record(tip)?)
}

/// Decode and validate an incoming payload. Never panics.
pub fn decode(bytes: &[u8]) -> Result<TipEvent, Rejection> {
    let mut value: Value = serde_json::from_slice(bytes).map_err(Rejection::MalformedJson)?;

    if value.get("type").and_then(Value::as_str) != Some(ENVELOPE_TYPE) {
        return Err(Rejection::WrongType);
    }

    let tip = value
        .get_mut("tip")
        .map(Value::take)
        .filter(|tip| tip.get("type").and_then(Value::as_str) == Some(TIP_TYPE))
        .ok_or(Rejection::MissingTip)?;

    let event: TipEvent = serde_json::from_value(tip).map_err(Rejection::InvalidTip)?;

    if event.id.is_empty() {
        return Err(Rejection::EmptyId);
    }
    if !(event.amount > 0.0) || !event.amount.is_finite() {
        return Err(Rejection::NonPositiveAmount(event.amount));
    }
    if event.tipper_username.is_empty() || event.streamer_username.is_empty() {
        return Err(Rejection::MissingIdentity);
    }

    Ok(event)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::tip::{Amount, TokenType, UserSummary};

    fn record() -> TipRecord {
        TipRecord {
            id: "tip_1".to_string(),
            amount: Amount::from_display(75.0).unwrap(),
            token_type: TokenType::Usdc,
            gift_type: None,
            gift_name: Some(String::new()),
            tipper: UserSummary {
                id: "usr_alice".to_string(),
                username: "alice".to_string(),
                image_url: "https://img.example/alice.png".to_string(),
            },
            streamer: UserSummary {
                id: "usr_bob".to_string(),
                username: "bob".to_string(),
                image_url: String::new(),
            },
            stream_id: None,
            transaction_hash: Some("5xSig".to_string()),
            created_at: Utc.timestamp_millis_opt(1000).unwrap(),
        }
    }

    #[test]
    fn encode_produces_tagged_envelope() {
        let bytes = encode(&record()).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["type"], "tip_notification");
        assert_eq!(value["tip"]["type"], "tip");
        assert_eq!(value["tip"]["id"], "tip_1");
        assert_eq!(value["tip"]["amount"], 75.0);
        assert_eq!(value["tip"]["tokenType"], "USDC");
        assert_eq!(value["tip"]["tipperUsername"], "alice");
        assert_eq!(value["tip"]["streamerUsername"], "bob");
        assert_eq!(value["tip"]["timestamp"], 1000);
        assert_eq!(value["tip"]["transactionHash"], "5xSig");
        // Empty and absent optional fields are omitted.
        assert!(value["tip"].get("giftName").is_none());
        assert!(value["tip"].get("giftType").is_none());
        // Derived flags never go on the wire.
        assert!(value["tip"].get("isLargeTip").is_none());
    }

    #[test]
    fn encode_rejects_unresolved_identities() {
        let mut tip = record();
        tip.tipper.username.clear();
        assert!(matches!(encode(&tip), Err(EncodeError::MissingTipper)));

        let mut tip = record();
        tip.streamer.id.clear();
        assert!(matches!(encode(&tip), Err(EncodeError::MissingStreamer)));

        let mut tip = record();
        tip.id.clear();
        assert!(matches!(encode(&tip), Err(EncodeError::MissingId)));
    }

    #[test]
    fn decode_accepts_what_encode_produces() {
        let event = decode(&encode(&record()).unwrap()).unwrap();
        assert_eq!(event.id, "tip_1");
        assert_eq!(event.amount, 75.0);
        assert_eq!(event.token_type, TokenType::Usdc);
        assert_eq!(event.timestamp, 1000);
    }

    #[test]
    fn decode_rejects_malformed_payloads() {
        assert!(matches!(decode(b"{not json"), Err(Rejection::MalformedJson(_))));
        assert!(matches!(
            decode(br#"{"type":"tip_notification","tip":{}}"#),
            Err(Rejection::MissingTip)
        ));
        assert!(matches!(decode(br#"{"type":"other"}"#), Err(Rejection::WrongType)));
        assert!(matches!(decode(br#"[1,2,3]"#), Err(Rejection::WrongType)));
        assert!(matches!(decode(b""), Err(Rejection::MalformedJson(_))));
    }

    #[test]
    fn decode_rejects_missing_required_fields() {
        let payload = br#"{"type":"tip_notification","tip":{"type":"tip","id":"t","tokenType":"USDC","tipperUsername":"a","streamerUsername":"b"}}"#;
        assert!(matches!(decode(payload), Err(Rejection::InvalidTip(_))));
    }

    #[test]
    fn decode_rejects_bad_amount_and_token() {
        let zero = br#"{"type":"tip_notification","tip":{"type":"tip","id":"t","amount":0,"tokenType":"USDC","tipperUsername":"a","streamerUsername":"b"}}"#;
        assert!(matches!(decode(zero), Err(Rejection::NonPositiveAmount(_))));

        let negative = br#"{"type":"tip_notification","tip":{"type":"tip","id":"t","amount":-5,"tokenType":"USDC","tipperUsername":"a","streamerUsername":"b"}}"#;
        assert!(matches!(decode(negative), Err(Rejection::NonPositiveAmount(_))));

        let text_amount = br#"{"type":"tip_notification","tip":{"type":"tip","id":"t","amount":"5","tokenType":"USDC","tipperUsername":"a","streamerUsername":"b"}}"#;
        assert!(matches!(decode(text_amount), Err(Rejection::InvalidTip(_))));

        let token = br#"{"type":"tip_notification","tip":{"type":"tip","id":"t","amount":5,"tokenType":"BONK","tipperUsername":"a","streamerUsername":"b"}}"#;
        assert!(matches!(decode(token), Err(Rejection::InvalidTip(_))));
    }

    #[test]
    fn decode_rejects_empty_id() {
        let payload = br#"{"type":"tip_notification","tip":{"type":"tip","id":"","amount":5,"tokenType":"SOL","tipperUsername":"a","streamerUsername":"b"}}"#;
        assert!(matches!(decode(payload), Err(Rejection::EmptyId)));
    }

    #[test]
    fn decode_fills_optional_fields() {
        let payload = br#"{"type":"tip_notification","tip":{"type":"tip","id":"t","amount":5,"tokenType":"SOL","tipperUsername":"a","streamerUsername":"b"}}"#;
        let event = decode(payload).unwrap();
        assert_eq!(event.token_type, TokenType::Sol);
        assert_eq!(event.timestamp, 0);
        assert!(event.gift_type.is_none());
        assert!(event.tipper_image_url.is_empty());
    }
}
