use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tipcast_common::id::prefix;
use tipcast_common::PrefixedId;
use utoipa::ToSchema;

/// Micro-units per display unit. USDC settles with 6 decimals.
const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// Settlement asset of a tip.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum TokenType {
    #[default]
    #[serde(rename = "USDC")]
    Usdc,
    #[serde(rename = "SOL")]
    Sol,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usdc => f.write_str("USDC"),
            Self::Sol => f.write_str("SOL"),
        }
    }
}

/// A strictly positive tip amount, stored as integer micro-units of the
/// display currency.
///
/// Serializes as a plain JSON number in display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct Amount(i64);

impl Amount {
    /// Convert a display-unit number into an amount.
    ///
    /// Returns `None` for NaN, infinities, and anything that rounds to zero or below.
    pub fn from_display(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let micros = (value * MICROS_PER_UNIT).round();
        if micros < 1.0 || micros > i64::MAX as f64 {
            return None;
        }
        Some(Self(micros as i64))
    }

    pub fn from_micros(micros: i64) -> Option<Self> {
        (micros > 0).then_some(Self(micros))
    }

    pub fn micros(&self) -> i64 {
        self.0
    }

    /// The amount in display units, as transmitted on the wire.
    pub fn to_display(&self) -> f64 {
        self.0 as f64 / MICROS_PER_UNIT
    }
}

impl From<Amount> for f64 {
    fn from(amount: Amount) -> Self {
        amount.to_display()
    }
}

impl TryFrom<f64> for Amount {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_display(value).ok_or_else(|| format!("amount must be positive, got {value}"))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display())
    }
}

/// Display identity of a user joined onto a tip record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub image_url: String,
}

/// A persisted tip with tipper and streamer display fields joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TipRecord {
    pub id: String,
    #[schema(value_type = f64)]
    pub amount: Amount,
    pub token_type: TokenType,
    pub gift_type: Option<String>,
    pub gift_name: Option<String>,
    pub tipper: UserSummary,
    pub streamer: UserSummary,
    pub stream_id: Option<String>,
    pub transaction_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PrefixedId for TipRecord {
    const PREFIX: &'static str = prefix::TIP;
}

/// Fields required to persist a new tip.
#[derive(Debug, Clone)]
pub struct NewTip {
    pub amount: Amount,
    pub token_type: TokenType,
    pub gift_type: Option<String>,
    pub gift_name: Option<String>,
    pub tipper_id: String,
    pub streamer_id: String,
    pub stream_id: Option<String>,
    pub transaction_hash: Option<String>,
}

/// Query filter for tip records. Results are newest first.
#[derive(Debug, Clone, Default)]
pub struct TipFilter {
    pub streamer_id: String,
    pub since: Option<DateTime<Utc>>,
    pub limit: usize,
    pub offset: usize,
}

/// Per-token aggregate inside [`TipStats`].
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TokenBreakdown {
    pub token_type: TokenType,
    pub total_amount: f64,
    pub count: usize,
}

/// Aggregated tip statistics for a streamer over a time range.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TipStats {
    pub total_tips: usize,
    pub total_amount: f64,
    pub by_token: Vec<TokenBreakdown>,
    pub recent_tips: Vec<TipRecord>,
    pub time_range: String,
}

impl TipStats {
    /// Number of recent tips included in the summary.
    pub const RECENT_LIMIT: usize = 5;

    /// Aggregate over `records`, which must already be sorted newest first.
    pub fn from_records(records: &[TipRecord], time_range: &str) -> Self {
        let mut by_token: BTreeMap<TokenType, (i64, usize)> = BTreeMap::new();
        let mut total_micros = 0i64;

        for tip in records {
            total_micros = total_micros.saturating_add(tip.amount.micros());
            let entry = by_token.entry(tip.token_type).or_default();
            entry.0 = entry.0.saturating_add(tip.amount.micros());
            entry.1 += 1;
        }

        Self {
            total_tips: records.len(),
            total_amount: total_micros as f64 / MICROS_PER_UNIT,
            by_token: by_token
                .into_iter()
                .map(|(token_type, (micros, count))| TokenBreakdown {
                    token_type,
                    total_amount: micros as f64 / MICROS_PER_UNIT,
                    count,
                })
                .collect(),
            recent_tips: records.iter().take(Self::RECENT_LIMIT).cloned().collect(),
            time_range: time_range.to_string(),
        }
    }
}
