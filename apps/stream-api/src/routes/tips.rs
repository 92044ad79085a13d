//! Tip creation, history and statistics endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::models::tip::{Amount, NewTip, TipFilter, TipRecord, TipStats, TokenType};
use crate::tips::broadcaster;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tips", post(create_tip))
        .route("/streamers/{streamer_id}/tips", get(list_tips))
        .route("/streamers/{streamer_id}/tips/stats", get(tip_stats))
}

/// Upper bound on records scanned for statistics.
const STATS_SCAN_LIMIT: usize = 10_000;

// ---------------------------------------------------------------------------
// POST /api/v1/tips
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTipRequest {
    pub amount: Option<f64>,
    /// Defaults to USDC.
    pub token_type: Option<TokenType>,
    pub gift_type: Option<String>,
    pub gift_name: Option<String>,
    pub streamer_id: Option<String>,
    /// Live stream to announce the tip in. Defaults to the streamer's room.
    pub stream_id: Option<String>,
    /// Signature of a transfer the client already settled.
    pub transaction_hash: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[utoipa::path(
    post,
    path = "/api/v1/tips",
    tag = "Tips",
    security(("bearer" = [])),
    request_body = CreateTipRequest,
    responses(
        (status = 201, description = "Tip created and announced", body = TipRecord),
        (status = 400, description = "Validation error", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 402, description = "Payment failed", body = ApiErrorBody),
        (status = 404, description = "Streamer not found", body = ApiErrorBody),
    ),
)]
pub async fn create_tip(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateTipRequest>,
) -> Result<(StatusCode, Json<TipRecord>), ApiError> {
    let mut errors = Vec::new();

    let amount = match body.amount {
        None => {
            errors.push(FieldError {
                field: "amount".to_string(),
                message: "Amount is required".to_string(),
            });
            None
        }
        Some(value) => {
            let amount = Amount::from_display(value);
            if amount.is_none() {
                errors.push(FieldError {
                    field: "amount".to_string(),
                    message: "Amount must be positive".to_string(),
                });
            }
            amount
        }
    };

    let streamer_id = non_empty(body.streamer_id);
    if streamer_id.is_none() {
        errors.push(FieldError {
            field: "streamer_id".to_string(),
            message: "Streamer ID is required".to_string(),
        });
    }

    let (Some(amount), Some(streamer_id)) = (amount, streamer_id) else {
        return Err(ApiError::validation(errors));
    };

    let streamer = state
        .tips
        .find_user(&streamer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Streamer not found"))?;

    let token_type = body.token_type.unwrap_or_default();

    let transaction_hash = match non_empty(body.transaction_hash) {
        Some(hash) => hash,
        None => {
            let destination = streamer
                .wallet_address
                .as_deref()
                .filter(|w| !w.is_empty())
                .ok_or_else(|| ApiError::payment_failed("Streamer has no wallet address"))?;
            state
                .payments
                .execute(amount, token_type, destination)
                .await?
                .0
        }
    };

    let stream_id = non_empty(body.stream_id);
    let record = state
        .tips
        .create_tip(NewTip {
            amount,
            token_type,
            gift_type: non_empty(body.gift_type),
            gift_name: non_empty(body.gift_name),
            tipper_id: identity.id.clone(),
            streamer_id: streamer.id.clone(),
            stream_id: stream_id.clone(),
            transaction_hash: Some(transaction_hash),
        })
        .await?;

    tracing::info!(
        tip_id = %record.id,
        tipper_id = %identity.id,
        streamer_id = %record.streamer.id,
        amount = %record.amount,
        token = %record.token_type,
        "tip created"
    );

    let room_id = stream_id.unwrap_or_else(|| streamer.id.clone());
    let channel = state.rooms.channel(&room_id, &identity.id);
    broadcaster::broadcast(&channel, &record).await;

    Ok((StatusCode::CREATED, Json(record)))
}

// ---------------------------------------------------------------------------
// GET /api/v1/streamers/:streamer_id/tips
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTipsParams {
    /// 1..=100, default 20.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/streamers/{streamer_id}/tips",
    tag = "Tips",
    params(
        ("streamer_id" = String, Path, description = "Streamer user ID"),
        ListTipsParams,
    ),
    responses(
        (status = 200, description = "Tips, newest first", body = Vec<TipRecord>),
        (status = 400, description = "Invalid paging", body = ApiErrorBody),
    ),
)]
pub async fn list_tips(
    State(state): State<AppState>,
    Path(streamer_id): Path<String>,
    Query(params): Query<ListTipsParams>,
) -> Result<Json<Vec<TipRecord>>, ApiError> {
    let limit = params.limit.unwrap_or(20);
    if !(1..=100).contains(&limit) {
        return Err(ApiError::bad_request("limit must be between 1 and 100"));
    }
    let offset = params.offset.unwrap_or(0);
    if offset < 0 {
        return Err(ApiError::bad_request("offset must not be negative"));
    }

    let tips = state
        .tips
        .query_tips(TipFilter {
            streamer_id,
            since: None,
            limit: limit as usize,
            offset: offset as usize,
        })
        .await?;

    Ok(Json(tips))
}

// ---------------------------------------------------------------------------
// GET /api/v1/streamers/:streamer_id/tips/stats
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TipStatsParams {
    /// One of `24h`, `7d`, `30d`, `all` (default).
    pub time_range: Option<String>,
}

fn window(time_range: &str) -> Option<Option<Duration>> {
    match time_range {
        "24h" => Some(Some(Duration::hours(24))),
        "7d" => Some(Some(Duration::days(7))),
        "30d" => Some(Some(Duration::days(30))),
        "all" => Some(None),
        _ => None,
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/streamers/{streamer_id}/tips/stats",
    tag = "Tips",
    params(
        ("streamer_id" = String, Path, description = "Streamer user ID"),
        TipStatsParams,
    ),
    responses(
        (status = 200, description = "Aggregated tip statistics", body = TipStats),
        (status = 400, description = "Unknown time range", body = ApiErrorBody),
    ),
)]
pub async fn tip_stats(
    State(state): State<AppState>,
    Path(streamer_id): Path<String>,
    Query(params): Query<TipStatsParams>,
) -> Result<Json<TipStats>, ApiError> {
    let time_range = params.time_range.unwrap_or_else(|| "all".to_string());
    let span = window(&time_range)
        .ok_or_else(|| ApiError::bad_request("time_range must be one of 24h, 7d, 30d, all"))?;

    let tips = state
        .tips
        .query_tips(TipFilter {
            streamer_id,
            since: span.map(|d| Utc::now() - d),
            limit: STATS_SCAN_LIMIT,
            offset: 0,
        })
        .await?;

    Ok(Json(TipStats::from_records(&tips, &time_range)))
}
