//! Insight API endpoints
//!
//! Endpoints:
//! - api_insights: list, optionally filtered by type, category and priority
//! - api_insights_generate: run the rule engine
//! - api_insights_by_type / _by_category / _by_priority: single-field lookups
//! - api_insights_cleanup: delete insights older than `days`

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;
use budgetweb_core::{
    ErrorContext, Insight, InsightQuery, InsightType, Priority, ResolvedInsight,
};
use serde::{Deserialize, Serialize};

use crate::routes::ApiResponse;
use crate::{ApiError, AppState, UserId};

type InsightList = Json<ApiResponse<Vec<ResolvedInsight>>>;

/// Body of a cleanup request; `days` falls back to the configured default
#[derive(Debug, Deserialize)]
pub struct CleanupRequest {
    #[serde(default)]
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CleanupResult {
    pub days: u32,
    pub deleted: u64,
}

pub async fn api_insights(
    state: State<AppState>,
    user: UserId,
    query: Query<InsightQuery>,
) -> Result<InsightList, ApiError> {
    let insights = state
        .engine
        .query_insights(user.as_str(), query.0)
        .await
        .map_err(|e| state.fail("query_insights", &user, e))?;
    Ok(ApiResponse::ok("Insights retrieved successfully", insights))
}

pub async fn api_insights_generate(
    state: State<AppState>,
    user: UserId,
) -> Result<Json<ApiResponse<Vec<Insight>>>, ApiError> {
    let insights = state
        .engine
        .generate_insights(user.as_str())
        .await
        .map_err(|e| state.fail("generate_insights", &user, e))?;
    Ok(ApiResponse::ok("Insights generated successfully", insights))
}

pub async fn api_insights_by_type(
    state: State<AppState>,
    user: UserId,
    path: Path<String>,
) -> Result<InsightList, ApiError> {
    let insight_type: InsightType = path.0.parse().map_err(ApiError::bad_request)?;
    let insights = state
        .engine
        .queries
        .list_by_type(user.as_str(), insight_type)
        .await
        .map_err(|e| state.fail("list_insights_by_type", &user, e))?;
    Ok(ApiResponse::ok("Insights retrieved successfully", insights))
}

pub async fn api_insights_by_category(
    state: State<AppState>,
    user: UserId,
    path: Path<String>,
) -> Result<InsightList, ApiError> {
    let category = path.0.trim();
    if category.is_empty() {
        return Err(ApiError::bad_request("Category is required"));
    }
    let insights = state
        .engine
        .queries
        .list_by_category(user.as_str(), category)
        .await
        .map_err(|e| state.fail("list_insights_by_category", &user, e))?;
    Ok(ApiResponse::ok("Insights retrieved successfully", insights))
}

pub async fn api_insights_by_priority(
    state: State<AppState>,
    user: UserId,
    path: Path<String>,
) -> Result<InsightList, ApiError> {
    let priority: Priority = path.0.parse().map_err(ApiError::bad_request)?;
    let insights = state
        .engine
        .queries
        .list_by_priority(user.as_str(), priority)
        .await
        .map_err(|e| state.fail("list_insights_by_priority", &user, e))?;
    Ok(ApiResponse::ok("Insights retrieved successfully", insights))
}

/// Only an empty body falls back to the default; a body that does not parse,
/// or whose `days` is not an integer, is rejected before anything is deleted.
pub async fn api_insights_cleanup(
    state: State<AppState>,
    user: UserId,
    body: Bytes,
) -> Result<Json<ApiResponse<CleanupResult>>, ApiError> {
    let retention = &state.config.retention;
    let requested = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<CleanupRequest>(&body) {
            Ok(request) => request.days,
            Err(e) => {
                let raw = serde_json::json!(String::from_utf8_lossy(&body));
                return Err(invalid_days(&state, &user, raw, Some(e)));
            }
        }
    };
    let requested = requested.unwrap_or_else(|| i64::from(retention.default_days));

    let Some(days) = u32::try_from(requested)
        .ok()
        .filter(|d| (1..=retention.max_days).contains(d))
    else {
        return Err(invalid_days(&state, &user, serde_json::json!(requested), None));
    };

    let deleted = state
        .engine
        .prune_insights(user.as_str(), days)
        .await
        .map_err(|e| state.fail("prune_insights", &user, e))?;
    Ok(ApiResponse::ok(
        "Old insights deleted successfully",
        CleanupResult { days, deleted },
    ))
}

fn invalid_days(
    state: &AppState,
    user: &UserId,
    requested: serde_json::Value,
    parse_error: Option<serde_json::Error>,
) -> ApiError {
    let retention = &state.config.retention;
    let message = format!("Days must be a number between 1 and {}", retention.max_days);
    let mut context = ErrorContext::new("prune_insights")
        .with_user_id(user.as_str())
        .with_data("days", requested);
    if let Some(e) = parse_error {
        context = context.with_data("parse_error", serde_json::json!(e.to_string()));
    }
    state.error_logger.log_warning(&message, &context);
    ApiError::bad_request(message)
}
