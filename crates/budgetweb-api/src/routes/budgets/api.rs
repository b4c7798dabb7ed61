//! Budget API endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use budgetweb_core::{Budget, BudgetUpdate, NewBudget};

use crate::routes::ApiResponse;
use crate::{ApiError, AppState, UserId};

type BudgetReply = Json<ApiResponse<Budget>>;

/// All of the caller's budgets, newest first, totals recomputed
pub async fn api_budgets(
    state: State<AppState>,
    user: UserId,
) -> Result<Json<ApiResponse<Vec<Budget>>>, ApiError> {
    let budgets = state
        .engine
        .get_budgets_reconciled(user.as_str())
        .await
        .map_err(|e| state.fail("list_budgets", &user, e))?;
    Ok(ApiResponse::ok("Budgets retrieved successfully", budgets))
}

pub async fn api_budget_create(
    state: State<AppState>,
    user: UserId,
    body: Json<NewBudget>,
) -> Result<(StatusCode, BudgetReply), ApiError> {
    let budget = state
        .engine
        .budgets
        .create_budget(user.as_str(), body.0)
        .await
        .map_err(|e| state.fail("create_budget", &user, e))?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Budget created successfully", budget),
    ))
}

pub async fn api_budget_detail(
    state: State<AppState>,
    user: UserId,
    path: Path<String>,
) -> Result<BudgetReply, ApiError> {
    let budget = state
        .engine
        .budgets
        .get_budget(user.as_str(), &path.0)
        .await
        .map_err(|e| state.fail("get_budget", &user, e))?;
    Ok(ApiResponse::ok("Budget retrieved successfully", budget))
}

pub async fn api_budget_update(
    state: State<AppState>,
    user: UserId,
    path: Path<String>,
    body: Json<BudgetUpdate>,
) -> Result<BudgetReply, ApiError> {
    let budget = state
        .engine
        .budgets
        .update_budget(user.as_str(), &path.0, body.0)
        .await
        .map_err(|e| state.fail("update_budget", &user, e))?;
    Ok(ApiResponse::ok("Budget updated successfully", budget))
}

pub async fn api_budget_delete(
    state: State<AppState>,
    user: UserId,
    path: Path<String>,
) -> Result<BudgetReply, ApiError> {
    let budget = state
        .engine
        .budgets
        .delete_budget(user.as_str(), &path.0)
        .await
        .map_err(|e| state.fail("delete_budget", &user, e))?;
    Ok(ApiResponse::ok("Budget deleted successfully", budget))
}
