//! Transaction API endpoints
//!
//! Endpoints:
//! - api_transactions: list the caller's active transactions
//! - api_transaction_create: record a transaction
//! - api_transaction_detail: one active transaction
//! - api_transaction_update: partial update
//! - api_transaction_delete: soft delete

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use budgetweb_core::{NewTransaction, Transaction, TransactionQuery, TransactionUpdate};

use crate::routes::ApiResponse;
use crate::{ApiError, AppState, UserId};

type TransactionReply = Json<ApiResponse<Transaction>>;

/// List transactions (filters: type, category, start_date, end_date, payment_type)
pub async fn api_transactions(
    state: State<AppState>,
    user: UserId,
    query: Query<TransactionQuery>,
) -> Result<Json<ApiResponse<Vec<Transaction>>>, ApiError> {
    let transactions = state
        .engine
        .ledger
        .list_transactions(user.as_str(), query.0)
        .await
        .map_err(|e| state.fail("list_transactions", &user, e))?;
    Ok(ApiResponse::ok("Transactions retrieved successfully", transactions))
}

pub async fn api_transaction_create(
    state: State<AppState>,
    user: UserId,
    body: Json<NewTransaction>,
) -> Result<(StatusCode, TransactionReply), ApiError> {
    let transaction = state
        .engine
        .ledger
        .record_transaction(user.as_str(), body.0)
        .await
        .map_err(|e| state.fail("record_transaction", &user, e))?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Transaction created successfully", transaction),
    ))
}

pub async fn api_transaction_detail(
    state: State<AppState>,
    user: UserId,
    path: Path<String>,
) -> Result<TransactionReply, ApiError> {
    let transaction = state
        .engine
        .ledger
        .get_transaction(user.as_str(), &path.0)
        .await
        .map_err(|e| state.fail("get_transaction", &user, e))?;
    Ok(ApiResponse::ok("Transaction retrieved successfully", transaction))
}

pub async fn api_transaction_update(
    state: State<AppState>,
    user: UserId,
    path: Path<String>,
    body: Json<TransactionUpdate>,
) -> Result<TransactionReply, ApiError> {
    let transaction = state
        .engine
        .ledger
        .update_transaction(user.as_str(), &path.0, body.0)
        .await
        .map_err(|e| state.fail("update_transaction", &user, e))?;
    Ok(ApiResponse::ok("Transaction updated successfully", transaction))
}

pub async fn api_transaction_delete(
    state: State<AppState>,
    user: UserId,
    path: Path<String>,
) -> Result<TransactionReply, ApiError> {
    let transaction = state
        .engine
        .ledger
        .delete_transaction(user.as_str(), &path.0)
        .await
        .map_err(|e| state.fail("delete_transaction", &user, e))?;
    Ok(ApiResponse::ok("Transaction deleted successfully", transaction))
}
