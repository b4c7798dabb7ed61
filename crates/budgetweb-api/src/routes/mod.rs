//! Route modules for the API server
//!
//! Each module follows the same structure:
//! - mod.rs: module declaration and exports
//! - api.rs: JSON endpoints

pub mod budgets;
pub mod insights;
pub mod transactions;

use axum::Json;
use serde::Serialize;

/// Envelope for successful responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
        })
    }
}
