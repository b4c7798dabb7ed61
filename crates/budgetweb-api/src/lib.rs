//! JSON HTTP API over the budgetweb engine
//!
//! Routes are organized into modules:
//! - routes::transactions: record, update, soft delete and list transactions
//! - routes::budgets: budget CRUD with reconciled totals
//! - routes::insights: generate, query and prune insights

pub mod error;
pub mod routes;
pub mod user;

use anyhow::Context;
use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use budgetweb_config::Config;
use budgetweb_core::{CoreError, DefaultErrorLogger, Engine, ErrorContext, ErrorLogger};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;
pub use user::UserId;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub config: Config,
    pub error_logger: Arc<dyn ErrorLogger>,
}

impl AppState {
    pub fn new(config: Config, engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
            config,
            error_logger: Arc::new(DefaultErrorLogger),
        }
    }

    /// Log a failed operation and turn it into a response error
    pub(crate) fn fail(&self, operation: &str, user: &UserId, error: CoreError) -> ApiError {
        let context = ErrorContext::new(operation).with_user_id(user.as_str());
        self.error_logger.log_error(&error, &context);
        ApiError::Core(error)
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::budgets::{
        api_budget_create, api_budget_delete, api_budget_detail, api_budget_update, api_budgets,
    };
    use routes::insights::{
        api_insights, api_insights_by_category, api_insights_by_priority, api_insights_by_type,
        api_insights_cleanup, api_insights_generate,
    };
    use routes::transactions::{
        api_transaction_create, api_transaction_delete, api_transaction_detail,
        api_transaction_update, api_transactions,
    };

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/transactions", get(api_transactions).post(api_transaction_create))
        .route(
            "/api/transactions/:id",
            get(api_transaction_detail)
                .put(api_transaction_update)
                .delete(api_transaction_delete),
        )
        .route("/api/budgets", get(api_budgets).post(api_budget_create))
        .route(
            "/api/budgets/:id",
            get(api_budget_detail)
                .put(api_budget_update)
                .delete(api_budget_delete),
        )
        .route("/api/insights", get(api_insights))
        .route("/api/insights/generate", post(api_insights_generate))
        .route("/api/insights/type/:type", get(api_insights_by_type))
        .route("/api/insights/category/:category", get(api_insights_by_category))
        .route("/api/insights/priority/:priority", get(api_insights_by_priority))
        .route("/api/insights/cleanup", delete(api_insights_cleanup))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}

async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound {
        resource: uri.path().to_string(),
    }
}

/// Start the HTTP server
///
/// Binds `server.host:server.port` and serves until the process receives
/// Ctrl-C.
pub async fn start_server(config: Config, engine: Engine) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(config, engine);
    let router = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    log::info!("Starting budgetweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - /api/transactions (Transaction ledger)");
    log::info!("  - /api/budgets (Budgets with reconciled totals)");
    log::info!("  - /api/insights (Spending insights)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_router() -> Router {
        create_router(AppState::new(Config::default(), Engine::in_memory()))
    }

    fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(user::USER_HEADER, user);
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    fn food_budget() -> Value {
        json!({
            "name": "Food",
            "category": "food",
            "amount": "100",
            "start_date": "2024-01-01",
            "end_date": "2024-01-31"
        })
    }

    fn food_expense(amount: &str) -> Value {
        json!({
            "type": "expense",
            "amount": amount,
            "category": "food",
            "description": "groceries",
            "date": "2024-01-15",
            "payment_type": "cash"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_router();
        let (status, body) = send(&app, request("GET", "/api/health", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_user_header_rejected() {
        let app = test_router();
        let (status, body) = send(&app, request("GET", "/api/budgets", None, None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_budget_reconciled_after_expense() {
        let app = test_router();
        let (status, created) = send(
            &app,
            request("POST", "/api/budgets", Some("u1"), Some(food_budget())),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/transactions",
                Some("u1"),
                Some(food_expense("85")),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            request("GET", &format!("/api/budgets/{}", id), Some("u1"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["spent"], "85");
        assert_eq!(body["data"]["remaining"], "15");

        // budgets are scoped to their owner
        let (status, body) = send(
            &app,
            request("GET", &format!("/api/budgets/{}", id), Some("u2"), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "BUDGET_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_duplicate_budget_conflict() {
        let app = test_router();
        send(
            &app,
            request("POST", "/api/budgets", Some("u1"), Some(food_budget())),
        )
        .await;
        let (status, body) = send(
            &app,
            request("POST", "/api/budgets", Some("u1"), Some(food_budget())),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "DUPLICATE_ENTRY");
    }

    #[tokio::test]
    async fn test_invalid_transaction_is_bad_request() {
        let app = test_router();
        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/transactions",
                Some("u1"),
                Some(food_expense("0")),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_and_filter_insights() {
        let app = test_router();
        send(
            &app,
            request("POST", "/api/budgets", Some("u1"), Some(food_budget())),
        )
        .await;
        send(
            &app,
            request(
                "POST",
                "/api/transactions",
                Some("u1"),
                Some(food_expense("95")),
            ),
        )
        .await;

        let (status, generated) = send(
            &app,
            request("POST", "/api/insights/generate", Some("u1"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(generated["data"].as_array().unwrap().len(), 1);
        assert_eq!(generated["data"][0]["type"], "warning");
        assert_eq!(generated["data"][0]["priority"], "high");

        let (_, by_type) = send(
            &app,
            request("GET", "/api/insights/type/warning", Some("u1"), None),
        )
        .await;
        let listed = by_type["data"].as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["budgets"][0]["category"], "food");

        let (_, filtered) = send(
            &app,
            request(
                "GET",
                "/api/insights?type=success&category=food",
                Some("u1"),
                None,
            ),
        )
        .await;
        assert!(filtered["data"].as_array().unwrap().is_empty());

        let (status, _) = send(
            &app,
            request("GET", "/api/insights/priority/urgent", Some("u1"), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cleanup_validates_days() {
        let app = test_router();

        let (status, body) = send(
            &app,
            request(
                "DELETE",
                "/api/insights/cleanup",
                Some("u1"),
                Some(json!({ "days": 0 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Bad request: Days must be a number between 1 and 90");

        let (status, _) = send(
            &app,
            request(
                "DELETE",
                "/api/insights/cleanup",
                Some("u1"),
                Some(json!({ "days": 91 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            request("DELETE", "/api/insights/cleanup", Some("u1"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["days"], 30);
        assert_eq!(body["data"]["deleted"], 0);
    }

    #[tokio::test]
    async fn test_cleanup_rejects_malformed_days() {
        use budgetweb_core::store::InsightFilter;
        use budgetweb_core::{
            InMemoryLedgerStore, Insight, InsightDetail, InsightRules, LedgerStore,
        };

        let store = Arc::new(InMemoryLedgerStore::new());
        let mut old = Insight::new("u1", "food", InsightDetail::Success);
        old.created_at = chrono::Utc::now() - chrono::Duration::days(40);
        store.insert_insights(vec![old]).await.unwrap();
        let engine = Engine::new(store.clone(), InsightRules::default());
        let app = create_router(AppState::new(Config::default(), engine));

        for days in [json!("abc"), json!(7.5), json!("7")] {
            let (status, body) = send(
                &app,
                request(
                    "DELETE",
                    "/api/insights/cleanup",
                    Some("u1"),
                    Some(json!({ "days": days.clone() })),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "days = {}", days);
            assert_eq!(body["code"], "BAD_REQUEST");
        }

        let garbage = Request::builder()
            .method("DELETE")
            .uri("/api/insights/cleanup")
            .header(user::USER_HEADER, "u1")
            .header("content-type", "application/json")
            .body(Body::from("{\"days\":"))
            .unwrap();
        let (status, _) = send(&app, garbage).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let remaining = store
            .find_insights(&InsightFilter::for_user("u1"))
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);

        // an absent body still means the configured default
        let (status, body) = send(
            &app,
            request("DELETE", "/api/insights/cleanup", Some("u1"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["days"], 30);
        assert_eq!(body["data"]["deleted"], 1);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = test_router();
        let (status, body) = send(&app, request("GET", "/api/nope", Some("u1"), None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
