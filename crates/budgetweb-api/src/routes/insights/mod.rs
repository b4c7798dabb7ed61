//! Insight routes
//!
//! Features:
//! - Run the rule engine for the caller
//! - List insights, optionally filtered by type, category or priority
//! - Prune insights older than a number of days

pub mod api;

pub use api::{
    api_insights,
    api_insights_by_category,
    api_insights_by_priority,
    api_insights_by_type,
    api_insights_cleanup,
    api_insights_generate,
};
