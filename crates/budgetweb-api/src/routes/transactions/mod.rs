//! Transaction routes: record, list, update and soft delete
//!
//! Every write reconciles the affected budget before responding.

pub mod api;

pub use api::{
    api_transaction_create,
    api_transaction_delete,
    api_transaction_detail,
    api_transaction_update,
    api_transactions,
};
