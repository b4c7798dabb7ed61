//! Budget routes: CRUD with totals reconciled on every read

pub mod api;

pub use api::{
    api_budget_create,
    api_budget_delete,
    api_budget_detail,
    api_budget_update,
    api_budgets,
};
