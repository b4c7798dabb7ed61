//! Budget reconciliation and insight derivation

pub mod budgets;
pub mod error;
pub mod insights;
pub mod ledger;
pub mod memory;
pub mod models;
pub mod query;
pub mod reconciler;
pub mod store;
pub mod time;
pub mod types;

use chrono::NaiveDate;
use std::sync::Arc;

pub use budgets::BudgetService;
pub use error::{
    CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity,
};
pub use insights::{InsightEngine, InsightRules};
pub use ledger::{LedgerService, TransactionQuery};
pub use memory::InMemoryLedgerStore;
pub use models::{
    Budget, BudgetUpdate, Insight, InsightDetail, NewBudget, NewTransaction, Transaction,
    TransactionUpdate,
};
pub use query::{InsightQuery, InsightQueryService, ResolvedInsight};
pub use reconciler::BudgetReconciler;
pub use store::{LedgerStore, StoreRef};
pub use types::{InsightType, PaymentType, Priority, TransactionType};

/// All services over one shared store
///
/// Cheap to clone; every service holds only the store handle.
#[derive(Clone)]
pub struct Engine {
    pub reconciler: BudgetReconciler,
    pub insights: InsightEngine,
    pub queries: InsightQueryService,
    pub ledger: LedgerService,
    pub budgets: BudgetService,
}

impl Engine {
    pub fn new(store: StoreRef, rules: InsightRules) -> Self {
        Self {
            reconciler: BudgetReconciler::new(store.clone()),
            insights: InsightEngine::new(store.clone(), rules),
            queries: InsightQueryService::new(store.clone()),
            ledger: LedgerService::new(store.clone()),
            budgets: BudgetService::new(store),
        }
    }

    /// Engine over a fresh in-memory store with default rules
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryLedgerStore::new()), InsightRules::default())
    }

    /// Refresh the budget tracking `category` on `date`, if there is one
    pub async fn reconcile_on_transaction_change(
        &self,
        user_id: &str,
        category: &str,
        date: NaiveDate,
    ) -> CoreResult<Option<Budget>> {
        self.reconciler
            .on_transaction_write(user_id, category, date)
            .await
    }

    pub async fn get_budgets_reconciled(&self, user_id: &str) -> CoreResult<Vec<Budget>> {
        self.reconciler.budgets_for_user(user_id).await
    }

    pub async fn generate_insights(&self, user_id: &str) -> CoreResult<Vec<Insight>> {
        self.insights.generate_insights(user_id).await
    }

    pub async fn query_insights(
        &self,
        user_id: &str,
        query: InsightQuery,
    ) -> CoreResult<Vec<ResolvedInsight>> {
        self.queries.query(user_id, query).await
    }

    /// Delete the user's insights older than `days`, returning how many went
    pub async fn prune_insights(&self, user_id: &str, days: u32) -> CoreResult<u64> {
        self.queries.delete_older_than(user_id, days).await
    }
}
