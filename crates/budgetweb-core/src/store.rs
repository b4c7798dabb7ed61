//! Persistence interface used by the reconciler, the insight rules and
//! the query service

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::error::CoreResult;
use crate::models::{Budget, Insight, Transaction};
use crate::time::{DateWindow, Dated};
use crate::types::{InsightType, PaymentType, Priority, TransactionType};

/// Shared store reference
pub type StoreRef = Arc<dyn LedgerStore>;

// ==================== Filters ====================

/// Transaction lookup filter; `None` fields match anything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub user_id: String,
    pub category: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub payment_type: Option<PaymentType>,
    pub is_active: Option<bool>,
    pub window: Option<DateWindow>,
    /// Open-ended lower bound, used when only one bound is known
    pub from: Option<NaiveDate>,
    /// Open-ended upper bound
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    /// Active expenses of one category inside `window`: the transactions a
    /// budget's spend is made of
    pub fn budget_spend(user_id: &str, category: &str, window: DateWindow) -> Self {
        Self::for_user(user_id)
            .category(category)
            .transaction_type(TransactionType::Expense)
            .active(true)
            .window(window)
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn window(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        tx.user_id == self.user_id
            && self.category.as_ref().map_or(true, |c| &tx.category == c)
            && self.transaction_type.map_or(true, |t| tx.transaction_type == t)
            && self.payment_type.map_or(true, |p| tx.payment_type == p)
            && self.is_active.map_or(true, |a| tx.is_active == a)
            && self.window.as_ref().map_or(true, |w| tx.within(w))
            && self.from.map_or(true, |from| tx.date >= from)
            && self.to.map_or(true, |to| tx.date <= to)
    }
}

/// Budget lookup filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetFilter {
    pub user_id: String,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    /// Only budgets whose window contains this date; undated budgets never match
    pub date_contains: Option<NaiveDate>,
}

impl BudgetFilter {
    /// The active budget of `category` that should track a transaction on `date`
    pub fn tracking(user_id: &str, category: &str, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            category: Some(category.to_string()),
            is_active: Some(true),
            date_contains: Some(date),
        }
    }

    /// Any active budget of `category`, regardless of dates
    pub fn active_for_category(user_id: &str, category: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            category: Some(category.to_string()),
            is_active: Some(true),
            date_contains: None,
        }
    }

    pub fn matches(&self, budget: &Budget) -> bool {
        budget.user_id == self.user_id
            && self.category.as_ref().map_or(true, |c| &budget.category == c)
            && self.is_active.map_or(true, |a| budget.is_active == a)
            && self.date_contains.map_or(true, |d| budget.covers(&d))
    }
}

/// Insight lookup filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightFilter {
    pub user_id: String,
    pub insight_type: Option<InsightType>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    /// Only insights created strictly before this instant
    pub created_before: Option<DateTime<Utc>>,
}

impl InsightFilter {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    /// Insights of one type raised for one category
    pub fn of_kind(user_id: &str, insight_type: InsightType, category: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            insight_type: Some(insight_type),
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    pub fn matches(&self, insight: &Insight) -> bool {
        insight.user_id == self.user_id
            && self.insight_type.map_or(true, |t| insight.insight_type() == t)
            && self.category.as_ref().map_or(true, |c| &insight.category == c)
            && self.priority.map_or(true, |p| insight.priority == p)
            && self.created_before.map_or(true, |cutoff| insight.created_at < cutoff)
    }
}

// ==================== Store Trait ====================

/// Repository over transactions, budgets and insights
///
/// Implementations report failures as `CoreError::StoreError`; callers
/// propagate them without retrying.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ---- transactions ----

    async fn find_transactions(&self, filter: &TransactionFilter) -> CoreResult<Vec<Transaction>>;

    /// Sum of `amount` over the matching transactions
    async fn sum_amounts(&self, filter: &TransactionFilter) -> CoreResult<Decimal> {
        let transactions = self.find_transactions(filter).await?;
        Ok(transactions.iter().map(|t| t.amount).sum())
    }

    async fn find_transaction(&self, user_id: &str, id: &str) -> CoreResult<Option<Transaction>>;

    async fn insert_transaction(&self, transaction: Transaction) -> CoreResult<Transaction>;

    /// Replace a stored transaction by id
    async fn update_transaction(&self, transaction: Transaction) -> CoreResult<Transaction>;

    // ---- budgets ----

    /// First budget matching the filter
    async fn find_budget(&self, filter: &BudgetFilter) -> CoreResult<Option<Budget>>;

    async fn find_budgets(&self, user_id: &str) -> CoreResult<Vec<Budget>>;

    async fn get_budget(&self, user_id: &str, id: &str) -> CoreResult<Option<Budget>>;

    async fn insert_budget(&self, budget: Budget) -> CoreResult<Budget>;

    /// Insert or replace a budget by id
    async fn upsert_budget(&self, budget: Budget) -> CoreResult<Budget>;

    /// Overwrite the cached totals of one budget in a single write
    async fn update_budget_totals(
        &self,
        id: &str,
        spent: Decimal,
        remaining: Decimal,
    ) -> CoreResult<Budget>;

    async fn delete_budget(&self, user_id: &str, id: &str) -> CoreResult<Option<Budget>>;

    // ---- insights ----

    async fn find_insight(&self, filter: &InsightFilter) -> CoreResult<Option<Insight>>;

    async fn find_insights(&self, filter: &InsightFilter) -> CoreResult<Vec<Insight>>;

    async fn insert_insights(&self, insights: Vec<Insight>) -> CoreResult<Vec<Insight>>;

    /// Delete all matching insights, returning how many were removed
    async fn delete_insights(&self, filter: &InsightFilter) -> CoreResult<u64>;
}
