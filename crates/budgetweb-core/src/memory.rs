//! In-memory ledger store
//!
//! Each collection sits behind its own `RwLock`. Records keep insertion
//! order, so "first match" lookups are deterministic.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::models::{Budget, Insight, Transaction};
use crate::store::{BudgetFilter, InsightFilter, LedgerStore, TransactionFilter};

#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    transactions: RwLock<Vec<Transaction>>,
    budgets: RwLock<Vec<Budget>>,
    insights: RwLock<Vec<Insight>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, as (transactions, budgets, insights)
    pub async fn counts(&self) -> (usize, usize, usize) {
        (
            self.transactions.read().await.len(),
            self.budgets.read().await.len(),
            self.insights.read().await.len(),
        )
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn find_transactions(&self, filter: &TransactionFilter) -> CoreResult<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn sum_amounts(&self, filter: &TransactionFilter) -> CoreResult<Decimal> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .iter()
            .filter(|t| filter.matches(t))
            .map(|t| t.amount)
            .sum())
    }

    async fn find_transaction(&self, user_id: &str, id: &str) -> CoreResult<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .iter()
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned())
    }

    async fn insert_transaction(&self, transaction: Transaction) -> CoreResult<Transaction> {
        let mut transactions = self.transactions.write().await;
        if transactions.iter().any(|t| t.id == transaction.id) {
            return Err(CoreError::DuplicateEntry {
                entry: format!("transaction {}", transaction.id),
            });
        }
        transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn update_transaction(&self, transaction: Transaction) -> CoreResult<Transaction> {
        let mut transactions = self.transactions.write().await;
        let slot = transactions
            .iter_mut()
            .find(|t| t.id == transaction.id)
            .ok_or_else(|| CoreError::TransactionNotFound {
                id: transaction.id.clone(),
            })?;
        *slot = transaction.clone();
        Ok(transaction)
    }

    async fn find_budget(&self, filter: &BudgetFilter) -> CoreResult<Option<Budget>> {
        let budgets = self.budgets.read().await;
        Ok(budgets.iter().find(|b| filter.matches(b)).cloned())
    }

    async fn find_budgets(&self, user_id: &str) -> CoreResult<Vec<Budget>> {
        let budgets = self.budgets.read().await;
        Ok(budgets.iter().filter(|b| b.user_id == user_id).cloned().collect())
    }

    async fn get_budget(&self, user_id: &str, id: &str) -> CoreResult<Option<Budget>> {
        let budgets = self.budgets.read().await;
        Ok(budgets
            .iter()
            .find(|b| b.id == id && b.user_id == user_id)
            .cloned())
    }

    async fn insert_budget(&self, budget: Budget) -> CoreResult<Budget> {
        let mut budgets = self.budgets.write().await;
        if budgets.iter().any(|b| b.id == budget.id) {
            return Err(CoreError::DuplicateEntry {
                entry: format!("budget {}", budget.id),
            });
        }
        budgets.push(budget.clone());
        Ok(budget)
    }

    async fn upsert_budget(&self, budget: Budget) -> CoreResult<Budget> {
        let mut budgets = self.budgets.write().await;
        match budgets.iter_mut().find(|b| b.id == budget.id) {
            Some(slot) => *slot = budget.clone(),
            None => budgets.push(budget.clone()),
        }
        Ok(budget)
    }

    async fn update_budget_totals(
        &self,
        id: &str,
        spent: Decimal,
        remaining: Decimal,
    ) -> CoreResult<Budget> {
        let mut budgets = self.budgets.write().await;
        let budget = budgets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| CoreError::BudgetNotFound { id: id.to_string() })?;
        budget.spent = spent;
        budget.remaining = remaining;
        budget.updated_at = Utc::now();
        Ok(budget.clone())
    }

    async fn delete_budget(&self, user_id: &str, id: &str) -> CoreResult<Option<Budget>> {
        let mut budgets = self.budgets.write().await;
        let position = budgets.iter().position(|b| b.id == id && b.user_id == user_id);
        Ok(position.map(|i| budgets.remove(i)))
    }

    async fn find_insight(&self, filter: &InsightFilter) -> CoreResult<Option<Insight>> {
        let insights = self.insights.read().await;
        Ok(insights.iter().find(|i| filter.matches(i)).cloned())
    }

    async fn find_insights(&self, filter: &InsightFilter) -> CoreResult<Vec<Insight>> {
        let insights = self.insights.read().await;
        Ok(insights.iter().filter(|i| filter.matches(i)).cloned().collect())
    }

    async fn insert_insights(&self, batch: Vec<Insight>) -> CoreResult<Vec<Insight>> {
        let mut insights = self.insights.write().await;
        insights.extend(batch.iter().cloned());
        Ok(batch)
    }

    async fn delete_insights(&self, filter: &InsightFilter) -> CoreResult<u64> {
        let mut insights = self.insights.write().await;
        let before = insights.len();
        insights.retain(|i| !filter.matches(i));
        Ok((before - insights.len()) as u64)
    }
}
