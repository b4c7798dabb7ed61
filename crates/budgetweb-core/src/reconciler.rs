//! Budget reconciliation
//!
//! Keeps a budget's cached `spent`/`remaining` in line with the active
//! expense transactions inside its window. Runs after every expense
//! write and on every budget read.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::CoreResult;
use crate::models::Budget;
use crate::store::{BudgetFilter, StoreRef, TransactionFilter};
use crate::time::DateWindow;

#[derive(Clone)]
pub struct BudgetReconciler {
    store: StoreRef,
}

impl BudgetReconciler {
    pub fn new(store: StoreRef) -> Self {
        Self { store }
    }

    /// Total of active expenses for `category` inside `window`
    pub async fn spent_in_window(
        &self,
        user_id: &str,
        category: &str,
        window: DateWindow,
    ) -> CoreResult<Decimal> {
        self.store
            .sum_amounts(&TransactionFilter::budget_spend(user_id, category, window))
            .await
    }

    /// Recompute `spent` and `remaining` from the ledger.
    ///
    /// Budgets missing either date come back untouched. `remaining` is not
    /// floored, so an overspent budget carries a negative value. Nothing is
    /// persisted here.
    pub async fn recompute_budget(&self, mut budget: Budget) -> CoreResult<Budget> {
        let Some(window) = budget.window() else {
            log::debug!(
                "Skipping reconciliation of undated budget {} ({})",
                budget.id,
                budget.category
            );
            return Ok(budget);
        };

        let spent = self
            .spent_in_window(&budget.user_id, &budget.category, window)
            .await?;
        budget.spent = spent;
        budget.remaining = budget.amount - spent;
        Ok(budget)
    }

    /// Refresh the budget tracking an expense written on `date`.
    ///
    /// Returns the updated budget, or `None` when no active budget of that
    /// category covers the date.
    pub async fn on_transaction_write(
        &self,
        user_id: &str,
        category: &str,
        date: NaiveDate,
    ) -> CoreResult<Option<Budget>> {
        let Some(budget) = self
            .store
            .find_budget(&BudgetFilter::tracking(user_id, category, date))
            .await?
        else {
            log::debug!(
                "No active {} budget covers {} for user {}",
                category,
                date,
                user_id
            );
            return Ok(None);
        };

        let budget = self.recompute_budget(budget).await?;
        let stored = self
            .store
            .update_budget_totals(&budget.id, budget.spent, budget.remaining)
            .await?;
        log::info!(
            "Reconciled budget {} ({}): spent={} remaining={}",
            stored.id,
            stored.category,
            stored.spent,
            stored.remaining
        );
        if stored.is_overspent() {
            log::warn!(
                "Budget {} ({}) is overspent by {}",
                stored.id,
                stored.category,
                -stored.remaining
            );
        }
        Ok(Some(stored))
    }

    /// All of a user's budgets with freshly computed totals, newest first
    pub async fn budgets_for_user(&self, user_id: &str) -> CoreResult<Vec<Budget>> {
        let mut budgets = self.store.find_budgets(user_id).await?;
        budgets.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut reconciled = Vec::with_capacity(budgets.len());
        for budget in budgets {
            reconciled.push(self.recompute_budget(budget).await?);
        }
        Ok(reconciled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedgerStore;
    use crate::models::{NewBudget, NewTransaction, Transaction};
    use crate::store::LedgerStore;
    use crate::types::{PaymentType, TransactionType};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(kind: TransactionType, category: &str, amount: i64, on: NaiveDate) -> Transaction {
        NewTransaction {
            transaction_type: kind,
            amount: Decimal::from(amount),
            category: category.to_string(),
            description: "test".to_string(),
            date: Some(on),
            payment_type: PaymentType::Cash,
        }
        .into_transaction("u1")
    }

    fn food_budget(amount: i64) -> Budget {
        NewBudget {
            name: "Food".to_string(),
            category: "food".to_string(),
            amount: Decimal::from(amount),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            description: None,
            notifications: None,
        }
        .into_budget("u1")
    }

    async fn setup() -> (Arc<InMemoryLedgerStore>, BudgetReconciler) {
        let store = Arc::new(InMemoryLedgerStore::new());
        let reconciler = BudgetReconciler::new(store.clone());
        (store, reconciler)
    }

    #[tokio::test]
    async fn test_recompute_sums_active_expenses_in_window() {
        let (store, reconciler) = setup().await;
        store
            .insert_transaction(tx(TransactionType::Expense, "food", 85, date(2024, 1, 15)))
            .await
            .unwrap();
        store
            .insert_transaction(tx(TransactionType::Income, "food", 500, date(2024, 1, 15)))
            .await
            .unwrap();
        store
            .insert_transaction(tx(TransactionType::Expense, "food", 40, date(2024, 2, 1)))
            .await
            .unwrap();
        store
            .insert_transaction(tx(TransactionType::Expense, "rent", 40, date(2024, 1, 3)))
            .await
            .unwrap();

        let budget = reconciler.recompute_budget(food_budget(100)).await.unwrap();

        assert_eq!(budget.spent, Decimal::from(85));
        assert_eq!(budget.remaining, Decimal::from(15));
    }

    #[tokio::test]
    async fn test_remaining_goes_negative_when_overspent() {
        let (store, reconciler) = setup().await;
        store
            .insert_transaction(tx(TransactionType::Expense, "food", 70, date(2024, 1, 1)))
            .await
            .unwrap();
        store
            .insert_transaction(tx(TransactionType::Expense, "food", 60, date(2024, 1, 31)))
            .await
            .unwrap();

        let budget = reconciler.recompute_budget(food_budget(100)).await.unwrap();

        assert_eq!(budget.spent, Decimal::from(130));
        assert_eq!(budget.remaining, Decimal::from(-30));
        assert!(budget.is_overspent());
    }

    #[tokio::test]
    async fn test_undated_budget_left_untouched() {
        let (store, reconciler) = setup().await;
        store
            .insert_transaction(tx(TransactionType::Expense, "food", 10, date(2024, 1, 5)))
            .await
            .unwrap();

        let mut budget = food_budget(100);
        budget.start_date = None;
        budget.spent = Decimal::from(3);
        budget.remaining = Decimal::from(97);

        let result = reconciler.recompute_budget(budget.clone()).await.unwrap();
        assert_eq!(result, budget);
    }

    #[tokio::test]
    async fn test_on_transaction_write_persists_totals() {
        let (store, reconciler) = setup().await;
        let budget = store.insert_budget(food_budget(100)).await.unwrap();
        store
            .insert_transaction(tx(TransactionType::Expense, "food", 25, date(2024, 1, 9)))
            .await
            .unwrap();

        let updated = reconciler
            .on_transaction_write("u1", "food", date(2024, 1, 9))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, budget.id);

        let stored = store.get_budget("u1", &budget.id).await.unwrap().unwrap();
        assert_eq!(stored.spent, Decimal::from(25));
        assert_eq!(stored.remaining, Decimal::from(75));
    }

    #[tokio::test]
    async fn test_on_transaction_write_without_budget_is_noop() {
        let (store, reconciler) = setup().await;
        store.insert_budget(food_budget(100)).await.unwrap();

        let outside = reconciler
            .on_transaction_write("u1", "food", date(2024, 3, 1))
            .await
            .unwrap();
        assert!(outside.is_none());

        let other_category = reconciler
            .on_transaction_write("u1", "travel", date(2024, 1, 10))
            .await
            .unwrap();
        assert!(other_category.is_none());
    }

    #[tokio::test]
    async fn test_inactive_budget_not_reconciled_on_write() {
        let (store, reconciler) = setup().await;
        let mut budget = food_budget(100);
        budget.is_active = false;
        store.insert_budget(budget).await.unwrap();

        let result = reconciler
            .on_transaction_write("u1", "food", date(2024, 1, 10))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_budgets_for_user_reconciles_on_read() {
        let (store, reconciler) = setup().await;
        let budget = store.insert_budget(food_budget(200)).await.unwrap();
        // written straight to the store, bypassing any write-time reconciliation
        store
            .insert_transaction(tx(TransactionType::Expense, "food", 120, date(2024, 1, 20)))
            .await
            .unwrap();

        let budgets = reconciler.budgets_for_user("u1").await.unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].id, budget.id);
        assert_eq!(budgets[0].spent, Decimal::from(120));
        assert_eq!(budgets[0].remaining, Decimal::from(80));

        assert!(reconciler.budgets_for_user("u2").await.unwrap().is_empty());
    }
}
