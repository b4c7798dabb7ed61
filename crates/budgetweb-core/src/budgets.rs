//! Budget CRUD
//!
//! A user holds at most one active budget per category. Reads always
//! return totals recomputed from the ledger.

use crate::error::{CoreError, CoreResult};
use crate::models::{Budget, BudgetUpdate, NewBudget};
use crate::reconciler::BudgetReconciler;
use crate::store::{BudgetFilter, StoreRef};

#[derive(Clone)]
pub struct BudgetService {
    store: StoreRef,
    reconciler: BudgetReconciler,
}

impl BudgetService {
    pub fn new(store: StoreRef) -> Self {
        let reconciler = BudgetReconciler::new(store.clone());
        Self { store, reconciler }
    }

    /// Create a budget, seeding its totals from transactions already recorded
    pub async fn create_budget(&self, user_id: &str, input: NewBudget) -> CoreResult<Budget> {
        input.validate()?;
        self.ensure_category_free(user_id, input.category.trim(), None)
            .await?;

        let budget = self
            .reconciler
            .recompute_budget(input.into_budget(user_id))
            .await?;
        let budget = self.store.insert_budget(budget).await?;
        log::info!(
            "Created budget {} ({}) amount={} spent={}",
            budget.id,
            budget.category,
            budget.amount,
            budget.spent
        );
        Ok(budget)
    }

    pub async fn get_budget(&self, user_id: &str, id: &str) -> CoreResult<Budget> {
        let budget = self.find_owned(user_id, id).await?;
        self.reconciler.recompute_budget(budget).await
    }

    /// All budgets of the user, newest first, with fresh totals
    pub async fn list_budgets(&self, user_id: &str) -> CoreResult<Vec<Budget>> {
        self.reconciler.budgets_for_user(user_id).await
    }

    pub async fn update_budget(
        &self,
        user_id: &str,
        id: &str,
        update: BudgetUpdate,
    ) -> CoreResult<Budget> {
        let mut budget = self.find_owned(user_id, id).await?;
        let was_active = budget.is_active;
        let previous_category = budget.category.clone();

        update.apply_to(&mut budget)?;

        let claims_category =
            budget.category != previous_category || (!was_active && budget.is_active);
        if budget.is_active && claims_category {
            self.ensure_category_free(user_id, &budget.category, Some(&budget.id))
                .await?;
        }

        let budget = self.reconciler.recompute_budget(budget).await?;
        let budget = self.store.upsert_budget(budget).await?;
        log::info!("Updated budget {} ({})", budget.id, budget.category);
        Ok(budget)
    }

    /// Remove a budget; insights that reference it keep the dangling id
    pub async fn delete_budget(&self, user_id: &str, id: &str) -> CoreResult<Budget> {
        let budget = self
            .store
            .delete_budget(user_id, id)
            .await?
            .ok_or_else(|| CoreError::BudgetNotFound { id: id.to_string() })?;
        log::info!("Deleted budget {} ({})", budget.id, budget.category);
        Ok(budget)
    }

    async fn find_owned(&self, user_id: &str, id: &str) -> CoreResult<Budget> {
        self.store
            .get_budget(user_id, id)
            .await?
            .ok_or_else(|| CoreError::BudgetNotFound { id: id.to_string() })
    }

    async fn ensure_category_free(
        &self,
        user_id: &str,
        category: &str,
        except_id: Option<&str>,
    ) -> CoreResult<()> {
        let existing = self
            .store
            .find_budgets(user_id)
            .await?
            .into_iter()
            .filter(|b| BudgetFilter::active_for_category(user_id, category).matches(b))
            .find(|b| except_id.map_or(true, |id| b.id != id));

        match existing {
            Some(_) => Err(CoreError::DuplicateEntry {
                entry: format!("a budget for category \"{}\" already exists", category),
            }),
            None => Ok(()),
        }
    }
}
