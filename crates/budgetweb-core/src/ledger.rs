//! Transaction write paths
//!
//! Every write that touches an expense is followed by budget
//! reconciliation. The write itself is never rolled back; a failed
//! reconciliation is reported as `CoreError::ReconciliationFailed`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{NewTransaction, Transaction, TransactionUpdate};
use crate::reconciler::BudgetReconciler;
use crate::store::{StoreRef, TransactionFilter};
use crate::types::{PaymentType, TransactionType};

/// Listing criteria for a user's active transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionQuery {
    #[serde(default, rename = "type")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
}

impl TransactionQuery {
    fn into_filter(self, user_id: &str) -> TransactionFilter {
        TransactionFilter {
            category: self.category,
            transaction_type: self.transaction_type,
            payment_type: self.payment_type,
            from: self.start_date,
            to: self.end_date,
            ..TransactionFilter::for_user(user_id).active(true)
        }
    }
}

/// The (category, date) slot an expense occupies in the budget ledger
type BudgetSlot = (String, NaiveDate);

fn budget_slot(transaction: &Transaction) -> Option<BudgetSlot> {
    transaction
        .is_expense()
        .then(|| (transaction.category.clone(), transaction.date))
}

#[derive(Clone)]
pub struct LedgerService {
    store: StoreRef,
    reconciler: BudgetReconciler,
}

impl LedgerService {
    pub fn new(store: StoreRef) -> Self {
        let reconciler = BudgetReconciler::new(store.clone());
        Self { store, reconciler }
    }

    pub async fn record_transaction(
        &self,
        user_id: &str,
        input: NewTransaction,
    ) -> CoreResult<Transaction> {
        input.validate()?;
        let transaction = self
            .store
            .insert_transaction(input.into_transaction(user_id))
            .await?;
        log::info!(
            "Recorded {} transaction {} ({} {})",
            transaction.transaction_type,
            transaction.id,
            transaction.category,
            transaction.amount
        );

        let slots: Vec<BudgetSlot> = budget_slot(&transaction).into_iter().collect();
        self.reconcile_slots(&transaction, slots).await?;
        Ok(transaction)
    }

    /// Active transaction by id
    pub async fn get_transaction(&self, user_id: &str, id: &str) -> CoreResult<Transaction> {
        self.store
            .find_transaction(user_id, id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| CoreError::TransactionNotFound { id: id.to_string() })
    }

    /// Active transactions matching `query`, most recent date first
    pub async fn list_transactions(
        &self,
        user_id: &str,
        query: TransactionQuery,
    ) -> CoreResult<Vec<Transaction>> {
        let mut transactions = self
            .store
            .find_transactions(&query.into_filter(user_id))
            .await?;
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }

    /// Apply a partial update.
    ///
    /// Both the budget that tracked the old version and the one tracking the
    /// new version are reconciled, so moving an expense between categories or
    /// dates leaves no stale totals behind.
    pub async fn update_transaction(
        &self,
        user_id: &str,
        id: &str,
        update: TransactionUpdate,
    ) -> CoreResult<Transaction> {
        update.validate()?;
        let mut transaction = self.get_transaction(user_id, id).await?;
        let previous_slot = budget_slot(&transaction);

        update.apply_to(&mut transaction);
        let transaction = self.store.update_transaction(transaction).await?;
        log::info!("Updated transaction {}", transaction.id);

        let mut slots: Vec<BudgetSlot> = previous_slot.into_iter().collect();
        if let Some(slot) = budget_slot(&transaction) {
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        self.reconcile_slots(&transaction, slots).await?;
        Ok(transaction)
    }

    /// Soft delete: the record stays, flagged inactive
    pub async fn delete_transaction(&self, user_id: &str, id: &str) -> CoreResult<Transaction> {
        let mut transaction = self.get_transaction(user_id, id).await?;
        transaction.is_active = false;
        transaction.updated_at = chrono::Utc::now();
        let transaction = self.store.update_transaction(transaction).await?;
        log::info!("Deactivated transaction {}", transaction.id);

        let slots: Vec<BudgetSlot> = budget_slot(&transaction).into_iter().collect();
        self.reconcile_slots(&transaction, slots).await?;
        Ok(transaction)
    }

    async fn reconcile_slots(
        &self,
        transaction: &Transaction,
        slots: Vec<BudgetSlot>,
    ) -> CoreResult<()> {
        for (category, date) in slots {
            self.reconciler
                .on_transaction_write(&transaction.user_id, &category, date)
                .await
                .map_err(|e| {
                    log::error!(
                        "Budget reconciliation failed after writing transaction {}: {}",
                        transaction.id,
                        e
                    );
                    CoreError::ReconciliationFailed {
                        transaction_id: transaction.id.clone(),
                        message: e.to_string(),
                    }
                })?;
        }
        Ok(())
    }
}
