//! Insight query service: filtered reads and age-based pruning

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::CoreResult;
use crate::models::{Budget, Insight};
use crate::reconciler::BudgetReconciler;
use crate::store::{InsightFilter, StoreRef};
use crate::time::days_before;
use crate::types::{InsightType, Priority};

/// Optional criteria; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightQuery {
    #[serde(default, rename = "type")]
    pub insight_type: Option<InsightType>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl InsightQuery {
    fn into_filter(self, user_id: &str) -> InsightFilter {
        InsightFilter {
            insight_type: self.insight_type,
            category: self.category,
            priority: self.priority,
            ..InsightFilter::for_user(user_id)
        }
    }
}

/// An insight with its related budget ids resolved to full records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedInsight {
    #[serde(flatten)]
    pub insight: Insight,
    /// Budgets that no longer exist are left out
    pub budgets: Vec<Budget>,
}

#[derive(Clone)]
pub struct InsightQueryService {
    store: StoreRef,
    reconciler: BudgetReconciler,
}

impl InsightQueryService {
    pub fn new(store: StoreRef) -> Self {
        let reconciler = BudgetReconciler::new(store.clone());
        Self { store, reconciler }
    }

    pub async fn list(&self, user_id: &str) -> CoreResult<Vec<ResolvedInsight>> {
        self.fetch(user_id, InsightFilter::for_user(user_id)).await
    }

    pub async fn list_by_type(
        &self,
        user_id: &str,
        insight_type: InsightType,
    ) -> CoreResult<Vec<ResolvedInsight>> {
        let filter = InsightFilter {
            insight_type: Some(insight_type),
            ..InsightFilter::for_user(user_id)
        };
        self.fetch(user_id, filter).await
    }

    pub async fn list_by_category(
        &self,
        user_id: &str,
        category: &str,
    ) -> CoreResult<Vec<ResolvedInsight>> {
        let filter = InsightFilter {
            category: Some(category.to_string()),
            ..InsightFilter::for_user(user_id)
        };
        self.fetch(user_id, filter).await
    }

    pub async fn list_by_priority(
        &self,
        user_id: &str,
        priority: Priority,
    ) -> CoreResult<Vec<ResolvedInsight>> {
        let filter = InsightFilter {
            priority: Some(priority),
            ..InsightFilter::for_user(user_id)
        };
        self.fetch(user_id, filter).await
    }

    pub async fn query(
        &self,
        user_id: &str,
        query: InsightQuery,
    ) -> CoreResult<Vec<ResolvedInsight>> {
        self.fetch(user_id, query.into_filter(user_id)).await
    }

    /// Delete insights created more than `days` days ago
    pub async fn delete_older_than(&self, user_id: &str, days: u32) -> CoreResult<u64> {
        self.delete_before(user_id, days_before(Utc::now(), days)).await
    }

    /// Delete insights created strictly before `cutoff`
    pub async fn delete_before(
        &self,
        user_id: &str,
        cutoff: chrono::DateTime<Utc>,
    ) -> CoreResult<u64> {
        let filter = InsightFilter {
            created_before: Some(cutoff),
            ..InsightFilter::for_user(user_id)
        };
        let deleted = self.store.delete_insights(&filter).await?;
        log::info!(
            "Deleted {} insights older than {} for user {}",
            deleted,
            cutoff,
            user_id
        );
        Ok(deleted)
    }

    async fn fetch(
        &self,
        user_id: &str,
        filter: InsightFilter,
    ) -> CoreResult<Vec<ResolvedInsight>> {
        let mut insights = self.store.find_insights(&filter).await?;
        insights.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if insights.is_empty() {
            return Ok(vec![]);
        }

        // Related budgets are served with fresh totals, like any other budget read.
        let budgets: HashMap<String, Budget> = self
            .reconciler
            .budgets_for_user(user_id)
            .await?
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();

        Ok(insights
            .into_iter()
            .map(|insight| {
                let related = insight
                    .related_budgets
                    .iter()
                    .filter_map(|id| budgets.get(id).cloned())
                    .collect();
                ResolvedInsight {
                    insight,
                    budgets: related,
                }
            })
            .collect())
    }
}
