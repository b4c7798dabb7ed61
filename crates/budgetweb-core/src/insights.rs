//! Insight rule engine
//!
//! For each dated budget of a user the engine evaluates four fixed rules:
//!
//! - warning: usage above the warning threshold
//! - success: usage below the success threshold
//! - trend: spend compared with the period right before the budget starts
//! - recommendation: trend increase above the recommendation threshold
//!
//! New insights are written in one batch at the end of a run.

use budgetweb_config::{DedupMode, InsightsConfig};
use rust_decimal::Decimal;

use crate::error::CoreResult;
use crate::models::{Budget, Insight, InsightDetail, Recommendation, TrendData};
use crate::reconciler::BudgetReconciler;
use crate::store::{InsightFilter, StoreRef, TransactionFilter};
use crate::time::DateWindow;
use crate::types::{InsightType, Priority};

const WARNING_ACTIONS: [&str; 3] = [
    "Review your recent transactions",
    "Consider reducing spending in this category",
    "Look for potential savings opportunities",
];

const RECOMMENDATION_REASON: &str = "Recent spending shows a significant increase";
const RECOMMENDATION_IMPACT: &str =
    "This adjustment will help accommodate your current spending patterns";

/// Thresholds and dedup policy for one engine
#[derive(Debug, Clone, PartialEq)]
pub struct InsightRules {
    pub warning_threshold: Decimal,
    pub high_priority_threshold: Decimal,
    pub success_threshold: Decimal,
    pub trend_window_days: u32,
    pub recommendation_threshold: Decimal,
    pub recommendation_factor: Decimal,
    pub dedup: DedupMode,
}

impl Default for InsightRules {
    fn default() -> Self {
        Self::from(&InsightsConfig::default())
    }
}

impl From<&InsightsConfig> for InsightRules {
    fn from(config: &InsightsConfig) -> Self {
        Self {
            warning_threshold: config.warning_threshold,
            high_priority_threshold: config.high_priority_threshold,
            success_threshold: config.success_threshold,
            trend_window_days: config.trend_window_days,
            recommendation_threshold: config.recommendation_threshold,
            recommendation_factor: config.recommendation_factor,
            dedup: config.dedup,
        }
    }
}

/// Insights queued during one run
#[derive(Debug, Default)]
struct InsightBatch {
    insights: Vec<Insight>,
}

impl InsightBatch {
    fn contains(&self, insight_type: InsightType, category: &str) -> bool {
        self.insights
            .iter()
            .any(|i| i.insight_type() == insight_type && i.category == category)
    }

    fn push(&mut self, insight: Insight) {
        log::debug!(
            "Queued {} insight for {}: {}",
            insight.insight_type(),
            insight.category,
            insight.title
        );
        self.insights.push(insight);
    }
}

#[derive(Clone)]
pub struct InsightEngine {
    store: StoreRef,
    reconciler: BudgetReconciler,
    rules: InsightRules,
}

impl InsightEngine {
    pub fn new(store: StoreRef, rules: InsightRules) -> Self {
        let reconciler = BudgetReconciler::new(store.clone());
        Self {
            store,
            reconciler,
            rules,
        }
    }

    /// Evaluate every rule against every dated budget of `user_id` and
    /// persist the new insights. Returns what was stored.
    pub async fn generate_insights(&self, user_id: &str) -> CoreResult<Vec<Insight>> {
        let budgets = self.store.find_budgets(user_id).await?;
        let mut batch = InsightBatch::default();

        for budget in &budgets {
            let Some(window) = budget.window() else {
                continue;
            };
            self
                .evaluate_budget(user_id, budget, window, &mut batch)
                .await?;
        }

        if batch.insights.is_empty() {
            log::debug!("No new insights for user {}", user_id);
            return Ok(vec![]);
        }

        let saved = self.store.insert_insights(batch.insights).await?;
        log::info!("Generated {} insights for user {}", saved.len(), user_id);
        Ok(saved)
    }

    async fn evaluate_budget(
        &self,
        user_id: &str,
        budget: &Budget,
        window: DateWindow,
        batch: &mut InsightBatch,
    ) -> CoreResult<()> {
        log::debug!(
            "Evaluating budget {} ({}) over {} ({} days)",
            budget.id,
            budget.category,
            window.description(),
            window.len_days()
        );
        let total_spent = self
            .reconciler
            .spent_in_window(&budget.user_id, &budget.category, window)
            .await?;

        // Zero-amount budgets have no meaningful usage ratio.
        let Some(percentage_used) = percentage_of(total_spent, budget.amount) else {
            log::debug!(
                "Skipping budget {} ({}): usage ratio is undefined",
                budget.id,
                budget.category
            );
            return Ok(());
        };

        if percentage_used > self.rules.warning_threshold
            && !self
                .already_raised(user_id, InsightType::Warning, &budget.category, batch, true)
                .await?
        {
            batch.push(self.warning(user_id, budget, total_spent, percentage_used));
        }

        if percentage_used < self.rules.success_threshold
            && !self
                .already_raised(user_id, InsightType::Success, &budget.category, batch, false)
                .await?
        {
            batch.push(self.success(user_id, budget, total_spent, percentage_used));
        }

        let previous_window = window.preceding(self.rules.trend_window_days);
        let previous = self
            .store
            .find_transactions(&TransactionFilter::budget_spend(
                &budget.user_id,
                &budget.category,
                previous_window,
            ))
            .await?;
        if previous.is_empty() {
            return Ok(());
        }

        let previous_spent: Decimal = previous.iter().map(|t| t.amount).sum();
        let Some(spending_change) = total_spent
            .checked_sub(previous_spent)
            .and_then(|change| percentage_of(change, previous_spent))
        else {
            return Ok(());
        };

        if !self
            .already_raised(user_id, InsightType::Trend, &budget.category, batch, false)
            .await?
        {
            batch.push(self.trend(user_id, budget, total_spent, previous_spent, spending_change));
        }

        if spending_change > self.rules.recommendation_threshold
            && !self
                .already_raised(
                    user_id,
                    InsightType::Recommendation,
                    &budget.category,
                    batch,
                    false,
                )
                .await?
        {
            match self.recommendation(user_id, budget, total_spent, spending_change) {
                Some(insight) => batch.push(insight),
                None => log::warn!(
                    "Skipping recommendation for budget {} ({}): suggested amount overflows",
                    budget.id,
                    budget.category
                ),
            }
        }

        Ok(())
    }

    /// Whether an insight of this kind is already queued or stored.
    ///
    /// In mixed mode a rule looks either at stored insights (`check_store`)
    /// or at the current batch. Persisted mode looks at both.
    async fn already_raised(
        &self,
        user_id: &str,
        insight_type: InsightType,
        category: &str,
        batch: &InsightBatch,
        check_store: bool,
    ) -> CoreResult<bool> {
        let persisted_mode = self.rules.dedup == DedupMode::Persisted;

        if (!check_store || persisted_mode) && batch.contains(insight_type, category) {
            return Ok(true);
        }

        if check_store || persisted_mode {
            let existing = self
                .store
                .find_insight(&InsightFilter::of_kind(user_id, insight_type, category))
                .await?;
            return Ok(existing.is_some());
        }

        Ok(false)
    }

    fn warning(
        &self,
        user_id: &str,
        budget: &Budget,
        total_spent: Decimal,
        percentage_used: Decimal,
    ) -> Insight {
        let priority = if percentage_used > self.rules.high_priority_threshold {
            Priority::High
        } else {
            Priority::Medium
        };

        Insight::new(
            user_id,
            &budget.category,
            InsightDetail::Warning {
                action_items: WARNING_ACTIONS.iter().map(|a| a.to_string()).collect(),
            },
        )
        .with_text(
            format!("High Spending Alert: {}", budget.category),
            format!(
                "You've used {:.1}% of your {} budget",
                percentage_used, budget.category
            ),
        )
        .with_figures(total_spent, percentage_used.round_dp(2))
        .with_priority(priority)
        .with_tags(&["overspending", budget.category.as_str()])
        .related_to(&budget.id)
    }

    fn success(
        &self,
        user_id: &str,
        budget: &Budget,
        total_spent: Decimal,
        percentage_used: Decimal,
    ) -> Insight {
        Insight::new(user_id, &budget.category, InsightDetail::Success)
            .with_text(
                format!("Well Managed: {}", budget.category),
                format!(
                    "You're managing your {} budget well, using only {:.1}%",
                    budget.category, percentage_used
                ),
            )
            .with_figures(total_spent, percentage_used.round_dp(2))
            .with_priority(Priority::Low)
            .with_tags(&["well-managed", budget.category.as_str()])
            .related_to(&budget.id)
    }

    fn trend(
        &self,
        user_id: &str,
        budget: &Budget,
        total_spent: Decimal,
        previous_spent: Decimal,
        spending_change: Decimal,
    ) -> Insight {
        let direction = if spending_change > Decimal::ZERO {
            "increased"
        } else {
            "decreased"
        };

        Insight::new(
            user_id,
            &budget.category,
            InsightDetail::Trend {
                trend_data: TrendData {
                    previous_amount: previous_spent,
                    current_amount: total_spent,
                    period: format!("{} days", self.rules.trend_window_days),
                },
            },
        )
        .with_text(
            format!("Spending Trend: {}", budget.category),
            format!(
                "Your spending in {} has {} by {:.1}%",
                budget.category,
                direction,
                spending_change.abs()
            ),
        )
        .with_figures(total_spent, spending_change.round_dp(2))
        .with_priority(Priority::Medium)
        .with_tags(&["trend", budget.category.as_str()])
        .related_to(&budget.id)
    }

    fn recommendation(
        &self,
        user_id: &str,
        budget: &Budget,
        total_spent: Decimal,
        spending_change: Decimal,
    ) -> Option<Insight> {
        let suggested_amount = budget.amount.checked_mul(self.rules.recommendation_factor)?;
        let insight = Insight::new(
            user_id,
            &budget.category,
            InsightDetail::Recommendation {
                recommendation: Recommendation {
                    suggested_amount,
                    reason: RECOMMENDATION_REASON.to_string(),
                    impact: RECOMMENDATION_IMPACT.to_string(),
                },
            },
        )
        .with_text(
            format!("Budget Adjustment Recommended: {}", budget.category),
            format!(
                "Consider adjusting your {} budget based on recent spending patterns",
                budget.category
            ),
        )
        .with_figures(total_spent, spending_change.round_dp(2))
        .with_priority(Priority::Medium)
        .with_tags(&["recommendation", budget.category.as_str()])
        .related_to(&budget.id);
        Some(insight)
    }
}

/// `part / whole * 100`, or `None` when `whole` is zero or the result overflows
fn percentage_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
}
