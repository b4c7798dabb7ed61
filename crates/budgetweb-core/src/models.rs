//! Ledger records: transactions, budgets and insights

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::time::DateWindow;
use crate::types::{InsightType, NotificationFrequency, PaymentType, Priority, TransactionType};

/// Generate a unique record identifier
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ==================== Transactions ====================

/// Income or expense entry owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Always positive; the direction comes from `transaction_type`
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub payment_type: PaymentType,
    /// Soft-delete flag
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

/// Payload for recording a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    /// Defaults to today when omitted
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_type: PaymentType,
}

impl NewTransaction {
    pub fn validate(&self) -> CoreResult<()> {
        validate_positive("amount", self.amount)?;
        validate_not_blank("category", &self.category)?;
        validate_not_blank("description", &self.description)?;
        Ok(())
    }

    /// Build the stored record
    pub fn into_transaction(self, user_id: &str) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: generate_id(),
            user_id: user_id.to_string(),
            transaction_type: self.transaction_type,
            amount: self.amount,
            category: self.category.trim().to_string(),
            description: self.description,
            date: self.date.unwrap_or_else(|| now.date_naive()),
            payment_type: self.payment_type,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a transaction; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionUpdate {
    #[serde(default, rename = "type")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(amount) = self.amount {
            validate_positive("amount", amount)?;
        }
        if let Some(ref category) = self.category {
            validate_not_blank("category", category)?;
        }
        if let Some(ref description) = self.description {
            validate_not_blank("description", description)?;
        }
        Ok(())
    }

    pub fn apply_to(self, transaction: &mut Transaction) {
        if let Some(transaction_type) = self.transaction_type {
            transaction.transaction_type = transaction_type;
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(category) = self.category {
            transaction.category = category.trim().to_string();
        }
        if let Some(description) = self.description {
            transaction.description = description;
        }
        if let Some(date) = self.date {
            transaction.date = date;
        }
        if let Some(payment_type) = self.payment_type {
            transaction.payment_type = payment_type;
        }
        transaction.updated_at = Utc::now();
    }
}

// ==================== Budgets ====================

/// Reminder settings stored with a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Usage percentage (0-100) that should trigger a reminder
    #[serde(default)]
    pub threshold: Option<u8>,
    #[serde(default)]
    pub frequency: Option<NotificationFrequency>,
}

impl NotificationSettings {
    fn validate(&self) -> CoreResult<()> {
        match self.threshold {
            Some(threshold) if threshold > 100 => Err(CoreError::validation(
                "notifications.threshold must be between 0 and 100",
            )),
            _ => Ok(()),
        }
    }
}

/// Spending cap for one category over a date window
///
/// `spent` and `remaining` are a cache of the ledger; the reconciler
/// recomputes them from active expense transactions in the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category: String,
    /// Spending cap
    pub amount: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub spent: Decimal,
    /// `amount - spent`; negative when overspent
    pub remaining: Decimal,
    pub is_active: bool,
    pub notifications: Option<NotificationSettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Tracking window, when both dates are set
    pub fn window(&self) -> Option<DateWindow> {
        DateWindow::from_bounds(self.start_date, self.end_date)
    }

    /// Whether a transaction dated `date` falls in this budget's window
    pub fn covers(&self, date: &NaiveDate) -> bool {
        self.window().map_or(false, |w| w.contains(date))
    }

    pub fn is_overspent(&self) -> bool {
        self.remaining < Decimal::ZERO
    }
}

/// Payload for creating a budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudget {
    pub name: String,
    pub category: String,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notifications: Option<NotificationSettings>,
}

impl NewBudget {
    pub fn validate(&self) -> CoreResult<()> {
        validate_not_blank("name", &self.name)?;
        validate_not_blank("category", &self.category)?;
        validate_positive("amount", self.amount)?;
        validate_window(self.start_date, self.end_date)?;
        if let Some(ref notifications) = self.notifications {
            notifications.validate()?;
        }
        Ok(())
    }

    /// Build the stored record with empty totals
    pub fn into_budget(self, user_id: &str) -> Budget {
        let now = Utc::now();
        Budget {
            id: generate_id(),
            user_id: user_id.to_string(),
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            amount: self.amount,
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
            description: self.description,
            spent: Decimal::ZERO,
            remaining: self.amount,
            is_active: true,
            notifications: self.notifications,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a budget; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub notifications: Option<NotificationSettings>,
}

impl BudgetUpdate {
    /// Apply onto `budget`, validating the merged record
    pub fn apply_to(self, budget: &mut Budget) -> CoreResult<()> {
        if let Some(ref name) = self.name {
            validate_not_blank("name", name)?;
        }
        if let Some(ref category) = self.category {
            validate_not_blank("category", category)?;
        }
        if let Some(amount) = self.amount {
            validate_positive("amount", amount)?;
        }
        if let Some(ref notifications) = self.notifications {
            notifications.validate()?;
        }
        if let (Some(start), Some(end)) = (
            self.start_date.or(budget.start_date),
            self.end_date.or(budget.end_date),
        ) {
            validate_window(start, end)?;
        }

        if let Some(name) = self.name {
            budget.name = name.trim().to_string();
        }
        if let Some(category) = self.category {
            budget.category = category.trim().to_string();
        }
        if let Some(amount) = self.amount {
            budget.amount = amount;
            budget.remaining = amount - budget.spent;
        }
        if self.start_date.is_some() {
            budget.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            budget.end_date = self.end_date;
        }
        if self.description.is_some() {
            budget.description = self.description;
        }
        if let Some(is_active) = self.is_active {
            budget.is_active = is_active;
        }
        if self.notifications.is_some() {
            budget.notifications = self.notifications;
        }
        budget.updated_at = Utc::now();
        Ok(())
    }
}

// ==================== Insights ====================

/// Spending comparison carried by trend insights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendData {
    pub previous_amount: Decimal,
    pub current_amount: Decimal,
    /// Length of the comparison period, e.g. "30 days"
    pub period: String,
}

/// Suggested budget change carried by recommendation insights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub suggested_amount: Decimal,
    pub reason: String,
    pub impact: String,
}

/// Per-type payload of an insight, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InsightDetail {
    Warning { action_items: Vec<String> },
    Success,
    Info,
    Trend { trend_data: TrendData },
    Recommendation { recommendation: Recommendation },
    Alert,
}

impl InsightDetail {
    pub fn insight_type(&self) -> InsightType {
        match self {
            InsightDetail::Warning { .. } => InsightType::Warning,
            InsightDetail::Success => InsightType::Success,
            InsightDetail::Info => InsightType::Info,
            InsightDetail::Trend { .. } => InsightType::Trend,
            InsightDetail::Recommendation { .. } => InsightType::Recommendation,
            InsightDetail::Alert => InsightType::Alert,
        }
    }
}

/// Derived observation about a user's spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
    pub percentage: Decimal,
    pub priority: Priority,
    pub tags: Vec<String>,
    /// Ids of the budgets this insight was derived from
    pub related_budgets: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub detail: InsightDetail,
}

impl Insight {
    /// Start an insight for `category`; fill the rest with the `with_*` builders
    pub fn new(user_id: &str, category: &str, detail: InsightDetail) -> Self {
        Self {
            id: generate_id(),
            user_id: user_id.to_string(),
            title: String::new(),
            description: String::new(),
            category: category.to_string(),
            amount: Decimal::ZERO,
            percentage: Decimal::ZERO,
            priority: Priority::default(),
            tags: vec![],
            related_budgets: vec![],
            created_at: Utc::now(),
            detail,
        }
    }

    pub fn with_text(mut self, title: String, description: String) -> Self {
        self.title = title;
        self.description = description;
        self
    }

    pub fn with_figures(mut self, amount: Decimal, percentage: Decimal) -> Self {
        self.amount = amount;
        self.percentage = percentage;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn related_to(mut self, budget_id: &str) -> Self {
        self.related_budgets.push(budget_id.to_string());
        self
    }

    pub fn insight_type(&self) -> InsightType {
        self.detail.insight_type()
    }
}

// ==================== Validation helpers ====================

fn validate_positive(field: &str, value: Decimal) -> CoreResult<()> {
    if value <= Decimal::ZERO {
        return Err(CoreError::validation(format!("{} must be greater than 0", field)));
    }
    Ok(())
}

fn validate_not_blank(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_window(start: NaiveDate, end: NaiveDate) -> CoreResult<()> {
    if end <= start {
        return Err(CoreError::validation("end_date must be after start_date"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_budget() -> NewBudget {
        NewBudget {
            name: "Groceries".to_string(),
            category: "food".to_string(),
            amount: Decimal::from(100),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            description: None,
            notifications: None,
        }
    }

    #[test]
    fn test_new_budget_starts_with_full_remaining() {
        let budget = new_budget().into_budget("user-1");

        assert_eq!(budget.spent, Decimal::ZERO);
        assert_eq!(budget.remaining, Decimal::from(100));
        assert!(budget.is_active);
        assert!(budget.covers(&date(2024, 1, 31)));
        assert!(!budget.covers(&date(2024, 2, 1)));
    }

    #[test]
    fn test_new_budget_validation() {
        assert!(new_budget().validate().is_ok());

        let mut zero = new_budget();
        zero.amount = Decimal::ZERO;
        assert!(matches!(zero.validate(), Err(CoreError::ValidationError { .. })));

        let mut backwards = new_budget();
        backwards.end_date = backwards.start_date;
        assert!(backwards.validate().is_err());

        let mut loud = new_budget();
        loud.notifications = Some(NotificationSettings {
            enabled: true,
            threshold: Some(120),
            frequency: Some(NotificationFrequency::Weekly),
        });
        assert!(loud.validate().is_err());
    }

    #[test]
    fn test_budget_without_dates_covers_nothing() {
        let mut budget = new_budget().into_budget("user-1");
        budget.end_date = None;

        assert!(budget.window().is_none());
        assert!(!budget.covers(&date(2024, 1, 15)));
    }

    #[test]
    fn test_budget_update_recomputes_remaining_on_amount_change() {
        let mut budget = new_budget().into_budget("user-1");
        budget.spent = Decimal::from(40);
        budget.remaining = Decimal::from(60);

        let update = BudgetUpdate {
            amount: Some(Decimal::from(150)),
            ..Default::default()
        };
        update.apply_to(&mut budget).unwrap();

        assert_eq!(budget.amount, Decimal::from(150));
        assert_eq!(budget.remaining, Decimal::from(110));
    }

    #[test]
    fn test_budget_update_rejects_inverted_window() {
        let mut budget = new_budget().into_budget("user-1");
        let update = BudgetUpdate {
            end_date: Some(date(2023, 12, 1)),
            ..Default::default()
        };

        assert!(update.apply_to(&mut budget).is_err());
        assert_eq!(budget.end_date, Some(date(2024, 1, 31)));
    }

    #[test]
    fn test_transaction_update_applies_present_fields() {
        let mut tx = NewTransaction {
            transaction_type: TransactionType::Expense,
            amount: Decimal::from(20),
            category: "food".to_string(),
            description: "lunch".to_string(),
            date: Some(date(2024, 1, 10)),
            payment_type: PaymentType::Cash,
        }
        .into_transaction("user-1");

        TransactionUpdate {
            category: Some(" transport ".to_string()),
            ..Default::default()
        }
        .apply_to(&mut tx);

        assert_eq!(tx.category, "transport");
        assert_eq!(tx.amount, Decimal::from(20));
        assert!(tx.is_expense());
        assert!(tx.is_active);
    }

    #[test]
    fn test_new_transaction_rejects_non_positive_amount() {
        let tx = NewTransaction {
            transaction_type: TransactionType::Income,
            amount: Decimal::from(-5),
            category: "salary".to_string(),
            description: "refund".to_string(),
            date: None,
            payment_type: PaymentType::Online,
        };
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_insight_serializes_type_tag() {
        let insight = Insight::new(
            "user-1",
            "food",
            InsightDetail::Warning {
                action_items: vec!["Review your recent transactions".to_string()],
            },
        )
        .with_priority(Priority::High)
        .related_to("budget-1");

        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["type"], "warning");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["action_items"][0], "Review your recent transactions");
        assert_eq!(json["related_budgets"][0], "budget-1");

        let back: Insight = serde_json::from_value(json).unwrap();
        assert_eq!(back.insight_type(), InsightType::Warning);
    }

    #[test]
    fn test_unit_variant_insight_has_no_payload() {
        let insight = Insight::new("user-1", "food", InsightDetail::Success);
        let json = serde_json::to_value(&insight).unwrap();

        assert_eq!(json["type"], "success");
        assert!(json.get("trend_data").is_none());
        assert!(json.get("recommendation").is_none());
    }
}
