//! Enumerations shared by the ledger records

use serde::{Deserialize, Serialize};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
        }
    }
}

/// How a transaction was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Online,
    Cash,
}

impl Default for PaymentType {
    fn default() -> Self {
        PaymentType::Online
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(PaymentType::Online),
            "cash" => Ok(PaymentType::Cash),
            _ => Err(format!("Invalid payment type: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentType::Online => write!(f, "online"),
            PaymentType::Cash => write!(f, "cash"),
        }
    }
}

/// Insight kind, as stored in the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    /// Budget nearly or fully used
    Warning,
    /// Budget comfortably under its cap
    Success,
    Info,
    /// Spending compared with the previous period
    Trend,
    /// Suggested budget adjustment
    Recommendation,
    Alert,
}

impl InsightType {
    /// All insight types, in declaration order
    pub const ALL: [InsightType; 6] = [
        InsightType::Warning,
        InsightType::Success,
        InsightType::Info,
        InsightType::Trend,
        InsightType::Recommendation,
        InsightType::Alert,
    ];
}

impl std::str::FromStr for InsightType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warning" => Ok(InsightType::Warning),
            "success" => Ok(InsightType::Success),
            "info" => Ok(InsightType::Info),
            "trend" => Ok(InsightType::Trend),
            "recommendation" => Ok(InsightType::Recommendation),
            "alert" => Ok(InsightType::Alert),
            _ => Err(format!("Invalid insight type: {}", s)),
        }
    }
}

impl std::fmt::Display for InsightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightType::Warning => write!(f, "warning"),
            InsightType::Success => write!(f, "success"),
            InsightType::Info => write!(f, "info"),
            InsightType::Trend => write!(f, "trend"),
            InsightType::Recommendation => write!(f, "recommendation"),
            InsightType::Alert => write!(f, "alert"),
        }
    }
}

/// Insight priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl std::str::FromStr for Priority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("Invalid priority level: {}", s)),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Reminder cadence stored with a budget's notification settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for NotificationFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationFrequency::Daily => write!(f, "daily"),
            NotificationFrequency::Weekly => write!(f, "weekly"),
            NotificationFrequency::Monthly => write!(f, "monthly"),
        }
    }
}
