//! Configuration management for budgetweb
//!
//! This module handles loading, validation, and management of
//! budgetweb configuration from YAML files.

pub mod error;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// How the insight rules decide that an insight already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupMode {
    /// Warnings check stored insights, the other rules only the current run
    Mixed,
    /// Every rule checks stored insights and the current run
    Persisted,
}

impl Default for DedupMode {
    fn default() -> Self {
        DedupMode::Mixed
    }
}

impl std::str::FromStr for DedupMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mixed" => Ok(DedupMode::Mixed),
            "persisted" => Ok(DedupMode::Persisted),
            _ => Err(format!("Invalid dedup mode: {}", s)),
        }
    }
}

impl std::fmt::Display for DedupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DedupMode::Mixed => write!(f, "mixed"),
            DedupMode::Persisted => write!(f, "persisted"),
        }
    }
}

/// Insight rule thresholds. Percentages are on a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Budget usage above which a warning is raised
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: Decimal,
    /// Budget usage above which a warning is high priority
    #[serde(default = "default_high_priority_threshold")]
    pub high_priority_threshold: Decimal,
    /// Budget usage below which a success insight is raised
    #[serde(default = "default_success_threshold")]
    pub success_threshold: Decimal,
    /// Length of the comparison period before a budget starts
    #[serde(default = "default_trend_window_days")]
    pub trend_window_days: u32,
    /// Spending increase above which a budget adjustment is recommended
    #[serde(default = "default_recommendation_threshold")]
    pub recommendation_threshold: Decimal,
    /// Multiplier applied to the budget amount for the suggested amount
    #[serde(default = "default_recommendation_factor")]
    pub recommendation_factor: Decimal,
    #[serde(default)]
    pub dedup: DedupMode,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            warning_threshold: default_warning_threshold(),
            high_priority_threshold: default_high_priority_threshold(),
            success_threshold: default_success_threshold(),
            trend_window_days: default_trend_window_days(),
            recommendation_threshold: default_recommendation_threshold(),
            recommendation_factor: default_recommendation_factor(),
            dedup: DedupMode::default(),
        }
    }
}

fn default_warning_threshold() -> Decimal {
    Decimal::from(80)
}

fn default_high_priority_threshold() -> Decimal {
    Decimal::from(90)
}

fn default_success_threshold() -> Decimal {
    Decimal::from(70)
}

fn default_trend_window_days() -> u32 {
    30
}

fn default_recommendation_threshold() -> Decimal {
    Decimal::from(20)
}

fn default_recommendation_factor() -> Decimal {
    Decimal::new(12, 1)
}

/// Insight retention settings used by the cleanup endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Age in days used when a cleanup request names none
    #[serde(default = "default_retention_days")]
    pub default_days: u32,
    /// Largest age in days a cleanup request may name
    #[serde(default = "default_max_retention_days")]
    pub max_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            default_days: default_retention_days(),
            max_days: default_max_retention_days(),
        }
    }
}

fn default_retention_days() -> u32 {
    30
}

fn default_max_retention_days() -> u32 {
    90
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Insight rule settings
    #[serde(default)]
    pub insights: InsightsConfig,
    /// Insight retention settings
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_string_lossy().to_string(),
                }
            } else {
                ConfigError::IoError {
                    path: path.to_string_lossy().to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        let insights = &self.insights;
        let hundred = Decimal::from(100);
        if insights.success_threshold <= Decimal::ZERO || insights.success_threshold > hundred {
            return Err(ConfigError::InvalidValue {
                field: "insights.success_threshold".to_string(),
                reason: "Success threshold must be in (0, 100]".to_string(),
            });
        }
        if insights.warning_threshold < insights.success_threshold {
            return Err(ConfigError::InvalidValue {
                field: "insights.warning_threshold".to_string(),
                reason: "Warning threshold must not be below the success threshold".to_string(),
            });
        }
        if insights.high_priority_threshold < insights.warning_threshold {
            return Err(ConfigError::InvalidValue {
                field: "insights.high_priority_threshold".to_string(),
                reason: "High priority threshold must not be below the warning threshold"
                    .to_string(),
            });
        }
        if insights.trend_window_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "insights.trend_window_days".to_string(),
                reason: "Trend window must be at least one day".to_string(),
            });
        }
        if insights.recommendation_factor <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "insights.recommendation_factor".to_string(),
                reason: "Recommendation factor must be positive".to_string(),
            });
        }

        if self.retention.max_days == 0 || self.retention.max_days > 90 {
            return Err(ConfigError::InvalidValue {
                field: "retention.max_days".to_string(),
                reason: "Maximum retention must be between 1 and 90 days".to_string(),
            });
        }
        if self.retention.default_days == 0
            || self.retention.default_days > self.retention.max_days
        {
            return Err(ConfigError::InvalidValue {
                field: "retention.default_days".to_string(),
                reason: "Default retention must be between 1 and retention.max_days".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.insights.warning_threshold, Decimal::from(80));
        assert_eq!(config.insights.recommendation_factor, Decimal::new(12, 1));
        assert_eq!(config.insights.dedup, DedupMode::Mixed);
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.server.port, defaults.server.port);
        assert_eq!(config.insights.success_threshold, defaults.insights.success_threshold);
        assert_eq!(config.retention.default_days, defaults.retention.default_days);
        assert_eq!(config.logging.level, defaults.logging.level);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
server:
  port: 8080
insights:
  dedup: persisted
  warning_threshold: 75
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.insights.dedup, DedupMode::Persisted);
        assert_eq!(config.insights.warning_threshold, Decimal::from(75));
        assert_eq!(config.insights.high_priority_threshold, Decimal::from(90));
    }

    #[test]
    fn test_zero_port_rejected() {
        let err = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "server.port"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_threshold_order_enforced() {
        let yaml = "insights:\n  warning_threshold: 60\n  success_threshold: 70\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "insights.warning_threshold"
        ));
    }

    #[test]
    fn test_retention_bounds() {
        let err = Config::from_yaml("retention:\n  max_days: 120\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = Config::from_yaml("retention:\n  default_days: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(PathBuf::from("/nonexistent/budgetweb.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_dedup_mode_parse() {
        assert_eq!("Mixed".parse::<DedupMode>().unwrap(), DedupMode::Mixed);
        assert_eq!("persisted".parse::<DedupMode>().unwrap(), DedupMode::Persisted);
        assert!("always".parse::<DedupMode>().is_err());
        assert_eq!(DedupMode::Persisted.to_string(), "persisted");
    }

    #[test]
    fn test_bind_address() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }
}
