use crate::config::reminder::{parse_utc_offset, ENV_REMINDER_UTC_OFFSET};
use crate::core::expiration::DEFAULT_REMINDER_DAYS;
use crate::utils::error::{AlertError, Result};
use crate::utils::validation::{
    parse_date, validate_email, validate_non_empty_string, validate_range,
    validate_resource_name, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Deployment-time description of the alerts stack.
///
/// Every section is optional in TOML; omitted values fall back to the
/// defaults below, which describe the standard free-tier setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StackConfig {
    pub stack: StackInfo,
    pub account: AccountConfig,
    pub function: FunctionConfig,
    pub schedule: ScheduleConfig,
    pub topics: TopicConfig,
    pub budgets: BudgetsConfig,
    pub policies: PolicyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackInfo {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// `YYYY-MM-DD`
    pub creation_date: String,
    pub email: String,
    /// IAM user name or user ARN; the policies are attached only when set.
    pub existing_user: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionConfig {
    pub name: String,
    pub code_bucket: String,
    pub code_key: String,
    pub runtime: String,
    pub handler: String,
    pub architecture: String,
    pub timeout_seconds: u32,
    pub memory_mb: u32,
    pub reminder_days: Vec<i64>,
    pub utc_offset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub rule_name: String,
    pub description: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub expiration: String,
    pub budget: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetsConfig {
    pub unit: String,
    pub time_unit: String,
    #[serde(rename = "budget")]
    pub entries: Vec<BudgetEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub logical_id: String,
    pub amount: f64,
    /// Cost Explorer service name; `None` budgets the whole account.
    pub service: Option<String>,
    /// Percentages of the limit that trigger a notification.
    pub thresholds: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub freetier_admin_name: String,
    pub mfa_name: String,
    /// JSON policy document replacing the built-in MFA policy.
    pub mfa_policy_file: Option<String>,
}

impl Default for StackInfo {
    fn default() -> Self {
        Self {
            name: "FreeTierAlertsStack".to_string(),
            description: "AWS free-tier expiration reminders, budget alerts and guard policies"
                .to_string(),
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            creation_date: "2024-04-25".to_string(),
            email: "your-email@example.com".to_string(),
            existing_user: String::new(),
        }
    }
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            name: "freetier-expiration-check".to_string(),
            code_bucket: "freetier-alerts-artifacts".to_string(),
            code_key: "lambda/freetier-expiration-check.zip".to_string(),
            runtime: "provided.al2023".to_string(),
            handler: "bootstrap".to_string(),
            architecture: "arm64".to_string(),
            timeout_seconds: 10,
            memory_mb: 128,
            reminder_days: DEFAULT_REMINDER_DAYS.to_vec(),
            utc_offset: None,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            rule_name: "freetier-expiration-reminder".to_string(),
            description: "프리티어 종료 알림을 위한 CloudWatch 이벤트 규칙".to_string(),
            expression: "cron(0 9 * * ? *)".to_string(),
        }
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            expiration: "freetier-expiration-alert".to_string(),
            budget: "budget-alert".to_string(),
        }
    }
}

impl Default for BudgetsConfig {
    fn default() -> Self {
        Self {
            unit: "USD".to_string(),
            time_unit: "MONTHLY".to_string(),
            entries: vec![
                BudgetEntry {
                    logical_id: "FreeTierMonthlyBudget".to_string(),
                    amount: 10.0,
                    service: None,
                    thresholds: vec![80.0, 100.0],
                },
                BudgetEntry {
                    logical_id: "EC2MonthlyBudget".to_string(),
                    amount: 1.0,
                    service: Some("Amazon Elastic Compute Cloud - Compute".to_string()),
                    thresholds: vec![80.0],
                },
                BudgetEntry {
                    logical_id: "S3MonthlyBudget".to_string(),
                    amount: 0.5,
                    service: Some("Amazon Simple Storage Service".to_string()),
                    thresholds: vec![80.0],
                },
                BudgetEntry {
                    logical_id: "RDSMonthlyBudget".to_string(),
                    amount: 1.0,
                    service: Some("Amazon Relational Database Service".to_string()),
                    thresholds: vec![80.0],
                },
            ],
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            freetier_admin_name: "FreeTierAdminPolicy".to_string(),
            mfa_name: "MFAOnlyPolicy".to_string(),
            mfa_policy_file: None,
        }
    }
}

impl StackConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        let config: StackConfig = toml::from_str(&processed_content)?;
        Ok(config)
    }

    /// Replaces `${VAR}` with the environment value. An unset variable is a
    /// missing config field, so no placeholder reaches the template.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AlertError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        if let Some(unset) = re
            .captures_iter(content)
            .map(|caps| caps[1].to_string())
            .find(|var_name| std::env::var(var_name).is_err())
        {
            return Err(AlertError::MissingConfigError { field: unset });
        }

        let result = re.replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        Ok(result.to_string())
    }

    /// The IAM user name the guard policies attach to. ARNs are reduced to
    /// the segment after the last `/`.
    pub fn existing_user_name(&self) -> Option<&str> {
        let value = self.account.existing_user.trim();
        if value.is_empty() {
            return None;
        }
        value.rsplit('/').next().filter(|name| !name.is_empty())
    }
}

impl Validate for StackConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("stack.name", &self.stack.name)?;

        parse_date("account.creation_date", &self.account.creation_date)?;
        validate_email("account.email", &self.account.email)?;

        validate_resource_name("function.name", &self.function.name, 64)?;
        validate_non_empty_string("function.code_bucket", &self.function.code_bucket)?;
        validate_non_empty_string("function.code_key", &self.function.code_key)?;
        validate_non_empty_string("function.runtime", &self.function.runtime)?;
        validate_non_empty_string("function.handler", &self.function.handler)?;
        if !matches!(self.function.architecture.as_str(), "arm64" | "x86_64") {
            return Err(AlertError::InvalidConfigValueError {
                field: "function.architecture".to_string(),
                value: self.function.architecture.clone(),
                reason: "Architecture must be arm64 or x86_64".to_string(),
            });
        }
        validate_range("function.timeout_seconds", self.function.timeout_seconds, 1, 900)?;
        validate_range("function.memory_mb", self.function.memory_mb, 128, 10240)?;
        if self.function.reminder_days.is_empty() {
            return Err(AlertError::MissingConfigError {
                field: "function.reminder_days".to_string(),
            });
        }
        for day in &self.function.reminder_days {
            validate_range("function.reminder_days", *day, 1, 365)?;
        }
        if let Some(offset) = &self.function.utc_offset {
            parse_utc_offset(ENV_REMINDER_UTC_OFFSET, offset)?;
        }

        validate_resource_name("schedule.rule_name", &self.schedule.rule_name, 64)?;
        let expression = self.schedule.expression.trim();
        if !(expression.starts_with("cron(") || expression.starts_with("rate("))
            || !expression.ends_with(')')
        {
            return Err(AlertError::InvalidConfigValueError {
                field: "schedule.expression".to_string(),
                value: self.schedule.expression.clone(),
                reason: "Expected cron(...) or rate(...)".to_string(),
            });
        }

        validate_resource_name("topics.expiration", &self.topics.expiration, 256)?;
        validate_resource_name("topics.budget", &self.topics.budget, 256)?;
        if self.topics.expiration == self.topics.budget {
            return Err(AlertError::InvalidConfigValueError {
                field: "topics.budget".to_string(),
                value: self.topics.budget.clone(),
                reason: "Budget and expiration topics must be distinct".to_string(),
            });
        }

        validate_non_empty_string("budgets.unit", &self.budgets.unit)?;
        if !matches!(
            self.budgets.time_unit.as_str(),
            "DAILY" | "MONTHLY" | "QUARTERLY" | "ANNUALLY"
        ) {
            return Err(AlertError::InvalidConfigValueError {
                field: "budgets.time_unit".to_string(),
                value: self.budgets.time_unit.clone(),
                reason: "Time unit must be DAILY, MONTHLY, QUARTERLY or ANNUALLY".to_string(),
            });
        }
        for entry in &self.budgets.entries {
            validate_resource_name("budgets.budget.logical_id", &entry.logical_id, 255)?;
            if entry.amount.is_nan() || entry.amount <= 0.0 {
                return Err(AlertError::InvalidConfigValueError {
                    field: format!("budgets.{}.amount", entry.logical_id),
                    value: entry.amount.to_string(),
                    reason: "Budget amount must be positive".to_string(),
                });
            }
            if entry.thresholds.is_empty() {
                return Err(AlertError::MissingConfigError {
                    field: format!("budgets.{}.thresholds", entry.logical_id),
                });
            }
            for threshold in &entry.thresholds {
                validate_range(
                    &format!("budgets.{}.thresholds", entry.logical_id),
                    *threshold,
                    0.01,
                    1000.0,
                )?;
            }
        }

        validate_resource_name("policies.freetier_admin_name", &self.policies.freetier_admin_name, 128)?;
        validate_resource_name("policies.mfa_name", &self.policies.mfa_name, 128)?;

        tracing::info!("✅ Stack configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = StackConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.budgets.entries.len(), 4);
        assert_eq!(config.function.timeout_seconds, 10);
        assert_eq!(config.schedule.expression, "cron(0 9 * * ? *)");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = StackConfig::from_toml_str(
            r#"
[account]
creation_date = "2025-01-15"
email = "billing@example.com"
existing_user = "arn:aws:iam::123456789012:user/dev/alice"

[function]
timeout_seconds = 15
"#,
        )
        .unwrap();

        assert_eq!(config.account.creation_date, "2025-01-15");
        assert_eq!(config.function.timeout_seconds, 15);
        assert_eq!(config.function.name, "freetier-expiration-check");
        assert_eq!(config.topics.budget, "budget-alert");
        assert_eq!(config.existing_user_name(), Some("alice"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_budget_entries_replace_defaults() {
        let config = StackConfig::from_toml_str(
            r#"
[[budgets.budget]]
logical_id = "LambdaMonthlyBudget"
amount = 2.5
service = "AWS Lambda"
thresholds = [50.0, 90.0]
"#,
        )
        .unwrap();

        assert_eq!(config.budgets.entries.len(), 1);
        assert_eq!(config.budgets.unit, "USD");
        assert_eq!(config.budgets.entries[0].thresholds, vec![50.0, 90.0]);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("FREETIER_ALERTS_TEST_EMAIL", "subst@example.com");
        let config = StackConfig::from_toml_str(
            r#"
[account]
email = "${FREETIER_ALERTS_TEST_EMAIL}"
"#,
        )
        .unwrap();
        assert_eq!(config.account.email, "subst@example.com");

        let err = StackConfig::from_toml_str(
            r#"
[account]
email = "${FREETIER_ALERTS_UNSET_VARIABLE}"
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AlertError::MissingConfigError { field } if field == "FREETIER_ALERTS_UNSET_VARIABLE"
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = StackConfig::default();
        config.account.creation_date = "2023-02-29".to_string();
        assert!(config.validate().is_err());

        let mut config = StackConfig::default();
        config.budgets.entries[0].amount = 0.0;
        assert!(config.validate().is_err());

        let mut config = StackConfig::default();
        config.schedule.expression = "every day".to_string();
        assert!(config.validate().is_err());

        let mut config = StackConfig::default();
        config.topics.budget = config.topics.expiration.clone();
        assert!(config.validate().is_err());

        let mut config = StackConfig::default();
        config.function.utc_offset = Some("KST".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_existing_user_name() {
        let mut config = StackConfig::default();
        assert_eq!(config.existing_user_name(), None);

        config.account.existing_user = "alice".to_string();
        assert_eq!(config.existing_user_name(), Some("alice"));

        config.account.existing_user = "arn:aws:iam::123456789012:user/".to_string();
        assert_eq!(config.existing_user_name(), None);
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        let err = StackConfig::from_toml_str("[account\nemail = 1").unwrap_err();
        assert!(matches!(err, AlertError::TomlError(_)));
    }
}
