use crate::core::expiration::DEFAULT_REMINDER_DAYS;
use crate::utils::error::{AlertError, Result};
use crate::utils::validation::{
    parse_date, validate_non_empty_string, validate_range, validate_required_field,
    validate_sns_topic_arn, Validate,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use std::env;

pub const ENV_ACCOUNT_CREATION_DATE: &str = "ACCOUNT_CREATION_DATE";
pub const ENV_SNS_TOPIC_ARN: &str = "SNS_TOPIC_ARN";
pub const ENV_REMINDER_DAYS: &str = "REMINDER_DAYS";
pub const ENV_REMINDER_UTC_OFFSET: &str = "REMINDER_UTC_OFFSET";

/// Everything one expiration check needs, resolved and validated up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
    pub reference_date: NaiveDate,
    pub topic_arn: String,
    pub reminder_days: Vec<i64>,
    pub utc_offset: FixedOffset,
}

impl ReminderConfig {
    pub fn new(reference_date: NaiveDate, topic_arn: impl Into<String>) -> Self {
        Self {
            reference_date,
            topic_arn: topic_arn.into(),
            reminder_days: DEFAULT_REMINDER_DAYS.to_vec(),
            utc_offset: utc(),
        }
    }

    pub fn with_reminder_days(mut self, reminder_days: Vec<i64>) -> Self {
        self.reminder_days = reminder_days;
        self
    }

    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source and validates it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_date = lookup(ENV_ACCOUNT_CREATION_DATE);
        let raw_date = validate_required_field(ENV_ACCOUNT_CREATION_DATE, &raw_date)?;
        let reference_date = parse_date(ENV_ACCOUNT_CREATION_DATE, raw_date)?;

        let topic_arn = lookup(ENV_SNS_TOPIC_ARN);
        let topic_arn = validate_required_field(ENV_SNS_TOPIC_ARN, &topic_arn)?
            .trim()
            .to_string();

        let reminder_days = match lookup(ENV_REMINDER_DAYS) {
            Some(raw) if !raw.trim().is_empty() => parse_reminder_days(ENV_REMINDER_DAYS, &raw)?,
            _ => DEFAULT_REMINDER_DAYS.to_vec(),
        };

        let utc_offset = match lookup(ENV_REMINDER_UTC_OFFSET) {
            Some(raw) => parse_utc_offset(ENV_REMINDER_UTC_OFFSET, &raw)?,
            None => utc(),
        };

        let config = Self {
            reference_date,
            topic_arn,
            reminder_days,
            utc_offset,
        };
        config.validate()?;
        Ok(config)
    }

    /// The calendar date at `now` in the configured offset.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.utc_offset).date_naive()
    }
}

impl Validate for ReminderConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string(ENV_SNS_TOPIC_ARN, &self.topic_arn)?;
        validate_sns_topic_arn(ENV_SNS_TOPIC_ARN, &self.topic_arn)?;

        if self.reminder_days.is_empty() {
            return Err(AlertError::InvalidConfigValueError {
                field: ENV_REMINDER_DAYS.to_string(),
                value: String::new(),
                reason: "At least one reminder day is required".to_string(),
            });
        }
        for day in &self.reminder_days {
            validate_range(ENV_REMINDER_DAYS, *day, 1, 365)?;
        }

        tracing::debug!("✅ Reminder configuration validation passed");
        Ok(())
    }
}

/// Parses `30,7,1` style lists. Duplicates are dropped, order is kept.
pub fn parse_reminder_days(field_name: &str, raw: &str) -> Result<Vec<i64>> {
    let mut days = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day: i64 = part
            .parse()
            .map_err(|_| AlertError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: raw.to_string(),
                reason: format!("'{}' is not a whole number of days", part),
            })?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

/// Accepts `+09:00`, `-05:30`, or `UTC`/`Z` for zero.
pub fn parse_utc_offset(field_name: &str, raw: &str) -> Result<FixedOffset> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
        return Ok(utc());
    }

    trimmed
        .parse::<FixedOffset>()
        .map_err(|e| AlertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: raw.to_string(),
            reason: format!("Expected an offset like +09:00: {}", e),
        })
}

fn utc() -> FixedOffset {
    Utc.fix()
}
