use crate::utils::error::{AlertError, Result};
use chrono::NaiveDate;
use regex::Regex;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| AlertError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AlertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AlertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Parses a strict `YYYY-MM-DD` calendar date. Dates that do not exist on the
/// calendar (`2023-02-29`) are rejected here rather than later.
pub fn parse_date(field_name: &str, value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.len() != 10 {
        return Err(AlertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a date in YYYY-MM-DD format".to_string(),
        });
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|e| {
        AlertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Invalid date: {}", e),
        }
    })
}

pub fn validate_email(field_name: &str, email: &str) -> Result<()> {
    validate_non_empty_string(field_name, email)?;

    let re = Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").map_err(|e| {
        AlertError::ConfigError {
            message: format!("Invalid email pattern: {}", e),
        }
    })?;

    if !re.is_match(email) {
        return Err(AlertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: email.to_string(),
            reason: "Not a valid email address".to_string(),
        });
    }
    Ok(())
}

/// Accepts `arn:<partition>:sns:<region>:<account>:<topic>`.
pub fn validate_sns_topic_arn(field_name: &str, arn: &str) -> Result<()> {
    validate_non_empty_string(field_name, arn)?;

    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    let valid = parts.len() == 6
        && parts[0] == "arn"
        && !parts[1].is_empty()
        && parts[2] == "sns"
        && !parts[3].is_empty()
        && !parts[4].is_empty()
        && !parts[5].is_empty();

    if !valid {
        return Err(AlertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: arn.to_string(),
            reason: "Expected an SNS topic ARN (arn:aws:sns:<region>:<account>:<name>)"
                .to_string(),
        });
    }
    Ok(())
}

/// CloudFormation physical names for topics, functions and rules share the
/// same safe alphabet.
pub fn validate_resource_name(field_name: &str, name: &str, max_len: usize) -> Result<()> {
    validate_non_empty_string(field_name, name)?;

    if name.len() > max_len {
        return Err(AlertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: format!("Name must be at most {} characters", max_len),
        });
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AlertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Name can only contain letters, numbers, hyphens, and underscores".to_string(),
        });
    }
    Ok(())
}
