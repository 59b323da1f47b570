//! Free-tier expiration arithmetic.
//!
//! The free tier lasts one calendar year from account creation. A reminder is
//! due when the number of whole days left until that anniversary is one of the
//! configured reminder days.

use crate::domain::model::{ExpirationNotice, ReminderDecision};
use crate::utils::error::{AlertError, Result};
use crate::utils::validation::DATE_FORMAT;
use chrono::{Months, NaiveDate};

pub const DEFAULT_REMINDER_DAYS: [i64; 3] = [30, 7, 1];

/// Reference date plus one year, same month and day.
///
/// A Feb 29 reference date expires on Feb 28 of the following year.
pub fn expiration_date(reference: NaiveDate) -> Result<NaiveDate> {
    reference
        .checked_add_months(Months::new(12))
        .ok_or_else(|| AlertError::InvalidConfigValueError {
            field: "reference_date".to_string(),
            value: reference.format(DATE_FORMAT).to_string(),
            reason: "Expiration date is out of the supported calendar range".to_string(),
        })
}

/// Whole calendar days from `today` until `expiration`; negative once expired.
pub fn days_remaining(expiration: NaiveDate, today: NaiveDate) -> i64 {
    expiration.signed_duration_since(today).num_days()
}

pub fn evaluate(
    reference: NaiveDate,
    today: NaiveDate,
    reminder_days: &[i64],
) -> Result<ReminderDecision> {
    let expiration = expiration_date(reference)?;
    let days = days_remaining(expiration, today);

    if reminder_days.contains(&days) {
        Ok(ReminderDecision::Due(render_notice(reference, expiration, days)))
    } else {
        Ok(ReminderDecision::NotDue {
            expiration_date: expiration,
            days_remaining: days,
        })
    }
}

pub fn render_notice(
    reference: NaiveDate,
    expiration: NaiveDate,
    days_remaining: i64,
) -> ExpirationNotice {
    let subject = format!("[중요] AWS 프리티어 종료 {}일 전 알림", days_remaining);
    let message = format!(
        "
AWS 프리티어 종료 알림

계정 생성일: {}
프리티어 종료일: {}
남은 일수: {}일

프리티어 기간이 종료되면 사용 중인 AWS 서비스에 대해 일반 요금이 부과됩니다.
필요하지 않은 리소스는 삭제하거나 중지하는 것을 권장합니다.
",
        reference.format(DATE_FORMAT),
        expiration.format(DATE_FORMAT),
        days_remaining
    );

    ExpirationNotice {
        reference_date: reference,
        expiration_date: expiration,
        days_remaining,
        subject,
        message,
    }
}
