use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The reminder that goes out when the free tier is about to end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationNotice {
    pub reference_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub days_remaining: i64,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderDecision {
    Due(ExpirationNotice),
    NotDue {
        expiration_date: NaiveDate,
        days_remaining: i64,
    },
}

impl ReminderDecision {
    pub fn days_remaining(&self) -> i64 {
        match self {
            ReminderDecision::Due(notice) => notice.days_remaining,
            ReminderDecision::NotDue { days_remaining, .. } => *days_remaining,
        }
    }

    pub fn is_due(&self) -> bool {
        matches!(self, ReminderDecision::Due(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub message_id: Option<String>,
}

/// Invocation result returned to the host, shaped like an API Gateway proxy
/// response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl CheckResponse {
    pub fn sent(days_remaining: i64) -> Self {
        Self {
            status_code: 200,
            body: format!("프리티어 종료 {}일 전 알림이 전송되었습니다.", days_remaining),
        }
    }

    pub fn not_due() -> Self {
        Self {
            status_code: 200,
            body: "알림 조건에 해당하지 않습니다.".to_string(),
        }
    }
}
