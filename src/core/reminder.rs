use crate::config::reminder::ReminderConfig;
use crate::core::expiration;
use crate::domain::model::{CheckResponse, ReminderDecision};
use crate::domain::ports::Publisher;
use crate::utils::error::Result;
use chrono::{DateTime, NaiveDate, Utc};

/// Runs one expiration check: decide, then publish at most one reminder.
pub struct ReminderEngine<P: Publisher> {
    publisher: P,
    config: ReminderConfig,
}

impl<P: Publisher> ReminderEngine<P> {
    pub fn new(publisher: P, config: ReminderConfig) -> Self {
        Self { publisher, config }
    }

    pub fn evaluate(&self, today: NaiveDate) -> Result<ReminderDecision> {
        expiration::evaluate(self.config.reference_date, today, &self.config.reminder_days)
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<CheckResponse> {
        self.run(self.config.today(now)).await
    }

    pub async fn run(&self, today: NaiveDate) -> Result<CheckResponse> {
        let decision = self.evaluate(today)?;

        match decision {
            ReminderDecision::Due(notice) => {
                tracing::info!(
                    "⏰ Free tier ends on {} ({} days left), sending reminder",
                    notice.expiration_date,
                    notice.days_remaining
                );

                let receipt = self
                    .publisher
                    .publish(&self.config.topic_arn, &notice)
                    .await
                    .inspect_err(|e| tracing::error!("❌ Reminder delivery failed: {}", e))?;
                tracing::debug!("Publish receipt: {:?}", receipt);

                Ok(CheckResponse::sent(notice.days_remaining))
            }
            ReminderDecision::NotDue {
                expiration_date,
                days_remaining,
            } => {
                tracing::info!(
                    "Free tier ends on {} ({} days left), no reminder due",
                    expiration_date,
                    days_remaining
                );
                Ok(CheckResponse::not_due())
            }
        }
    }
}

/// One scheduled invocation: resolve the configuration through `lookup`, then
/// check the date at `now`. Configuration errors stop the run before anything
/// is published.
pub async fn handle_scheduled_check<P, F>(
    lookup: F,
    publisher: P,
    now: DateTime<Utc>,
) -> Result<CheckResponse>
where
    P: Publisher,
    F: Fn(&str) -> Option<String>,
{
    let config = ReminderConfig::from_lookup(lookup).inspect_err(|e| {
        tracing::error!("❌ Configuration error: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    })?;

    ReminderEngine::new(publisher, config).run_at(now).await
}
