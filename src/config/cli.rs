use crate::domain::model::{ExpirationNotice, PublishReceipt};
use crate::domain::ports::Publisher;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Prints reminders to stdout instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct ConsolePublisher;

impl ConsolePublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Publisher for ConsolePublisher {
    async fn publish(&self, topic_arn: &str, notice: &ExpirationNotice) -> Result<PublishReceipt> {
        tracing::debug!("Printing reminder instead of publishing to {}", topic_arn);

        println!("To: {}", topic_arn);
        println!("Subject: {}", notice.subject);
        println!("{}", notice.message);

        Ok(PublishReceipt { message_id: None })
    }
}
