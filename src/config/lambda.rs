use crate::domain::model::{ExpirationNotice, PublishReceipt};
use crate::domain::ports::Publisher;
use crate::utils::error::{AlertError, Result};
use async_trait::async_trait;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client as SnsClient;

#[derive(Debug, Clone)]
pub struct SnsPublisher {
    client: SnsClient,
}

impl SnsPublisher {
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Publisher for SnsPublisher {
    async fn publish(&self, topic_arn: &str, notice: &ExpirationNotice) -> Result<PublishReceipt> {
        let output = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .subject(&notice.subject)
            .message(&notice.message)
            .send()
            .await
            .map_err(|e| AlertError::DeliveryError {
                message: format!(
                    "Failed to publish to {}: {}",
                    topic_arn,
                    DisplayErrorContext(&e)
                ),
            })?;

        let message_id = output.message_id().map(str::to_string);
        tracing::info!(
            "📨 Published reminder to {} (message id: {})",
            topic_arn,
            message_id.as_deref().unwrap_or("unknown")
        );

        Ok(PublishReceipt { message_id })
    }
}
