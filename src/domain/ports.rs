use crate::domain::model::{ExpirationNotice, PublishReceipt};
use crate::utils::error::Result;
use async_trait::async_trait;

/// A destination that can deliver an [`ExpirationNotice`].
///
/// Implementations make a single attempt. A failed publish surfaces as
/// `AlertError::DeliveryError` and is not retried.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic_arn: &str, notice: &ExpirationNotice) -> Result<PublishReceipt>;
}

#[async_trait]
impl<P: Publisher + ?Sized> Publisher for Box<P> {
    async fn publish(&self, topic_arn: &str, notice: &ExpirationNotice) -> Result<PublishReceipt> {
        (**self).publish(topic_arn, notice).await
    }
}
