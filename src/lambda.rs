#[cfg(feature = "lambda")]
use aws_config::BehaviorVersion;
#[cfg(feature = "lambda")]
use aws_sdk_sns::Client as SnsClient;
#[cfg(feature = "lambda")]
use freetier_alerts::utils::logger;
#[cfg(feature = "lambda")]
use freetier_alerts::{handle_scheduled_check, CheckResponse, SnsPublisher};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde_json::Value;

/// The scheduled event carries nothing we need; today's date comes from the
/// host clock.
#[cfg(feature = "lambda")]
async fn function_handler(
    event: LambdaEvent<Value>,
    sns_client: &SnsClient,
) -> Result<CheckResponse, Error> {
    tracing::info!(
        request_id = %event.context.request_id,
        "Starting free-tier expiration check"
    );

    // Read on every invocation so configuration changes apply without a cold start
    let response = handle_scheduled_check(
        |key| std::env::var(key).ok(),
        SnsPublisher::new(sns_client.clone()),
        chrono::Utc::now(),
    )
    .await?;

    tracing::info!("Free-tier expiration check finished: {}", response.body);
    Ok(response)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let shared_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let sns_client = SnsClient::new(&shared_config);

    run(service_fn(|event: LambdaEvent<Value>| {
        function_handler(event, &sns_client)
    }))
    .await
}
