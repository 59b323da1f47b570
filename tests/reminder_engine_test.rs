use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use freetier_alerts::config::reminder::parse_utc_offset;
use freetier_alerts::{
    handle_scheduled_check, AlertError, CheckResponse, ExpirationNotice, PublishReceipt,
    Publisher, ReminderConfig, ReminderEngine, Result,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

const TOPIC: &str = "arn:aws:sns:ap-northeast-2:123456789012:freetier-expiration-alert";

#[derive(Clone, Default)]
struct RecordingPublisher {
    sent: Arc<Mutex<Vec<(String, ExpirationNotice)>>>,
}

impl RecordingPublisher {
    async fn sent(&self) -> Vec<(String, ExpirationNotice)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic_arn: &str, notice: &ExpirationNotice) -> Result<PublishReceipt> {
        let mut sent = self.sent.lock().await;
        sent.push((topic_arn.to_string(), notice.clone()));
        Ok(PublishReceipt {
            message_id: Some(format!("msg-{}", sent.len())),
        })
    }
}

struct FailingPublisher;

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, _topic_arn: &str, _notice: &ExpirationNotice) -> Result<PublishReceipt> {
        Err(AlertError::DeliveryError {
            message: "AuthorizationError: not allowed to publish".to_string(),
        })
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn engine(publisher: RecordingPublisher) -> ReminderEngine<RecordingPublisher> {
    ReminderEngine::new(publisher, ReminderConfig::new(date(2024, 4, 25), TOPIC))
}

#[tokio::test]
async fn test_thirty_days_before_sends_one_reminder() {
    let publisher = RecordingPublisher::default();
    let engine = engine(publisher.clone());

    let response = engine.run(date(2025, 3, 26)).await.unwrap();

    assert_eq!(response, CheckResponse::sent(30));
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "프리티어 종료 30일 전 알림이 전송되었습니다.");

    let sent = publisher.sent().await;
    assert_eq!(sent.len(), 1);
    let (topic, notice) = &sent[0];
    assert_eq!(topic, TOPIC);
    assert!(notice.subject.contains("30일 전"));
    assert!(notice.message.contains("계정 생성일: 2024-04-25"));
    assert!(notice.message.contains("프리티어 종료일: 2025-04-25"));
    assert!(notice.message.contains("남은 일수: 30일"));
}

#[tokio::test]
async fn test_seven_and_one_day_before_send_reminders() {
    for (today, days) in [(date(2025, 4, 18), 7), (date(2025, 4, 24), 1)] {
        let publisher = RecordingPublisher::default();
        let response = engine(publisher.clone()).run(today).await.unwrap();

        assert_eq!(response, CheckResponse::sent(days));
        let sent = publisher.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].1.subject,
            format!("[중요] AWS 프리티어 종료 {}일 전 알림", days)
        );
    }
}

#[tokio::test]
async fn test_other_days_send_nothing() {
    // 5 days left, expiration day itself, one day after
    for today in [date(2025, 4, 20), date(2025, 4, 25), date(2025, 4, 26)] {
        let publisher = RecordingPublisher::default();
        let response = engine(publisher.clone()).run(today).await.unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "알림 조건에 해당하지 않습니다.");
        assert!(publisher.sent().await.is_empty());
    }
}

#[tokio::test]
async fn test_repeated_runs_produce_identical_content() {
    let publisher = RecordingPublisher::default();
    let engine = engine(publisher.clone());

    let first = engine.run(date(2025, 4, 18)).await.unwrap();
    let second = engine.run(date(2025, 4, 18)).await.unwrap();

    assert_eq!(first, second);
    let sent = publisher.sent().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
}

#[tokio::test]
async fn test_delivery_failure_propagates() {
    let engine = ReminderEngine::new(
        FailingPublisher,
        ReminderConfig::new(date(2024, 4, 25), TOPIC),
    );

    let err = engine.run(date(2025, 4, 24)).await.unwrap_err();
    assert!(matches!(err, AlertError::DeliveryError { .. }));

    // Not due: the publisher is never touched
    let response = engine.run(date(2025, 4, 20)).await.unwrap();
    assert_eq!(response, CheckResponse::not_due());
}

#[tokio::test]
async fn test_non_leap_reference_date() {
    let publisher = RecordingPublisher::default();
    let engine = ReminderEngine::new(
        publisher.clone(),
        ReminderConfig::new(date(2023, 2, 28), TOPIC),
    );

    let decision = engine.evaluate(date(2024, 2, 21)).unwrap();
    assert!(decision.is_due());
    assert_eq!(decision.days_remaining(), 7);

    engine.run(date(2024, 2, 27)).await.unwrap();
    let sent = publisher.sent().await;
    assert_eq!(sent[0].1.expiration_date, date(2024, 2, 28));
}

#[tokio::test]
async fn test_leap_day_reference_expires_feb_28() {
    let publisher = RecordingPublisher::default();
    let engine = ReminderEngine::new(
        publisher.clone(),
        ReminderConfig::new(date(2024, 2, 29), TOPIC),
    );

    let response = engine.run(date(2025, 2, 27)).await.unwrap();

    assert_eq!(response, CheckResponse::sent(1));
    assert!(publisher.sent().await[0]
        .1
        .message
        .contains("프리티어 종료일: 2025-02-28"));
}

#[tokio::test]
async fn test_run_at_uses_configured_offset() {
    let publisher = RecordingPublisher::default();
    let config = ReminderConfig::new(date(2024, 4, 25), TOPIC)
        .with_utc_offset(parse_utc_offset("offset", "+09:00").unwrap());
    let engine = ReminderEngine::new(publisher.clone(), config);

    // 2025-03-25 16:00 UTC is already 2025-03-26 in +09:00, 30 days out
    let now = Utc.with_ymd_and_hms(2025, 3, 25, 16, 0, 0).unwrap();
    let response = engine.run_at(now).await.unwrap();

    assert_eq!(response, CheckResponse::sent(30));
    assert_eq!(publisher.sent().await.len(), 1);
}

#[tokio::test]
async fn test_custom_reminder_days() {
    let publisher = RecordingPublisher::default();
    let config = ReminderConfig::new(date(2024, 4, 25), TOPIC).with_reminder_days(vec![14]);
    let engine = ReminderEngine::new(publisher.clone(), config);

    assert_eq!(
        engine.run(date(2025, 3, 26)).await.unwrap(),
        CheckResponse::not_due()
    );
    assert_eq!(
        engine.run(date(2025, 4, 11)).await.unwrap(),
        CheckResponse::sent(14)
    );
    assert_eq!(publisher.sent().await.len(), 1);
}

#[test]
fn test_boxed_publisher_can_drive_the_engine() {
    let publisher = RecordingPublisher::default();
    let boxed: Box<dyn Publisher> = Box::new(publisher.clone());
    let engine = ReminderEngine::new(boxed, ReminderConfig::new(date(2024, 4, 25), TOPIC));

    let response = tokio_test::block_on(engine.run(date(2025, 4, 24))).unwrap();

    assert_eq!(response, CheckResponse::sent(1));
    assert_eq!(tokio_test::block_on(publisher.sent()).len(), 1);
}

fn environment(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let values: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| values.get(key).cloned()
}

#[tokio::test]
async fn test_scheduled_check_reads_environment_and_publishes() {
    let publisher = RecordingPublisher::default();
    let lookup = environment(&[
        ("ACCOUNT_CREATION_DATE", "2024-04-25"),
        ("SNS_TOPIC_ARN", TOPIC),
        ("REMINDER_UTC_OFFSET", "+09:00"),
    ]);
    // 09:00 UTC schedule, 18:00 in +09:00: still 2025-04-18, 7 days out
    let now = Utc.with_ymd_and_hms(2025, 4, 18, 9, 0, 0).unwrap();

    let response = handle_scheduled_check(lookup, publisher.clone(), now)
        .await
        .unwrap();

    assert_eq!(response, CheckResponse::sent(7));
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({
            "statusCode": 200,
            "body": "프리티어 종료 7일 전 알림이 전송되었습니다."
        })
    );
    let sent = publisher.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, TOPIC);
}

#[tokio::test]
async fn test_scheduled_check_not_due_publishes_nothing() {
    let publisher = RecordingPublisher::default();
    let lookup = environment(&[
        ("ACCOUNT_CREATION_DATE", "2024-04-25"),
        ("SNS_TOPIC_ARN", TOPIC),
    ]);
    let now = Utc.with_ymd_and_hms(2025, 4, 20, 9, 0, 0).unwrap();

    let response = handle_scheduled_check(lookup, publisher.clone(), now)
        .await
        .unwrap();

    assert_eq!(response, CheckResponse::not_due());
    assert!(publisher.sent().await.is_empty());
}

#[tokio::test]
async fn test_scheduled_check_config_errors_stop_before_publishing() {
    let now = Utc.with_ymd_and_hms(2025, 4, 24, 9, 0, 0).unwrap();

    let publisher = RecordingPublisher::default();
    let err = handle_scheduled_check(
        environment(&[("ACCOUNT_CREATION_DATE", "2024-04-25")]),
        publisher.clone(),
        now,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        AlertError::MissingConfigError { ref field } if field == "SNS_TOPIC_ARN"
    ));

    let err = handle_scheduled_check(
        environment(&[
            ("ACCOUNT_CREATION_DATE", "2023-02-29"),
            ("SNS_TOPIC_ARN", TOPIC),
        ]),
        publisher.clone(),
        now,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AlertError::InvalidConfigValueError { .. }));

    assert!(publisher.sent().await.is_empty());
}
