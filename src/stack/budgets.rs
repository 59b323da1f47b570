use crate::config::stack_config::{BudgetEntry, BudgetsConfig};
use crate::stack::template::CfnResource;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Spend {
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BudgetData {
    pub budget_type: String,
    pub time_unit: String,
    pub budget_limit: Spend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_filters: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Notification {
    pub comparison_operator: String,
    pub notification_type: String,
    pub threshold: f64,
    pub threshold_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subscriber {
    pub address: Value,
    pub subscription_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationWithSubscribers {
    pub notification: Notification,
    pub subscribers: Vec<Subscriber>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BudgetProperties {
    pub budget: BudgetData,
    pub notifications_with_subscribers: Vec<NotificationWithSubscribers>,
}

impl CfnResource for BudgetProperties {
    const TYPE: &'static str = "AWS::Budgets::Budget";
}

/// One cost budget; every threshold notifies both the email address and the
/// budget alert topic once actual spend passes that percentage.
pub fn cost_budget(
    defaults: &BudgetsConfig,
    entry: &BudgetEntry,
    email: &Value,
    topic_arn: &Value,
) -> BudgetProperties {
    let cost_filters = entry.service.as_ref().map(|service| {
        let mut filters = BTreeMap::new();
        filters.insert("Service".to_string(), vec![service.clone()]);
        filters
    });

    let notifications_with_subscribers = entry
        .thresholds
        .iter()
        .map(|threshold| NotificationWithSubscribers {
            notification: Notification {
                comparison_operator: "GREATER_THAN".to_string(),
                notification_type: "ACTUAL".to_string(),
                threshold: *threshold,
                threshold_type: "PERCENTAGE".to_string(),
            },
            subscribers: vec![
                Subscriber {
                    address: email.clone(),
                    subscription_type: "EMAIL".to_string(),
                },
                Subscriber {
                    address: topic_arn.clone(),
                    subscription_type: "SNS".to_string(),
                },
            ],
        })
        .collect();

    BudgetProperties {
        budget: BudgetData {
            budget_type: "COST".to_string(),
            time_unit: defaults.time_unit.clone(),
            budget_limit: Spend {
                amount: entry.amount,
                unit: defaults.unit.clone(),
            },
            cost_filters,
        },
        notifications_with_subscribers,
    }
}
