use crate::stack::iam::PolicyDocument;
use crate::stack::template::CfnResource;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicProperties {
    pub topic_name: String,
}

impl CfnResource for TopicProperties {
    const TYPE: &'static str = "AWS::SNS::Topic";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionProperties {
    pub topic_arn: Value,
    pub protocol: String,
    pub endpoint: Value,
}

impl SubscriptionProperties {
    pub fn email(topic_arn: Value, address: Value) -> Self {
        Self {
            topic_arn,
            protocol: "email".to_string(),
            endpoint: address,
        }
    }
}

impl CfnResource for SubscriptionProperties {
    const TYPE: &'static str = "AWS::SNS::Subscription";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicPolicyProperties {
    pub topics: Vec<Value>,
    pub policy_document: PolicyDocument,
}

impl CfnResource for TopicPolicyProperties {
    const TYPE: &'static str = "AWS::SNS::TopicPolicy";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InlinePolicy {
    pub policy_name: String,
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleProperties {
    pub assume_role_policy_document: PolicyDocument,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub managed_policy_arns: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<InlinePolicy>,
}

impl CfnResource for RoleProperties {
    const TYPE: &'static str = "AWS::IAM::Role";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagedPolicyProperties {
    pub managed_policy_name: String,
    pub description: String,
    pub policy_document: PolicyDocument,
    /// User names, or an `Fn::If` resolving to them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Value>,
}

impl CfnResource for ManagedPolicyProperties {
    const TYPE: &'static str = "AWS::IAM::ManagedPolicy";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionCode {
    pub s3_bucket: String,
    pub s3_key: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionEnvironment {
    pub variables: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionProperties {
    pub function_name: String,
    pub runtime: String,
    pub handler: String,
    pub architectures: Vec<String>,
    pub code: FunctionCode,
    pub role: Value,
    pub timeout: u32,
    pub memory_size: u32,
    pub environment: FunctionEnvironment,
}

impl CfnResource for FunctionProperties {
    const TYPE: &'static str = "AWS::Lambda::Function";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PermissionProperties {
    pub action: String,
    pub function_name: Value,
    pub principal: String,
    pub source_arn: Value,
}

impl CfnResource for PermissionProperties {
    const TYPE: &'static str = "AWS::Lambda::Permission";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleTarget {
    pub arn: Value,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleProperties {
    pub name: String,
    pub description: String,
    pub schedule_expression: String,
    pub state: String,
    pub targets: Vec<RuleTarget>,
}

impl CfnResource for RuleProperties {
    const TYPE: &'static str = "AWS::Events::Rule";
}
