use crate::utils::error::{AlertError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

pub const POLICY_VERSION: &str = "2012-10-17";

/// IAM allows most statement fields to be a single value or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    Many(Vec<Value>),
    One(Value),
}

impl OneOrMany {
    pub fn strings(values: &[&str]) -> Self {
        OneOrMany::Many(values.iter().map(|v| Value::String(v.to_string())).collect())
    }

    pub fn values(&self) -> Vec<&Value> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values.iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_action: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

impl Statement {
    pub fn new(sid: &str, effect: Effect, actions: &[&str]) -> Self {
        Self {
            sid: Some(sid.to_string()),
            effect,
            principal: None,
            action: Some(OneOrMany::strings(actions)),
            not_action: None,
            resource: None,
            condition: None,
        }
    }

    pub fn on(mut self, resources: &[&str]) -> Self {
        self.resource = Some(OneOrMany::strings(resources));
        self
    }

    pub fn on_value(mut self, resource: Value) -> Self {
        self.resource = Some(OneOrMany::One(resource));
        self
    }

    pub fn when(mut self, condition: Value) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn for_principal(mut self, principal: Value) -> Self {
        self.principal = Some(principal);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: PolicyDocument = serde_json::from_str(content)?;
        document.validate()?;
        Ok(document)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        tracing::debug!("Loaded policy document from {}", path.as_ref().display());
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.statement.is_empty() {
            return Err(AlertError::TemplateError {
                message: "Policy document has no statements".to_string(),
            });
        }

        for (index, statement) in self.statement.iter().enumerate() {
            let label = statement
                .sid
                .clone()
                .unwrap_or_else(|| format!("#{}", index));
            match (&statement.action, &statement.not_action) {
                (Some(_), None) | (None, Some(_)) => {}
                _ => {
                    return Err(AlertError::TemplateError {
                        message: format!(
                            "Statement {} needs exactly one of Action or NotAction",
                            label
                        ),
                    })
                }
            }
        }
        Ok(())
    }
}

/// Admin access, minus anything that would leave the free tier.
pub fn freetier_admin_policy() -> PolicyDocument {
    PolicyDocument::new(vec![
        Statement::new("AdminAccess", Effect::Allow, &["*"]).on(&["*"]),
        Statement::new("DenyNonFreeTierEC2Instances", Effect::Deny, &["ec2:RunInstances"])
            .on(&["arn:aws:ec2:*:*:instance/*"])
            .when(json!({
                "StringNotEquals": { "ec2:InstanceType": ["t2.micro", "t3.micro"] }
            })),
        Statement::new("DenyNonFreeTierRDS", Effect::Deny, &["rds:CreateDBInstance"])
            .on(&["*"])
            .when(json!({
                "StringNotLike": { "rds:DatabaseClass": ["db.t2.micro", "db.t3.micro"] }
            })),
        // 5 GiB
        Statement::new("DenyLargeS3Storage", Effect::Deny, &["s3:PutObject"])
            .on(&["*"])
            .when(json!({
                "NumericGreaterThan": { "s3:TotalObjectSize": 5_368_709_120_u64 }
            })),
        Statement::new("DenyLargeDynamoDBTables", Effect::Deny, &["dynamodb:CreateTable"])
            .on(&["*"])
            .when(json!({
                "NumericGreaterThan": {
                    "dynamodb:ProvisionedReadCapacityUnits": 25,
                    "dynamodb:ProvisionedWriteCapacityUnits": 25
                }
            })),
        Statement::new(
            "DenyLambdaWithHighMemory",
            Effect::Deny,
            &["lambda:CreateFunction", "lambda:UpdateFunctionConfiguration"],
        )
        .on(&["*"])
        .when(json!({ "NumericGreaterThan": { "lambda:MemorySize": 512 } })),
    ])
}

/// Blocks everything except MFA self-service until the caller has signed in
/// with MFA.
pub fn mfa_required_policy() -> PolicyDocument {
    const OWN_USER: &str = "arn:aws:iam::*:user/${aws:username}";

    PolicyDocument::new(vec![
        Statement::new(
            "AllowViewAccountInfo",
            Effect::Allow,
            &["iam:GetAccountPasswordPolicy", "iam:ListVirtualMFADevices"],
        )
        .on(&["*"]),
        Statement::new(
            "AllowManageOwnPasswords",
            Effect::Allow,
            &["iam:ChangePassword", "iam:GetUser"],
        )
        .on(&[OWN_USER]),
        Statement::new(
            "AllowManageOwnVirtualMFADevice",
            Effect::Allow,
            &["iam:CreateVirtualMFADevice"],
        )
        .on(&["arn:aws:iam::*:mfa/*"]),
        Statement::new(
            "AllowManageOwnUserMFA",
            Effect::Allow,
            &[
                "iam:DeactivateMFADevice",
                "iam:EnableMFADevice",
                "iam:ListMFADevices",
                "iam:ResyncMFADevice",
            ],
        )
        .on(&[OWN_USER]),
        Statement {
            sid: Some("DenyAllExceptListedIfNoMFA".to_string()),
            effect: Effect::Deny,
            principal: None,
            action: None,
            not_action: Some(OneOrMany::strings(&[
                "iam:CreateVirtualMFADevice",
                "iam:EnableMFADevice",
                "iam:GetUser",
                "iam:ChangePassword",
                "iam:ListMFADevices",
                "iam:ListVirtualMFADevices",
                "iam:ResyncMFADevice",
                "sts:GetSessionToken",
            ])),
            resource: Some(OneOrMany::strings(&["*"])),
            condition: Some(json!({
                "BoolIfExists": { "aws:MultiFactorAuthPresent": "false" }
            })),
        },
    ])
}

pub fn lambda_assume_role_policy() -> PolicyDocument {
    PolicyDocument::new(vec![Statement {
        sid: None,
        effect: Effect::Allow,
        principal: Some(json!({ "Service": "lambda.amazonaws.com" })),
        action: Some(OneOrMany::strings(&["sts:AssumeRole"])),
        not_action: None,
        resource: None,
        condition: None,
    }])
}

/// `sns:Publish` on exactly one topic.
pub fn publish_to_topic_policy(topic_arn: Value) -> PolicyDocument {
    PolicyDocument::new(vec![
        Statement::new("PublishReminder", Effect::Allow, &["sns:Publish"]).on_value(topic_arn),
    ])
}

/// Lets AWS Budgets deliver notifications to a topic.
pub fn budgets_publish_policy(topic_arn: Value) -> PolicyDocument {
    PolicyDocument::new(vec![Statement::new(
        "AllowBudgetsPublish",
        Effect::Allow,
        &["sns:Publish"],
    )
    .for_principal(json!({ "Service": "budgets.amazonaws.com" }))
    .on_value(topic_arn)])
}
