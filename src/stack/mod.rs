//! Resource declaration layer: the free-tier alerts stack as a CloudFormation
//! template.

pub mod budgets;
pub mod iam;
pub mod resources;
pub mod template;

use crate::config::reminder::{
    ENV_ACCOUNT_CREATION_DATE, ENV_REMINDER_DAYS, ENV_REMINDER_UTC_OFFSET, ENV_SNS_TOPIC_ARN,
};
use crate::config::stack_config::StackConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use iam::PolicyDocument;
use resources::{
    FunctionCode, FunctionEnvironment, FunctionProperties, InlinePolicy, ManagedPolicyProperties,
    PermissionProperties, RoleProperties, RuleProperties, RuleTarget, SubscriptionProperties,
    TopicPolicyProperties, TopicProperties,
};
use serde_json::Value;
use std::collections::BTreeMap;
use template::{
    cfn_ref, get_att, if_condition, no_value, parameter_is_set, sub, Parameter, Template,
};

pub const PARAM_ACCOUNT_CREATION_DATE: &str = "AccountCreationDate";
pub const PARAM_EMAIL_ADDRESS: &str = "EmailAddress";
pub const PARAM_EXISTING_USER_NAME: &str = "ExistingUserName";

pub const HAS_EXISTING_USER: &str = "HasExistingUser";

pub const EXPIRATION_TOPIC: &str = "FreeTierExpirationAlert";
pub const EXPIRATION_SUBSCRIPTION: &str = "FreeTierExpirationAlertEmailSubscription";
pub const CHECK_FUNCTION: &str = "FreeTierExpirationCheck";
pub const CHECK_FUNCTION_ROLE: &str = "FreeTierExpirationCheckRole";
pub const REMINDER_RULE: &str = "FreeTierExpirationReminder";
pub const REMINDER_RULE_PERMISSION: &str = "FreeTierExpirationReminderInvokePermission";
pub const BUDGET_TOPIC: &str = "BudgetAlert";
pub const BUDGET_SUBSCRIPTION: &str = "BudgetAlertEmailSubscription";
pub const BUDGET_TOPIC_POLICY: &str = "BudgetAlertTopicPolicy";
pub const FREETIER_ADMIN_POLICY: &str = "FreeTierAdminPolicy";
pub const MFA_ONLY_POLICY: &str = "MFAOnlyPolicy";

const BASIC_EXECUTION_ROLE_ARN: &str =
    "arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

pub struct FreeTierAlertsStack;

impl FreeTierAlertsStack {
    /// Validates `config` and declares every resource of the stack.
    pub fn build(config: &StackConfig) -> Result<Template> {
        config.validate()?;

        let mut template = Template::new(config.stack.description.clone());
        declare_parameters(&mut template, config)?;
        declare_expiration_reminder(&mut template, config)?;
        declare_budgets(&mut template, config)?;
        declare_guard_policies(&mut template, config)?;
        declare_outputs(&mut template)?;

        tracing::info!(
            "🏗️ Declared {} resources for stack {}",
            template.resources.len(),
            config.stack.name
        );
        Ok(template)
    }
}

pub fn synth(config: &StackConfig) -> Result<String> {
    FreeTierAlertsStack::build(config)?.to_json_pretty()
}

fn declare_parameters(template: &mut Template, config: &StackConfig) -> Result<()> {
    template.add_parameter(
        PARAM_ACCOUNT_CREATION_DATE,
        Parameter::string(
            "AWS 계정 생성 일자 (YYYY-MM-DD 형식)",
            config.account.creation_date.clone(),
        )
        .with_allowed_pattern(r"^\d{4}-\d{2}-\d{2}$"),
    )?;
    template.add_parameter(
        PARAM_EMAIL_ADDRESS,
        Parameter::string("알림을 받을 이메일 주소", config.account.email.clone()),
    )?;
    template.add_parameter(
        PARAM_EXISTING_USER_NAME,
        Parameter::string(
            "정책을 연결할 기존 IAM 사용자 이름 (비워두면 연결하지 않음)",
            config.existing_user_name().unwrap_or_default(),
        )
        .with_allowed_pattern(r"^[\w+=,.@-]*$"),
    )?;
    template.add_condition(HAS_EXISTING_USER, parameter_is_set(PARAM_EXISTING_USER_NAME))?;
    Ok(())
}

fn declare_expiration_reminder(template: &mut Template, config: &StackConfig) -> Result<()> {
    template.add_resource(
        EXPIRATION_TOPIC,
        &TopicProperties {
            topic_name: config.topics.expiration.clone(),
        },
    )?;
    template.add_resource(
        EXPIRATION_SUBSCRIPTION,
        &SubscriptionProperties::email(cfn_ref(EXPIRATION_TOPIC), cfn_ref(PARAM_EMAIL_ADDRESS)),
    )?;

    template.add_resource(
        CHECK_FUNCTION_ROLE,
        &RoleProperties {
            assume_role_policy_document: iam::lambda_assume_role_policy(),
            managed_policy_arns: vec![sub(BASIC_EXECUTION_ROLE_ARN)],
            policies: vec![InlinePolicy {
                policy_name: "PublishExpirationReminder".to_string(),
                policy_document: iam::publish_to_topic_policy(cfn_ref(EXPIRATION_TOPIC)),
            }],
        },
    )?;

    let mut variables = BTreeMap::new();
    variables.insert(
        ENV_ACCOUNT_CREATION_DATE.to_string(),
        cfn_ref(PARAM_ACCOUNT_CREATION_DATE),
    );
    variables.insert(ENV_SNS_TOPIC_ARN.to_string(), cfn_ref(EXPIRATION_TOPIC));
    variables.insert(
        ENV_REMINDER_DAYS.to_string(),
        Value::String(
            config
                .function
                .reminder_days
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
    );
    if let Some(offset) = &config.function.utc_offset {
        variables.insert(
            ENV_REMINDER_UTC_OFFSET.to_string(),
            Value::String(offset.clone()),
        );
    }

    template.add_resource(
        CHECK_FUNCTION,
        &FunctionProperties {
            function_name: config.function.name.clone(),
            runtime: config.function.runtime.clone(),
            handler: config.function.handler.clone(),
            architectures: vec![config.function.architecture.clone()],
            code: FunctionCode {
                s3_bucket: config.function.code_bucket.clone(),
                s3_key: config.function.code_key.clone(),
            },
            role: get_att(CHECK_FUNCTION_ROLE, "Arn"),
            timeout: config.function.timeout_seconds,
            memory_size: config.function.memory_mb,
            environment: FunctionEnvironment { variables },
        },
    )?;

    template.add_resource(
        REMINDER_RULE,
        &RuleProperties {
            name: config.schedule.rule_name.clone(),
            description: config.schedule.description.clone(),
            schedule_expression: config.schedule.expression.clone(),
            state: "ENABLED".to_string(),
            targets: vec![RuleTarget {
                arn: get_att(CHECK_FUNCTION, "Arn"),
                id: "FreeTierExpirationCheckTarget".to_string(),
            }],
        },
    )?;
    template.add_resource(
        REMINDER_RULE_PERMISSION,
        &PermissionProperties {
            action: "lambda:InvokeFunction".to_string(),
            function_name: cfn_ref(CHECK_FUNCTION),
            principal: "events.amazonaws.com".to_string(),
            source_arn: get_att(REMINDER_RULE, "Arn"),
        },
    )?;

    Ok(())
}

fn declare_budgets(template: &mut Template, config: &StackConfig) -> Result<()> {
    template.add_resource(
        BUDGET_TOPIC,
        &TopicProperties {
            topic_name: config.topics.budget.clone(),
        },
    )?;
    template.add_resource(
        BUDGET_SUBSCRIPTION,
        &SubscriptionProperties::email(cfn_ref(BUDGET_TOPIC), cfn_ref(PARAM_EMAIL_ADDRESS)),
    )?;
    template.add_resource(
        BUDGET_TOPIC_POLICY,
        &TopicPolicyProperties {
            topics: vec![cfn_ref(BUDGET_TOPIC)],
            policy_document: iam::budgets_publish_policy(cfn_ref(BUDGET_TOPIC)),
        },
    )?;

    let email = cfn_ref(PARAM_EMAIL_ADDRESS);
    let topic_arn = cfn_ref(BUDGET_TOPIC);
    for entry in &config.budgets.entries {
        let properties = budgets::cost_budget(&config.budgets, entry, &email, &topic_arn);
        // Budgets validates SNS subscribers against the topic policy at create time
        template
            .add_resource(&entry.logical_id, &properties)?
            .depends_on
            .push(BUDGET_TOPIC_POLICY.to_string());
    }

    Ok(())
}

fn declare_guard_policies(template: &mut Template, config: &StackConfig) -> Result<()> {
    if config.existing_user_name().is_none() {
        tracing::warn!("No existing IAM user configured; guard policies will not be attached");
    }
    let users = if_condition(
        HAS_EXISTING_USER,
        Value::Array(vec![cfn_ref(PARAM_EXISTING_USER_NAME)]),
        no_value(),
    );

    template.add_resource(
        FREETIER_ADMIN_POLICY,
        &ManagedPolicyProperties {
            managed_policy_name: config.policies.freetier_admin_name.clone(),
            description: "프리티어 리소스만 생성 가능하고 나머지는 관리자 권한을 가진 정책"
                .to_string(),
            policy_document: iam::freetier_admin_policy(),
            users: Some(users.clone()),
        },
    )?;

    let mfa_document = match &config.policies.mfa_policy_file {
        Some(path) => PolicyDocument::from_file(path)?,
        None => iam::mfa_required_policy(),
    };
    template.add_resource(
        MFA_ONLY_POLICY,
        &ManagedPolicyProperties {
            managed_policy_name: config.policies.mfa_name.clone(),
            description: "MFA 필수 정책".to_string(),
            policy_document: mfa_document,
            users: Some(users),
        },
    )?;

    Ok(())
}

fn declare_outputs(template: &mut Template) -> Result<()> {
    template.add_output(
        "FreeTierExpirationTopicArn",
        cfn_ref(EXPIRATION_TOPIC),
        "프리티어 종료 알림 SNS 토픽 ARN",
    )?;
    template.add_output(
        "BudgetAlertTopicArn",
        cfn_ref(BUDGET_TOPIC),
        "예산 알림 SNS 토픽 ARN",
    )?;
    template.add_output(
        "FreeTierAdminPolicyArn",
        cfn_ref(FREETIER_ADMIN_POLICY),
        "프리티어 관리자 정책 ARN",
    )?;
    template.add_output(
        "MFAOnlyPolicyArn",
        cfn_ref(MFA_ONLY_POLICY),
        "MFA 필수 정책 ARN",
    )?;
    template.add_conditional_output(
        "AttachedUserArn",
        sub("arn:${AWS::Partition}:iam::${AWS::AccountId}:user/${ExistingUserName}"),
        "정책이 연결된 사용자 ARN",
        HAS_EXISTING_USER,
    )?;
    Ok(())
}
