use anyhow::Result;
use freetier_alerts::stack::{self, FreeTierAlertsStack, MFA_ONLY_POLICY};
use freetier_alerts::{AlertError, StackConfig};
use serde_json::{json, Value};
use tempfile::TempDir;

#[test]
fn test_synth_from_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("freetier-alerts.toml");
    std::fs::write(
        &config_path,
        r#"
[stack]
name = "FreeTierAlertsStack"
description = "Free tier alerts for the sandbox account"

[account]
creation_date = "2024-04-25"
email = "billing@example.com"
existing_user = "sandbox-admin"

[function]
code_bucket = "sandbox-artifacts"
code_key = "freetier/bootstrap.zip"
utc_offset = "+09:00"
reminder_days = [30, 7, 1]

[[budgets.budget]]
logical_id = "FreeTierMonthlyBudget"
amount = 5.0
thresholds = [50.0, 80.0, 100.0]
"#,
    )?;

    let config = StackConfig::from_file(&config_path)?;
    let rendered = stack::synth(&config)?;
    let template: Value = serde_json::from_str(&rendered)?;

    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    assert_eq!(
        template["Description"],
        "Free tier alerts for the sandbox account"
    );
    assert_eq!(
        template["Parameters"]["EmailAddress"]["Default"],
        "billing@example.com"
    );
    assert_eq!(
        template["Parameters"]["AccountCreationDate"]["Default"],
        "2024-04-25"
    );

    let resources = template["Resources"].as_object().unwrap();
    let budgets: Vec<&Value> = resources
        .values()
        .filter(|r| r["Type"] == "AWS::Budgets::Budget")
        .collect();
    assert_eq!(budgets.len(), 1);
    assert_eq!(
        budgets[0]["Properties"]["NotificationsWithSubscribers"]
            .as_array()
            .unwrap()
            .len(),
        3
    );
    assert_eq!(budgets[0]["DependsOn"], json!(["BudgetAlertTopicPolicy"]));

    let function = &resources["FreeTierExpirationCheck"]["Properties"];
    assert_eq!(function["Code"]["S3Bucket"], "sandbox-artifacts");
    assert_eq!(
        function["Environment"]["Variables"]["REMINDER_UTC_OFFSET"],
        "+09:00"
    );

    assert_eq!(
        template["Parameters"]["ExistingUserName"]["Default"],
        "sandbox-admin"
    );
    assert_eq!(
        resources["FreeTierAdminPolicy"]["Properties"]["Users"]["Fn::If"][0],
        "HasExistingUser"
    );
    assert_eq!(template["Outputs"]["AttachedUserArn"]["Condition"], "HasExistingUser");
    Ok(())
}

#[test]
fn test_default_template_outputs() -> Result<()> {
    let rendered = stack::synth(&StackConfig::default())?;
    let template: Value = serde_json::from_str(&rendered)?;

    let outputs = template["Outputs"].as_object().unwrap();
    let mut names: Vec<&str> = outputs.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "AttachedUserArn",
            "BudgetAlertTopicArn",
            "FreeTierAdminPolicyArn",
            "FreeTierExpirationTopicArn",
            "MFAOnlyPolicyArn",
        ]
    );
    assert_eq!(
        outputs["FreeTierExpirationTopicArn"]["Value"],
        json!({ "Ref": "FreeTierExpirationAlert" })
    );
    assert_eq!(outputs["AttachedUserArn"]["Condition"], "HasExistingUser");
    assert!(outputs["FreeTierExpirationTopicArn"].get("Condition").is_none());
    Ok(())
}

#[test]
fn test_synth_is_deterministic() -> Result<()> {
    let config = StackConfig::default();
    assert_eq!(stack::synth(&config)?, stack::synth(&config)?);
    Ok(())
}

#[test]
fn test_mfa_policy_loaded_from_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let policy_path = temp_dir.path().join("mfa_only.json");
    std::fs::write(
        &policy_path,
        r#"{
  "Version": "2012-10-17",
  "Statement": [
    {
      "Sid": "DenyWithoutMFA",
      "Effect": "Deny",
      "NotAction": ["iam:*", "sts:GetSessionToken"],
      "Resource": "*",
      "Condition": { "BoolIfExists": { "aws:MultiFactorAuthPresent": "false" } }
    }
  ]
}"#,
    )?;

    let mut config = StackConfig::default();
    config.policies.mfa_policy_file = Some(policy_path.to_string_lossy().into_owned());
    let template = FreeTierAlertsStack::build(&config)?;

    let document = &template.resource(MFA_ONLY_POLICY).unwrap().properties["PolicyDocument"];
    assert_eq!(document["Statement"].as_array().unwrap().len(), 1);
    assert_eq!(document["Statement"][0]["Sid"], "DenyWithoutMFA");
    assert_eq!(document["Statement"][0]["Resource"], "*");
    Ok(())
}

#[test]
fn test_missing_mfa_policy_file_is_an_io_error() {
    let mut config = StackConfig::default();
    config.policies.mfa_policy_file = Some("/nonexistent/mfa_only.json".to_string());

    let err = FreeTierAlertsStack::build(&config).unwrap_err();
    assert!(matches!(err, AlertError::IoError(_)));
}

#[test]
fn test_invalid_creation_date_in_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("bad.toml");
    std::fs::write(
        &config_path,
        r#"
[account]
creation_date = "2023-02-29"
email = "billing@example.com"
"#,
    )?;

    let config = StackConfig::from_file(&config_path)?;
    let err = stack::synth(&config).unwrap_err();
    assert!(matches!(err, AlertError::InvalidConfigValueError { .. }));
    Ok(())
}

#[test]
fn test_unset_placeholder_stops_synth() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("freetier-alerts.toml");
    std::fs::write(
        &config_path,
        r#"
[function]
code_bucket = "${FREETIER_ALERTS_UNSET_BUCKET}"
"#,
    )?;

    let err = StackConfig::from_file(&config_path)
        .and_then(|config| stack::synth(&config))
        .unwrap_err();
    assert!(matches!(
        err,
        AlertError::MissingConfigError { ref field } if field == "FREETIER_ALERTS_UNSET_BUCKET"
    ));
    Ok(())
}

#[test]
fn test_placeholder_resolved_from_environment() -> Result<()> {
    std::env::set_var("FREETIER_ALERTS_TEST_BUCKET", "resolved-artifacts");
    let config = StackConfig::from_toml_str(
        r#"
[function]
code_bucket = "${FREETIER_ALERTS_TEST_BUCKET}"
"#,
    )?;

    let template: Value = serde_json::from_str(&stack::synth(&config)?)?;
    assert_eq!(
        template["Resources"]["FreeTierExpirationCheck"]["Properties"]["Code"]["S3Bucket"],
        "resolved-artifacts"
    );
    assert!(!template.to_string().contains("${FREETIER_ALERTS"));
    Ok(())
}
