use anyhow::Context;
use clap::Parser;
use freetier_alerts::config::reminder::{parse_reminder_days, parse_utc_offset};
use freetier_alerts::stack;
use freetier_alerts::utils::error::ErrorSeverity;
use freetier_alerts::utils::logger;
use freetier_alerts::utils::validation::{parse_date, Validate};
use freetier_alerts::{
    AlertError, CliConfig, Command, ConsolePublisher, ReminderConfig, ReminderEngine, StackConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    let result = match config.command {
        Command::Synth { config, output } => synth(config.as_deref(), output.as_deref()),
        Command::Check {
            creation_date,
            today,
            topic_arn,
            reminder_days,
            utc_offset,
        } => {
            check(
                &creation_date,
                today.as_deref(),
                &topic_arn,
                &reminder_days,
                &utc_offset,
            )
            .await
        }
    };

    if let Err(e) = result {
        // Failures outside the crate (writing the output file) have no severity
        let Some(alert) = e.downcast_ref::<AlertError>() else {
            return Err(e);
        };

        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            alert,
            alert.category(),
            alert.severity()
        );
        eprintln!("❌ {}", alert.user_friendly_message());
        eprintln!("💡 Suggestion: {}", alert.recovery_suggestion());

        let exit_code = match alert.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

fn synth(config_path: Option<&str>, output: Option<&str>) -> anyhow::Result<()> {
    let stack_config = match config_path {
        Some(path) => {
            tracing::info!("📁 Loading stack configuration from: {}", path);
            StackConfig::from_file(path)?
        }
        None => {
            tracing::info!("Using built-in stack configuration");
            StackConfig::default()
        }
    };

    let rendered = stack::synth(&stack_config)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write template to {}", path))?;
            tracing::info!("✅ Template written to {}", path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

async fn check(
    creation_date: &str,
    today: Option<&str>,
    topic_arn: &str,
    reminder_days: &str,
    utc_offset: &str,
) -> anyhow::Result<()> {
    let reference_date = parse_date("creation_date", creation_date)?;
    let config = ReminderConfig::new(reference_date, topic_arn)
        .with_reminder_days(parse_reminder_days("reminder_days", reminder_days)?)
        .with_utc_offset(parse_utc_offset("utc_offset", utc_offset)?);
    config.validate()?;

    let engine = ReminderEngine::new(ConsolePublisher::new(), config);
    let response = match today {
        Some(raw) => engine.run(parse_date("today", raw)?).await?,
        None => engine.run_at(chrono::Utc::now()).await?,
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
