#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod reminder;
pub mod stack_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "freetier-alerts")]
#[command(about = "AWS free-tier cost alerts: stack synthesis and expiration reminders")]
pub struct CliConfig {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render the CloudFormation template for the alerts stack
    Synth {
        /// Path to the TOML stack configuration; built-in defaults when omitted
        #[arg(short, long)]
        config: Option<String>,

        /// Write the template here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run the free-tier expiration check locally and print the reminder
    Check {
        /// Account creation date (YYYY-MM-DD)
        #[arg(long, env = "ACCOUNT_CREATION_DATE")]
        creation_date: String,

        /// Evaluate as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,

        #[arg(
            long,
            env = "SNS_TOPIC_ARN",
            default_value = "arn:aws:sns:us-east-1:000000000000:freetier-expiration-alert"
        )]
        topic_arn: String,

        /// Comma-separated reminder days
        #[arg(long, default_value = "30,7,1")]
        reminder_days: String,

        /// UTC offset used to derive today's date, e.g. +09:00
        #[arg(long, default_value = "UTC")]
        utc_offset: String,
    },
}
