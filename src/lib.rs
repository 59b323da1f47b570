pub mod config;
pub mod core;
pub mod domain;
pub mod stack;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::ConsolePublisher, CliConfig, Command};

#[cfg(feature = "lambda")]
pub use config::lambda::SnsPublisher;

pub use config::{reminder::ReminderConfig, stack_config::StackConfig};
pub use core::reminder::{handle_scheduled_check, ReminderEngine};
pub use domain::model::{CheckResponse, ExpirationNotice, PublishReceipt, ReminderDecision};
pub use domain::ports::Publisher;
pub use stack::FreeTierAlertsStack;
pub use utils::error::{AlertError, Result};
