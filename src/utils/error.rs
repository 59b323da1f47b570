use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Notification delivery failed: {message}")]
    DeliveryError { message: String },

    #[error("Template error: {message}")]
    TemplateError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Delivery,
    Template,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl AlertError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AlertError::ConfigError { .. }
            | AlertError::MissingConfigError { .. }
            | AlertError::InvalidConfigValueError { .. }
            | AlertError::TomlError(_) => ErrorCategory::Configuration,
            AlertError::DeliveryError { .. } => ErrorCategory::Delivery,
            AlertError::TemplateError { .. } | AlertError::SerializationError(_) => {
                ErrorCategory::Template
            }
            AlertError::IoError(_) => ErrorCategory::System,
        }
    }

    /// Delivery failures are retried by tomorrow's scheduled run, so they rank
    /// below configuration mistakes that fail every invocation.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Delivery => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Template => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AlertError::MissingConfigError { field } => {
                format!("Set {} in the function environment or config file", field)
            }
            AlertError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of {} and run again", field)
            }
            AlertError::ConfigError { .. } | AlertError::TomlError(_) => {
                "Check the configuration file syntax and values".to_string()
            }
            AlertError::DeliveryError { .. } => {
                "Check the SNS topic ARN and the function's sns:Publish permission; the next scheduled run will try again"
                    .to_string()
            }
            AlertError::TemplateError { .. } | AlertError::SerializationError(_) => {
                "Review the stack configuration for conflicting resource names".to_string()
            }
            AlertError::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Delivery => format!("Could not send the reminder: {}", self),
            ErrorCategory::Template => format!("Could not build the stack template: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AlertError>;
