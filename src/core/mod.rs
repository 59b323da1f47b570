pub mod expiration;
pub mod reminder;

pub use crate::domain::model::{CheckResponse, ExpirationNotice, ReminderDecision};
pub use crate::domain::ports::Publisher;
pub use crate::utils::error::Result;
