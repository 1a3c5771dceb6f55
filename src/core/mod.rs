pub mod config;
pub mod error;
pub mod types;

pub use config::QuestConfig;
pub use error::{QuestError, Result};
