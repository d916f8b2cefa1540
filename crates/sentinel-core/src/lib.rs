//! Configuration and shared record vocabulary for the Sentinel workspace.

mod app_config;
mod config;
pub mod fields;
mod sentiment;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use sentiment::{SentimentLabel, NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
