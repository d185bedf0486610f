pub mod app_config;
pub mod catalog;
mod config;
pub mod filter;
pub mod geo;
pub mod hotel;
pub mod links;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read hotel catalog at {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse hotel catalog")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid hotel catalog: {0}")]
    Validation(String),
}
