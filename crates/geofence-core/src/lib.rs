//! Shared data model, configuration, and the persistence seam for the
//! geofence editor.

mod app_config;
mod config;
mod gateway;
mod store;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use gateway::StoreGateway;
pub use store::{LatLng, Store, StoreId};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
