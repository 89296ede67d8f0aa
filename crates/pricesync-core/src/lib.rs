pub mod app_config;
pub mod config;
pub mod products;
pub mod suppliers;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::Product;
pub use suppliers::{
    load_suppliers, parse_suppliers, CanonicalField, FieldMapping, ResponseFormat,
    StatusVocabulary, Supplier, SuppliersFile, ACTIVE_STATUS, INACTIVE_STATUS,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read suppliers file {path}: {source}")]
    SuppliersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse suppliers file: {0}")]
    SuppliersFileParse(#[from] serde_yaml::Error),

    #[error("supplier validation failed: {0}")]
    Validation(String),
}
