pub mod cache;
pub mod config;

pub use cache::Cache;
pub use config::{BackendConfig, Config, ConfigError};
