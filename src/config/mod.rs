//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, ExchangeRateConfig, LogFormat, LoggingConfig, ServerConfig,
    StorageConfig,
};
