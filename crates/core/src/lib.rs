pub mod config;

pub use config::{AppConfig, AuthConfig, DatabaseConfig, MissingSetting, ServerConfig, StoreBackend};
