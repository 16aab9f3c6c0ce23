use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;

/// File name (without extension) looked up in the working directory.
pub const CONFIG_FILE: &str = "user-account";
/// Prefix for environment overrides, e.g. `USER_ACCOUNT__AUTH__JWT_SECRET`.
pub const ENV_PREFIX: &str = "USER_ACCOUNT";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Full connection URL. Takes precedence over the component fields.
    pub url: Option<String>,
    pub host: Option<String>,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Deserialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    pub hash_memory_kib: Option<u32>,
    pub hash_iterations: Option<u32>,
    pub hash_parallelism: Option<u32>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("hash_iterations", &self.hash_iterations)
            .field("hash_parallelism", &self.hash_parallelism)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: None,
            host: None,
            port: default_db_port(),
            user: None,
            password: None,
            name: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    10
}

fn default_db_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    10
}

/// A single problem found by `AppConfig::validate`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} is required")]
pub struct MissingSetting(pub &'static str);

impl DatabaseConfig {
    /// Connection URL, either given directly or composed from the component fields
    pub fn connection_url(&self) -> Option<String> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Some(url.to_string());
        }

        Some(format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            self.user.as_deref()?,
            self.password.as_deref()?,
            self.host.as_deref()?,
            self.port,
            self.name.as_deref()?,
        ))
    }
}

impl AppConfig {
    /// Load `user-account.toml` (optional) with environment variable overrides
    ///
    /// Nested keys are separated by a double underscore:
    /// `USER_ACCOUNT__SERVER__PORT`, `USER_ACCOUNT__DATABASE__URL`,
    /// `USER_ACCOUNT__AUTH__JWT_SECRET`.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Report every missing required setting at once
    pub fn validate(&self) -> Vec<MissingSetting> {
        let mut errs = Vec::new();

        if self.auth.jwt_secret.trim().is_empty() {
            errs.push(MissingSetting("auth.jwt_secret"));
        }

        let db = &self.database;
        let has_url = db.url.as_deref().is_some_and(|u| !u.trim().is_empty());
        if db.backend == StoreBackend::Postgres && !has_url {
            let fields = [
                ("database.host", &db.host),
                ("database.user", &db.user),
                ("database.password", &db.password),
                ("database.name", &db.name),
            ];
            for (key, value) in fields {
                if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                    errs.push(MissingSetting(key));
                }
            }
        }

        errs
    }
}
