//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session token configuration.
    pub session: SessionConfig,
    /// Storage configuration. Absent means uploads are disabled.
    #[serde(default)]
    pub storage: Option<StorageSettings>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Secret key for signing session tokens.
    pub secret: String,
    /// Session lifetime in hours.
    #[serde(default = "default_session_ttl")]
    pub ttl_hours: i64,
}

fn default_session_ttl() -> i64 {
    24 * 14 // two weeks
}

/// Storage backend settings as read from the environment.
///
/// Which fields are required depends on `provider`; validation happens when
/// the storage service is constructed, so an incomplete section degrades to
/// disabled uploads instead of failing startup.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Backend kind: `local` or `s3`.
    pub provider: String,
    /// Root directory for the local backend.
    #[serde(default)]
    pub root: Option<String>,
    /// Public URL prefix for locally stored files.
    #[serde(default)]
    pub public_prefix: Option<String>,
    /// S3-compatible endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bucket name.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Access key id.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Secret access key.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Region (use `auto` for R2 and friends).
    #[serde(default)]
    pub region: Option<String>,
    /// Public base URL for uploaded objects, if served from a CDN or
    /// public bucket URL that differs from the endpoint.
    #[serde(default)]
    pub public_url_base: Option<String>,
    /// Maximum upload size in bytes.
    #[serde(default)]
    pub max_file_size: Option<u64>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PINBOARD").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("PINBOARD__DATABASE__URL", Some("postgres://localhost/test")),
                ("PINBOARD__SESSION__SECRET", Some("test-secret")),
                ("PINBOARD__SERVER__PORT", Some("9090")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/test");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.session.secret, "test-secret");
                assert!(config.storage.is_none());
            },
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("PINBOARD__DATABASE__URL", Some("postgres://localhost/test")),
                ("PINBOARD__SESSION__SECRET", Some("s")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.session.ttl_hours, 24 * 14);
            },
        );
    }
}
