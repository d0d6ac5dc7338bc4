use crate::error::{ApiError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "QUIZ_BOOKS_CONFIG";
pub const DATABASE_ENV: &str = "QUIZ_BOOKS_DATABASE";
pub const PORT_ENV: &str = "QUIZ_BOOKS_PORT";
pub const METRICS_PORT_ENV: &str = "QUIZ_BOOKS_METRICS_PORT";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db.sqlite3"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9898,
        }
    }
}

impl Config {
    /// Load `config.toml` (or the file named by `QUIZ_BOOKS_CONFIG`), then
    /// apply environment overrides. A missing default file means defaults.
    pub fn load() -> Result<Self> {
        let (path, explicit) = match env::var(CONFIG_PATH_ENV) {
            Ok(p) => (PathBuf::from(p), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let mut config = if explicit || path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ApiError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = env::var(DATABASE_ENV) {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(port) = env::var(PORT_ENV) {
            self.server.port = parse_port(PORT_ENV, &port)?;
        }
        if let Ok(port) = env::var(METRICS_PORT_ENV) {
            self.metrics.port = parse_port(METRICS_PORT_ENV, &port)?;
            self.metrics.enabled = true;
        }
        Ok(())
    }

    pub fn server_addr(&self) -> Result<SocketAddr> {
        socket_addr("server", &self.server.host, self.server.port)
    }

    /// The exporter listens on the same interface as the API
    pub fn metrics_addr(&self) -> Result<SocketAddr> {
        socket_addr("metrics", &self.server.host, self.metrics.port)
    }
}

fn socket_addr(what: &str, host: &str, port: u16) -> Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .map_err(|e| ApiError::Config(format!("Invalid {what} address '{host}:{port}': {e}")))
}

fn parse_port(var: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::Config(format!("{var} must be a port number, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.path, PathBuf::from("db.sqlite3"));
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 9000

            [database]
            path = "/var/lib/quiz/db.sqlite3"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.path, PathBuf::from("/var/lib/quiz/db.sqlite3"));
        assert_eq!(config.logging.directory, PathBuf::from("logs"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml("[server\nport = 1"),
            Err(ApiError::Toml(_))
        ));
    }

    #[test]
    fn server_addr_rejects_bad_hosts() {
        let mut config = Config::default();
        assert!(config.server_addr().is_ok());
        config.server.host = "not a host".to_string();
        assert!(matches!(config.server_addr(), Err(ApiError::Config(_))));
    }

    #[test]
    fn metrics_listen_on_the_server_host() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.metrics.port = 9100;
        assert_eq!(
            config.metrics_addr().unwrap(),
            "127.0.0.1:9100".parse::<SocketAddr>().unwrap()
        );
        config.server.host = "not a host".to_string();
        assert!(matches!(config.metrics_addr(), Err(ApiError::Config(_))));
    }

    #[test]
    fn port_parsing() {
        assert_eq!(parse_port(PORT_ENV, " 8080 ").unwrap(), 8080);
        assert!(parse_port(PORT_ENV, "eighty").is_err());
    }
}
