//! Configuration loading and management

use crate::core::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Environment variable naming the YAML configuration file
pub const CONFIG_ENV: &str = "PAGEMETA_CONFIG";

/// Listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Page size limits applied to list and search routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size when the request does not name one
    pub default_page_size: usize,

    /// Upper bound on a requested page size
    pub max_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Cross-origin settings for browser clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API; empty mirrors the request origin
    pub allowed_origins: Vec<String>,

    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: true,
        }
    }
}

/// Complete configuration of the metadata server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pagination: PaginationConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `PAGEMETA_CONFIG`, or fall back to defaults
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::info!(path = %path, "loading configuration");
                Self::from_yaml_file(path.trim())
            }
            _ => {
                tracing::info!("no {} set, using default configuration", CONFIG_ENV);
                Ok(Self::default())
            }
        }
    }

    /// Check values serde cannot reject on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pagination = &self.pagination;
        if pagination.default_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_page_size".into(),
                value: "0".into(),
                message: "must be at least 1".into(),
            });
        }
        if pagination.max_page_size < pagination.default_page_size {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_page_size".into(),
                value: pagination.max_page_size.to_string(),
                message: format!(
                    "must not be below default_page_size ({})",
                    pagination.default_page_size
                ),
            });
        }
        if let Some(origin) = self.cors.allowed_origins.iter().find(|o| o.trim() == "*") {
            if self.cors.allow_credentials {
                return Err(ConfigError::InvalidValue {
                    field: "cors.allowed_origins".into(),
                    value: origin.clone(),
                    message: "a wildcard origin cannot be combined with credentials".into(),
                });
            }
        }
        Ok(())
    }

    /// `host:port` the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.pagination.default_page_size, 20);
        assert_eq!(config.pagination.max_page_size, 100);
        assert!(config.cors.allow_credentials);
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
server:
  port: 8080
pagination:
  default_page_size: 5
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.pagination.default_page_size, 5);
        assert_eq!(config.pagination.max_page_size, 100);
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let yaml = "pagination:\n  default_page_size: 0\n";
        let err = AppConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("default_page_size"));
    }

    #[test]
    fn test_max_below_default_is_rejected() {
        let yaml = "pagination:\n  default_page_size: 50\n  max_page_size: 10\n";
        assert!(AppConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_wildcard_origin_with_credentials_is_rejected() {
        let yaml = "cors:\n  allowed_origins: ['*']\n";
        assert!(AppConfig::from_yaml_str(yaml).is_err());

        let yaml = "cors:\n  allowed_origins: ['*']\n  allow_credentials: false\n";
        assert!(AppConfig::from_yaml_str(yaml).is_ok());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(AppConfig::from_yaml_str("server: [unclosed").is_err());
    }
}
