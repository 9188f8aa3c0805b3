use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::client::ClientConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;

const LOCAL_CONFIG_PATH: &str = "dnsmux.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/dnsmux/config.toml";

/// Main configuration structure for dnsmux
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Client cache behaviour
    #[serde(default)]
    pub client: ClientConfig,

    /// Logical DNS servers, addressed by name
    #[serde(default = "default_servers")]
    pub servers: Vec<ServerConfig>,

    /// Server used when none is named explicitly
    #[serde(default)]
    pub default_server: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            servers: default_servers(),
            default_server: None,
            logging: LoggingConfig::default(),
        }
    }
}

fn default_servers() -> Vec<ServerConfig> {
    vec![ServerConfig::new("local", "local")]
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dnsmux.toml in current directory
    /// 3. /etc/dnsmux/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if overrides.disable_cache {
            self.client.disable_cache = true;
        }
        if let Some(server) = overrides.default_server {
            self.default_server = Some(server);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::Validation("No servers configured".to_string()));
        }

        if !self.client.disable_cache && self.client.cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "cache_capacity must be greater than 0".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for server in &self.servers {
            if !names.insert(server.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate server name '{}'",
                    server.name
                )));
            }
            if server.address.is_empty() && server.addresses.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Server '{}' has no address",
                    server.name
                )));
            }
            server.client_subnet_prefix()?;
        }

        if let Some(default) = &self.default_server {
            if !names.contains(default.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Default server '{}' is not defined",
                    default
                )));
            }
        }

        Ok(())
    }

    /// Server by name, or the default one (explicit default, else the first).
    pub fn server(&self, name: Option<&str>) -> Option<&ServerConfig> {
        match name.or(self.default_server.as_deref()) {
            Some(name) => self.servers.iter().find(|s| s.name == name),
            None => self.servers.first(),
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub disable_cache: bool,
    pub default_server: Option<String>,
}
