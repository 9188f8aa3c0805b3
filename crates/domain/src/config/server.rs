use super::errors::ConfigError;
use crate::DomainStrategy;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

/// One logical DNS server. Several `addresses` make it a batch that races
/// every member.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub name: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub addresses: Vec<String>,

    #[serde(default)]
    pub client_subnet: Option<String>,

    #[serde(default)]
    pub strategy: DomainStrategy,
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            addresses: Vec::new(),
            client_subnet: None,
            strategy: DomainStrategy::AsIs,
        }
    }

    pub fn client_subnet_prefix(&self) -> Result<Option<IpNetwork>, ConfigError> {
        match self.client_subnet.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => {
                let prefix = match raw.parse::<IpNetwork>() {
                    Ok(prefix) => prefix,
                    Err(_) => raw
                        .parse::<std::net::IpAddr>()
                        .map(IpNetwork::from)
                        .map_err(|e| {
                            ConfigError::Validation(format!(
                                "Server '{}' has invalid client_subnet '{}': {}",
                                self.name, raw, e
                            ))
                        })?,
                };
                Ok(Some(prefix))
            }
        }
    }
}
