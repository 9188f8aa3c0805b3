use crate::RCode;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// Legitimate negative answer (NXDOMAIN, SERVFAIL, ...). Cacheable.
    #[error("DNS response code {0}")]
    Rcode(RCode),

    /// Answered successfully with zero records.
    #[error("No records in DNS response")]
    NoData,

    #[error("No raw query support by current transport")]
    NoRawSupport,

    #[error("Operation not supported by transport {transport}: {operation}")]
    Unsupported {
        transport: String,
        operation: &'static str,
    },

    #[error("{operation}: all failed: {detail}")]
    AllFailed {
        operation: &'static str,
        detail: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Transport timeout connecting to {server}")]
    TransportTimeout { server: String },

    #[error("Transport {0} is closed")]
    TransportClosed(String),

    #[error("Transport {0} has not been started")]
    TransportNotStarted(String),

    #[error("Query cancelled")]
    Cancelled,

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Unknown DNS server format: {0}")]
    UnknownServerFormat(String),

    #[error("Invalid server address: {0}")]
    InvalidServerAddress(String),

    #[error("Invalid client subnet: {0}")]
    InvalidClientSubnet(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// Response code carried by a soft result; `None` for hard failures.
    /// `NoData` counts as a successful answer.
    pub fn rcode(&self) -> Option<RCode> {
        match self {
            DomainError::Rcode(code) => Some(*code),
            DomainError::NoData => Some(RCode::NoError),
            _ => None,
        }
    }

    /// Soft results may be cached and turned into valid but failing responses.
    pub fn is_soft(&self) -> bool {
        self.rcode().is_some()
    }

    pub fn is_nxdomain(&self) -> bool {
        matches!(self, DomainError::Rcode(RCode::NXDomain))
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}
