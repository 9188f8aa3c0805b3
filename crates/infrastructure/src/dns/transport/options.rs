use async_trait::async_trait;
use dnsmux_domain::DomainError;
use ipnetwork::IpNetwork;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the TCP connections stream transports run over.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream>;
}

/// Connects straight to the target, resolving host names with the system
/// resolver.
pub struct DirectDialer;

#[async_trait]
impl Dialer for DirectDialer {
    async fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

/// Construction parameters for one logical transport.
#[derive(Clone)]
pub struct TransportOptions {
    pub name: String,
    pub dialer: Arc<dyn Dialer>,
    pub address: String,
    /// Non-empty turns the transport into a batch over every address.
    pub addresses: Vec<String>,
    pub client_subnet: Option<IpNetwork>,
    pub timeout: Duration,
}

impl TransportOptions {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dialer: Arc::new(DirectDialer),
            address: address.into(),
            addresses: Vec::new(),
            client_subnet: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_addresses(mut self, addresses: Vec<String>) -> Self {
        self.addresses = addresses;
        self
    }

    pub fn with_client_subnet(mut self, subnet: Option<IpNetwork>) -> Self {
        self.client_subnet = subnet;
        self
    }

    pub fn with_dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.dialer = dialer;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for TransportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportOptions")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("addresses", &self.addresses)
            .field("client_subnet", &self.client_subnet)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Splits `scheme://rest` into its parts. Literal tokens such as `local`
/// have no scheme.
pub fn split_scheme(address: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = address.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, rest))
}

/// Parses `host`, `host:port`, `[v6]` or `[v6]:port`, dropping any path.
pub fn parse_host_port(authority: &str, default_port: u16) -> Result<(String, u16), DomainError> {
    let authority = authority.split('/').next().unwrap_or_default();
    let invalid = || DomainError::InvalidServerAddress(authority.to_string());

    if let Some(rest) = authority.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
        let port = match tail.strip_prefix(':') {
            Some(port) => port.parse().map_err(|_| invalid())?,
            None if tail.is_empty() => default_port,
            None => return Err(invalid()),
        };
        return Ok((host.to_string(), port));
    }

    // A bare IPv6 address has several colons and no port.
    if authority.matches(':').count() > 1 {
        return Ok((authority.to_string(), default_port));
    }

    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => (host, port.parse().map_err(|_| invalid())?),
        None => (authority, default_port),
    };
    if host.is_empty() {
        return Err(invalid());
    }
    Ok((host.to_string(), port))
}
