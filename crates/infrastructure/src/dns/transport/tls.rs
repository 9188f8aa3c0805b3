//! DNS-over-TLS transport (RFC 7858)
//!
//! - Shared `ClientConfig` built once with the webpki roots
//! - Idle connections are kept per transport (at most `MAX_IDLE_PER_HOST`)
//!   and reused for subsequent queries, amortizing the handshake
//! - `reset` drops every idle connection; streams checked out before the
//!   reset are discarded instead of being returned

use super::framing::{read_with_length_prefix, send_with_length_prefix};
use super::lifecycle::Lifecycle;
use super::options::{parse_host_port, split_scheme, Dialer, TransportOptions};
use crate::dns::wire::MessageCodec;
use async_trait::async_trait;
use dnsmux_application::{ports::DnsTransport, QueryContext};
use dnsmux_domain::{DomainError, DomainStrategy, Message};
use rustls::pki_types::ServerName;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::debug;

pub const DEFAULT_TLS_PORT: u16 = 853;

/// Maximum idle connections kept per transport.
const MAX_IDLE_PER_HOST: usize = 2;

static SHARED_TLS_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
});

type Stream = TlsStream<TcpStream>;

pub struct TlsTransport {
    name: String,
    host: String,
    port: u16,
    server_name: ServerName<'static>,
    dialer: Arc<dyn Dialer>,
    timeout: Duration,
    idle: Mutex<Vec<Stream>>,
    generation: AtomicU64,
    lifecycle: Lifecycle,
}

impl TlsTransport {
    /// Accepts `tls://host[:port]`; SNI is the host as written.
    pub fn new(options: TransportOptions) -> Result<Self, DomainError> {
        let authority = match split_scheme(&options.address) {
            Some(("tls", rest)) => rest,
            _ => return Err(DomainError::InvalidServerAddress(options.address)),
        };
        let (host, port) = parse_host_port(authority, DEFAULT_TLS_PORT)?;

        let server_name = ServerName::try_from(host.clone()).map_err(|e| {
            DomainError::InvalidServerAddress(format!("Invalid TLS hostname '{}': {}", host, e))
        })?;

        Ok(Self {
            name: options.name,
            host,
            port,
            server_name,
            dialer: options.dialer,
            timeout: options.timeout,
            idle: Mutex::new(Vec::new()),
            generation: AtomicU64::new(0),
            lifecycle: Lifecycle::new(),
        })
    }

    pub fn server(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => format!("[{}]:{}", self.host, self.port),
            _ => format!("{}:{}", self.host, self.port),
        }
    }

    pub fn idle_connections(&self) -> usize {
        self.lock_idle().len()
    }

    fn lock_idle(&self) -> std::sync::MutexGuard<'_, Vec<Stream>> {
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_pooled(&self) -> Option<(Stream, u64)> {
        let generation = self.generation.load(Ordering::Acquire);
        self.lock_idle().pop().map(|stream| (stream, generation))
    }

    fn return_to_pool(&self, stream: Stream, generation: u64) {
        if generation != self.generation.load(Ordering::Acquire) {
            return;
        }
        let mut idle = self.lock_idle();
        if idle.len() < MAX_IDLE_PER_HOST {
            idle.push(stream);
        }
        // A full pool simply drops (closes) the connection.
    }

    async fn connect_new(&self) -> Result<Stream, DomainError> {
        let connector = tokio_rustls::TlsConnector::from(SHARED_TLS_CONFIG.clone());

        let tcp_stream = tokio::time::timeout(self.timeout, self.dialer.connect(&self.host, self.port))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server(),
            })?
            .map_err(|e| {
                DomainError::Transport(format!(
                    "Connection refused by TLS server {}: {}",
                    self.server(),
                    e
                ))
            })?;

        let tls_stream = tokio::time::timeout(
            self.timeout,
            connector.connect(self.server_name.clone(), tcp_stream),
        )
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: self.server(),
        })?
        .map_err(|e| {
            DomainError::Transport(format!("TLS handshake failed with {}: {}", self.server(), e))
        })?;

        debug!(server = %self.server(), transport = %self.name, "TLS connection established");
        Ok(tls_stream)
    }

    async fn send_on_stream(
        &self,
        stream: &mut Stream,
        message_bytes: &[u8],
    ) -> Result<Vec<u8>, DomainError> {
        tokio::time::timeout(self.timeout, send_with_length_prefix(stream, message_bytes))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server(),
            })??;

        tokio::time::timeout(self.timeout, read_with_length_prefix(stream))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: self.server(),
            })?
    }

    async fn round_trip(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        if let Some((mut stream, generation)) = self.take_pooled() {
            match self.send_on_stream(&mut stream, message_bytes).await {
                Ok(response_bytes) => {
                    debug!(server = %self.server(), "TLS query via pooled connection");
                    self.return_to_pool(stream, generation);
                    return Ok(response_bytes);
                }
                Err(e) => {
                    debug!(server = %self.server(), error = %e, "Pooled TLS connection stale, reconnecting");
                }
            }
        }

        let generation = self.generation.load(Ordering::Acquire);
        let mut stream = self.connect_new().await?;
        let response_bytes = self.send_on_stream(&mut stream, message_bytes).await?;

        debug!(
            server = %self.server(),
            response_len = response_bytes.len(),
            "TLS response received"
        );

        self.return_to_pool(stream, generation);
        Ok(response_bytes)
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_raw(&self) -> bool {
        true
    }

    async fn start(&self) -> Result<(), DomainError> {
        self.lifecycle.start(&self.name)
    }

    fn reset(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let dropped = std::mem::take(&mut *self.lock_idle()).len();
        debug!(transport = %self.name, dropped, "TLS idle connections reset");
    }

    async fn close(&self) -> Result<(), DomainError> {
        if self.lifecycle.close() {
            self.reset();
        }
        Ok(())
    }

    async fn exchange(
        &self,
        ctx: &QueryContext,
        message: &Message,
    ) -> Result<Message, DomainError> {
        self.lifecycle.ensure_active(&self.name)?;

        let mut request = message.clone();
        request.id = fastrand::u16(..);
        let request_bytes = MessageCodec::encode(&request)?;

        let response_bytes = tokio::select! {
            _ = ctx.cancelled() => return Err(DomainError::Cancelled),
            result = self.round_trip(&request_bytes) => result?,
        };

        let mut response = MessageCodec::decode(&response_bytes)?;
        if response.id != request.id {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Response id {} does not match query id {} from {}",
                response.id,
                request.id,
                self.server()
            )));
        }
        response.id = message.id;
        Ok(response)
    }

    async fn lookup(
        &self,
        _ctx: &QueryContext,
        _domain: &str,
        _strategy: DomainStrategy,
    ) -> Result<Vec<IpAddr>, DomainError> {
        Err(DomainError::Unsupported {
            transport: self.name.clone(),
            operation: "lookup",
        })
    }
}
