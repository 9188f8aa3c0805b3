use super::lifecycle::Lifecycle;
use super::options::TransportOptions;
use async_trait::async_trait;
use dnsmux_application::{ports::DnsTransport, QueryContext};
use dnsmux_domain::{
    trim_fqdn, DnsRecord, DomainError, DomainStrategy, Message, RCode, DEFAULT_TTL,
};
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Host-name resolution backing the local transport.
#[async_trait]
pub trait HostLookup: Send + Sync {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// The operating system resolver, reached through `getaddrinfo`.
pub struct SystemHostLookup;

#[async_trait]
impl HostLookup for SystemHostLookup {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Resolve-only transport over the system resolver.
pub struct LocalTransport {
    name: String,
    resolver: Arc<dyn HostLookup>,
    lifecycle: Lifecycle,
}

impl LocalTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self::with_resolver(options, Arc::new(SystemHostLookup))
    }

    pub fn with_resolver(options: TransportOptions, resolver: Arc<dyn HostLookup>) -> Self {
        Self {
            name: options.name,
            resolver,
            lifecycle: Lifecycle::new(),
        }
    }

    async fn resolve(
        &self,
        ctx: &QueryContext,
        domain: &str,
        strategy: DomainStrategy,
    ) -> Result<Vec<IpAddr>, DomainError> {
        self.lifecycle.ensure_active(&self.name)?;
        let host = trim_fqdn(domain);

        let resolved = tokio::select! {
            _ = ctx.cancelled() => return Err(DomainError::Cancelled),
            result = self.resolver.lookup(host) => result.map_err(classify_lookup_error)?,
        };

        let mut addresses: Vec<IpAddr> = Vec::with_capacity(resolved.len());
        for address in resolved.into_iter().map(|address| address.to_canonical()) {
            let wanted = match address {
                IpAddr::V4(_) => strategy.wants_ipv4(),
                IpAddr::V6(_) => strategy.wants_ipv6(),
            };
            if wanted && !addresses.contains(&address) {
                addresses.push(address);
            }
        }

        match strategy {
            // Stable sorts keep the resolver's order within each family.
            DomainStrategy::PreferIPv4 => addresses.sort_by_key(|address| address.is_ipv6()),
            DomainStrategy::PreferIPv6 => addresses.sort_by_key(|address| address.is_ipv4()),
            _ => {}
        }

        debug!(transport = %self.name, domain = %host, count = addresses.len(), "System resolver answered");

        if addresses.is_empty() {
            return Err(DomainError::NoData);
        }
        Ok(addresses)
    }
}

/// Resolver failures that mean "no such name" become NXDOMAIN; anything
/// else is a hard failure.
fn classify_lookup_error(e: io::Error) -> DomainError {
    if e.kind() == io::ErrorKind::NotFound {
        return DomainError::Rcode(RCode::NXDomain);
    }
    let message = e.to_string().to_ascii_lowercase();
    let not_found = [
        "not known",
        "no address associated",
        "no such host",
        "nodename nor servname",
        "no data",
    ]
    .iter()
    .any(|needle| message.contains(needle));

    if not_found {
        DomainError::Rcode(RCode::NXDomain)
    } else {
        DomainError::IoError(e.to_string())
    }
}

#[async_trait]
impl DnsTransport for LocalTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_raw(&self) -> bool {
        false
    }

    async fn start(&self) -> Result<(), DomainError> {
        self.lifecycle.start(&self.name)
    }

    fn reset(&self) {}

    async fn close(&self) -> Result<(), DomainError> {
        self.lifecycle.close();
        Ok(())
    }

    /// Answers A and AAAA questions by synthesizing records from a lookup.
    async fn exchange(
        &self,
        ctx: &QueryContext,
        message: &Message,
    ) -> Result<Message, DomainError> {
        let question = message
            .single_question()
            .ok_or_else(|| DomainError::InvalidDnsResponse("expected exactly one question".into()))?;
        if !question.record_type.is_address() {
            return Err(DomainError::NoRawSupport);
        }

        let strategy = DomainStrategy::for_record_type(question.record_type);
        let (addresses, rcode) = match self.resolve(ctx, &question.name, strategy).await {
            Ok(addresses) => (addresses, RCode::NoError),
            Err(e) => match e.rcode() {
                Some(rcode) => (Vec::new(), rcode),
                None => return Err(e),
            },
        };

        let ttl = ctx.rewrite_ttl().unwrap_or(DEFAULT_TTL);
        let answers = addresses
            .into_iter()
            .map(|address| DnsRecord::from_address(question.name.clone(), address, ttl))
            .collect();
        Ok(Message::response_to(message, rcode).with_answers(answers))
    }

    async fn lookup(
        &self,
        ctx: &QueryContext,
        domain: &str,
        strategy: DomainStrategy,
    ) -> Result<Vec<IpAddr>, DomainError> {
        self.resolve(ctx, domain, strategy).await
    }
}
