use async_trait::async_trait;
use dnsmux_application::{ports::DnsTransport, QueryContext};
use dnsmux_domain::{DomainError, DomainStrategy, Message};
use ipnetwork::IpNetwork;
use std::net::IpAddr;
use std::sync::Arc;

/// Decorator attaching an EDNS client-subnet prefix to outgoing queries.
/// Queries that already carry a subnet are forwarded untouched.
pub struct ClientSubnetTransport {
    inner: Arc<dyn DnsTransport>,
    subnet: IpNetwork,
}

impl ClientSubnetTransport {
    pub fn new(inner: Arc<dyn DnsTransport>, subnet: IpNetwork) -> Self {
        Self { inner, subnet }
    }

    pub fn subnet(&self) -> IpNetwork {
        self.subnet
    }
}

#[async_trait]
impl DnsTransport for ClientSubnetTransport {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_raw(&self) -> bool {
        self.inner.is_raw()
    }

    async fn start(&self) -> Result<(), DomainError> {
        self.inner.start().await
    }

    fn reset(&self) {
        self.inner.reset();
    }

    async fn close(&self) -> Result<(), DomainError> {
        self.inner.close().await
    }

    async fn exchange(
        &self,
        ctx: &QueryContext,
        message: &Message,
    ) -> Result<Message, DomainError> {
        if message.client_subnet.is_some() {
            return self.inner.exchange(ctx, message).await;
        }
        let mut stamped = message.clone();
        stamped.client_subnet = Some(self.subnet);
        self.inner.exchange(ctx, &stamped).await
    }

    async fn lookup(
        &self,
        ctx: &QueryContext,
        domain: &str,
        strategy: DomainStrategy,
    ) -> Result<Vec<IpAddr>, DomainError> {
        self.inner.lookup(ctx, domain, strategy).await
    }
}
