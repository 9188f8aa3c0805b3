use crate::QueryContext;
use async_trait::async_trait;
use dnsmux_domain::{DomainError, DomainStrategy, Message};
use std::net::IpAddr;

/// A resolution backend.
///
/// Raw transports serve `exchange` for any record type. Resolve-only
/// transports serve `lookup` and nothing else; the client adapts between
/// the two shapes. `is_raw` must not change after construction.
///
/// Lifecycle: `start` once (may fail), any number of `reset` calls, then
/// `close` once. Calls after `close` fail with `TransportClosed`.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    fn name(&self) -> &str;

    fn is_raw(&self) -> bool;

    async fn start(&self) -> Result<(), DomainError>;

    /// Drops transient connection state. Safe to call while queries are
    /// in flight.
    fn reset(&self);

    async fn close(&self) -> Result<(), DomainError>;

    /// `message` carries exactly one question.
    async fn exchange(&self, ctx: &QueryContext, message: &Message)
        -> Result<Message, DomainError>;

    /// `domain` has no trailing dot.
    async fn lookup(
        &self,
        ctx: &QueryContext,
        domain: &str,
        strategy: DomainStrategy,
    ) -> Result<Vec<IpAddr>, DomainError>;
}
