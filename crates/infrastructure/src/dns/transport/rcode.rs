use super::lifecycle::Lifecycle;
use super::options::{split_scheme, TransportOptions};
use async_trait::async_trait;
use dnsmux_application::{ports::DnsTransport, QueryContext};
use dnsmux_domain::{DomainError, DomainStrategy, Message, RCode};
use std::net::IpAddr;

/// Answers every query with a fixed response code, e.g. `rcode://refused`
/// to block a route or `rcode://success` for an empty answer.
pub struct RCodeTransport {
    name: String,
    rcode: RCode,
    lifecycle: Lifecycle,
}

impl RCodeTransport {
    pub fn new(options: TransportOptions) -> Result<Self, DomainError> {
        let host = match split_scheme(&options.address) {
            Some(("rcode", rest)) => rest.split(['/', '?']).next().unwrap_or_default(),
            _ => return Err(DomainError::InvalidServerAddress(options.address)),
        };
        let rcode = RCode::from_name(host).ok_or_else(|| {
            DomainError::InvalidServerAddress(format!("unknown rcode: {}", host))
        })?;

        Ok(Self {
            name: options.name,
            rcode,
            lifecycle: Lifecycle::new(),
        })
    }

    pub fn rcode(&self) -> RCode {
        self.rcode
    }
}

#[async_trait]
impl DnsTransport for RCodeTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_raw(&self) -> bool {
        true
    }

    async fn start(&self) -> Result<(), DomainError> {
        self.lifecycle.start(&self.name)
    }

    fn reset(&self) {}

    async fn close(&self) -> Result<(), DomainError> {
        self.lifecycle.close();
        Ok(())
    }

    async fn exchange(
        &self,
        _ctx: &QueryContext,
        message: &Message,
    ) -> Result<Message, DomainError> {
        self.lifecycle.ensure_active(&self.name)?;

        let mut response = message.clone();
        response.is_response = true;
        response.rcode = self.rcode;
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
