use async_trait::async_trait;
use dnsmux_application::{ports::DnsTransport, QueryContext};
use dnsmux_domain::{DomainError, DomainStrategy, Message};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Several transports behind one name. Each query is raced across the
/// sub-transports able to serve its shape; the first success wins and the
/// remaining attempts are cancelled.
pub struct BatchTransport {
    name: String,
    transports: Vec<Arc<dyn DnsTransport>>,
}

impl BatchTransport {
    pub fn new(name: impl Into<String>, transports: Vec<Arc<dyn DnsTransport>>) -> Self {
        Self {
            name: name.into(),
            transports,
        }
    }

    pub fn transports(&self) -> &[Arc<dyn DnsTransport>] {
        &self.transports
    }

    /// Races `attempt` over the sub-transports whose raw capability equals
    /// `raw`, under a child scope cancelled as soon as one succeeds.
    async fn race<T, F, Fut>(
        &self,
        ctx: &QueryContext,
        operation: &'static str,
        raw: bool,
        attempt: F,
    ) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: Fn(Arc<dyn DnsTransport>, QueryContext) -> Fut,
        Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
    {
        let eligible: Vec<_> = self
            .transports
            .iter()
            .filter(|transport| transport.is_raw() == raw)
            .cloned()
            .collect();

        if eligible.is_empty() {
            return Err(DomainError::AllFailed {
                operation,
                detail: format!("no transport in {} supports {}", self.name, operation),
            });
        }

        debug!(transport = %self.name, operation, candidates = eligible.len(), "Racing sub-transports");

        let scope = ctx.child();
        let mut abort_handles = Vec::with_capacity(eligible.len());
        let mut attempts = FuturesUnordered::new();

        for transport in eligible {
            let name: Arc<str> = transport.name().into();
            let handle = tokio::spawn(attempt(transport, scope.clone()));
            abort_handles.push(handle.abort_handle());
            attempts.push(async move { (name, handle.await) });
        }

        let mut first_error = None;
        let mut winner = None;

        while let Some((name, joined)) = attempts.next().await {
            match joined {
                Ok(Ok(value)) => {
                    winner = Some((name, value));
                    break;
                }
                Ok(Err(e)) => {
                    debug!(transport = %self.name, sub_transport = %name, error = %e, "Sub-transport failed");
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    warn!(transport = %self.name, sub_transport = %name, error = %e, "Sub-transport task panicked");
                    first_error.get_or_insert(DomainError::Transport(format!(
                        "{} task failed: {}",
                        name, e
                    )));
                }
            }
        }

        scope.cancel();
        for handle in &abort_handles {
            handle.abort();
        }

        match winner {
            Some((name, value)) => {
                info!(transport = %self.name, winner = %name, operation, "Batch query answered");
                Ok(value)
            }
            None => Err(first_error.unwrap_or(DomainError::AllFailed {
                operation,
                detail: format!("every transport in {} failed", self.name),
            })),
        }
    }
}

#[async_trait]
impl DnsTransport for BatchTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_raw(&self) -> bool {
        self.transports.iter().any(|transport| transport.is_raw())
    }

    async fn start(&self) -> Result<(), DomainError> {
        for transport in &self.transports {
            transport.start().await?;
        }
        Ok(())
    }

    fn reset(&self) {
        for transport in &self.transports {
            transport.reset();
        }
    }

    /// Closes every sub-transport, then reports the first failure.
    async fn close(&self) -> Result<(), DomainError> {
        let mut first_error = None;
        for transport in &self.transports {
            if let Err(e) = transport.close().await {
                warn!(transport = %self.name, sub_transport = %transport.name(), error = %e, "Failed to close sub-transport");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn exchange(
        &self,
        ctx: &QueryContext,
        message: &Message,
    ) -> Result<Message, DomainError> {
        let message = Arc::new(message.clone());
        self.race(ctx, "exchange", true, move |transport, scope| {
            let message = Arc::clone(&message);
            async move { transport.exchange(&scope, &message).await }
        })
        .await
    }

    async fn lookup(
        &self,
        ctx: &QueryContext,
        domain: &str,
        strategy: DomainStrategy,
    ) -> Result<Vec<IpAddr>, DomainError> {
        let domain: Arc<str> = domain.into();
        self.race(ctx, "lookup", false, move |transport, scope| {
            let domain = Arc::clone(&domain);
            async move { transport.lookup(&scope, &domain, strategy).await }
        })
        .await
    }
}
