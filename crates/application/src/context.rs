use std::sync::Arc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Per-call scope handed to the client and every transport.
///
/// Besides cancellation it carries the ambient directives a caller can set
/// for a single query: bypass the result cache, force the TTL of answers a
/// resolve-only transport synthesizes, and name the logical transport in
/// diagnostics.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    token: CancellationToken,
    disable_cache: bool,
    rewrite_ttl: Option<u32>,
    transport_name: Option<Arc<str>>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn with_disable_cache(mut self, disable: bool) -> Self {
        self.disable_cache = disable;
        self
    }

    pub fn with_rewrite_ttl(mut self, ttl: u32) -> Self {
        self.rewrite_ttl = Some(ttl);
        self
    }

    pub fn with_transport_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.transport_name = Some(name.into());
        self
    }

    /// Same directives under a child token: cancelling the child leaves
    /// this scope untouched, cancelling this scope cancels the child.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            ..self.clone()
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn disable_cache(&self) -> bool {
        self.disable_cache
    }

    pub fn rewrite_ttl(&self) -> Option<u32> {
        self.rewrite_ttl
    }

    pub fn transport_name(&self) -> Option<&str> {
        self.transport_name.as_deref()
    }
}
