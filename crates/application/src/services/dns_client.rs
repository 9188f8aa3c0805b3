use crate::ports::{DnsTransport, ResultCache};
use crate::QueryContext;
use dnsmux_domain::{
    fqdn, merge_addresses, trim_fqdn, DnsRecord, DomainError, DomainStrategy, Message, Question,
    RCode, RecordType, DEFAULT_TTL,
};
use futures::future::{BoxFuture, FutureExt};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClientOptions {
    pub disable_cache: bool,
    /// Cached entries never expire by TTL.
    pub disable_expire: bool,
}

/// Front door for queries: consults the result cache, adapts between the
/// exchange and lookup shapes depending on what the transport supports,
/// and populates the cache with positive and negative results.
pub struct DnsClient {
    cache: Option<Arc<dyn ResultCache>>,
    disable_expire: bool,
}

impl DnsClient {
    pub fn new(options: ClientOptions, cache: Arc<dyn ResultCache>) -> Self {
        Self {
            cache: (!options.disable_cache).then_some(cache),
            disable_expire: options.disable_expire,
        }
    }

    pub fn without_cache() -> Self {
        Self {
            cache: None,
            disable_expire: false,
        }
    }

    fn cache_for(&self, ctx: &QueryContext) -> Option<&dyn ResultCache> {
        if ctx.disable_cache() {
            return None;
        }
        self.cache.as_deref()
    }

    pub async fn exchange(
        &self,
        ctx: &QueryContext,
        transport: &dyn DnsTransport,
        message: &Message,
        strategy: DomainStrategy,
    ) -> Result<Message, DomainError> {
        let Some(question) = message.single_question() else {
            debug!(
                id = message.id,
                questions = message.questions.len(),
                "Rejecting request without exactly one question"
            );
            return Ok(Message::response_to(message, RCode::FormErr));
        };

        let cache = self.cache_for(ctx);
        if let Some(cache) = cache {
            if let Some(mut cached) = cache.load(question) {
                debug!(question = %question, "Cache hit");
                cached.id = message.id;
                return Ok(cached);
            }
        }

        if !transport.is_raw() {
            if question.record_type.is_address() {
                return self.exchange_to_lookup(ctx, transport, message, question).await;
            }
            return Err(DomainError::NoRawSupport);
        }

        if strategy.conflicts_with(question.record_type) {
            return Ok(Message::response_to(message, RCode::NoError));
        }

        let mut response = transport.exchange(ctx, message).await?;
        response.id = message.id;

        if let Some(cache) = cache {
            self.store(cache, question.clone(), response.clone());
        }
        Ok(response)
    }

    pub async fn lookup(
        &self,
        ctx: &QueryContext,
        transport: &dyn DnsTransport,
        domain: &str,
        strategy: DomainStrategy,
    ) -> Result<Vec<IpAddr>, DomainError> {
        let domain = trim_fqdn(domain);
        let name = fqdn(domain);

        if transport.is_raw() {
            return self.lookup_raw(ctx, transport, &name, strategy).await;
        }

        let cache = self.cache_for(ctx);
        if let Some(cache) = cache {
            if let Some(cached) = cached_lookup(cache, &name, strategy) {
                debug!(domain = %name, strategy = %strategy, "Cache hit");
                return cached;
            }
        }

        let (addresses, failure) = match transport.lookup(ctx, domain, strategy).await {
            Ok(addresses) => (addresses, None),
            Err(e) => match e.rcode() {
                None => return Err(e),
                Some(_) if cache.is_none() => return Err(e),
                Some(rcode) => (Vec::new(), Some((rcode, e))),
            },
        };

        if let Some(cache) = cache {
            let rcode = failure.as_ref().map_or(RCode::NoError, |(rcode, _)| *rcode);
            for record_type in strategy.record_types() {
                let question = Question::internet(&name, record_type);
                let answers = addresses
                    .iter()
                    .map(|address| DnsRecord::from_address(question.name.clone(), *address, DEFAULT_TTL))
                    .filter(|record| record.record_type == record_type)
                    .collect();
                let message = Message::response_for(question.clone(), rcode).with_answers(answers);
                self.store(cache, question, message);
            }
        }

        match failure {
            Some((_, e)) => Err(e),
            None => Ok(addresses),
        }
    }

    async fn lookup_raw(
        &self,
        ctx: &QueryContext,
        transport: &dyn DnsTransport,
        name: &str,
        strategy: DomainStrategy,
    ) -> Result<Vec<IpAddr>, DomainError> {
        if let Some(record_type) = strategy.pinned_record_type() {
            return self
                .lookup_to_exchange(ctx, transport, name, record_type, strategy)
                .await;
        }

        // Both families run to completion; one failing does not cancel the other.
        let (v4, v6) = tokio::join!(
            self.lookup_to_exchange(ctx, transport, name, RecordType::A, strategy),
            self.lookup_to_exchange(ctx, transport, name, RecordType::AAAA, strategy),
        );

        let mut first_error = None;
        let mut collect = |result: Result<Vec<IpAddr>, DomainError>| match result {
            Ok(addresses) => addresses,
            Err(e) => {
                first_error.get_or_insert(e);
                Vec::new()
            }
        };
        let v4 = collect(v4);
        let v6 = collect(v6);

        if v4.is_empty() && v6.is_empty() {
            return Err(first_error.unwrap_or(DomainError::NoData));
        }
        Ok(merge_addresses(v4, v6, strategy))
    }

    /// Serves an A/AAAA exchange from a resolve-only transport.
    async fn exchange_to_lookup(
        &self,
        ctx: &QueryContext,
        transport: &dyn DnsTransport,
        message: &Message,
        question: &Question,
    ) -> Result<Message, DomainError> {
        let strategy = DomainStrategy::for_record_type(question.record_type);

        let (addresses, rcode) = match self.lookup(ctx, transport, &question.name, strategy).await
        {
            Ok(addresses) => (addresses, RCode::NoError),
            Err(e) => match e.rcode() {
                Some(rcode) => (Vec::new(), rcode),
                None => return Err(e),
            },
        };

        let answers = addresses
            .into_iter()
            .map(|address| DnsRecord::from_address(question.name.clone(), address, DEFAULT_TTL))
            .collect();
        Ok(Message::response_to(message, rcode).with_answers(answers))
    }

    /// Serves an address lookup for one family from a raw transport.
    ///
    /// Boxed to break the exchange/lookup recursion.
    fn lookup_to_exchange<'a>(
        &'a self,
        ctx: &'a QueryContext,
        transport: &'a dyn DnsTransport,
        name: &'a str,
        record_type: RecordType,
        strategy: DomainStrategy,
    ) -> BoxFuture<'a, Result<Vec<IpAddr>, DomainError>> {
        async move {
            let question = Question::internet(name, record_type);

            if let Some(cache) = self.cache_for(ctx) {
                if let Some(cached) = cache.load(&question) {
                    return cached.to_addresses();
                }
            }

            let request = Message::query(0, question);
            let response = self.exchange(ctx, transport, &request, strategy).await?;
            response.to_addresses()
        }
        .boxed()
    }

    fn store(&self, cache: &dyn ResultCache, question: Question, message: Message) {
        if self.disable_expire {
            cache.store(question, message);
            return;
        }
        let ttl = message.min_ttl().map_or(DEFAULT_TTL, |ttl| ttl.min(DEFAULT_TTL));
        let expires_at = Instant::now() + Duration::from_secs(u64::from(ttl));
        debug!(question = %question, ttl, rcode = %message.rcode, "Caching response");
        cache.store_with_expiry(question, message, expires_at);
    }
}

/// Cached answer for a resolve-only lookup, or `None` to go to the network.
///
/// A pinned strategy is served by any entry for its family, negative ones
/// included. A dual strategy is served when either family has addresses,
/// or when both families hold a negative entry.
fn cached_lookup(
    cache: &dyn ResultCache,
    name: &str,
    strategy: DomainStrategy,
) -> Option<Result<Vec<IpAddr>, DomainError>> {
    let load = |record_type| {
        cache
            .load(&Question::internet(name, record_type))
            .map(|message| message.to_addresses())
    };

    if let Some(record_type) = strategy.pinned_record_type() {
        return load(record_type);
    }

    let (v4, v6) = (load(RecordType::A), load(RecordType::AAAA));
    match (v4, v6) {
        (Some(Err(e)), Some(Err(_))) => Some(Err(e)),
        (v4, v6) => {
            let v4 = v4.and_then(Result::ok).unwrap_or_default();
            let v6 = v6.and_then(Result::ok).unwrap_or_default();
            if v4.is_empty() && v6.is_empty() {
                None
            } else {
                Some(Ok(merge_addresses(v4, v6, strategy)))
            }
        }
    }
}
