use anyhow::Context;
use dnsmux_application::{ports::DnsTransport, ClientOptions, DnsClient};
use dnsmux_domain::{Config, DomainStrategy, ServerConfig};
use dnsmux_infrastructure::dns::{MessageCache, TransportOptions, TransportRegistry};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a single command needs: the client, its cache and the
/// selected server's transport.
pub struct Resolution {
    pub client: DnsClient,
    pub cache: Option<Arc<MessageCache>>,
    pub transport: Arc<dyn DnsTransport>,
    pub strategy: DomainStrategy,
}

impl Resolution {
    pub async fn new(
        config: &Config,
        registry: &TransportRegistry,
        server: Option<&str>,
    ) -> anyhow::Result<Self> {
        let server_config = config
            .server(server)
            .with_context(|| format!("no server named {}", server.unwrap_or("<default>")))?;

        let transport = Self::build_transport(registry, server_config)?;
        transport
            .start()
            .await
            .with_context(|| format!("failed to start transport {}", server_config.name))?;

        let (client, cache) = Self::build_client(config);

        info!(
            server = %server_config.name,
            raw = transport.is_raw(),
            strategy = %server_config.strategy,
            cache = cache.is_some(),
            "Transport ready"
        );

        Ok(Self {
            client,
            cache,
            transport,
            strategy: server_config.strategy,
        })
    }

    fn build_transport(
        registry: &TransportRegistry,
        server: &ServerConfig,
    ) -> anyhow::Result<Arc<dyn DnsTransport>> {
        let options = TransportOptions::new(&server.name, &server.address)
            .with_addresses(server.addresses.clone())
            .with_client_subnet(server.client_subnet_prefix()?);

        registry
            .create(options)
            .with_context(|| format!("failed to create transport {}", server.name))
    }

    fn build_client(config: &Config) -> (DnsClient, Option<Arc<MessageCache>>) {
        if config.client.disable_cache {
            return (DnsClient::without_cache(), None);
        }
        let cache = Arc::new(MessageCache::new(config.client.cache_capacity));
        let options = ClientOptions {
            disable_cache: false,
            disable_expire: config.client.disable_expire,
        };
        (DnsClient::new(options, cache.clone()), Some(cache))
    }

    pub async fn shutdown(self) {
        if let Some(cache) = &self.cache {
            let stats = cache.stats();
            info!(
                entries = stats.entries,
                hits = stats.hits,
                misses = stats.misses,
                hit_rate = %format!("{:.1}%", stats.hit_rate()),
                "Cache statistics"
            );
        }
        if let Err(e) = self.transport.close().await {
            warn!(transport = %self.transport.name(), error = %e, "Failed to close transport");
        }
    }
}
