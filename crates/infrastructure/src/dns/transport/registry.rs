use super::batch::BatchTransport;
use super::client_subnet::ClientSubnetTransport;
use super::local::LocalTransport;
use super::options::{split_scheme, TransportOptions};
use super::rcode::RCodeTransport;
use super::tls::TlsTransport;
use dnsmux_application::ports::DnsTransport;
use dnsmux_domain::DomainError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub type TransportConstructor =
    Arc<dyn Fn(TransportOptions) -> Result<Arc<dyn DnsTransport>, DomainError> + Send + Sync>;

/// Maps literal address tokens (`local`) and URL schemes (`tls`) to
/// transport constructors.
#[derive(Clone, Default)]
pub struct TransportRegistry {
    constructors: HashMap<String, TransportConstructor>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `tls`, `local` and `rcode` transports.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(&["tls"], |options| {
            Ok(Arc::new(TlsTransport::new(options)?) as Arc<dyn DnsTransport>)
        });
        registry.register(&["local"], |options| {
            Ok(Arc::new(LocalTransport::new(options)) as Arc<dyn DnsTransport>)
        });
        registry.register(&["rcode"], |options| {
            Ok(Arc::new(RCodeTransport::new(options)?) as Arc<dyn DnsTransport>)
        });
        registry
    }

    /// Registers `constructor` under every key, replacing earlier entries.
    pub fn register<F>(&mut self, keys: &[&str], constructor: F)
    where
        F: Fn(TransportOptions) -> Result<Arc<dyn DnsTransport>, DomainError>
            + Send
            + Sync
            + 'static,
    {
        let constructor: TransportConstructor = Arc::new(constructor);
        for key in keys {
            self.constructors
                .insert((*key).to_string(), Arc::clone(&constructor));
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Builds the transport for `options`.
    ///
    /// A non-empty `addresses` list yields a [`BatchTransport`] with one
    /// sub-transport per address (`address` is added when missing). A valid
    /// client subnet wraps every constructed transport in a
    /// [`ClientSubnetTransport`].
    pub fn create(&self, options: TransportOptions) -> Result<Arc<dyn DnsTransport>, DomainError> {
        if !options.addresses.is_empty() {
            return self.create_batch(options);
        }
        self.create_single(options)
    }

    fn create_batch(&self, options: TransportOptions) -> Result<Arc<dyn DnsTransport>, DomainError> {
        let mut addresses = options.addresses.clone();
        if !options.address.is_empty() && !addresses.contains(&options.address) {
            addresses.push(options.address.clone());
        }
        if addresses.is_empty() {
            return Err(DomainError::InvalidServerAddress(format!(
                "addresses is empty: {}",
                options.name
            )));
        }

        let transports = addresses
            .into_iter()
            .map(|address| {
                let mut sub = options.clone();
                sub.name = format!("{}@{}", options.name, address);
                sub.address = address;
                sub.addresses = Vec::new();
                self.create_single(sub)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(transport = %options.name, members = transports.len(), "Created batch transport");
        Ok(Arc::new(BatchTransport::new(options.name, transports)))
    }

    fn create_single(&self, options: TransportOptions) -> Result<Arc<dyn DnsTransport>, DomainError> {
        let constructor = self
            .constructors
            .get(options.address.as_str())
            .or_else(|| {
                split_scheme(&options.address).and_then(|(scheme, _)| self.constructors.get(scheme))
            })
            .ok_or_else(|| DomainError::UnknownServerFormat(options.address.clone()))?;

        let subnet = options.client_subnet;
        let transport = constructor(options)?;

        Ok(match subnet {
            Some(subnet) => Arc::new(ClientSubnetTransport::new(transport, subnet)),
            None => transport,
        })
    }
}

impl fmt::Debug for TransportRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.constructors.keys().collect();
        keys.sort();
        f.debug_struct("TransportRegistry").field("keys", &keys).finish()
    }
}
