pub mod batch;
pub mod client_subnet;
pub mod framing;
mod lifecycle;
pub mod local;
pub mod options;
pub mod rcode;
pub mod registry;
pub mod tls;

pub use batch::BatchTransport;
pub use client_subnet::ClientSubnetTransport;
pub use local::{HostLookup, LocalTransport, SystemHostLookup};
pub use options::{DirectDialer, Dialer, TransportOptions};
pub use rcode::RCodeTransport;
pub use registry::{TransportConstructor, TransportRegistry};
pub use tls::TlsTransport;
