pub mod cache;
pub mod transport;
pub mod wire;

pub use cache::{CacheStats, MessageCache};
pub use transport::{TransportOptions, TransportRegistry};
