mod message_cache;
mod metrics;

pub use message_cache::MessageCache;
pub use metrics::CacheStats;
