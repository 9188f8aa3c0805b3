mod dns_transport;
mod result_cache;

pub use dns_transport::DnsTransport;
pub use result_cache::ResultCache;
