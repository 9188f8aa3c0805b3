//! dnsmux infrastructure: result cache, wire codec, concrete transports
//! and the registry that assembles them from server addresses.
pub mod dns;
