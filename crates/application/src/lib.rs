//! dnsmux application layer: transport and cache ports plus the client
//! that adapts between wire exchanges and address lookups.
pub mod context;
pub mod ports;
pub mod services;

pub use context::QueryContext;
pub use services::{ClientOptions, DnsClient};
