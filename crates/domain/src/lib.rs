//! dnsmux domain layer: DNS messages, questions, rcodes, strategies and config.
pub mod config;
pub mod dns_record;
pub mod errors;
pub mod message;
pub mod question;
pub mod rcode;
pub mod strategy;

pub use config::{CliOverrides, Config, ConfigError, ServerConfig};
pub use dns_record::{DnsRecord, RecordData, RecordType};
pub use errors::DomainError;
pub use message::Message;
pub use question::{fqdn, is_fqdn, trim_fqdn, DnsClass, Question};
pub use rcode::RCode;
pub use strategy::{merge_addresses, DomainStrategy};

/// TTL given to synthesized answers, and the ceiling for cached entries.
pub const DEFAULT_TTL: u32 = 600;
