mod record;
mod record_type;

pub use record::{DnsRecord, RecordData};
pub use record_type::RecordType;
