use super::RecordType;
use crate::question::DnsClass;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

/// Type-specific payload of an answer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    /// Raw RDATA for every other record type.
    Opaque(Arc<[u8]>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    pub name: Arc<str>,

    pub record_type: RecordType,

    pub class: DnsClass,

    pub ttl: u32,

    pub data: RecordData,
}

impl DnsRecord {
    /// Builds an A or AAAA record matching the family of `address`.
    /// IPv4-mapped IPv6 addresses are unmapped first.
    pub fn from_address(name: impl Into<Arc<str>>, address: IpAddr, ttl: u32) -> Self {
        let (record_type, data) = match address.to_canonical() {
            IpAddr::V4(v4) => (RecordType::A, RecordData::A(v4)),
            IpAddr::V6(v6) => (RecordType::AAAA, RecordData::AAAA(v6)),
        };
        Self {
            name: name.into(),
            record_type,
            class: DnsClass::IN,
            ttl,
            data,
        }
    }

    pub fn address(&self) -> Option<IpAddr> {
        match &self.data {
            RecordData::A(v4) => Some(IpAddr::V4(*v4)),
            RecordData::AAAA(v6) => Some(IpAddr::V6(*v6)),
            RecordData::Opaque(_) => None,
        }
    }
}
