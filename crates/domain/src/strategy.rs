use crate::RecordType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Which address families are queried and how dual-stack results are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum DomainStrategy {
    #[default]
    AsIs,
    PreferIPv4,
    PreferIPv6,
    UseIPv4,
    UseIPv6,
}

impl DomainStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AsIs => "as_is",
            Self::PreferIPv4 => "prefer_ipv4",
            Self::PreferIPv6 => "prefer_ipv6",
            Self::UseIPv4 => "ipv4_only",
            Self::UseIPv6 => "ipv6_only",
        }
    }

    /// The single record type this strategy pins, if it pins one.
    pub fn pinned_record_type(&self) -> Option<RecordType> {
        match self {
            Self::UseIPv4 => Some(RecordType::A),
            Self::UseIPv6 => Some(RecordType::AAAA),
            _ => None,
        }
    }

    /// Strategy restricted to the family of an address query type.
    pub fn for_record_type(record_type: RecordType) -> Self {
        if record_type == RecordType::AAAA {
            Self::UseIPv6
        } else {
            Self::UseIPv4
        }
    }

    /// Address record types this strategy resolves, IPv4 first.
    pub fn record_types(&self) -> Vec<RecordType> {
        let mut types = Vec::with_capacity(2);
        if self.wants_ipv4() {
            types.push(RecordType::A);
        }
        if self.wants_ipv6() {
            types.push(RecordType::AAAA);
        }
        types
    }

    pub fn wants_ipv4(&self) -> bool {
        !matches!(self, Self::UseIPv6)
    }

    pub fn wants_ipv6(&self) -> bool {
        !matches!(self, Self::UseIPv4)
    }

    /// True when `record_type` asks for the family this strategy excludes.
    pub fn conflicts_with(&self, record_type: RecordType) -> bool {
        matches!(
            (record_type, self),
            (RecordType::A, Self::UseIPv6) | (RecordType::AAAA, Self::UseIPv4)
        )
    }
}

impl fmt::Display for DomainStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "as_is" | "asis" => Ok(Self::AsIs),
            "prefer_ipv4" => Ok(Self::PreferIPv4),
            "prefer_ipv6" => Ok(Self::PreferIPv6),
            "ipv4_only" | "use_ipv4" => Ok(Self::UseIPv4),
            "ipv6_only" | "use_ipv6" => Ok(Self::UseIPv6),
            _ => Err(format!("Unknown domain strategy '{}'", s)),
        }
    }
}

impl TryFrom<String> for DomainStrategy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DomainStrategy> for String {
    fn from(strategy: DomainStrategy) -> Self {
        strategy.as_str().to_string()
    }
}

/// Orders the two families into one sequence: IPv6 first only for
/// `PreferIPv6`, IPv4 first for every other strategy.
pub fn merge_addresses(
    mut v4: Vec<IpAddr>,
    mut v6: Vec<IpAddr>,
    strategy: DomainStrategy,
) -> Vec<IpAddr> {
    if strategy == DomainStrategy::PreferIPv6 {
        v6.append(&mut v4);
        v6
    } else {
        v4.append(&mut v6);
        v4
    }
}
