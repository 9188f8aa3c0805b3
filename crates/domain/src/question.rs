use crate::RecordType;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsClass {
    IN,
    CH,
    HS,
    NONE,
    ANY,
    Unknown(u16),
}

impl DnsClass {
    pub fn to_u16(&self) -> u16 {
        match self {
            DnsClass::IN => 1,
            DnsClass::CH => 3,
            DnsClass::HS => 4,
            DnsClass::NONE => 254,
            DnsClass::ANY => 255,
            DnsClass::Unknown(code) => *code,
        }
    }

    pub fn from_u16(code: u16) -> Self {
        match code {
            1 => DnsClass::IN,
            3 => DnsClass::CH,
            4 => DnsClass::HS,
            254 => DnsClass::NONE,
            255 => DnsClass::ANY,
            other => DnsClass::Unknown(other),
        }
    }
}

impl fmt::Display for DnsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsClass::Unknown(code) => write!(f, "CLASS{}", code),
            other => write!(f, "{:?}", other),
        }
    }
}

/// What is being resolved. Also the cache key: every field participates in
/// equality, so A and AAAA for one name are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question {
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub class: DnsClass,
}

impl Question {
    pub fn new(name: impl Into<Arc<str>>, record_type: RecordType, class: DnsClass) -> Self {
        Self {
            name: name.into(),
            record_type,
            class,
        }
    }

    /// Internet-class question for `name`, which is made fully qualified.
    pub fn internet(name: &str, record_type: RecordType) -> Self {
        Self::new(fqdn(name), record_type, DnsClass::IN)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.record_type)
    }
}

pub fn is_fqdn(name: &str) -> bool {
    name.ends_with('.')
}

/// Appends the root label unless already present.
pub fn fqdn(name: &str) -> String {
    if is_fqdn(name) {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Strips a single trailing root label, if any.
pub fn trim_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}
