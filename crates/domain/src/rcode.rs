use std::fmt;

/// DNS response code. Carried inside `DomainError::Rcode` it marks a
/// legitimate negative answer rather than a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RCode {
    #[default]
    NoError,
    FormErr,
    ServFail,
    NXDomain,
    NotImp,
    Refused,
    Other(u16),
}

impl RCode {
    pub fn to_u16(&self) -> u16 {
        match self {
            RCode::NoError => 0,
            RCode::FormErr => 1,
            RCode::ServFail => 2,
            RCode::NXDomain => 3,
            RCode::NotImp => 4,
            RCode::Refused => 5,
            RCode::Other(code) => *code,
        }
    }

    pub fn from_u16(code: u16) -> Self {
        match code {
            0 => RCode::NoError,
            1 => RCode::FormErr,
            2 => RCode::ServFail,
            3 => RCode::NXDomain,
            4 => RCode::NotImp,
            5 => RCode::Refused,
            other => RCode::Other(other),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RCode::NoError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RCode::NoError => "NOERROR",
            RCode::FormErr => "FORMERR",
            RCode::ServFail => "SERVFAIL",
            RCode::NXDomain => "NXDOMAIN",
            RCode::NotImp => "NOTIMP",
            RCode::Refused => "REFUSED",
            RCode::Other(_) => "UNKNOWN",
        }
    }

    /// Parses the host part of an `rcode://` address.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "success" => Some(RCode::NoError),
            "format_error" => Some(RCode::FormErr),
            "server_failure" => Some(RCode::ServFail),
            "name_error" => Some(RCode::NXDomain),
            "not_implemented" => Some(RCode::NotImp),
            "refused" => Some(RCode::Refused),
            _ => None,
        }
    }
}

impl fmt::Display for RCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RCode::Other(code) => write!(f, "RCODE{}", code),
            other => f.write_str(other.as_str()),
        }
    }
}
