use std::fmt;
use std::net::IpAddr;

use serde::Serialize;
use url::Host;

use crate::domain::error::{EngineResult, TrustError};

/// The name a server certificate must be valid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ServerIdentity {
    DnsName(String),
    IpAddress(IpAddr),
}

impl ServerIdentity {
    /// Parse a connection host. IP literals (bracketed or not) become
    /// `IpAddress`; anything else is normalized as a domain name.
    pub fn parse(host: &str) -> EngineResult<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(TrustError::Precondition("host must not be empty"));
        }
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ServerIdentity::IpAddress(ip));
        }
        match Host::parse(host) {
            Ok(Host::Domain(d)) => Ok(ServerIdentity::DnsName(d.trim_end_matches('.').to_string())),
            Ok(Host::Ipv4(a)) => Ok(ServerIdentity::IpAddress(IpAddr::V4(a))),
            Ok(Host::Ipv6(a)) => Ok(ServerIdentity::IpAddress(IpAddr::V6(a))),
            Err(_) => Err(TrustError::Precondition("host is not a valid domain name or IP address")),
        }
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerIdentity::DnsName(name) => f.write_str(name),
            ServerIdentity::IpAddress(ip) => write!(f, "{ip}"),
        }
    }
}

/// Policy handed to the chain oracle alongside the chain and anchors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustPolicy {
    /// TLS server policy: the leaf must be valid for this identity.
    Ssl(ServerIdentity),
    /// Plain X.509 path validation with no name binding.
    BasicX509,
}

impl TrustPolicy {
    pub fn ssl(host: &str) -> EngineResult<Self> {
        ServerIdentity::parse(host).map(TrustPolicy::Ssl)
    }

    pub fn server_identity(&self) -> Option<&ServerIdentity> {
        match self {
            TrustPolicy::Ssl(id) => Some(id),
            TrustPolicy::BasicX509 => None,
        }
    }
}
