// crates/engine/src/domain/verdict.rs
use std::fmt;

use serde::Serialize;

use super::error::{EngineResult, TrustError};
use super::oracle::{ChainFailure, ChainFailures};

/// What the trust decision rested on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrustBasis {
    /// The leaf matched the configured pin byte-for-byte.
    PinnedCertificate,
    /// The chain validated under the given anchor configuration.
    ChainValidation { anchor_generation: u64, anchors_only: bool },
    /// A lone self-signed certificate was accepted on request.
    SelfSigned,
}

/// Success token handed back to the connection layer, bound to one host/port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub host: String,
    pub port: u16,
    /// SHA-256 (hex) of the leaf certificate the decision applies to.
    pub leaf_sha256: String,
    pub basis: TrustBasis,
}

impl Credential {
    /// Whether this credential may be reused for a connection to `host:port`.
    pub fn is_for(&self, host: &str, port: u16) -> bool {
        self.port == port && self.host.eq_ignore_ascii_case(host)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    PinMismatch,
    ChainInvalid { reason: ChainFailure, failures: ChainFailures },
    NotSelfSigned,
}

impl RejectReason {
    pub fn chain_invalid(failures: ChainFailures) -> Self {
        RejectReason::ChainInvalid { reason: failures.dominant(), failures }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::PinMismatch => f.write_str("certificate does not match the pinned certificate"),
            RejectReason::ChainInvalid { reason, failures } if failures.len() > 1 => {
                write!(f, "certificate chain is invalid ({reason}; all: {failures})")
            }
            RejectReason::ChainInvalid { reason, .. } => {
                write!(f, "certificate chain is invalid ({reason})")
            }
            RejectReason::NotSelfSigned => f.write_str("certificate is not a lone self-signed certificate"),
        }
    }
}

/// Outcome of one trust evaluation. Exactly one per evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "detail", rename_all = "snake_case")]
pub enum TrustVerdict {
    Accepted(Credential),
    Rejected(RejectReason),
    /// The oracle could not complete; trust is undetermined, not denied.
    Error(String),
}

impl TrustVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TrustVerdict::Accepted(_))
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            TrustVerdict::Accepted(c) => Some(c),
            _ => None,
        }
    }

    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            TrustVerdict::Rejected(r) => Some(r),
            _ => None,
        }
    }

    /// Rejections become `TrustError::Rejected`, oracle failures `TrustError::Oracle`.
    pub fn into_result(self) -> EngineResult<Credential> {
        match self {
            TrustVerdict::Accepted(c) => Ok(c),
            TrustVerdict::Rejected(r) => Err(TrustError::Rejected(r)),
            TrustVerdict::Error(detail) => Err(TrustError::Oracle(detail)),
        }
    }

    pub fn to_audit_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
