// crates/engine/src/domain/oracle.rs

//! Chain validation oracle contract.
//!
//! The engine never parses certificates or checks signatures itself. It hands
//! the presented chain, a policy and an anchor snapshot to a `ChainOracle` and
//! interprets the verdict. The webpki adapter is the production oracle; tests
//! script verdicts with closures.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::anchors::AnchorSnapshot;
use super::types::{CertificateIdentity, TrustPolicy};

/// One reason a chain failed validation.
///
/// Declaration order is dominance order: when several failures are reported
/// the first one here is surfaced as the primary reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainFailure {
    UntrustedRoot,
    Revoked,
    /// Outside the validity window (expired or not yet valid).
    Expired,
    HostnameMismatch,
    MalformedChain,
    Other,
}

impl fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChainFailure::UntrustedRoot => "untrusted root",
            ChainFailure::Revoked => "revoked",
            ChainFailure::Expired => "expired",
            ChainFailure::HostnameMismatch => "hostname mismatch",
            ChainFailure::MalformedChain => "malformed chain",
            ChainFailure::Other => "other",
        };
        f.write_str(s)
    }
}

/// Set of status bits reported by an oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChainFailures(BTreeSet<ChainFailure>);

impl ChainFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, failure: ChainFailure) {
        self.0.insert(failure);
    }

    pub fn contains(&self, failure: ChainFailure) -> bool {
        self.0.contains(&failure)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The most significant failure, `Other` when nothing specific was reported.
    pub fn dominant(&self) -> ChainFailure {
        self.0.iter().next().copied().unwrap_or(ChainFailure::Other)
    }

    pub fn iter(&self) -> impl Iterator<Item = ChainFailure> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ChainFailure> for ChainFailures {
    fn from_iter<I: IntoIterator<Item = ChainFailure>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ChainFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for failure in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{failure}")?;
            first = false;
        }
        Ok(())
    }
}

/// Result of one oracle evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleVerdict {
    Valid,
    Invalid(ChainFailures),
    /// The evaluation itself could not complete.
    Indeterminate(String),
}

/// Verifies a chain against a root set under a policy.
pub trait ChainOracle: Send + Sync {
    fn evaluate(
        &self,
        chain: &[CertificateIdentity],
        policy: &TrustPolicy,
        anchors: &AnchorSnapshot,
    ) -> OracleVerdict;
}

impl<F> ChainOracle for F
where
    F: Fn(&[CertificateIdentity], &TrustPolicy, &AnchorSnapshot) -> OracleVerdict + Send + Sync,
{
    fn evaluate(
        &self,
        chain: &[CertificateIdentity],
        policy: &TrustPolicy,
        anchors: &AnchorSnapshot,
    ) -> OracleVerdict {
        self(chain, policy, anchors)
    }
}
