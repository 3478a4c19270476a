// crates/engine/src/domain/trust_check.rs

//! Trust decision engine.
//!
//! A `TrustCheck` is built for one handshake and produces one verdict:
//!
//! 1. A pinned certificate, when present, is the whole decision. The leaf must
//!    match it byte-for-byte and the chain oracle is never consulted.
//! 2. Otherwise the anchor store is snapshotted once and the chain is handed to
//!    the oracle under an SSL policy for the target host.
//! 3. `evaluate_self_signed` is a separate, explicitly invoked path available
//!    only in `enterprise` builds.

use std::fmt;
use std::sync::Arc;

use super::anchors::{self, AnchorSnapshot, AnchorStore};
use super::error::{EngineResult, TrustError};
use super::oracle::{ChainFailure, ChainOracle, OracleVerdict};
use super::types::{CertificateIdentity, ServerIdentity, TrustDefaults, TrustPolicy};
use super::verdict::{Credential, RejectReason, TrustBasis, TrustVerdict};

pub struct TrustCheck {
    host: String,
    port: u16,
    policy: TrustPolicy,
    chain: Vec<CertificateIdentity>,
    pinned: Option<CertificateIdentity>,
    oracle: Arc<dyn ChainOracle>,
    store: Arc<AnchorStore>,
    self_signed_capability: bool,
}

impl TrustCheck {
    /// Evaluation for `host:port` using the default webpki oracle and the
    /// process-wide anchor store. `chain` is leaf first and must not be empty.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        chain: Vec<CertificateIdentity>,
    ) -> EngineResult<Self> {
        #[cfg(not(feature = "webpki"))]
        {
            let _ = (host, port, chain);
            return Err(TrustError::Feature("webpki"));
        }
        #[cfg(feature = "webpki")]
        {
            Self::with_oracle(host, port, chain, crate::adapters::webpki::default_oracle())
        }
    }

    /// Evaluation using a caller-supplied chain oracle.
    pub fn with_oracle(
        host: impl Into<String>,
        port: u16,
        chain: Vec<CertificateIdentity>,
        oracle: Arc<dyn ChainOracle>,
    ) -> EngineResult<Self> {
        if chain.is_empty() {
            return Err(TrustError::Precondition("server presented an empty certificate chain"));
        }
        let host: String = host.into();
        let identity = ServerIdentity::parse(&host)?;
        let host = identity.to_string();
        let policy = TrustPolicy::Ssl(identity);
        Ok(Self {
            host,
            port,
            policy,
            chain,
            pinned: None,
            oracle,
            store: anchors::global(),
            self_signed_capability: TrustDefaults::SELF_SIGNED_CAPABILITY,
        })
    }

    /// Pin the server to exactly this certificate. Replaces chain validation.
    pub fn with_pinned_cert(mut self, pinned: Option<CertificateIdentity>) -> Self {
        self.pinned = pinned;
        self
    }

    /// Read anchors from `store` instead of the process-wide store.
    pub fn with_store(mut self, store: Arc<AnchorStore>) -> Self {
        self.store = store;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_self_signed_capability(mut self, enabled: bool) -> Self {
        self.self_signed_capability = enabled;
        self
    }

    /// The normalized name the leaf is validated against.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn leaf(&self) -> &CertificateIdentity {
        &self.chain[0]
    }

    pub fn pinned_cert(&self) -> Option<&CertificateIdentity> {
        self.pinned.as_ref()
    }

    /// Standard evaluation: pin comparison if pinned, chain validation otherwise.
    pub fn evaluate(&self) -> TrustVerdict {
        let verdict = match &self.pinned {
            Some(pinned) => self.evaluate_pin(pinned),
            None => self.evaluate_chain(&self.store.snapshot()),
        };
        self.log_verdict(&verdict);
        verdict
    }

    /// `evaluate` as a `Result`, keeping rejection and oracle failure distinct.
    pub fn check_trust(&self) -> EngineResult<Credential> {
        self.evaluate().into_result()
    }

    /// Accept the chain only if it is one self-signed, currently valid
    /// certificate. Ignores anchors and pins and applies no hostname policy.
    pub fn evaluate_self_signed(&self) -> EngineResult<TrustVerdict> {
        if !self.self_signed_capability {
            return Err(TrustError::Feature("enterprise"));
        }
        let verdict = if self.chain.len() != 1 {
            TrustVerdict::Rejected(RejectReason::NotSelfSigned)
        } else {
            // The certificate as its own exclusive anchor validates only if it
            // signed itself.
            let leaf = self.leaf();
            let anchors = AnchorSnapshot::new(vec![leaf.clone()], true);
            match self.oracle.evaluate(&self.chain, &TrustPolicy::BasicX509, &anchors) {
                OracleVerdict::Valid => TrustVerdict::Accepted(self.credential(TrustBasis::SelfSigned)),
                OracleVerdict::Invalid(failures) if failures.contains(ChainFailure::UntrustedRoot) => {
                    TrustVerdict::Rejected(RejectReason::NotSelfSigned)
                }
                OracleVerdict::Invalid(failures) => {
                    TrustVerdict::Rejected(RejectReason::chain_invalid(failures))
                }
                OracleVerdict::Indeterminate(detail) => TrustVerdict::Error(detail),
            }
        };
        self.log_verdict(&verdict);
        Ok(verdict)
    }

    pub fn accept_only_self_signed(&self) -> EngineResult<Credential> {
        self.evaluate_self_signed()?.into_result()
    }

    fn evaluate_pin(&self, pinned: &CertificateIdentity) -> TrustVerdict {
        if self.leaf() == pinned {
            TrustVerdict::Accepted(self.credential(TrustBasis::PinnedCertificate))
        } else {
            TrustVerdict::Rejected(RejectReason::PinMismatch)
        }
    }

    fn evaluate_chain(&self, snapshot: &AnchorSnapshot) -> TrustVerdict {
        match self.oracle.evaluate(&self.chain, &self.policy, snapshot) {
            OracleVerdict::Valid => TrustVerdict::Accepted(self.credential(TrustBasis::ChainValidation {
                anchor_generation: snapshot.generation(),
                anchors_only: snapshot.is_exclusive(),
            })),
            OracleVerdict::Invalid(failures) => {
                TrustVerdict::Rejected(RejectReason::chain_invalid(failures))
            }
            OracleVerdict::Indeterminate(detail) => TrustVerdict::Error(detail),
        }
    }

    fn credential(&self, basis: TrustBasis) -> Credential {
        Credential {
            host: self.host.clone(),
            port: self.port,
            leaf_sha256: self.leaf().sha256_hex(),
            basis,
        }
    }

    fn log_verdict(&self, verdict: &TrustVerdict) {
        match verdict {
            TrustVerdict::Accepted(c) => tracing::debug!(
                host = %self.host,
                port = self.port,
                leaf_sha256 = %c.leaf_sha256,
                basis = ?c.basis,
                "server certificate trusted"
            ),
            TrustVerdict::Rejected(reason) => tracing::warn!(
                host = %self.host,
                port = self.port,
                leaf_sha256 = %self.leaf().sha256_hex(),
                reason = %reason,
                "server certificate rejected"
            ),
            TrustVerdict::Error(detail) => tracing::warn!(
                host = %self.host,
                port = self.port,
                detail = %detail,
                "server trust could not be evaluated"
            ),
        }
    }
}

impl fmt::Debug for TrustCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustCheck")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("chain_len", &self.chain.len())
            .field("pinned", &self.pinned.is_some())
            .field("self_signed_capability", &self.self_signed_capability)
            .finish()
    }
}
