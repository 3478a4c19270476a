// crates/engine/src/lib.rs

//! Public facade for the trust engine.
//! Decides whether a replicator may trust the certificate chain a server
//! presented, combining certificate pinning, administrator-supplied anchors
//! and standard chain validation.

pub mod adapters;
pub mod domain;

/// Configure the process-wide anchor certificates. With `only_these` the
/// anchors replace the system root store, otherwise they extend it.
pub fn set_anchor_certs(certs: Vec<CertificateIdentity>, only_these: bool) {
    domain::anchors::set_anchor_certs(certs, only_these)
}

/// One-shot standard evaluation against the process-wide anchors.
pub fn check_trust(
    host: &str,
    port: u16,
    chain: Vec<CertificateIdentity>,
    pinned_cert: Option<CertificateIdentity>,
) -> EngineResult<Credential> {
    TrustCheck::new(host, port, chain)?
        .with_pinned_cert(pinned_cert)
        .check_trust()
}

/// One-shot self-signed acceptance (enterprise builds only).
#[cfg(feature = "enterprise")]
pub fn accept_only_self_signed_cert(
    host: &str,
    port: u16,
    chain: Vec<CertificateIdentity>,
) -> EngineResult<Credential> {
    TrustCheck::new(host, port, chain)?.accept_only_self_signed()
}

// Re-exports for convenience
pub use domain::anchors::{AnchorSnapshot, AnchorStore};
pub use domain::error::{EngineResult, TrustError};
pub use domain::oracle::{ChainFailure, ChainFailures, ChainOracle, OracleVerdict};
pub use domain::trust_check::TrustCheck;
pub use domain::types::{CertificateIdentity, ServerIdentity, TrustDefaults, TrustPolicy};
pub use domain::verdict::{Credential, RejectReason, TrustBasis, TrustVerdict};

#[cfg(feature = "webpki")]
pub use adapters::webpki::WebPkiOracle;

#[cfg(feature = "rustls")]
pub use adapters::rustls::PolicyVerifier;
