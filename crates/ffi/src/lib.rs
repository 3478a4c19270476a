use trust_engine::domain::error::TrustError;
use trust_engine::{ChainFailure, CertificateIdentity, Credential, RejectReason, TrustBasis};

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiTrustError {
    #[error("pinned certificate mismatch")]
    PinMismatch,
    #[error("certificate chain is invalid ({reason:?})")]
    ChainInvalid { reason: FfiChainFailure, failures: Vec<FfiChainFailure> },
    #[error("server certificate is not self-signed")]
    NotSelfSigned,
    #[error("{message}")]
    Oracle { message: String },
    #[error("{message}")]
    Precondition { message: String },
    #[error("feature not enabled: {message}")]
    Feature { message: String },
}

impl From<TrustError> for FfiTrustError {
    fn from(e: TrustError) -> Self {
        match e {
            TrustError::Rejected(RejectReason::PinMismatch) => FfiTrustError::PinMismatch,
            TrustError::Rejected(RejectReason::NotSelfSigned) => FfiTrustError::NotSelfSigned,
            TrustError::Rejected(RejectReason::ChainInvalid { reason, failures }) => FfiTrustError::ChainInvalid {
                reason: reason.into(),
                failures: failures.iter().map(Into::into).collect(),
            },
            TrustError::Precondition(m) => FfiTrustError::Precondition { message: m.to_string() },
            TrustError::Feature(m) => FfiTrustError::Feature { message: m.to_string() },
            other => FfiTrustError::Oracle { message: other.to_string() },
        }
    }
}

// ===== FFI types mirroring the public Rust API =====

#[derive(uniffi::Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiChainFailure { UntrustedRoot, Revoked, Expired, HostnameMismatch, MalformedChain, Other }

impl From<ChainFailure> for FfiChainFailure {
    fn from(v: ChainFailure) -> Self {
        match v {
            ChainFailure::UntrustedRoot => FfiChainFailure::UntrustedRoot,
            ChainFailure::Revoked => FfiChainFailure::Revoked,
            ChainFailure::Expired => FfiChainFailure::Expired,
            ChainFailure::HostnameMismatch => FfiChainFailure::HostnameMismatch,
            ChainFailure::MalformedChain => FfiChainFailure::MalformedChain,
            ChainFailure::Other => FfiChainFailure::Other,
        }
    }
}

#[derive(uniffi::Enum, Debug, Clone, PartialEq, Eq)]
pub enum FfiTrustBasis {
    PinnedCertificate,
    ChainValidation { anchor_generation: u64, anchors_only: bool },
    SelfSigned,
}

impl From<TrustBasis> for FfiTrustBasis {
    fn from(v: TrustBasis) -> Self {
        match v {
            TrustBasis::PinnedCertificate => FfiTrustBasis::PinnedCertificate,
            TrustBasis::ChainValidation { anchor_generation, anchors_only } => {
                FfiTrustBasis::ChainValidation { anchor_generation, anchors_only }
            }
            TrustBasis::SelfSigned => FfiTrustBasis::SelfSigned,
        }
    }
}

#[derive(uniffi::Record, Debug, Clone)]
pub struct FfiCredential {
    pub host: String,
    pub port: u16,
    pub leaf_sha256: String,
    pub basis: FfiTrustBasis,
}

impl From<Credential> for FfiCredential {
    fn from(v: Credential) -> Self {
        FfiCredential { host: v.host, port: v.port, leaf_sha256: v.leaf_sha256, basis: v.basis.into() }
    }
}

fn identities(chain: Vec<Vec<u8>>) -> Vec<CertificateIdentity> {
    chain.into_iter().map(CertificateIdentity::from_der).collect()
}

// ===== Exports =====

#[uniffi::export]
pub fn set_anchor_certs(certs: Vec<Vec<u8>>, only_these: bool) {
    trust_engine::set_anchor_certs(identities(certs), only_these)
}

#[uniffi::export]
pub fn check_trust(
    host: String,
    port: u16,
    chain: Vec<Vec<u8>>,
    pinned_cert: Option<Vec<u8>>,
) -> Result<FfiCredential, FfiTrustError> {
    let pinned = pinned_cert.map(CertificateIdentity::from_der);
    Ok(trust_engine::check_trust(&host, port, identities(chain), pinned)?.into())
}

#[cfg(feature = "enterprise")]
#[uniffi::export]
pub fn accept_only_self_signed_cert(
    host: String,
    port: u16,
    chain: Vec<Vec<u8>>,
) -> Result<FfiCredential, FfiTrustError> {
    Ok(trust_engine::accept_only_self_signed_cert(&host, port, identities(chain))?.into())
}

uniffi::setup_scaffolding!();
