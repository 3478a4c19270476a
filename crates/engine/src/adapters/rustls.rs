//! rustls handshake hook.
//!
//! `PolicyVerifier` plugs the trust engine into a rustls client as its
//! `ServerCertVerifier`: every handshake builds a fresh `TrustCheck` from the
//! presented chain and the configured pin, and maps the verdict onto rustls
//! errors. Handshake signatures are still checked with the crypto provider.

use std::fmt;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, Error, SignatureScheme};

use crate::domain::anchors::{self, AnchorStore};
use crate::domain::error::{EngineResult, TrustError};
use crate::domain::oracle::{ChainFailure, ChainOracle};
use crate::domain::trust_check::TrustCheck;
use crate::domain::types::CertificateIdentity;
use crate::domain::verdict::RejectReason;

impl TrustCheck {
  /// Evaluation for the name rustls is connecting to.
  pub fn from_server_name(
    server_name: &ServerName<'_>,
    port: u16,
    chain: Vec<CertificateIdentity>,
    oracle: Arc<dyn ChainOracle>,
  ) -> EngineResult<Self> {
    TrustCheck::with_oracle(host_of(server_name)?, port, chain, oracle)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
  Standard,
  #[cfg(feature = "enterprise")]
  SelfSignedOnly,
}

pub struct PolicyVerifier {
  port: u16,
  pinned: Option<CertificateIdentity>,
  oracle: Arc<dyn ChainOracle>,
  store: Arc<AnchorStore>,
  provider: Arc<CryptoProvider>,
  mode: Mode,
}

impl PolicyVerifier {
  /// Verifier for connections to `port`, using the default webpki oracle,
  /// the process-wide anchors and the ring crypto provider.
  pub fn new(port: u16) -> Self {
    Self {
      port,
      pinned: None,
      oracle: crate::adapters::webpki::default_oracle(),
      store: anchors::global(),
      provider: Arc::new(rustls::crypto::ring::default_provider()),
      mode: Mode::Standard,
    }
  }

  pub fn with_pinned_cert(mut self, pinned: Option<CertificateIdentity>) -> Self {
    self.pinned = pinned;
    self
  }

  pub fn with_oracle(mut self, oracle: Arc<dyn ChainOracle>) -> Self {
    self.oracle = oracle;
    self
  }

  pub fn with_store(mut self, store: Arc<AnchorStore>) -> Self {
    self.store = store;
    self
  }

  pub fn with_provider(mut self, provider: Arc<CryptoProvider>) -> Self {
    self.provider = provider;
    self
  }

  /// Trust only a lone self-signed server certificate.
  #[cfg(feature = "enterprise")]
  pub fn accept_only_self_signed(mut self) -> Self {
    self.mode = Mode::SelfSignedOnly;
    self
  }

  fn check(
    &self,
    end_entity: &CertificateDer<'_>,
    intermediates: &[CertificateDer<'_>],
    server_name: &ServerName<'_>,
  ) -> EngineResult<()> {
    let chain = std::iter::once(end_entity)
      .chain(intermediates)
      .map(|c| CertificateIdentity::from(c.as_ref()))
      .collect();
    let check = TrustCheck::from_server_name(server_name, self.port, chain, self.oracle.clone())?
      .with_pinned_cert(self.pinned.clone())
      .with_store(self.store.clone());
    match self.mode {
      Mode::Standard => check.check_trust().map(|_| ()),
      #[cfg(feature = "enterprise")]
      Mode::SelfSignedOnly => check.accept_only_self_signed().map(|_| ()),
    }
  }
}

impl fmt::Debug for PolicyVerifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PolicyVerifier")
      .field("port", &self.port)
      .field("pinned", &self.pinned.is_some())
      .field("mode", &self.mode)
      .finish()
  }
}

impl ServerCertVerifier for PolicyVerifier {
  fn verify_server_cert(
    &self,
    end_entity: &CertificateDer<'_>,
    intermediates: &[CertificateDer<'_>],
    server_name: &ServerName<'_>,
    _ocsp_response: &[u8],
    _now: UnixTime,
  ) -> Result<ServerCertVerified, Error> {
    self
      .check(end_entity, intermediates, server_name)
      .map(|_| ServerCertVerified::assertion())
      .map_err(to_rustls_error)
  }

  fn verify_tls12_signature(
    &self,
    message: &[u8],
    cert: &CertificateDer<'_>,
    dss: &DigitallySignedStruct,
  ) -> Result<HandshakeSignatureValid, Error> {
    verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
  }

  fn verify_tls13_signature(
    &self,
    message: &[u8],
    cert: &CertificateDer<'_>,
    dss: &DigitallySignedStruct,
  ) -> Result<HandshakeSignatureValid, Error> {
    verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
  }

  fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
    self.provider.signature_verification_algorithms.supported_schemes()
  }
}

fn host_of(server_name: &ServerName<'_>) -> EngineResult<String> {
  match server_name {
    ServerName::DnsName(name) => Ok(name.as_ref().to_string()),
    ServerName::IpAddress(ip) => Ok(std::net::IpAddr::from(*ip).to_string()),
    _ => Err(TrustError::Precondition("unsupported server name type")),
  }
}

pub(crate) fn to_rustls_error(e: TrustError) -> Error {
  match e {
    TrustError::Rejected(RejectReason::PinMismatch) => {
      Error::InvalidCertificate(CertificateError::ApplicationVerificationFailure)
    }
    TrustError::Rejected(RejectReason::NotSelfSigned) => {
      Error::InvalidCertificate(CertificateError::UnknownIssuer)
    }
    TrustError::Rejected(RejectReason::ChainInvalid { reason, .. }) => {
      Error::InvalidCertificate(match reason {
        ChainFailure::UntrustedRoot => CertificateError::UnknownIssuer,
        ChainFailure::Revoked => CertificateError::Revoked,
        ChainFailure::Expired => CertificateError::Expired,
        ChainFailure::HostnameMismatch => CertificateError::NotValidForName,
        ChainFailure::MalformedChain => CertificateError::BadEncoding,
        ChainFailure::Other => CertificateError::ApplicationVerificationFailure,
      })
    }
    other => Error::General(other.to_string()),
  }
}
