//! webpki-backed `ChainOracle`.
//!
//! Stands in for the platform trust evaluator: path building and signature
//! checks come from `rustls-webpki`, the system root store from
//! `webpki-roots`, and validity windows from `x509-parser`.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use rustls_pki_types::{CertificateDer, ServerName, TrustAnchor, UnixTime};
use webpki::{EndEntityCert, KeyUsage};

use crate::domain::anchors::AnchorSnapshot;
use crate::domain::oracle::{ChainFailure, ChainFailures, ChainOracle, OracleVerdict};
use crate::domain::types::{CertificateIdentity, ServerIdentity, TrustPolicy};

static SUPPORTED_SIG_ALGS: &[&dyn rustls_pki_types::SignatureVerificationAlgorithm] = &[
  webpki::ring::ECDSA_P256_SHA256,
  webpki::ring::ECDSA_P256_SHA384,
  webpki::ring::ECDSA_P384_SHA256,
  webpki::ring::ECDSA_P384_SHA384,
  webpki::ring::ED25519,
  webpki::ring::RSA_PKCS1_2048_8192_SHA256,
  webpki::ring::RSA_PKCS1_2048_8192_SHA384,
  webpki::ring::RSA_PKCS1_2048_8192_SHA512,
  webpki::ring::RSA_PKCS1_3072_8192_SHA384,
  webpki::ring::RSA_PSS_2048_8192_SHA256_LEGACY_KEY,
  webpki::ring::RSA_PSS_2048_8192_SHA384_LEGACY_KEY,
  webpki::ring::RSA_PSS_2048_8192_SHA512_LEGACY_KEY,
];

static DEFAULT_ORACLE: Lazy<Arc<WebPkiOracle>> = Lazy::new(|| Arc::new(WebPkiOracle::new()));

/// Shared oracle over the Mozilla root store.
pub fn default_oracle() -> Arc<dyn ChainOracle> {
  DEFAULT_ORACLE.clone()
}

pub struct WebPkiOracle {
  system_roots: Vec<TrustAnchor<'static>>,
  clock: fn() -> UnixTime,
}

impl WebPkiOracle {
  /// Oracle whose system root store is the bundled Mozilla root set.
  pub fn new() -> Self {
    Self {
      system_roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
      clock: UnixTime::now,
    }
  }

  /// Oracle with an explicit system root store. Certificates that cannot be
  /// used as trust anchors are skipped.
  pub fn with_system_roots(roots: Vec<CertificateIdentity>) -> Self {
    Self {
      system_roots: roots.iter().filter_map(to_trust_anchor).collect(),
      clock: UnixTime::now,
    }
  }

  pub fn with_clock(mut self, clock: fn() -> UnixTime) -> Self {
    self.clock = clock;
    self
  }

  pub fn system_root_count(&self) -> usize {
    self.system_roots.len()
  }

  fn trust_anchors(&self, snapshot: &AnchorSnapshot) -> Vec<TrustAnchor<'static>> {
    let mut anchors = if snapshot.is_exclusive() {
      Vec::with_capacity(snapshot.anchors().len())
    } else {
      self.system_roots.clone()
    };
    anchors.extend(snapshot.anchors().iter().filter_map(to_trust_anchor));
    anchors
  }
}

impl Default for WebPkiOracle {
  fn default() -> Self {
    Self::new()
  }
}

impl ChainOracle for WebPkiOracle {
  fn evaluate(
    &self,
    chain: &[CertificateIdentity],
    policy: &TrustPolicy,
    anchors: &AnchorSnapshot,
  ) -> OracleVerdict {
    let Some((leaf, rest)) = chain.split_first() else {
      return OracleVerdict::Indeterminate("empty certificate chain".into());
    };
    let leaf_der = CertificateDer::from(leaf.as_bytes());
    let ee = match EndEntityCert::try_from(&leaf_der) {
      Ok(ee) => ee,
      Err(e) => return OracleVerdict::Indeterminate(format!("leaf certificate could not be decoded: {e:?}")),
    };
    let (not_before, not_after) = match validity_window(leaf) {
      Ok(w) => w,
      Err(detail) => return OracleVerdict::Indeterminate(detail),
    };

    let now = (self.clock)();
    let mut failures = ChainFailures::new();

    let secs = now.as_secs();
    let in_window = secs >= not_before && secs <= not_after;
    if !in_window {
      failures.insert(ChainFailure::Expired);
    }

    if let Some(id) = policy.server_identity() {
      let name_ok = server_name(id)
        .map(|name| ee.verify_is_valid_for_subject_name(&name).is_ok())
        .unwrap_or(false);
      if !name_ok {
        failures.insert(ChainFailure::HostnameMismatch);
      }
    }

    // Outside its window the leaf would fail on time alone; probe the path at
    // notBefore so an untrusted root is still reported.
    let at = if in_window { now } else { UnixTime::since_unix_epoch(Duration::from_secs(not_before)) };
    let trust_anchors = self.trust_anchors(anchors);
    let intermediates: Vec<CertificateDer<'_>> =
      rest.iter().map(|c| CertificateDer::from(c.as_bytes())).collect();

    if let Err(e) = ee.verify_for_usage(
      SUPPORTED_SIG_ALGS,
      &trust_anchors,
      &intermediates,
      at,
      KeyUsage::server_auth(),
      None,
      None,
    ) {
      tracing::debug!(error = ?e, "webpki path building failed");
      // A CA certificate presented as the leaf never builds a path; it is
      // trusted only when it is itself an anchor and signed itself.
      let anchored_root = matches!(e, webpki::Error::CaUsedAsEndEntity)
        && anchors.anchors().contains(leaf)
        && is_self_signed(leaf);
      if !anchored_root {
        failures.insert(map_webpki_error(&e));
      }
    }

    if failures.is_empty() {
      OracleVerdict::Valid
    } else {
      OracleVerdict::Invalid(failures)
    }
  }
}

fn to_trust_anchor(cert: &CertificateIdentity) -> Option<TrustAnchor<'static>> {
  let der = CertificateDer::from(cert.as_bytes());
  match webpki::anchor_from_trusted_cert(&der) {
    Ok(anchor) => Some(anchor.to_owned()),
    Err(e) => {
      tracing::warn!(sha256 = %cert.sha256_hex(), error = ?e, "skipping unusable anchor certificate");
      None
    }
  }
}

fn validity_window(cert: &CertificateIdentity) -> Result<(u64, u64), String> {
  let (_, parsed) = x509_parser::parse_x509_certificate(cert.as_bytes())
    .map_err(|e| format!("leaf certificate could not be parsed: {e}"))?;
  let validity = parsed.validity();
  let not_before = validity.not_before.timestamp().max(0) as u64;
  let not_after = validity.not_after.timestamp().max(0) as u64;
  Ok((not_before, not_after))
}

/// Issuer equals subject and the signature verifies under the certificate's
/// own key.
fn is_self_signed(cert: &CertificateIdentity) -> bool {
  match x509_parser::parse_x509_certificate(cert.as_bytes()) {
    Ok((_, parsed)) => {
      parsed.issuer().as_raw() == parsed.subject().as_raw() && parsed.verify_signature(None).is_ok()
    }
    Err(_) => false,
  }
}

fn server_name(id: &ServerIdentity) -> Option<ServerName<'static>> {
  match id {
    ServerIdentity::DnsName(name) => ServerName::try_from(name.clone()).ok(),
    ServerIdentity::IpAddress(ip) => Some(ServerName::IpAddress((*ip).into())),
  }
}

pub(crate) fn map_webpki_error(e: &webpki::Error) -> ChainFailure {
  use webpki::Error as E;
  match e {
    E::UnknownIssuer | E::CaUsedAsEndEntity => ChainFailure::UntrustedRoot,
    E::CertExpired { .. } | E::CertNotValidYet { .. } => ChainFailure::Expired,
    E::CertRevoked => ChainFailure::Revoked,
    E::CertNotValidForName { .. } => ChainFailure::HostnameMismatch,
    E::BadDer | E::BadDerTime => ChainFailure::MalformedChain,
    _ => ChainFailure::Other,
  }
}
