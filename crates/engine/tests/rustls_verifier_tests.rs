#![cfg(feature = "rustls")]

mod common;

use std::sync::Arc;

use rustls::client::danger::ServerCertVerifier;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, Error};
use trust_engine as te;

fn verify(
    verifier: &te::PolicyVerifier,
    host: &str,
    chain: &[te::CertificateIdentity],
) -> Result<(), Error> {
    let (leaf, rest) = chain.split_first().expect("non-empty chain");
    let end_entity = CertificateDer::from(leaf.as_bytes().to_vec());
    let intermediates: Vec<CertificateDer<'static>> =
        rest.iter().map(|c| CertificateDer::from(c.as_bytes().to_vec())).collect();
    let server_name = ServerName::try_from(host.to_string()).expect("server name");
    verifier
        .verify_server_cert(&end_entity, &intermediates, &server_name, &[], UnixTime::now())
        .map(|_| ())
}

fn verifier_trusting(ca: &common::TestCa) -> te::PolicyVerifier {
    te::PolicyVerifier::new(443)
        .with_oracle(Arc::new(te::WebPkiOracle::with_system_roots(vec![ca.identity()])))
        .with_store(common::fresh_store())
}

#[test]
fn trusted_chain_passes_the_handshake_hook() {
    common::init_tracing();
    let ca = common::TestCa::root("Public Root CA");
    let leaf = ca.issue_leaf("sync.example.com");

    verify(&verifier_trusting(&ca), "sync.example.com", &[leaf]).expect("trusted");
}

#[test]
fn untrusted_chain_is_an_unknown_issuer() {
    let ca = common::TestCa::root("Public Root CA");
    let stranger = common::TestCa::root("Unknown CA");
    let leaf = stranger.issue_leaf("sync.example.com");

    let err = verify(&verifier_trusting(&ca), "sync.example.com", &[leaf]).unwrap_err();
    assert_eq!(err, Error::InvalidCertificate(CertificateError::UnknownIssuer));
}

#[test]
fn wrong_host_is_not_valid_for_name() {
    let ca = common::TestCa::root("Public Root CA");
    let leaf = ca.issue_leaf("other.example.com");

    let err = verify(&verifier_trusting(&ca), "sync.example.com", &[leaf]).unwrap_err();
    assert_eq!(err, Error::InvalidCertificate(CertificateError::NotValidForName));
}

#[test]
fn pinned_verifier_ignores_the_chain_but_not_the_leaf() {
    let ca = common::TestCa::root("Public Root CA");
    let stranger = common::TestCa::root("Unknown CA");
    let pinned = stranger.issue_leaf("sync.example.com");
    let verifier = verifier_trusting(&ca).with_pinned_cert(Some(pinned.clone()));

    verify(&verifier, "sync.example.com", &[pinned]).expect("pinned leaf");

    let trusted_but_unpinned = ca.issue_leaf("sync.example.com");
    let err = verify(&verifier, "sync.example.com", &[trusted_but_unpinned]).unwrap_err();
    assert_eq!(err, Error::InvalidCertificate(CertificateError::ApplicationVerificationFailure));
}

#[cfg(feature = "enterprise")]
#[test]
fn self_signed_mode_accepts_only_self_signed_leaves() {
    let ca = common::TestCa::root("Edge CA");
    let verifier = verifier_trusting(&ca).accept_only_self_signed();

    verify(&verifier, "edge.local", &[common::self_signed("edge.local")]).expect("self-signed");

    let err = verify(&verifier, "edge.local", &[ca.issue_leaf("edge.local")]).unwrap_err();
    assert_eq!(err, Error::InvalidCertificate(CertificateError::UnknownIssuer));
}

#[test]
fn verifier_plugs_into_a_client_config() {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = Arc::new(te::PolicyVerifier::new(443).with_provider(provider.clone()));
    assert!(!verifier.supported_verify_schemes().is_empty());

    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth();
    assert!(config.alpn_protocols.is_empty());
}
