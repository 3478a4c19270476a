#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rcgen::{BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa};
use trust_engine as te;

/// A certificate authority with its DER serialized once (ECDSA signatures are
/// randomized, so re-serializing would change the bytes).
pub struct TestCa {
    pub cert: Certificate,
    pub der: Vec<u8>,
}

impl TestCa {
    /// Self-signed root CA with the given common name.
    pub fn root(name: &str) -> Self {
        let cert = Certificate::from_params(ca_params(name)).expect("ca cert");
        let der = cert.serialize_der().expect("ca der");
        TestCa { cert, der }
    }

    /// Intermediate CA signed by this CA.
    pub fn intermediate(&self, name: &str) -> Self {
        let cert = Certificate::from_params(ca_params(name)).expect("intermediate cert");
        let der = cert.serialize_der_with_signer(&self.cert).expect("intermediate der");
        TestCa { cert, der }
    }

    pub fn identity(&self) -> te::CertificateIdentity {
        te::CertificateIdentity::from_der(self.der.clone())
    }

    /// Server certificate for `dns_name`, valid 1975..4096.
    pub fn issue_leaf(&self, dns_name: &str) -> te::CertificateIdentity {
        let cert = Certificate::from_params(leaf_params(dns_name)).expect("leaf cert");
        let der = cert.serialize_der_with_signer(&self.cert).expect("leaf der");
        te::CertificateIdentity::from_der(der)
    }

    /// Server certificate for `dns_name` that expired in 2001.
    pub fn issue_expired_leaf(&self, dns_name: &str) -> te::CertificateIdentity {
        let mut params = leaf_params(dns_name);
        params.not_before = rcgen::date_time_ymd(2000, 1, 1);
        params.not_after = rcgen::date_time_ymd(2001, 1, 1);
        let cert = Certificate::from_params(params).expect("leaf cert");
        let der = cert.serialize_der_with_signer(&self.cert).expect("leaf der");
        te::CertificateIdentity::from_der(der)
    }
}

fn ca_params(name: &str) -> CertificateParams {
    let mut params = CertificateParams::new(vec![]);
    params.distinguished_name = DistinguishedName::new();
    params.distinguished_name.push(DnType::CommonName, name);
    params.distinguished_name.push(DnType::OrganizationName, "trust-engine tests");
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params
}

fn leaf_params(dns_name: &str) -> CertificateParams {
    let mut params = CertificateParams::new(vec![dns_name.to_string()]);
    params.distinguished_name = DistinguishedName::new();
    params.distinguished_name.push(DnType::CommonName, dns_name);
    params
}

/// Self-signed server certificate for `dns_name`.
pub fn self_signed(dns_name: &str) -> te::CertificateIdentity {
    let cert = Certificate::from_params(leaf_params(dns_name)).expect("self-signed cert");
    te::CertificateIdentity::from_der(cert.serialize_der().expect("self-signed der"))
}

/// Self-signed server certificate that expired in 2001.
pub fn expired_self_signed(dns_name: &str) -> te::CertificateIdentity {
    let mut params = leaf_params(dns_name);
    params.not_before = rcgen::date_time_ymd(2000, 1, 1);
    params.not_after = rcgen::date_time_ymd(2001, 1, 1);
    let cert = Certificate::from_params(params).expect("expired cert");
    te::CertificateIdentity::from_der(cert.serialize_der().expect("expired der"))
}

/// Wrap a closure as a chain oracle.
pub fn scripted<F>(f: F) -> Arc<dyn te::ChainOracle>
where
    F: Fn(&[te::CertificateIdentity], &te::TrustPolicy, &te::AnchorSnapshot) -> te::OracleVerdict
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Oracle that always fails to evaluate and counts how often it was asked.
pub fn broken_oracle() -> (Arc<dyn te::ChainOracle>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let oracle = scripted(move |_, _, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        te::OracleVerdict::Indeterminate("oracle unavailable".into())
    });
    (oracle, calls)
}

/// Oracle that reports the given failures for every chain.
pub fn failing_with(failures: &[te::ChainFailure]) -> Arc<dyn te::ChainOracle> {
    let failures: te::ChainFailures = failures.iter().copied().collect();
    scripted(move |_, _, _| te::OracleVerdict::Invalid(failures.clone()))
}

/// Isolated anchor store so tests never race on the process-wide one.
pub fn fresh_store() -> Arc<te::AnchorStore> {
    Arc::new(te::AnchorStore::new())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
