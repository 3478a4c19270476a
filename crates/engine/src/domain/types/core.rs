use std::fmt;

use sha2::{Digest, Sha256};

/// Raw encoded bytes of one certificate (DER as presented on the wire).
/// Two identities are equal iff their bytes are identical.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CertificateIdentity {
    der: Vec<u8>,
}

impl CertificateIdentity {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Self {
        Self { der: der.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.der
    }

    pub fn len(&self) -> usize {
        self.der.len()
    }

    pub fn is_empty(&self) -> bool {
        self.der.is_empty()
    }

    /// Lowercase hex SHA-256 of the encoded certificate.
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.der))
    }
}

impl From<Vec<u8>> for CertificateIdentity {
    fn from(der: Vec<u8>) -> Self {
        Self::from_der(der)
    }
}

impl From<&[u8]> for CertificateIdentity {
    fn from(der: &[u8]) -> Self {
        Self::from_der(der.to_vec())
    }
}

impl AsRef<[u8]> for CertificateIdentity {
    fn as_ref(&self) -> &[u8] {
        &self.der
    }
}

// Certificates are printed by fingerprint only.
impl fmt::Debug for CertificateIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateIdentity")
            .field("len", &self.der.len())
            .field("sha256", &self.sha256_hex())
            .finish()
    }
}
