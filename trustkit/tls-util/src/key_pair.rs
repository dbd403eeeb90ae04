use std::fmt;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tracing::Level;
use trustkit_pem::{Certificate, PemWriter, PrivateKey, PublicKey};

use crate::error::ProviderError;

/// A certificate chain and its private key, ready to be bound to a TLS endpoint.
///
/// Holds both the PEM encodings and the rustls DER types read back from them. The leaf is
/// the first certificate of the chain, and its public key matches the private key.
pub struct KeyPair {
    cert_pem: Vec<u8>,
    key_pem: Vec<u8>,
    cert_chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl KeyPair {
    /// Encodes the chain and the key, then reads them back the way a PEM file would be read.
    #[tracing::instrument(level = Level::TRACE, skip_all, err(level = Level::DEBUG))]
    pub(crate) fn new(
        chain: &[CertificateDer<'static>],
        key: &PrivateKey,
    ) -> Result<Self, ProviderError> {
        let leaf = chain.first().ok_or(ProviderError::NoCertificates)?;
        let leaf = Certificate::from_der(leaf.as_ref())
            .map_err(|source| ProviderError::InvalidCertificate { index: 0, source })?;

        if PublicKey::from_pkix_der(leaf.public_key_info())? != key.public_key() {
            return Err(ProviderError::KeyMismatch);
        }

        let mut writer = PemWriter::new(Vec::new());
        for cert in chain {
            writer.write_block(trustkit_pem::label::CERTIFICATE, cert.as_ref())?;
        }
        let cert_pem = writer.into_inner().map_err(ProviderError::KeyPairReadBack)?;
        let key_pem = trustkit_pem::encode_private_key(key)?;

        let cert_chain = rustls_pemfile::certs(&mut cert_pem.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .map_err(ProviderError::KeyPairReadBack)?;
        let key = rustls_pemfile::private_key(&mut key_pem.as_slice())
            .map_err(ProviderError::KeyPairReadBack)?
            .ok_or(ProviderError::MissingKey)?;

        Ok(Self {
            cert_pem,
            key_pem,
            cert_chain,
            key,
        })
    }

    /// PEM encoded certificate chain, leaf first.
    pub fn cert_pem(&self) -> &[u8] {
        &self.cert_pem
    }

    /// PKCS#8 PEM encoded private key.
    pub fn key_pem(&self) -> &[u8] {
        &self.key_pem
    }

    pub fn cert_chain(&self) -> &[CertificateDer<'static>] {
        &self.cert_chain
    }

    pub fn key_der(&self) -> PrivateKeyDer<'static> {
        self.key.clone_key()
    }

    pub fn leaf(&self) -> Option<&CertificateDer<'static>> {
        self.cert_chain.first()
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self {
            cert_pem: self.cert_pem.clone(),
            key_pem: self.key_pem.clone(),
            cert_chain: self.cert_chain.clone(),
            key: self.key.clone_key(),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("cert_chain_len", &self.cert_chain.len())
            .finish_non_exhaustive()
    }
}
