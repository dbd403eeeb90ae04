use std::{
    fmt,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use rustls::pki_types::CertificateDer;
use tracing::Level;
use trustkit_pem::{
    label, rsa::RsaPrivateKey, Certificate, PemError, PemReader, PemWriter, PrivateKey,
};

use crate::{
    error::{PoolError, ProviderError},
    key_pair::KeyPair,
    pool::{build_pool, TrustPool},
};

/// An ordered certificate chain and an optional private key.
///
/// The chain is kept as DER and only parsed when a derived view asks for it, while the key
/// is fully parsed when loaded. A provider holding a key is *private*, otherwise it is
/// *public*.
///
/// Nothing mutates a provider after it is loaded. Every derived view is a fresh copy.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Provider {
    chain: Vec<CertificateDer<'static>>,
    key: Option<PrivateKey>,
}

impl Provider {
    /// Parses a provider from PEM bytes.
    pub fn from_bytes(pem: &[u8]) -> Result<Self, ProviderError> {
        let mut provider = Self::default();
        provider.decode(&mut PemReader::from(pem))?;

        Ok(provider)
    }

    /// Loads a provider from the PEM file at `path`.
    ///
    /// The file is closed before decoding starts.
    #[tracing::instrument(level = Level::DEBUG, err(level = Level::DEBUG))]
    pub fn from_path(path: &Path) -> Result<Self, ProviderError> {
        let mut reader = {
            let file = File::open(path).map_err(|error| ProviderError::OpenFile {
                error,
                path: path.to_path_buf(),
            })?;

            PemReader::new(BufReader::new(file)).map_err(|error| ProviderError::ReadFile {
                error,
                path: path.to_path_buf(),
            })?
        };

        let mut provider = Self::default();
        provider.decode(&mut reader)?;

        tracing::debug!(
            certificates = provider.chain.len(),
            private = provider.is_private(),
            "Loaded a trust provider."
        );

        Ok(provider)
    }

    /// Same as [`Provider::from_path`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProviderError> {
        Self::from_path(path.as_ref())
    }

    /// Consumes every block of `reader`.
    ///
    /// 1. `CERTIFICATE` blocks are appended to the chain as they are.
    /// 2. Private key blocks are parsed and replace any previously decoded key.
    /// 3. Any other block aborts with [`ProviderError::UnhandledBlockType`].
    ///
    /// On error, this provider is left half-populated and should be discarded.
    pub fn decode(&mut self, reader: &mut PemReader) -> Result<(), ProviderError> {
        for block in reader.by_ref() {
            tracing::trace!(label = block.label(), "Decoding a PEM block.");

            if block.label() == label::CERTIFICATE {
                self.chain.push(block.into_contents().into());
            } else if label::is_private_key(block.label()) {
                self.key = Some(block.decode_private_key()?);
            } else {
                return Err(ProviderError::UnhandledBlockType(block.label().to_owned()));
            }
        }

        Ok(())
    }

    /// Writes the chain, each certificate re-encoded from its parsed form, followed by the
    /// key as PKCS#8.
    pub fn encode<W: Write>(&self, writer: &mut PemWriter<W>) -> Result<(), ProviderError> {
        for index in 0..self.chain.len() {
            let cert = self.certificate(index)?;
            writer.write_certificate(&cert)?;
        }

        if let Some(key) = &self.key {
            writer.write_private_key(key)?;
        }

        Ok(())
    }

    /// [`Provider::encode`] into memory.
    pub fn to_pem(&self) -> Result<Vec<u8>, ProviderError> {
        let mut writer = PemWriter::new(Vec::new());
        self.encode(&mut writer)?;

        Ok(writer.into_inner().map_err(PemError::Io)?)
    }

    /// Writes this provider to the file at `path`, replacing its contents.
    ///
    /// On error the file may hold partial output.
    #[tracing::instrument(level = Level::DEBUG, skip(self), err(level = Level::DEBUG))]
    pub fn dump(&self, path: &Path) -> Result<(), ProviderError> {
        let file = File::create(path).map_err(|error| ProviderError::CreateFile {
            error,
            path: path.to_path_buf(),
        })?;

        let mut writer = PemWriter::new(BufWriter::new(file));
        self.encode(&mut writer)?;
        writer.close().map_err(|error| ProviderError::WriteFile {
            error,
            path: path.to_path_buf(),
        })
    }

    /// The chain and the key, prepared for binding to a TLS endpoint.
    pub fn key_pair(&self) -> Result<KeyPair, ProviderError> {
        let key = self.key.as_ref().ok_or(ProviderError::MissingKey)?;
        KeyPair::new(&self.chain, key)
    }

    /// The first certificate of the chain.
    pub fn leaf_certificate(&self) -> Result<Certificate, ProviderError> {
        if self.chain.is_empty() {
            return Err(ProviderError::NoCertificates);
        }

        self.certificate(0)
    }

    /// Pool of every certificate in the chain.
    pub fn cert_pool(&self) -> Result<TrustPool, PoolError> {
        build_pool([self])
    }

    pub fn key(&self) -> Option<&PrivateKey> {
        self.key.as_ref()
    }

    pub fn rsa_key(&self) -> Result<RsaPrivateKey, ProviderError> {
        let key = self.key.as_ref().ok_or(ProviderError::MissingKey)?;

        key.as_rsa()
            .cloned()
            .ok_or(ProviderError::WrongKeyAlgorithm(key.algorithm()))
    }

    pub fn is_private(&self) -> bool {
        self.key.is_some()
    }

    /// Common name of the leaf certificate, empty when it cannot be determined.
    ///
    /// Meant for logs and display. Use [`Provider::try_common_name`] to find out what went
    /// wrong.
    pub fn common_name(&self) -> String {
        match self.try_common_name() {
            Ok(name) => name.unwrap_or_default(),
            Err(error) => {
                tracing::debug!(%error, "Failed to read the common name of a provider.");
                String::new()
            }
        }
    }

    pub fn try_common_name(&self) -> Result<Option<String>, ProviderError> {
        let leaf = self.leaf_certificate()?;
        Ok(leaf.common_name().map(str::to_owned))
    }

    /// Certificate chain in DER, leaf first.
    pub fn chain(&self) -> &[CertificateDer<'static>] {
        &self.chain
    }

    /// Number of certificates in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Copy of this provider without the private key.
    pub fn to_public(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            key: None,
        }
    }

    fn certificate(&self, index: usize) -> Result<Certificate, ProviderError> {
        let der = self.chain.get(index).ok_or(ProviderError::NoCertificates)?;

        Certificate::from_der(der.as_ref())
            .map_err(|source| ProviderError::InvalidCertificate { index, source })
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("chain_len", &self.chain.len())
            .field("key", &self.key.as_ref().map(PrivateKey::algorithm))
            .finish()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.common_name())
    }
}
