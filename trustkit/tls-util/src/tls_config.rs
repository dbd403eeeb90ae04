use std::sync::Arc;

use rustls::{
    crypto::CryptoProvider, server::WebPkiClientVerifier, CipherSuite, ClientConfig, NamedGroup,
    ProtocolVersion, ServerConfig, SupportedProtocolVersion,
};
use tracing::Level;

use crate::{
    error::TlsConfigError,
    key_pair::KeyPair,
    pool::{build_pool, TrustPool},
    provider::Provider,
};

static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];

/// Elliptic curves offered for the key exchange, by preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Curve {
    P521,
    P384,
    P256,
}

impl Curve {
    pub fn named_group(self) -> NamedGroup {
        match self {
            Self::P521 => NamedGroup::secp521r1,
            Self::P384 => NamedGroup::secp384r1,
            Self::P256 => NamedGroup::secp256r1,
        }
    }
}

/// Key exchange curves of every configuration built with [`tls_config`].
pub const CURVE_PREFERENCES: [Curve; 3] = [Curve::P521, Curve::P384, Curve::P256];

/// Cipher suites of every configuration built with [`tls_config`].
///
/// These only matter when TLS 1.2 is negotiated, which the TLS 1.3 minimum rules out.
/// TLS 1.3 suites are always offered.
pub const CIPHER_SUITES: [CipherSuite; 4] = [
    CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
    CipherSuite::TLS_RSA_WITH_AES_256_GCM_SHA384,
    CipherSuite::TLS_RSA_WITH_AES_128_GCM_SHA256,
];

/// Client certificate policy of a server.
///
/// Every configuration built here requires and verifies client certificates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientAuth {
    RequireAndVerifyClientCert,
}

/// Hardened mTLS settings of one endpoint, independent of the TLS library.
///
/// Built with [`tls_config`] in the server orientation, turned into the client orientation
/// with [`TlsConfig::into_client`]. Bind it with [`TlsConfig::server_config`] or
/// [`TlsConfig::client_config`].
#[derive(Clone, Debug)]
pub struct TlsConfig {
    certificate: KeyPair,
    min_version: ProtocolVersion,
    curve_preferences: Vec<Curve>,
    cipher_suites: Vec<CipherSuite>,
    client_auth: ClientAuth,
    client_cas: Option<TrustPool>,
    root_cas: Option<TrustPool>,
    server_name: Option<String>,
}

impl TlsConfig {
    /// Moves the pool from the client CA slot to the root CA slot and sets the expected
    /// server name. Nothing else changes.
    pub fn into_client(mut self, server_name: String) -> Self {
        self.root_cas = self.client_cas.take();
        self.server_name = Some(server_name);
        self
    }

    /// The local identity.
    pub fn certificate(&self) -> &KeyPair {
        &self.certificate
    }

    pub fn min_version(&self) -> ProtocolVersion {
        self.min_version
    }

    pub fn curve_preferences(&self) -> &[Curve] {
        &self.curve_preferences
    }

    pub fn cipher_suites(&self) -> &[CipherSuite] {
        &self.cipher_suites
    }

    pub fn client_auth(&self) -> ClientAuth {
        self.client_auth
    }

    /// Pool used to verify client certificates.
    pub fn client_cas(&self) -> Option<&TrustPool> {
        self.client_cas.as_ref()
    }

    /// Pool used to verify the server certificate.
    pub fn root_cas(&self) -> Option<&TrustPool> {
        self.root_cas.as_ref()
    }

    /// Name the client expects the server to have.
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    /// The `aws-lc-rs` crypto provider restricted to the preferred curves, in order.
    ///
    /// Curves the provider does not implement are skipped.
    pub fn crypto_provider(&self) -> Result<CryptoProvider, TlsConfigError> {
        let mut provider = rustls::crypto::aws_lc_rs::default_provider();

        let kx_groups = self
            .curve_preferences
            .iter()
            .filter_map(|curve| {
                let group = provider
                    .kx_groups
                    .iter()
                    .find(|group| group.name() == curve.named_group())
                    .copied();

                if group.is_none() {
                    tracing::debug!(
                        ?curve,
                        "Curve is not supported by the crypto provider, skipping."
                    );
                }

                group
            })
            .collect::<Vec<_>>();

        if kx_groups.is_empty() {
            return Err(TlsConfigError::NoKeyExchangeGroups);
        }

        let cipher_suites = provider
            .cipher_suites
            .iter()
            .filter(|suite| {
                suite.version().version == ProtocolVersion::TLSv1_3
                    || self.cipher_suites.contains(&suite.suite())
            })
            .copied()
            .collect::<Vec<_>>();

        provider.kx_groups = kx_groups;
        provider.cipher_suites = cipher_suites;

        Ok(provider)
    }

    /// Builds the rustls configuration of the server orientation.
    #[tracing::instrument(level = Level::DEBUG, skip(self), err(level = Level::DEBUG))]
    pub fn server_config(&self) -> Result<ServerConfig, TlsConfigError> {
        let provider = Arc::new(self.crypto_provider()?);

        let roots = self
            .client_cas
            .as_ref()
            .ok_or(TlsConfigError::MissingClientCas)?
            .root_store()?;
        let verifier =
            WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
                .build()?;

        ServerConfig::builder_with_provider(provider)
            .with_protocol_versions(TLS13_ONLY)
            .map_err(TlsConfigError::ProtocolVersions)?
            .with_client_cert_verifier(verifier)
            .with_single_cert(
                self.certificate.cert_chain().to_vec(),
                self.certificate.key_der(),
            )
            .map_err(TlsConfigError::InvalidCertChain)
    }

    /// Builds the rustls configuration of the client orientation.
    #[tracing::instrument(level = Level::DEBUG, skip(self), err(level = Level::DEBUG))]
    pub fn client_config(&self) -> Result<ClientConfig, TlsConfigError> {
        let provider = Arc::new(self.crypto_provider()?);

        let roots = self
            .root_cas
            .as_ref()
            .ok_or(TlsConfigError::MissingRootCas)?
            .root_store()?;

        ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(TLS13_ONLY)
            .map_err(TlsConfigError::ProtocolVersions)?
            .with_root_certificates(roots)
            .with_client_auth_cert(
                self.certificate.cert_chain().to_vec(),
                self.certificate.key_der(),
            )
            .map_err(TlsConfigError::InvalidCertChain)
    }
}

/// Builds the hardened mTLS configuration of `chain`, in the server orientation.
///
/// `chain` must be private. Its key pair becomes the only local identity, and the pool
/// verifying peers holds the certificates of `chain` followed by those of `trusted`.
#[tracing::instrument(level = Level::DEBUG, skip_all, fields(chain = %chain, trusted = trusted.len()), err(level = Level::DEBUG))]
pub fn tls_config(chain: &Provider, trusted: &[&Provider]) -> Result<TlsConfig, TlsConfigError> {
    if !chain.is_private() {
        return Err(TlsConfigError::PrivateKeyRequired);
    }

    let certificate = chain.key_pair()?;
    let pool = build_pool(std::iter::once(chain).chain(trusted.iter().copied()))?;

    Ok(TlsConfig {
        certificate,
        min_version: ProtocolVersion::TLSv1_3,
        curve_preferences: CURVE_PREFERENCES.to_vec(),
        cipher_suites: CIPHER_SUITES.to_vec(),
        client_auth: ClientAuth::RequireAndVerifyClientCert,
        client_cas: Some(pool),
        root_cas: None,
        server_name: None,
    })
}
