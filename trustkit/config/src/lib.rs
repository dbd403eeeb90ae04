//! mTLS settings of a service, read from the environment or any serde source.
//!
//! ```text
//! <PREFIX>INSECURE=false
//! <PREFIX>CERT_PATH=/etc/trustkit/node.pem
//! <PREFIX>POOL_PATH=/etc/trustkit/pool.pem
//! <PREFIX>ENDPOINT=https://node-3.example.net:4443
//! ```

mod error;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::Level;
use trustkit_tls_util::{
    client_credentials, server_credentials, ClientCredentials, Endpoint, Provider,
    ServerCredentials,
};

pub use crate::error::ConfigError;

/// mTLS settings of one connection.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct MtlsConfig {
    /// Skip mTLS entirely and use plain connections.
    pub insecure: bool,
    /// PEM file holding this endpoint's certificate chain and private key.
    ///
    /// Required unless [`MtlsConfig::insecure`] is set.
    pub cert_path: Option<PathBuf>,
    /// PEM file holding additional certificates to trust when verifying peers.
    pub pool_path: Option<PathBuf>,
    /// Remote endpoint to connect to, required by clients.
    ///
    /// Must be a URI with a host, e.g. `https://node-3.example.net:4443`.
    pub endpoint: Option<String>,
}

impl MtlsConfig {
    /// Reads the settings from environment variables starting with `prefix`.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        Ok(envy::prefixed(prefix).from_env()?)
    }

    /// Reads the settings from `vars`, as if they were environment variables.
    pub fn from_vars<I>(prefix: &str, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(prefix).from_iter(vars)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.insecure && self.cert_path.is_none() {
            return Err(ConfigError::MissingCertPath);
        }

        if let Some(endpoint) = self.endpoint.as_deref() {
            self.parse_endpoint(endpoint)?;
        }

        Ok(())
    }

    /// Loads the private provider from [`MtlsConfig::cert_path`].
    pub fn load_chain(&self) -> Result<Provider, ConfigError> {
        let path = self.cert_path.as_ref().ok_or(ConfigError::MissingCertPath)?;
        Ok(Provider::from_path(path)?)
    }

    /// Loads the provider from [`MtlsConfig::pool_path`], if set.
    pub fn load_trusted(&self) -> Result<Option<Provider>, ConfigError> {
        self.pool_path
            .as_deref()
            .map(Provider::from_path)
            .transpose()
            .map_err(ConfigError::from)
    }

    /// Server credentials, or [`None`] when insecure.
    #[tracing::instrument(level = Level::DEBUG, err(level = Level::DEBUG))]
    pub fn server_credentials(&self) -> Result<Option<ServerCredentials>, ConfigError> {
        if self.insecure {
            return Ok(None);
        }

        let chain = self.load_chain()?;
        let trusted = self.load_trusted()?;

        Ok(Some(server_credentials(&chain, &trusted.iter().collect::<Vec<_>>())?))
    }

    /// Client credentials for [`MtlsConfig::endpoint`], or [`None`] when insecure.
    #[tracing::instrument(level = Level::DEBUG, err(level = Level::DEBUG))]
    pub fn client_credentials(&self) -> Result<Option<ClientCredentials>, ConfigError> {
        if self.insecure {
            return Ok(None);
        }

        let endpoint = self.endpoint.as_deref().ok_or(ConfigError::MissingEndpoint)?;
        self.parse_endpoint(endpoint)?;

        let chain = self.load_chain()?;
        let trusted = self.load_trusted()?;

        Ok(Some(client_credentials(
            endpoint,
            &chain,
            &trusted.iter().collect::<Vec<_>>(),
        )?))
    }

    fn parse_endpoint(&self, endpoint: &str) -> Result<Endpoint, ConfigError> {
        Endpoint::parse(endpoint).map_err(|source| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            source,
        })
    }
}
