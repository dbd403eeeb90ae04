use thiserror::Error;
use trustkit_tls_util::error::{EndpointError, ProviderError, TlsConfigError};

/// Errors that can occur when loading or using an [`MtlsConfig`](crate::MtlsConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: connecting via mTLS requires `cert_path`")]
    MissingCertPath,
    #[error("invalid configuration: a client requires `endpoint`")]
    MissingEndpoint,
    #[error("invalid configuration: endpoint `{endpoint}` is invalid: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: EndpointError,
    },
    #[error("failed to read configuration from the environment: {0}")]
    Env(#[from] envy::Error),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    TlsConfig(#[from] TlsConfigError),
}
