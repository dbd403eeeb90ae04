use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use trustkit_config::ConfigError;
use trustkit_tls_util::error::{ProviderError, TlsConfigError};

pub(crate) type CliResult<T, E = CliError> = core::result::Result<T, E>;

const PROVIDER_HELP: &str = r#"A trust provider is a PEM file holding `CERTIFICATE` blocks, leaf first, and at most one private key block (`PRIVATE KEY`, `RSA PRIVATE KEY` or `EC PRIVATE KEY`)."#;

const CREDENTIALS_HELP: &str = r#"The first file must hold a private key matching its first certificate.

- The endpoint must be a URI with a host, e.g. `https://node-3.example.net:4443`.

- Files passed with `--trusted` may hold certificates only."#;

#[derive(Debug, Error, Diagnostic)]
pub(crate) enum CliError {
    #[error("Failed to install the default rustls crypto provider")]
    #[diagnostic(help("Another crypto provider was installed before the CLI started."))]
    CryptoProvider,

    #[error("Failed to load trust provider from `{0}`: {1}")]
    #[diagnostic(help("{PROVIDER_HELP}"))]
    LoadProvider(PathBuf, #[source] ProviderError),

    #[error("Failed to write trust provider to `{0}`: {1}")]
    #[diagnostic(help("Check that the parent directory exists and is writable."))]
    DumpProvider(PathBuf, #[source] ProviderError),

    #[error("Failed to build server credentials: {0}")]
    #[diagnostic(help("{CREDENTIALS_HELP}"))]
    ServerCredentials(#[source] TlsConfigError),

    #[error("Failed to build client credentials: {0}")]
    #[diagnostic(help("{CREDENTIALS_HELP}"))]
    ClientCredentials(#[source] TlsConfigError),

    #[error("Invalid mTLS configuration: {error}")]
    #[diagnostic(help(
        "Set `{prefix}CERT_PATH` to a private trust provider, or `{prefix}INSECURE=true` to skip mTLS."
    ))]
    Config {
        prefix: String,
        #[source]
        error: ConfigError,
    },
}
