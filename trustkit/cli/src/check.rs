use std::{fmt, path::Path};

use tracing::Level;
use trustkit_config::MtlsConfig;
use trustkit_tls_util::{
    client_credentials, server_credentials, ClientCredentials, Provider, ServerCredentials,
};

use crate::error::{CliError, CliResult};

/// What `trustkit check` and `trustkit env` print.
#[derive(Debug)]
pub(crate) struct CredentialsReport {
    pub(crate) server: Option<ServerCredentials>,
    pub(crate) client: Option<ClientCredentials>,
}

impl fmt::Display for CredentialsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.server.is_none() && self.client.is_none() {
            return writeln!(f, "mTLS disabled");
        }

        if let Some(server) = &self.server {
            let config = server.config();
            writeln!(
                f,
                "server: ok ({:?}, {:?}, {} client CAs)",
                config.min_version(),
                config.client_auth(),
                config.client_cas().map(|pool| pool.len()).unwrap_or_default()
            )?;
        }

        if let Some(client) = &self.client {
            let config = client.config();
            writeln!(
                f,
                "client: ok (server name {}, {} root CAs)",
                config.server_name().unwrap_or_default(),
                config.root_cas().map(|pool| pool.len()).unwrap_or_default()
            )?;
        }

        Ok(())
    }
}

/// Builds server credentials from the provider at `path`, and client credentials for
/// `endpoint` when given.
#[tracing::instrument(level = Level::DEBUG, err(level = Level::DEBUG))]
pub(crate) fn check(
    path: &Path,
    trusted: &[impl AsRef<Path> + fmt::Debug],
    endpoint: Option<&str>,
) -> CliResult<CredentialsReport> {
    let chain =
        Provider::load(path).map_err(|error| CliError::LoadProvider(path.to_owned(), error))?;

    let trusted = trusted
        .iter()
        .map(|path| {
            let path = path.as_ref();
            Provider::load(path).map_err(|error| CliError::LoadProvider(path.to_owned(), error))
        })
        .collect::<CliResult<Vec<_>>>()?;
    let trusted = trusted.iter().collect::<Vec<_>>();

    let server = server_credentials(&chain, &trusted).map_err(CliError::ServerCredentials)?;

    let client = endpoint
        .map(|endpoint| client_credentials(endpoint, &chain, &trusted))
        .transpose()
        .map_err(CliError::ClientCredentials)?;

    Ok(CredentialsReport {
        server: Some(server),
        client,
    })
}

/// Same as [`check`], with the settings read from environment variables starting with
/// `prefix`.
#[tracing::instrument(level = Level::DEBUG, err(level = Level::DEBUG))]
pub(crate) fn check_env(prefix: &str) -> CliResult<CredentialsReport> {
    check_config(prefix, MtlsConfig::from_env(prefix))
}

fn check_config(
    prefix: &str,
    config: Result<MtlsConfig, trustkit_config::ConfigError>,
) -> CliResult<CredentialsReport> {
    let config_error = |error| CliError::Config {
        prefix: prefix.to_owned(),
        error,
    };

    let config = config.map_err(config_error)?;
    config.validate().map_err(config_error)?;

    let server = config.server_credentials().map_err(config_error)?;
    let client = match config.endpoint {
        Some(..) => config.client_credentials().map_err(config_error)?,
        None => None,
    };

    Ok(CredentialsReport { server, client })
}
