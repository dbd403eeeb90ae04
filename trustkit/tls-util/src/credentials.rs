use std::{fmt, io, sync::Arc};

use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::{client, server, TlsAcceptor, TlsConnector};
use tracing::Level;

use crate::{
    error::TlsConfigError,
    provider::Provider,
    tls_config::{tls_config, TlsConfig},
    uri_ext::Endpoint,
};

/// Server side of an mTLS transport.
pub struct ServerCredentials {
    config: TlsConfig,
    acceptor: TlsAcceptor,
}

impl ServerCredentials {
    pub fn config(&self) -> &TlsConfig {
        &self.config
    }

    pub fn acceptor(&self) -> &TlsAcceptor {
        &self.acceptor
    }

    /// Runs the server side of the TLS handshake over `stream`.
    pub async fn accept<IO>(&self, stream: IO) -> io::Result<server::TlsStream<IO>>
    where
        IO: AsyncRead + AsyncWrite + Unpin,
    {
        self.acceptor.accept(stream).await
    }
}

impl fmt::Debug for ServerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerCredentials")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Client side of an mTLS transport, bound to one remote endpoint.
pub struct ClientCredentials {
    config: TlsConfig,
    connector: TlsConnector,
    server_name: ServerName<'static>,
}

impl ClientCredentials {
    pub fn config(&self) -> &TlsConfig {
        &self.config
    }

    pub fn connector(&self) -> &TlsConnector {
        &self.connector
    }

    /// Name the server certificate is verified against.
    pub fn server_name(&self) -> &ServerName<'static> {
        &self.server_name
    }

    /// Runs the client side of the TLS handshake over `stream`.
    pub async fn connect<IO>(&self, stream: IO) -> io::Result<client::TlsStream<IO>>
    where
        IO: AsyncRead + AsyncWrite + Unpin,
    {
        self.connector
            .connect(self.server_name.clone(), stream)
            .await
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("config", &self.config)
            .field("server_name", &self.server_name)
            .finish_non_exhaustive()
    }
}

/// Builds the server side of an mTLS transport from [`tls_config`], unchanged.
#[tracing::instrument(level = Level::DEBUG, skip_all, fields(chain = %chain), err(level = Level::DEBUG))]
pub fn server_credentials(
    chain: &Provider,
    trusted: &[&Provider],
) -> Result<ServerCredentials, TlsConfigError> {
    let config = tls_config(chain, trusted)?;
    let acceptor = TlsAcceptor::from(Arc::new(config.server_config()?));

    Ok(ServerCredentials { config, acceptor })
}

/// Builds the client side of an mTLS transport connecting to `endpoint`.
///
/// The configuration from [`tls_config`] is turned around with [`TlsConfig::into_client`],
/// expecting the server to be named after the endpoint host (and port, when written).
#[tracing::instrument(level = Level::DEBUG, skip(chain, trusted), fields(chain = %chain), err(level = Level::DEBUG))]
pub fn client_credentials(
    endpoint: &str,
    chain: &Provider,
    trusted: &[&Provider],
) -> Result<ClientCredentials, TlsConfigError> {
    let config = tls_config(chain, trusted)?;

    let endpoint = Endpoint::parse(endpoint).map_err(|source| TlsConfigError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        source,
    })?;

    let config = config.into_client(endpoint.server_name_hint().to_owned());
    let connector = TlsConnector::from(Arc::new(config.client_config()?));

    Ok(ClientCredentials {
        config,
        connector,
        server_name: endpoint.server_name().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EndpointError;

    const NODE3: &[u8] = include_bytes!("../tests/fixtures/node3.pem");
    const NODE3_CERT: &[u8] = include_bytes!("../tests/fixtures/node3.crt.pem");

    #[test]
    fn invalid_endpoint() {
        let provider = Provider::from_bytes(NODE3).unwrap();

        let error = client_credentials("/no/host", &provider, &[]).unwrap_err();
        assert!(matches!(
            error,
            TlsConfigError::InvalidEndpoint {
                source: EndpointError::MissingHost,
                ..
            }
        ));
    }

    #[test]
    fn public_provider_is_rejected() {
        let provider = Provider::from_bytes(NODE3_CERT).unwrap();

        assert!(matches!(
            server_credentials(&provider, &[]),
            Err(TlsConfigError::PrivateKeyRequired)
        ));
        assert!(matches!(
            client_credentials("https://node-3.example.net", &provider, &[]),
            Err(TlsConfigError::PrivateKeyRequired)
        ));
    }
}
