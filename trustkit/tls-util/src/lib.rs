//! Trust material for mutually authenticated TLS.
//!
//! A [`Provider`] holds a certificate chain and, optionally, the private key of its leaf.
//! Private providers identify an endpoint, public ones only extend the [`TrustPool`] used to
//! verify peers. [`tls_config`] combines them into a hardened [`TlsConfig`], which
//! [`server_credentials`] and [`client_credentials`] bind to [`tokio_rustls`].
//!
//! None of the functions here installs a process-wide rustls
//! [`CryptoProvider`](rustls::crypto::CryptoProvider). Every rustls configuration is built
//! with its own provider, see [`TlsConfig::crypto_provider`].

mod credentials;
pub mod error;
mod key_pair;
mod pool;
mod provider;
mod tls_config;
mod uri_ext;

pub use credentials::{client_credentials, server_credentials, ClientCredentials, ServerCredentials};
pub use key_pair::KeyPair;
pub use pool::{build_pool, TrustPool};
pub use provider::Provider;
pub use tls_config::{tls_config, ClientAuth, Curve, TlsConfig, CIPHER_SUITES, CURVE_PREFERENCES};
pub use uri_ext::{Endpoint, UriExt};
pub use {rustls, tokio_rustls, trustkit_pem as pem};
