use std::{io, path::PathBuf};

use http::uri::InvalidUri;
use rustls::{pki_types::InvalidDnsNameError, server::VerifierBuilderError};
use thiserror::Error;
use trustkit_pem::{KeyAlgorithm, PemError};

/// Errors that can occur when loading, dumping or inspecting a [`Provider`](crate::Provider).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to open PEM file `{path}`: {error}")]
    OpenFile {
        #[source]
        error: io::Error,
        path: PathBuf,
    },
    #[error("failed to read PEM file `{path}`: {error}")]
    ReadFile {
        #[source]
        error: io::Error,
        path: PathBuf,
    },
    #[error("failed to create PEM file `{path}`: {error}")]
    CreateFile {
        #[source]
        error: io::Error,
        path: PathBuf,
    },
    #[error("failed to write PEM file `{path}`: {error}")]
    WriteFile {
        #[source]
        error: io::Error,
        path: PathBuf,
    },
    #[error(transparent)]
    Pem(#[from] PemError),
    #[error("unhandled PEM block type `{0}`")]
    UnhandledBlockType(String),
    #[error("provider does not hold a private key")]
    MissingKey,
    #[error("provider does not hold any certificates")]
    NoCertificates,
    #[error("expected an RSA private key, found {0}")]
    WrongKeyAlgorithm(KeyAlgorithm),
    #[error("certificate {index} of the chain is invalid: {source}")]
    InvalidCertificate {
        index: usize,
        #[source]
        source: PemError,
    },
    #[error("private key does not match the public key of the leaf certificate")]
    KeyMismatch,
    #[error("key pair PEM could not be read back: {0}")]
    KeyPairReadBack(#[source] io::Error),
}

/// Errors that can occur when building a [`TrustPool`](crate::TrustPool).
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("certificate {certificate} of provider {provider} is invalid: {source}")]
    InvalidCertificate {
        provider: usize,
        certificate: usize,
        #[source]
        source: PemError,
    },
    #[error("certificate was rejected by the root store: {0}")]
    RootStore(#[source] rustls::Error),
}

/// Reasons for rejecting a remote endpoint.
#[derive(Error, Debug)]
pub enum EndpointError {
    #[error(transparent)]
    Parse(#[from] InvalidUri),
    #[error("endpoint has no host")]
    MissingHost,
    #[error(transparent)]
    InvalidServerName(#[from] InvalidDnsNameError),
}

/// Errors that can occur when building a [`TlsConfig`](crate::TlsConfig) or the credentials
/// derived from it.
#[derive(Error, Debug)]
pub enum TlsConfigError {
    #[error("a private provider is required to build an mTLS configuration")]
    PrivateKeyRequired,
    #[error("invalid endpoint `{endpoint}`: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: EndpointError,
    },
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("none of the preferred curves is supported by the crypto provider")]
    NoKeyExchangeGroups,
    #[error("configuration has no client CA pool to verify client certificates with")]
    MissingClientCas,
    #[error("configuration has no root CA pool to verify the server with")]
    MissingRootCas,
    #[error("crypto provider is inconsistent with the protocol versions: {0}")]
    ProtocolVersions(#[source] rustls::Error),
    #[error("failed to build client verifier: {0}")]
    VerifierBuildError(#[from] VerifierBuilderError),
    #[error("certificate chain was rejected: {0}")]
    InvalidCertChain(#[source] rustls::Error),
}

/// Errors of the zip archive container holding several providers.
///
/// Reserved for the archive format, nothing in this crate produces them yet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderPoolError {
    #[error("provider pool archive contains no providers")]
    ZipEmpty,
    #[error("provider pool archive contains {0} entries where one was expected")]
    ZipTooMany(usize),
}
