use std::io;

use thiserror::Error;

/// Errors that can occur when reading, writing or decoding PEM blocks.
#[derive(Error, Debug)]
pub enum PemError {
    #[error("failed to decode private key: {0}")]
    DecodePrivateKey(String),
    #[error("failed to decode public key: {0}")]
    DecodePublicKey(String),
    #[error("failed to decode certificate: {0}")]
    DecodeCertificate(String),
    #[error("failed to decode certificate request: {0}")]
    DecodeCsr(String),
    #[error("failed to encode private key as PKCS#8: {0}")]
    EncodePrivateKey(#[source] rsa::pkcs8::Error),
    #[error("failed to encode public key as PKIX: {0}")]
    EncodePublicKey(#[source] rsa::pkcs8::spki::Error),
    #[error("PEM I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl PemError {
    /// Reason used when a typed decoder is handed a block with the wrong label.
    pub(crate) fn unexpected_label(label: &str) -> String {
        format!("unexpected `{label}` block")
    }
}

pub type Result<T, E = PemError> = std::result::Result<T, E>;
