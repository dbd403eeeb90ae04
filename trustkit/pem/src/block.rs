use pem::{EncodeConfig, LineEnding, Pem};

use crate::{
    error::{PemError, Result},
    key::{PrivateKey, PublicKey},
    label,
    x509::{Certificate, CertificateRequest},
};

/// A single PEM block: a label and its DER payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    label: String,
    contents: Vec<u8>,
}

impl Block {
    pub fn new(label: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            contents: contents.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn into_contents(self) -> Vec<u8> {
        self.contents
    }

    /// Decodes a private key, choosing the DER schema from the label.
    ///
    /// 1. `EC PRIVATE KEY` is parsed as SEC1.
    /// 2. `RSA PRIVATE KEY` is parsed as PKCS#1.
    /// 3. `PRIVATE KEY` is parsed as PKCS#8, falling back to PKCS#1 and then SEC1, since
    ///    some tools mislabel their output.
    ///
    /// Any other label is an error.
    pub fn decode_private_key(&self) -> Result<PrivateKey> {
        match self.label() {
            label::EC_PRIVATE_KEY => PrivateKey::from_sec1_der(&self.contents),
            label::RSA_PRIVATE_KEY => PrivateKey::from_pkcs1_der(&self.contents),
            label::PRIVATE_KEY => PrivateKey::from_pkcs8_der(&self.contents)
                .or_else(|_| PrivateKey::from_pkcs1_der(&self.contents))
                .or_else(|_| PrivateKey::from_sec1_der(&self.contents))
                .map_err(|_| {
                    PemError::DecodePrivateKey(
                        "contents are neither PKCS#8, PKCS#1 nor SEC1".to_string(),
                    )
                }),
            other => Err(PemError::DecodePrivateKey(PemError::unexpected_label(
                other,
            ))),
        }
    }

    /// Decodes a public key: `RSA PUBLIC KEY` as PKCS#1, `PUBLIC KEY` as PKIX.
    pub fn decode_public_key(&self) -> Result<PublicKey> {
        match self.label() {
            label::RSA_PUBLIC_KEY => PublicKey::from_pkcs1_der(&self.contents),
            label::PUBLIC_KEY => PublicKey::from_pkix_der(&self.contents),
            other => Err(PemError::DecodePublicKey(PemError::unexpected_label(other))),
        }
    }

    pub fn decode_certificate(&self) -> Result<Certificate> {
        if self.label() != label::CERTIFICATE {
            return Err(PemError::DecodeCertificate(PemError::unexpected_label(
                self.label(),
            )));
        }

        Certificate::from_der(self.contents.as_slice())
    }

    pub fn decode_csr(&self) -> Result<CertificateRequest> {
        if self.label() != label::CERTIFICATE_REQUEST {
            return Err(PemError::DecodeCsr(PemError::unexpected_label(
                self.label(),
            )));
        }

        CertificateRequest::from_der(self.contents.as_slice())
    }

    /// Encodes this block as PEM text, base64 wrapped at 64 columns with LF line endings.
    pub fn encode(&self) -> String {
        pem::encode_config(
            &Pem::new(self.label.as_str(), self.contents.as_slice()),
            encode_config(),
        )
    }
}

impl From<Pem> for Block {
    fn from(pem: Pem) -> Self {
        Self {
            label: pem.tag().to_owned(),
            contents: pem.into_contents(),
        }
    }
}

pub(crate) fn encode_config() -> EncodeConfig {
    EncodeConfig::new().set_line_ending(LineEnding::LF)
}
