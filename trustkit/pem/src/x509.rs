//! Owned X.509 certificates and certification requests.
//!
//! [`x509_parser`] borrows from the DER it parses, so these types keep the DER bytes and
//! copy out the handful of fields the rest of the workspace needs.

use std::fmt;

use x509_parser::{
    certificate::X509Certificate, certification_request::X509CertificationRequest,
    prelude::FromDer,
};

use crate::error::{PemError, Result};

/// A parsed X.509 certificate.
///
/// Two certificates are equal when their DER encodings are equal.
#[derive(Clone)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    common_name: Option<String>,
    public_key_info: Vec<u8>,
    is_ca: bool,
}

impl Certificate {
    /// Parses a DER-encoded certificate. Trailing bytes after the certificate are rejected.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self> {
        let der = der.into();
        let (rest, cert) = X509Certificate::from_der(&der)
            .map_err(|error| PemError::DecodeCertificate(error.to_string()))?;

        if !rest.is_empty() {
            return Err(PemError::DecodeCertificate(format!(
                "{} trailing bytes after certificate",
                rest.len()
            )));
        }

        let subject = cert.subject().to_string();
        let issuer = cert.issuer().to_string();
        let common_name = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|attribute| attribute.as_str().ok())
            .map(str::to_owned);
        let public_key_info = cert.public_key().raw.to_vec();
        let is_ca = cert
            .basic_constraints()
            .ok()
            .flatten()
            .is_some_and(|extension| extension.value.ca);

        Ok(Self {
            subject,
            issuer,
            common_name,
            public_key_info,
            is_ca,
            der,
        })
    }

    /// Raw DER encoding.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn into_der(self) -> Vec<u8> {
        self.der
    }

    /// Subject distinguished name, RFC 4514 style.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Issuer distinguished name, RFC 4514 style.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// First common name of the subject, if it has one.
    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }

    /// DER encoding of the `SubjectPublicKeyInfo`.
    pub fn public_key_info(&self) -> &[u8] {
        &self.public_key_info
    }

    /// Whether the basic constraints extension marks this certificate as a CA.
    pub fn is_ca(&self) -> bool {
        self.is_ca
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("is_ca", &self.is_ca)
            .finish_non_exhaustive()
    }
}

/// A parsed PKCS#10 certification request.
#[derive(Clone)]
pub struct CertificateRequest {
    der: Vec<u8>,
    subject: String,
    public_key_info: Vec<u8>,
}

impl CertificateRequest {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self> {
        let der = der.into();
        let (rest, csr) = X509CertificationRequest::from_der(&der)
            .map_err(|error| PemError::DecodeCsr(error.to_string()))?;

        if !rest.is_empty() {
            return Err(PemError::DecodeCsr(format!(
                "{} trailing bytes after certificate request",
                rest.len()
            )));
        }

        let info = &csr.certification_request_info;
        let subject = info.subject.to_string();
        let public_key_info = info.subject_pki.raw.to_vec();

        Ok(Self {
            der,
            subject,
            public_key_info,
        })
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn public_key_info(&self) -> &[u8] {
        &self.public_key_info
    }
}

impl PartialEq for CertificateRequest {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for CertificateRequest {}

impl fmt::Debug for CertificateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateRequest")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}
