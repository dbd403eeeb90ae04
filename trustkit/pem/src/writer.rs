use std::io::{self, Write};

use pem::Pem;

use crate::{
    block::encode_config,
    error::Result,
    key::{PrivateKey, PublicKey},
    label,
    x509::{Certificate, CertificateRequest},
};

/// Writes PEM blocks to a byte sink, in call order.
///
/// Every block is base64 wrapped at 64 columns with LF line endings.
#[derive(Debug)]
pub struct PemWriter<W: Write> {
    sink: W,
}

impl<W: Write> PemWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn write_block(&mut self, label: &str, contents: &[u8]) -> Result<()> {
        let text = pem::encode_config(&Pem::new(label, contents), encode_config());
        self.sink.write_all(text.as_bytes())?;

        Ok(())
    }

    /// Writes `key` as a PKCS#8 `PRIVATE KEY` block.
    pub fn write_private_key(&mut self, key: &PrivateKey) -> Result<()> {
        let der = key.to_pkcs8_der()?;
        self.write_block(label::PRIVATE_KEY, &der)
    }

    /// Writes `key` as a PKIX `PUBLIC KEY` block.
    pub fn write_public_key(&mut self, key: &PublicKey) -> Result<()> {
        let der = key.to_pkix_der()?;
        self.write_block(label::PUBLIC_KEY, &der)
    }

    pub fn write_certificate(&mut self, cert: &Certificate) -> Result<()> {
        self.write_block(label::CERTIFICATE, cert.der())
    }

    pub fn write_csr(&mut self, csr: &CertificateRequest) -> Result<()> {
        self.write_block(label::CERTIFICATE_REQUEST, csr.der())
    }

    /// Writes `bytes` to the sink as they are, without PEM encoding.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink.write_all(bytes)?;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    /// Flushes and returns the sink.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }

    /// Flushes and drops the sink, which closes it if it owns a resource.
    pub fn close(self) -> io::Result<()> {
        self.into_inner().map(drop)
    }
}

fn encode_with<F>(write: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut PemWriter<Vec<u8>>) -> Result<()>,
{
    let mut writer = PemWriter::new(Vec::new());
    write(&mut writer)?;

    Ok(writer.sink)
}

/// Encodes `key` as a PKCS#8 `PRIVATE KEY` PEM block.
pub fn encode_private_key(key: &PrivateKey) -> Result<Vec<u8>> {
    encode_with(|writer| writer.write_private_key(key))
}

/// Encodes `key` as a PKIX `PUBLIC KEY` PEM block.
pub fn encode_public_key(key: &PublicKey) -> Result<Vec<u8>> {
    encode_with(|writer| writer.write_public_key(key))
}

pub fn encode_certificate(cert: &Certificate) -> Vec<u8> {
    pem::encode_config(&Pem::new(label::CERTIFICATE, cert.der()), encode_config()).into_bytes()
}

pub fn encode_csr(csr: &CertificateRequest) -> Vec<u8> {
    pem::encode_config(
        &Pem::new(label::CERTIFICATE_REQUEST, csr.der()),
        encode_config(),
    )
    .into_bytes()
}
