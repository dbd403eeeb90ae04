use std::{fmt, path::Path};

use tracing::Level;
use trustkit_tls_util::{
    error::ProviderError,
    pem::{Certificate, KeyAlgorithm},
    Provider,
};
use trustkit_units::ByteSize;

use crate::error::{CliError, CliResult};

/// Subject and issuer of one certificate in a provider chain.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct CertificateSummary {
    pub(crate) subject: String,
    pub(crate) issuer: String,
    pub(crate) is_ca: bool,
}

/// What `trustkit inspect` prints.
#[derive(Debug)]
pub(crate) struct ProviderReport {
    pub(crate) common_name: String,
    pub(crate) key: Option<KeyAlgorithm>,
    pub(crate) encoded_size: ByteSize,
    pub(crate) certificates: Vec<CertificateSummary>,
}

impl fmt::Display for ProviderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let common_name = if self.common_name.is_empty() {
            "<none>"
        } else {
            &self.common_name
        };

        writeln!(f, "common name:  {common_name}")?;
        match self.key {
            Some(algorithm) => writeln!(f, "kind:         private ({algorithm} key)")?,
            None => writeln!(f, "kind:         public")?,
        }
        writeln!(f, "certificates: {}", self.certificates.len())?;
        writeln!(f, "encoded size: {}", self.encoded_size)?;

        for (index, certificate) in self.certificates.iter().enumerate() {
            let ca = if certificate.is_ca { " (CA)" } else { "" };
            writeln!(f, "[{index}]{ca}")?;
            writeln!(f, "  subject: {}", certificate.subject)?;
            writeln!(f, "  issuer:  {}", certificate.issuer)?;
        }

        Ok(())
    }
}

#[tracing::instrument(level = Level::DEBUG, err(level = Level::DEBUG))]
pub(crate) fn inspect(path: &Path) -> CliResult<ProviderReport> {
    let load_error = |error| CliError::LoadProvider(path.to_owned(), error);

    let provider = Provider::load(path).map_err(load_error)?;
    let encoded = provider.to_pem().map_err(load_error)?;

    let certificates = provider
        .chain()
        .iter()
        .enumerate()
        .map(|(index, der)| {
            Certificate::from_der(der.as_ref())
                .map(|certificate| CertificateSummary {
                    subject: certificate.subject().to_owned(),
                    issuer: certificate.issuer().to_owned(),
                    is_ca: certificate.is_ca(),
                })
                .map_err(|source| ProviderError::InvalidCertificate { index, source })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(load_error)?;

    Ok(ProviderReport {
        common_name: provider.common_name(),
        key: provider.key().map(|key| key.algorithm()),
        encoded_size: ByteSize(encoded.len() as u64),
        certificates,
    })
}

/// Loads the provider at `input` and dumps it to `output` in canonical form.
#[tracing::instrument(level = Level::DEBUG, err(level = Level::DEBUG))]
pub(crate) fn normalize(input: &Path, output: &Path) -> CliResult<Provider> {
    let provider =
        Provider::load(input).map_err(|error| CliError::LoadProvider(input.to_owned(), error))?;

    provider
        .dump(output)
        .map_err(|error| CliError::DumpProvider(output.to_owned(), error))?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        certificates = provider.len(),
        "Provider normalized"
    );

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../tls-util/tests/fixtures")
            .join(name)
    }

    #[test]
    fn inspect_private_chain() {
        let report = inspect(&fixture("chain.pem")).unwrap();

        assert_eq!(report.common_name, "leaf.example.net");
        assert_eq!(report.key, Some(KeyAlgorithm::EcdsaP256));
        assert_eq!(report.certificates.len(), 2);
        assert!(!report.certificates[0].is_ca);
        assert!(report.certificates[1].is_ca);
        assert!(report.certificates[0].subject.contains("leaf.example.net"));
        assert!(report.certificates[0].issuer.contains("root.example.net"));

        let printed = report.to_string();
        assert!(printed.contains("private (ECDSA P-256 key)"));
        assert!(printed.contains("KiB"));
    }

    #[test]
    fn inspect_public() {
        let report = inspect(&fixture("node3.crt.pem")).unwrap();

        assert!(report.key.is_none());
        assert!(report.to_string().contains("kind:         public"));
    }

    #[test]
    fn inspect_missing_file() {
        let error = inspect(&fixture("does-not-exist.pem")).unwrap_err();

        assert!(matches!(
            error,
            CliError::LoadProvider(_, ProviderError::OpenFile { .. })
        ));
    }

    #[test]
    fn normalize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.pem");
        let second = dir.path().join("second.pem");

        let provider = normalize(&fixture("chain.pem"), &first).unwrap();
        let normalized = normalize(&first, &second).unwrap();

        assert_eq!(provider, normalized);
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn normalize_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("out.pem");

        let error = normalize(&fixture("node3.pem"), &output).unwrap_err();
        assert!(matches!(
            error,
            CliError::DumpProvider(_, ProviderError::CreateFile { .. })
        ));
    }
}
