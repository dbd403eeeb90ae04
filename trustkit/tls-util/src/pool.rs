use rustls::{pki_types::CertificateDer, RootCertStore};
use trustkit_pem::Certificate;

use crate::{error::PoolError, provider::Provider};

/// A set of certificates used as verification anchors.
///
/// Certificates are deduplicated by their DER encoding. Iteration follows insertion order,
/// equality ignores it. A pool never contains system roots.
#[derive(Clone, Debug, Default)]
pub struct TrustPool {
    certificates: Vec<Certificate>,
}

impl TrustPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `cert` to this pool. Returns `false` if it was already present.
    pub fn add(&mut self, cert: Certificate) -> bool {
        if self.contains(&cert) {
            return false;
        }

        self.certificates.push(cert);
        true
    }

    pub fn contains(&self, cert: &Certificate) -> bool {
        self.certificates.contains(cert)
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Certificate> {
        self.certificates.iter()
    }

    /// Builds a rustls [`RootCertStore`] holding exactly the certificates of this pool.
    pub fn root_store(&self) -> Result<RootCertStore, PoolError> {
        let mut store = RootCertStore::empty();

        for cert in &self.certificates {
            store
                .add(CertificateDer::from(cert.der().to_vec()))
                .map_err(PoolError::RootStore)?;
        }

        Ok(store)
    }
}

impl PartialEq for TrustPool {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|cert| other.contains(cert))
    }
}

impl Eq for TrustPool {}

impl Extend<Certificate> for TrustPool {
    fn extend<T: IntoIterator<Item = Certificate>>(&mut self, iter: T) {
        for cert in iter {
            self.add(cert);
        }
    }
}

impl<'a> IntoIterator for &'a TrustPool {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certificates.iter()
    }
}

/// Parses every certificate of every provider, in order, into a single [`TrustPool`].
///
/// Fails on the first certificate that cannot be parsed, naming the provider and the
/// certificate by their positions.
pub fn build_pool<'a, I>(providers: I) -> Result<TrustPool, PoolError>
where
    I: IntoIterator<Item = &'a Provider>,
{
    let mut pool = TrustPool::new();

    for (provider_index, provider) in providers.into_iter().enumerate() {
        for (cert_index, der) in provider.chain().iter().enumerate() {
            let cert = Certificate::from_der(der.as_ref()).map_err(|source| {
                PoolError::InvalidCertificate {
                    provider: provider_index,
                    certificate: cert_index,
                    source,
                }
            })?;

            pool.add(cert);
        }
    }

    tracing::trace!(certificates = pool.len(), "Built a trust pool.");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODE3: &[u8] = include_bytes!("../tests/fixtures/node3.pem");
    const CHAIN: &[u8] = include_bytes!("../tests/fixtures/chain.pem");
    const CA: &[u8] = include_bytes!("../tests/fixtures/ca.crt.pem");

    #[test]
    fn pool_of_single_provider() {
        let provider = Provider::from_bytes(CHAIN).unwrap();
        let pool = provider.cert_pool().unwrap();

        assert_eq!(pool.len(), 2);
        assert!(pool.iter().any(Certificate::is_ca));
        assert_eq!(pool.root_store().unwrap().len(), 2);
    }

    #[test]
    fn duplicates_collapse() {
        let chain = Provider::from_bytes(CHAIN).unwrap();
        let ca = Provider::from_bytes(CA).unwrap();

        let pool = build_pool([&chain, &ca]).unwrap();
        assert_eq!(pool, chain.cert_pool().unwrap());
    }

    #[test]
    fn membership_ignores_order() {
        let node3 = Provider::from_bytes(NODE3).unwrap();
        let chain = Provider::from_bytes(CHAIN).unwrap();

        let forward = build_pool([&node3, &chain]).unwrap();
        let backward = build_pool([&chain, &node3]).unwrap();

        assert_eq!(forward.len(), 3);
        assert_eq!(forward, backward);
        assert_eq!(forward, build_pool([&node3, &chain]).unwrap());
    }

    #[test]
    fn empty_providers_make_an_empty_pool() {
        let pool = build_pool(std::iter::empty::<&Provider>()).unwrap();

        assert!(pool.is_empty());
        assert!(pool.root_store().unwrap().is_empty());
    }

    #[test]
    fn invalid_certificate_is_located() {
        let node3 = Provider::from_bytes(NODE3).unwrap();

        let mut pem = CA.to_vec();
        pem.extend_from_slice(b"-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n");
        let broken = Provider::from_bytes(&pem).unwrap();

        let error = build_pool([&node3, &broken]).unwrap_err();
        assert!(matches!(
            error,
            PoolError::InvalidCertificate {
                provider: 1,
                certificate: 1,
                ..
            }
        ));
    }
}
