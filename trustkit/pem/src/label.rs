//! PEM block labels understood by this crate.

pub const CERTIFICATE: &str = "CERTIFICATE";
pub const CERTIFICATE_REQUEST: &str = "CERTIFICATE REQUEST";
/// PKIX `SubjectPublicKeyInfo`.
pub const PUBLIC_KEY: &str = "PUBLIC KEY";
/// PKCS#1 `RSAPublicKey`.
pub const RSA_PUBLIC_KEY: &str = "RSA PUBLIC KEY";
/// PKCS#8 `PrivateKeyInfo`.
pub const PRIVATE_KEY: &str = "PRIVATE KEY";
/// PKCS#1 `RSAPrivateKey`.
pub const RSA_PRIVATE_KEY: &str = "RSA PRIVATE KEY";
/// SEC1 `ECPrivateKey`.
pub const EC_PRIVATE_KEY: &str = "EC PRIVATE KEY";

/// Returns whether blocks with this label carry a private key.
pub fn is_private_key(label: &str) -> bool {
    matches!(label, PRIVATE_KEY | RSA_PRIVATE_KEY | EC_PRIVATE_KEY)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::pkcs8(PRIVATE_KEY, true)]
    #[case::pkcs1(RSA_PRIVATE_KEY, true)]
    #[case::sec1(EC_PRIVATE_KEY, true)]
    #[case::certificate(CERTIFICATE, false)]
    #[case::public_key(PUBLIC_KEY, false)]
    #[case::lowercase("private key", false)]
    fn private_key_labels(#[case] label: &str, #[case] expected: bool) {
        assert_eq!(is_private_key(label), expected);
    }
}
