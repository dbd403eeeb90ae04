//! Private and public keys that can travel in PEM blocks.
//!
//! Keys are fully parsed into the typed RustCrypto representations, so two keys compare
//! equal when their key material is equal, regardless of the DER schema they were read
//! from.

use std::fmt;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, SecretDocument},
    RsaPrivateKey, RsaPublicKey,
};

use crate::error::{PemError, Result};

/// Algorithm (and curve) of a [`PrivateKey`] or [`PublicKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Rsa,
    EcdsaP256,
    EcdsaP384,
    EcdsaP521,
    Ed25519,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rsa => "RSA",
            Self::EcdsaP256 => "ECDSA P-256",
            Self::EcdsaP384 => "ECDSA P-384",
            Self::EcdsaP521 => "ECDSA P-521",
            Self::Ed25519 => "Ed25519",
        };

        f.write_str(name)
    }
}

/// ECDSA private key on one of the NIST curves.
#[derive(Clone, PartialEq, Eq)]
pub enum EcdsaPrivateKey {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

impl EcdsaPrivateKey {
    /// Parses a SEC1 `ECPrivateKey`.
    ///
    /// The curve is taken from the embedded parameters when present, otherwise from the
    /// length of the scalar.
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        p256::SecretKey::from_sec1_der(der)
            .map(Self::P256)
            .or_else(|_| p384::SecretKey::from_sec1_der(der).map(Self::P384))
            .or_else(|_| p521::SecretKey::from_sec1_der(der).map(Self::P521))
            .map_err(|error| PemError::DecodePrivateKey(format!("invalid SEC1 key: {error}")))
    }

    fn from_pkcs8_der(der: &[u8]) -> rsa::pkcs8::Result<Self> {
        p256::SecretKey::from_pkcs8_der(der)
            .map(Self::P256)
            .or_else(|_| p384::SecretKey::from_pkcs8_der(der).map(Self::P384))
            .or_else(|_| p521::SecretKey::from_pkcs8_der(der).map(Self::P521))
    }

    fn to_pkcs8_der(&self) -> rsa::pkcs8::Result<SecretDocument> {
        match self {
            Self::P256(key) => key.to_pkcs8_der(),
            Self::P384(key) => key.to_pkcs8_der(),
            Self::P521(key) => key.to_pkcs8_der(),
        }
    }

    pub fn public_key(&self) -> EcdsaPublicKey {
        match self {
            Self::P256(key) => EcdsaPublicKey::P256(key.public_key()),
            Self::P384(key) => EcdsaPublicKey::P384(key.public_key()),
            Self::P521(key) => EcdsaPublicKey::P521(key.public_key()),
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::P256(..) => KeyAlgorithm::EcdsaP256,
            Self::P384(..) => KeyAlgorithm::EcdsaP384,
            Self::P521(..) => KeyAlgorithm::EcdsaP521,
        }
    }
}

/// A parsed private key.
///
/// [`fmt::Debug`] only reveals the algorithm.
#[derive(Clone, PartialEq, Eq)]
pub enum PrivateKey {
    Rsa(RsaPrivateKey),
    Ecdsa(EcdsaPrivateKey),
    Ed25519(SigningKey),
}

impl PrivateKey {
    /// Parses a PKCS#8 `PrivateKeyInfo` holding an RSA, ECDSA or Ed25519 key.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        if let Ok(key) = RsaPrivateKey::from_pkcs8_der(der) {
            return Ok(Self::Rsa(key));
        }

        if let Ok(key) = EcdsaPrivateKey::from_pkcs8_der(der) {
            return Ok(Self::Ecdsa(key));
        }

        SigningKey::from_pkcs8_der(der)
            .map(Self::Ed25519)
            .map_err(|error| PemError::DecodePrivateKey(format!("invalid PKCS#8 key: {error}")))
    }

    /// Parses a PKCS#1 `RSAPrivateKey`.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        RsaPrivateKey::from_pkcs1_der(der)
            .map(Self::Rsa)
            .map_err(|error| PemError::DecodePrivateKey(format!("invalid PKCS#1 key: {error}")))
    }

    /// Parses a SEC1 `ECPrivateKey`.
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        EcdsaPrivateKey::from_sec1_der(der).map(Self::Ecdsa)
    }

    /// Marshals this key into PKCS#8 DER.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let document = match self {
            Self::Rsa(key) => key.to_pkcs8_der(),
            Self::Ecdsa(key) => key.to_pkcs8_der(),
            Self::Ed25519(key) => key.to_pkcs8_der(),
        }
        .map_err(PemError::EncodePrivateKey)?;

        Ok(document.as_bytes().to_vec())
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
            Self::Ecdsa(key) => PublicKey::Ecdsa(key.public_key()),
            Self::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Rsa(..) => KeyAlgorithm::Rsa,
            Self::Ecdsa(key) => key.algorithm(),
            Self::Ed25519(..) => KeyAlgorithm::Ed25519,
        }
    }

    pub fn is_rsa(&self) -> bool {
        matches!(self, Self::Rsa(..))
    }

    pub fn is_ecdsa(&self) -> bool {
        matches!(self, Self::Ecdsa(..))
    }

    pub fn is_ed25519(&self) -> bool {
        matches!(self, Self::Ed25519(..))
    }

    pub fn as_rsa(&self) -> Option<&RsaPrivateKey> {
        match self {
            Self::Rsa(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey").field(&self.algorithm()).finish()
    }
}

impl From<RsaPrivateKey> for PrivateKey {
    fn from(key: RsaPrivateKey) -> Self {
        Self::Rsa(key)
    }
}

impl From<SigningKey> for PrivateKey {
    fn from(key: SigningKey) -> Self {
        Self::Ed25519(key)
    }
}

impl From<p256::SecretKey> for PrivateKey {
    fn from(key: p256::SecretKey) -> Self {
        Self::Ecdsa(EcdsaPrivateKey::P256(key))
    }
}

/// ECDSA public key on one of the NIST curves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EcdsaPublicKey {
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    P521(p521::PublicKey),
}

/// A parsed public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    Ecdsa(EcdsaPublicKey),
    Ed25519(VerifyingKey),
}

impl PublicKey {
    /// Parses a PKIX `SubjectPublicKeyInfo`.
    pub fn from_pkix_der(der: &[u8]) -> Result<Self> {
        if let Ok(key) = RsaPublicKey::from_public_key_der(der) {
            return Ok(Self::Rsa(key));
        }

        let ecdsa = p256::PublicKey::from_public_key_der(der)
            .map(EcdsaPublicKey::P256)
            .or_else(|_| p384::PublicKey::from_public_key_der(der).map(EcdsaPublicKey::P384))
            .or_else(|_| p521::PublicKey::from_public_key_der(der).map(EcdsaPublicKey::P521));
        if let Ok(key) = ecdsa {
            return Ok(Self::Ecdsa(key));
        }

        VerifyingKey::from_public_key_der(der)
            .map(Self::Ed25519)
            .map_err(|error| PemError::DecodePublicKey(format!("invalid PKIX key: {error}")))
    }

    /// Parses a PKCS#1 `RSAPublicKey`.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        RsaPublicKey::from_pkcs1_der(der)
            .map(Self::Rsa)
            .map_err(|error| PemError::DecodePublicKey(format!("invalid PKCS#1 key: {error}")))
    }

    /// Marshals this key into PKIX `SubjectPublicKeyInfo` DER.
    pub fn to_pkix_der(&self) -> Result<Vec<u8>> {
        let document = match self {
            Self::Rsa(key) => key.to_public_key_der(),
            Self::Ecdsa(EcdsaPublicKey::P256(key)) => key.to_public_key_der(),
            Self::Ecdsa(EcdsaPublicKey::P384(key)) => key.to_public_key_der(),
            Self::Ecdsa(EcdsaPublicKey::P521(key)) => key.to_public_key_der(),
            Self::Ed25519(key) => key.to_public_key_der(),
        }
        .map_err(PemError::EncodePublicKey)?;

        Ok(document.as_bytes().to_vec())
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Rsa(..) => KeyAlgorithm::Rsa,
            Self::Ecdsa(EcdsaPublicKey::P256(..)) => KeyAlgorithm::EcdsaP256,
            Self::Ecdsa(EcdsaPublicKey::P384(..)) => KeyAlgorithm::EcdsaP384,
            Self::Ecdsa(EcdsaPublicKey::P521(..)) => KeyAlgorithm::EcdsaP521,
            Self::Ed25519(..) => KeyAlgorithm::Ed25519,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn der(pem: &str) -> Vec<u8> {
        pem::parse(pem).unwrap().into_contents()
    }

    #[test]
    fn pkcs8_rsa() {
        let key = PrivateKey::from_pkcs8_der(&der(include_str!("../tests/fixtures/rsa.pkcs8.pem")))
            .unwrap();

        assert!(key.is_rsa());
        assert!(!key.is_ecdsa());
        assert!(!key.is_ed25519());
        assert!(key.as_rsa().is_some());
        assert_eq!(key.algorithm(), KeyAlgorithm::Rsa);
    }

    #[test]
    fn pkcs1_and_pkcs8_agree() {
        let pkcs8 =
            PrivateKey::from_pkcs8_der(&der(include_str!("../tests/fixtures/rsa.pkcs8.pem")))
                .unwrap();
        let pkcs1 =
            PrivateKey::from_pkcs1_der(&der(include_str!("../tests/fixtures/rsa.pkcs1.pem")))
                .unwrap();

        assert_eq!(pkcs8, pkcs1);
    }

    #[rstest]
    #[case::p256(include_str!("../tests/fixtures/ec256.sec1.pem"), KeyAlgorithm::EcdsaP256)]
    #[case::p384(include_str!("../tests/fixtures/ec384.sec1.pem"), KeyAlgorithm::EcdsaP384)]
    #[case::p521(include_str!("../tests/fixtures/ec521.sec1.pem"), KeyAlgorithm::EcdsaP521)]
    fn sec1_curve_detection(#[case] pem: &str, #[case] expected: KeyAlgorithm) {
        let key = PrivateKey::from_sec1_der(&der(pem)).unwrap();

        assert!(key.is_ecdsa());
        assert_eq!(key.algorithm(), expected);
        assert_eq!(key.public_key().algorithm(), expected);
    }

    #[test]
    fn sec1_and_pkcs8_agree() {
        let sec1 = PrivateKey::from_sec1_der(&der(include_str!("../tests/fixtures/ec256.sec1.pem")))
            .unwrap();
        let pkcs8 =
            PrivateKey::from_pkcs8_der(&der(include_str!("../tests/fixtures/ec256.pkcs8.pem")))
                .unwrap();

        assert_eq!(sec1, pkcs8);
    }

    #[test]
    fn ed25519_from_pkcs8() {
        let key =
            PrivateKey::from_pkcs8_der(&der(include_str!("../tests/fixtures/ed25519.pkcs8.pem")))
                .unwrap();

        assert!(key.is_ed25519());
        assert!(key.as_rsa().is_none());
    }

    #[rstest]
    #[case::rsa(include_str!("../tests/fixtures/rsa.pkcs8.pem"))]
    #[case::ecdsa(include_str!("../tests/fixtures/ec256.pkcs8.pem"))]
    #[case::ed25519(include_str!("../tests/fixtures/ed25519.pkcs8.pem"))]
    fn pkcs8_marshal_preserves_key(#[case] pem: &str) {
        let key = PrivateKey::from_pkcs8_der(&der(pem)).unwrap();
        let marshalled = key.to_pkcs8_der().unwrap();

        assert_eq!(PrivateKey::from_pkcs8_der(&marshalled).unwrap(), key);
    }

    #[test]
    fn rsa_public_key_matches_fixture() {
        let key = PrivateKey::from_pkcs8_der(&der(include_str!("../tests/fixtures/rsa.pkcs8.pem")))
            .unwrap();
        let public = PublicKey::from_pkix_der(&der(include_str!("../tests/fixtures/rsa.pub.pem")))
            .unwrap();

        assert_eq!(key.public_key(), public);
        assert_eq!(
            public.to_pkix_der().unwrap(),
            der(include_str!("../tests/fixtures/rsa.pub.pem"))
        );
    }

    #[test]
    fn garbage_is_not_a_key() {
        let error = PrivateKey::from_pkcs8_der(b"definitely not DER").unwrap_err();
        assert!(matches!(error, PemError::DecodePrivateKey(..)));

        let error = PublicKey::from_pkix_der(b"definitely not DER").unwrap_err();
        assert!(matches!(error, PemError::DecodePublicKey(..)));
    }

    #[test]
    fn debug_hides_key_material() {
        let key = PrivateKey::from(SigningKey::from_bytes(&[7; 32]));
        assert_eq!(format!("{key:?}"), "PrivateKey(Ed25519)");
    }
}
