//! Streamed PEM codec for trust material.
//!
//! [`PemReader`] buffers a whole byte source and hands out [`Block`]s in source order,
//! [`PemWriter`] emits them in call order. [`Block`] carries the typed decoders for
//! private keys, public keys, certificates and certificate requests.

pub mod block;
pub mod error;
pub mod key;
pub mod label;
pub mod reader;
pub mod writer;
pub mod x509;

pub use block::Block;
pub use error::{PemError, Result};
pub use key::{EcdsaPrivateKey, EcdsaPublicKey, KeyAlgorithm, PrivateKey, PublicKey};
pub use reader::{
    decode_certificate, decode_csr, decode_private_key, decode_public_key, PemReader,
};
pub use writer::{
    encode_certificate, encode_csr, encode_private_key, encode_public_key, PemWriter,
};
pub use x509::{Certificate, CertificateRequest};
pub use {ed25519_dalek, rsa};
