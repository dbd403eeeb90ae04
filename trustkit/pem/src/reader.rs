use std::io::{self, Read};

use bytes::{Buf, Bytes};

use crate::{
    block::Block,
    error::{PemError, Result},
    key::{PrivateKey, PublicKey},
    x509::{Certificate, CertificateRequest},
};

const BEGIN: &[u8] = b"-----BEGIN ";
const END: &[u8] = b"-----END ";
const DASHES: &[u8] = b"-----";

/// Sequential reader of PEM blocks.
///
/// The whole source is read into memory when the reader is created and the source is
/// dropped right away, so files are closed before any decoding happens.
///
/// Decoding is destructive: [`PemReader::decode`] removes the returned block (and any
/// junk in front of it) from the buffer. Whatever cannot be decoded stays available
/// through [`PemReader::remaining`] and the [`Read`] implementation.
///
/// The reader is in one of two states:
/// 1. A complete block is buffered, [`PemReader::has_next`] returns `true`.
/// 2. Drained, [`PemReader::decode`] returns [`None`] without touching the buffer.
#[derive(Debug, Clone, Default)]
pub struct PemReader {
    data: Bytes,
}

impl PemReader {
    /// Drains `source` into memory.
    pub fn new<R: Read>(mut source: R) -> io::Result<Self> {
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;

        Ok(Self { data: data.into() })
    }

    /// Returns `true` iff the next [`PemReader::decode`] call returns a block.
    pub fn has_next(&self) -> bool {
        find_block(&self.data).is_some()
    }

    /// Consumes and returns the next complete block.
    ///
    /// Malformed blocks are skipped over. When no complete block is left, returns [`None`]
    /// and leaves the buffer untouched.
    pub fn decode(&mut self) -> Option<Block> {
        let (block, consumed) = find_block(&self.data)?;
        self.data.advance(consumed);

        Some(block)
    }

    /// Undecoded bytes left in the buffer.
    pub fn remaining(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for PemReader {
    fn from(data: Vec<u8>) -> Self {
        Self { data: data.into() }
    }
}

impl From<&[u8]> for PemReader {
    fn from(data: &[u8]) -> Self {
        Self {
            data: Bytes::copy_from_slice(data),
        }
    }
}

impl From<Bytes> for PemReader {
    fn from(data: Bytes) -> Self {
        Self { data }
    }
}

impl Iterator for PemReader {
    type Item = Block;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode()
    }
}

/// Reads raw undecoded bytes, bypassing PEM decoding.
impl Read for PemReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.data.len());
        self.data.copy_to_slice(&mut buf[..len]);

        Ok(len)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .rposition(|window| window == needle)
}

/// Locates the first well-formed block in `data`.
///
/// Returns the block and the number of bytes up to and including the line that ends it.
///
/// Every byte is scanned a bounded number of times. A block cannot contain another
/// `-----BEGIN ` line, so only the last one in front of an END marker may start a block
/// closed by it.
fn find_block(data: &[u8]) -> Option<(Block, usize)> {
    let mut from = 0;

    while let Some(first) = find(&data[from..], BEGIN).map(|offset| from + offset) {
        let (end_marker, end) = find_block_end(data, first)?;
        let start = first + rfind(&data[first..end_marker], BEGIN)?;

        match pem::parse(&data[start..end]) {
            Ok(pem) => {
                let consumed = end + line_break_len(&data[end..]);
                return Some((pem.into(), consumed));
            }
            Err(error) => {
                tracing::trace!(%error, offset = start, "Skipping a malformed PEM block.");
            }
        }

        from = end;
    }

    None
}

/// Returns the offsets of the `-----END <label>-----` marker that closes the block
/// starting at `start`, and of the byte just past it.
fn find_block_end(data: &[u8], start: usize) -> Option<(usize, usize)> {
    let end_marker = start + find(&data[start..], END)?;
    let label_start = end_marker + END.len();
    let label_len = find(&data[label_start..], DASHES)?;

    Some((end_marker, label_start + label_len + DASHES.len()))
}

fn line_break_len(rest: &[u8]) -> usize {
    match rest {
        [b'\r', b'\n', ..] => 2,
        [b'\n', ..] => 1,
        _ => 0,
    }
}

/// Decodes the first private key block found in `input`.
pub fn decode_private_key(input: &[u8]) -> Result<PrivateKey> {
    first_block(input)
        .ok_or_else(|| PemError::DecodePrivateKey("no PEM block found".to_string()))?
        .decode_private_key()
}

/// Decodes the first public key block found in `input`.
pub fn decode_public_key(input: &[u8]) -> Result<PublicKey> {
    first_block(input)
        .ok_or_else(|| PemError::DecodePublicKey("no PEM block found".to_string()))?
        .decode_public_key()
}

/// Decodes the first certificate block found in `input`.
pub fn decode_certificate(input: &[u8]) -> Result<Certificate> {
    first_block(input)
        .ok_or_else(|| PemError::DecodeCertificate("no PEM block found".to_string()))?
        .decode_certificate()
}

/// Decodes the first certificate request block found in `input`.
pub fn decode_csr(input: &[u8]) -> Result<CertificateRequest> {
    first_block(input)
        .ok_or_else(|| PemError::DecodeCsr("no PEM block found".to_string()))?
        .decode_csr()
}

fn first_block(input: &[u8]) -> Option<Block> {
    find_block(input).map(|(block, _)| block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label;

    const CERT: &str = include_str!("../tests/fixtures/certificate.pem");
    const KEY: &str = include_str!("../tests/fixtures/rsa.pkcs8.pem");

    #[test]
    fn empty_input_is_drained() {
        let mut reader = PemReader::from(Vec::new());

        assert!(!reader.has_next());
        assert!(reader.decode().is_none());
        assert!(reader.remaining().is_empty());
    }

    #[test]
    fn blocks_come_out_in_order() {
        let input = format!("{CERT}{KEY}");
        let mut reader = PemReader::from(input.into_bytes());

        assert!(reader.has_next());
        assert_eq!(reader.decode().unwrap().label(), label::CERTIFICATE);
        assert!(reader.has_next());
        assert_eq!(reader.decode().unwrap().label(), label::PRIVATE_KEY);
        assert!(!reader.has_next());
        assert!(reader.decode().is_none());
        assert!(reader.decode().is_none());
    }

    #[test]
    fn trailing_data_stays_readable() {
        let input = format!("preamble\n{CERT}trailing bytes");
        let mut reader = PemReader::from(input.into_bytes());

        assert!(reader.decode().is_some());
        assert!(!reader.has_next());
        assert!(reader.decode().is_none());

        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "trailing bytes");
        assert!(reader.remaining().is_empty());
    }

    #[test]
    fn incomplete_block_is_not_consumed() {
        let truncated = &CERT[..CERT.len() / 2];
        let mut reader = PemReader::from(truncated.as_bytes());

        assert!(!reader.has_next());
        assert!(reader.decode().is_none());
        assert_eq!(reader.remaining(), truncated.as_bytes());
    }

    #[test]
    fn malformed_block_is_skipped() {
        let input = format!("-----BEGIN CERTIFICATE-----\n!!!!\n-----END CERTIFICATE-----\n{KEY}");
        let mut reader = PemReader::from(input.into_bytes());

        let block = reader.decode().unwrap();
        assert_eq!(block.label(), label::PRIVATE_KEY);
        assert!(reader.decode().is_none());
    }

    #[test]
    fn crlf_line_endings() {
        let input = format!("{CERT}{KEY}").replace('\n', "\r\n");
        let reader = PemReader::from(input.into_bytes());

        let labels = reader.map(|block| block.label().to_owned()).collect::<Vec<_>>();
        assert_eq!(labels, [label::CERTIFICATE, label::PRIVATE_KEY]);
    }

    #[test]
    fn new_drains_the_source() {
        let reader = PemReader::new(io::Cursor::new(CERT.as_bytes())).unwrap();
        assert_eq!(reader.remaining(), CERT.as_bytes());
    }

    #[test]
    fn unterminated_blocks_scan_in_linear_time() {
        let input = "-----BEGIN CERTIFICATE-----\n".repeat(50_000);
        let mut reader = PemReader::from(input.as_bytes());

        let started = std::time::Instant::now();
        assert!(!reader.has_next());
        assert!(reader.decode().is_none());
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(reader.remaining().len(), input.len());
    }

    #[test]
    fn stray_begin_lines_before_a_block() {
        let input = format!("{}{CERT}", "-----BEGIN CERTIFICATE-----\n".repeat(50_000));
        let mut reader = PemReader::from(input.into_bytes());

        let started = std::time::Instant::now();
        let block = reader.decode().unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        assert_eq!(block.label(), label::CERTIFICATE);
        assert!(reader.decode().is_none());
        assert!(reader.remaining().is_empty());
    }

    #[test]
    fn typed_helpers_use_first_block() {
        let input = format!("{CERT}{KEY}");

        assert!(decode_certificate(input.as_bytes()).is_ok());
        assert!(matches!(
            decode_private_key(input.as_bytes()),
            Err(PemError::DecodePrivateKey(..))
        ));
        assert!(matches!(
            decode_csr(b"no pem here"),
            Err(PemError::DecodeCsr(..))
        ));
    }
}
