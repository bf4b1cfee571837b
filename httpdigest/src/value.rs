use crate::{
  algorithm::DigestAlgorithm,
  error::{DigestError, DigestResult},
};
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;

/// A digest of a message body under a specific algorithm.
///
/// The raw byte length always matches [`DigestAlgorithm::output_len`].
/// Equality is exact byte comparison within one algorithm; values of
/// differing algorithms are never equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigestValue {
  algorithm: DigestAlgorithm,
  bytes: Bytes,
}

impl DigestValue {
  pub(crate) fn from_parts(algorithm: DigestAlgorithm, bytes: Vec<u8>) -> Self {
    debug_assert_eq!(bytes.len(), algorithm.output_len());
    Self {
      algorithm,
      bytes: Bytes::from(bytes),
    }
  }

  /// Algorithm that produced the value
  pub fn algorithm(&self) -> DigestAlgorithm {
    self.algorithm
  }

  /// Raw digest bytes
  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  /// Wire encoding of the value part: standard base64 for the SHA-2
  /// algorithms, the traditional decimal form for the checksums.
  pub fn encoded(&self) -> String {
    match self.algorithm {
      DigestAlgorithm::Sha256 | DigestAlgorithm::Sha512 => general_purpose::STANDARD.encode(&self.bytes),
      DigestAlgorithm::Crc32c | DigestAlgorithm::Unixcksum => {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&self.bytes);
        u32::from_be_bytes(buf).to_string()
      }
      DigestAlgorithm::Unixsum => {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(&self.bytes);
        u16::from_be_bytes(buf).to_string()
      }
    }
  }

  /// Decode the wire form of a declared value back into raw digest bytes
  pub fn decode(algorithm: DigestAlgorithm, encoded: &str) -> DigestResult<Self> {
    let bytes = match algorithm {
      DigestAlgorithm::Sha256 | DigestAlgorithm::Sha512 => general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| DigestError::InvalidDigest(format!("{encoded}: {e}")))?,
      DigestAlgorithm::Crc32c | DigestAlgorithm::Unixcksum => {
        let num: u32 = encoded
          .parse()
          .map_err(|_| DigestError::InvalidDigest(encoded.to_string()))?;
        num.to_be_bytes().to_vec()
      }
      DigestAlgorithm::Unixsum => {
        let num: u16 = encoded
          .parse()
          .map_err(|_| DigestError::InvalidDigest(encoded.to_string()))?;
        num.to_be_bytes().to_vec()
      }
    };

    if bytes.len() != algorithm.output_len() {
      return Err(DigestError::InvalidDigest(format!(
        "expected {} bytes for {algorithm}, got {}",
        algorithm.output_len(),
        bytes.len()
      )));
    }

    Ok(Self {
      algorithm,
      bytes: Bytes::from(bytes),
    })
  }
}

impl std::fmt::Display for DigestValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}={}", self.algorithm.wire_name(), self.encoded())
  }
}

/* ----------------------------------------------------------------- */
