use crate::{
  checksum::{CksumContext, SumContext},
  error::{DigestError, DigestResult},
  value::DigestValue,
};
use sha2::{Digest as _, Sha256, Sha512};

/// Digest algorithms usable in the HTTP digest header.
///
/// The set is closed. Dispatch into the backing primitives is an exhaustive
/// match, so adding a variant surfaces every site that has to learn about it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
  /// CRC-32-C
  Crc32c,

  /// SHA-256
  Sha256,

  /// SHA-512
  Sha512,

  /// Unixcksum (POSIX `cksum`)
  Unixcksum,

  /// Unixsum (BSD `sum`)
  Unixsum,
}

impl DigestAlgorithm {
  /// Resolve a wire token, case-insensitively.
  ///
  /// The legacy `id-sha-256`/`id-sha-512` tokens resolve to their plain
  /// counterparts.
  pub fn from_wire(token: &str) -> DigestResult<Self> {
    match token.to_ascii_lowercase().as_str() {
      "crc32c" => Ok(Self::Crc32c),
      "id-sha-256" | "sha-256" => Ok(Self::Sha256),
      "id-sha-512" | "sha-512" => Ok(Self::Sha512),
      "unixcksum" => Ok(Self::Unixcksum),
      "unixsum" => Ok(Self::Unixsum),
      _ => Err(DigestError::UnsupportedDigest(token.to_string())),
    }
  }

  /// Canonical wire token of the algorithm
  pub fn wire_name(&self) -> &'static str {
    match self {
      Self::Crc32c => "crc32c",
      Self::Sha256 => "sha-256",
      Self::Sha512 => "sha-512",
      Self::Unixcksum => "unixcksum",
      Self::Unixsum => "unixsum",
    }
  }

  /// Fixed length of the digest output in bytes
  pub fn output_len(&self) -> usize {
    match self {
      Self::Crc32c => 4,
      Self::Sha256 => 32,
      Self::Sha512 => 64,
      Self::Unixcksum => 4,
      Self::Unixsum => 2,
    }
  }

  /// Fresh, empty accumulator for this algorithm
  pub fn context(&self) -> DigestContext {
    let inner = match self {
      Self::Crc32c => ContextInner::Crc32c(crc32fast::Hasher::new()),
      Self::Sha256 => ContextInner::Sha256(Sha256::new()),
      Self::Sha512 => ContextInner::Sha512(Sha512::new()),
      Self::Unixcksum => ContextInner::Unixcksum(CksumContext::new()),
      Self::Unixsum => ContextInner::Unixsum(SumContext::new()),
    };
    DigestContext { inner }
  }
}

impl std::fmt::Display for DigestAlgorithm {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.wire_name())
  }
}

impl std::str::FromStr for DigestAlgorithm {
  type Err = DigestError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::from_wire(s)
  }
}

/* ----------------------------------------------------------------- */
/// Incremental digest accumulator for a single body stream.
///
/// One instance per stream, consumed by [`finalize`](Self::finalize); never
/// reuse an accumulator across streams.
pub struct DigestContext {
  inner: ContextInner,
}

enum ContextInner {
  Crc32c(crc32fast::Hasher),
  Sha256(Sha256),
  Sha512(Sha512),
  Unixcksum(CksumContext),
  Unixsum(SumContext),
}

impl DigestContext {
  /// Algorithm this accumulator is bound to
  pub fn algorithm(&self) -> DigestAlgorithm {
    match &self.inner {
      ContextInner::Crc32c(_) => DigestAlgorithm::Crc32c,
      ContextInner::Sha256(_) => DigestAlgorithm::Sha256,
      ContextInner::Sha512(_) => DigestAlgorithm::Sha512,
      ContextInner::Unixcksum(_) => DigestAlgorithm::Unixcksum,
      ContextInner::Unixsum(_) => DigestAlgorithm::Unixsum,
    }
  }

  /// Feed a chunk of body bytes into the accumulator
  pub fn update(&mut self, data: &[u8]) {
    match &mut self.inner {
      ContextInner::Crc32c(h) => h.update(data),
      ContextInner::Sha256(h) => h.update(data),
      ContextInner::Sha512(h) => h.update(data),
      ContextInner::Unixcksum(h) => h.update(data),
      ContextInner::Unixsum(h) => h.update(data),
    }
  }

  /// Consume the accumulator and produce the final digest value
  pub fn finalize(self) -> DigestValue {
    match self.inner {
      ContextInner::Crc32c(h) => {
        DigestValue::from_parts(DigestAlgorithm::Crc32c, h.finalize().to_be_bytes().to_vec())
      }
      ContextInner::Sha256(h) => DigestValue::from_parts(DigestAlgorithm::Sha256, h.finalize().to_vec()),
      ContextInner::Sha512(h) => DigestValue::from_parts(DigestAlgorithm::Sha512, h.finalize().to_vec()),
      ContextInner::Unixcksum(h) => {
        DigestValue::from_parts(DigestAlgorithm::Unixcksum, h.finalize().to_be_bytes().to_vec())
      }
      ContextInner::Unixsum(h) => {
        DigestValue::from_parts(DigestAlgorithm::Unixsum, h.finalize().to_be_bytes().to_vec())
      }
    }
  }
}

impl std::fmt::Debug for DigestContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DigestContext").field("algorithm", &self.algorithm()).finish_non_exhaustive()
  }
}

/* ----------------------------------------------------------------- */
