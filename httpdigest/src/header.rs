//! Codec for the digest header value syntax of RFC 3230:
//! `algorithm=encoded-value` entries separated by commas.

use crate::{
  algorithm::DigestAlgorithm,
  error::{DigestError, DigestResult},
  trace::*,
  value::DigestValue,
};

/// One `algorithm=value` pair as found on the wire, prior to decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigestHeaderEntry {
  /// Declared algorithm
  pub algorithm: DigestAlgorithm,
  /// Encoded value part, exactly as received
  pub encoded: String,
}

impl DigestHeaderEntry {
  /// Decode the entry into a digest value
  pub fn decode(&self) -> DigestResult<DigestValue> {
    DigestValue::decode(self.algorithm, &self.encoded)
  }
}

/// Parse a digest header value into its declared entries.
///
/// An unknown algorithm token fails the whole header: silently skipping an
/// entry would let a sender pick an algorithm the verifier never checks.
/// Each entry is split at its first `=`, so base64 padding survives.
pub fn parse(header: &str) -> DigestResult<Vec<DigestHeaderEntry>> {
  header
    .split(',')
    .map(|entry| {
      let entry = entry.trim();
      let (token, encoded) = entry
        .split_once('=')
        .ok_or_else(|| DigestError::InvalidDigestHeader(entry.to_string()))?;
      let algorithm = DigestAlgorithm::from_wire(token).map_err(|e| {
        warn!("rejecting digest header with unresolvable token: {token}");
        e
      })?;
      Ok(DigestHeaderEntry {
        algorithm,
        encoded: encoded.to_string(),
      })
    })
    .collect()
}

/// Parse and decode every declared entry of a digest header value
pub fn decode(header: &str) -> DigestResult<Vec<DigestValue>> {
  parse(header)?.iter().map(DigestHeaderEntry::decode).collect()
}

/// Serialize digest values into a digest header value
pub fn encode(values: &[DigestValue]) -> String {
  values.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

/* ----------------------------------------------------------------- */
