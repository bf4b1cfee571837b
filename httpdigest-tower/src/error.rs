use http::header::{InvalidHeaderValue, ToStrError};
use httpdigest::prelude::DigestError;
use std::error::Error as StdError;

/// Boxed error
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error type
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
  /// Body operation returned an error
  #[error(transparent)]
  BodyOperation(BoxError),

  /// Digest header codec failure: unsupported algorithm, undecodable value,
  /// or a malformed header entry
  #[error(transparent)]
  Digest(#[from] DigestError),

  /// Hash mismatched
  #[error("Hash mismatched. Expected: {expected}, Got: {got}")]
  HashMismatch {
    /// Hash we expected
    expected: String,

    /// Hash we calculated
    got: String,
  },

  /// Inner service returned an error
  #[error(transparent)]
  InnerService(BoxError),

  /// Invalid header value
  #[error(transparent)]
  InvalidHeaderValue(#[from] InvalidHeaderValue),

  /// Missing digest header
  #[error("Missing digest header")]
  MissingHeader,

  /// `ToStrError` from the HTTP crate
  #[error(transparent)]
  ToStr(#[from] ToStrError),
}
