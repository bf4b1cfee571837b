use thiserror::Error;

/// Result type for digest header processing
pub type DigestResult<T> = std::result::Result<T, DigestError>;

/// Error type for digest header processing
#[derive(Error, Debug)]
pub enum DigestError {
  /// Digest algorithm token is not in the supported set
  #[error("Unsupported digest algorithm: {0}")]
  UnsupportedDigest(String),

  /// Declared digest value failed to decode or has the wrong length
  #[error("Invalid digest value: {0}")]
  InvalidDigest(String),

  /// Header entry is not of the `algorithm=value` form
  #[error("Invalid digest header entry: {0}")]
  InvalidDigestHeader(String),
}
