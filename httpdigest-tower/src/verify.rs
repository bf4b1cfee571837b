use crate::{body::DigestBody, error::BoxError, BoxFuture, Error, DEFAULT_BUFFER_SIZE, DIGEST_HEADER};
use http::{HeaderMap, Request};
use http_body::Body;
use httpdigest::prelude::{header, DigestAlgorithm, DigestValue};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::debug;

/// Pull the declared digest for `algorithm` out of the header map.
///
/// Runs before the body is touched, so malformed metadata is rejected at
/// header cost regardless of body size.
fn declared_digest(headers: &HeaderMap, algorithm: DigestAlgorithm) -> Result<DigestValue, Error> {
  let raw = headers.get(DIGEST_HEADER).ok_or(Error::MissingHeader)?.to_str()?;
  let declared = header::decode(raw)?;

  // Several digests may be declared in one header; only the configured
  // algorithm is verified. A header that lacks it counts as missing.
  declared
    .into_iter()
    .find(|value| value.algorithm() == algorithm)
    .ok_or(Error::MissingHeader)
}

/// Tower layer for verifying the HTTP digest header
#[derive(Clone, Debug)]
pub struct VerifierLayer {
  algorithm: DigestAlgorithm,
  buffer_size: usize,
}

impl VerifierLayer {
  /// Create a new verifier layer with the default buffer size
  pub fn new(algorithm: DigestAlgorithm) -> Self {
    Self::new_with_buffer_size(algorithm, DEFAULT_BUFFER_SIZE)
  }

  /// Create a new verifier layer with a custom buffer size
  pub fn new_with_buffer_size(algorithm: DigestAlgorithm, buffer_size: usize) -> Self {
    Self {
      algorithm,
      buffer_size: buffer_size.max(1),
    }
  }
}

impl<S> Layer<S> for VerifierLayer {
  type Service = Verifier<S>;

  fn layer(&self, service: S) -> Self::Service {
    Verifier::new_with_buffer_size(service, self.algorithm, self.buffer_size)
  }
}

/// Verification service.
///
/// The inner service receives the still-streaming body wrapped in a
/// [`DigestBody`]; digesting proceeds chunk by chunk alongside the inner
/// service's own consumption, and the comparison is necessarily sequenced
/// after the last byte. A mismatch therefore replaces the inner response even
/// though that response already exists.
#[derive(Clone)]
pub struct Verifier<S> {
  inner: S,
  algorithm: DigestAlgorithm,
  buffer_size: usize,
}

impl<S> Verifier<S> {
  /// Create a new verifier service with the default buffer size
  pub fn new(inner: S, algorithm: DigestAlgorithm) -> Self {
    Self::new_with_buffer_size(inner, algorithm, DEFAULT_BUFFER_SIZE)
  }

  /// Create a new verifier service with a custom buffer size
  pub fn new_with_buffer_size(inner: S, algorithm: DigestAlgorithm, buffer_size: usize) -> Self {
    Self {
      inner,
      algorithm,
      buffer_size: buffer_size.max(1),
    }
  }
}

impl<S, B> Service<Request<B>> for Verifier<S>
where
  S: Service<Request<DigestBody<B>>> + Clone + Send + 'static,
  S::Error: Into<BoxError>,
  S::Future: Send,
  S::Response: Send,
  B: Body + Send + Unpin + 'static,
  B::Data: Send,
  B::Error: Into<BoxError>,
{
  type Response = S::Response;
  type Error = Error;
  type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

  #[inline]
  fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
    self.inner.poll_ready(cx).map_err(|e| Error::InnerService(e.into()))
  }

  fn call(&mut self, req: Request<B>) -> Self::Future {
    // take the service that was driven to readiness, leave the clone behind
    let clone = self.inner.clone();
    let mut inner = std::mem::replace(&mut self.inner, clone);
    let (algorithm, buffer_size) = (self.algorithm, self.buffer_size);

    Box::pin(async move {
      let (parts, body) = req.into_parts();
      let expected = declared_digest(&parts.headers, algorithm)?;

      let (body, completion) = DigestBody::new(body, algorithm, buffer_size);
      let response = inner
        .call(Request::from_parts(parts, body))
        .await
        .map_err(|e| Error::InnerService(e.into()))?;

      // the digest is only comparable once the last byte has streamed through
      let got = completion
        .await
        .map_err(|_| Error::BodyOperation("body stream closed before the digest was finalized".into()))?;

      if got != expected {
        debug!("digest mismatch for {algorithm}: expected {}, got {}", expected.encoded(), got.encoded());
        return Err(Error::HashMismatch {
          expected: expected.encoded(),
          got: got.encoded(),
        });
      }

      Ok(response)
    })
  }
}

/* ----------------------------------------------------------------- */
