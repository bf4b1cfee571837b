use crate::{body::DigestBody, error::BoxError, BoxFuture, Error, DEFAULT_BUFFER_SIZE, DIGEST_HEADER};
use bytes::Bytes;
use http::{header::HeaderName, HeaderValue, Request};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use httpdigest::prelude::DigestAlgorithm;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Generate the digest header for this request.
///
/// The header has to precede the body on the wire, so the body is streamed
/// through the accumulator and the re-emitted bytes are kept to replay them
/// to the inner service once the digest is known.
async fn sign_request<B>(
  algorithm: DigestAlgorithm,
  buffer_size: usize,
  req: Request<B>,
) -> Result<Request<Full<Bytes>>, Error>
where
  B: Body + Unpin,
  B::Error: Into<BoxError>,
{
  let (mut parts, body) = req.into_parts();

  let (body, completion) = DigestBody::new(body, algorithm, buffer_size);
  let body = body.collect().await?.to_bytes();
  let digest = completion
    .await
    .map_err(|_| Error::BodyOperation("digest stream ended before finalizing".into()))?;

  // replace any digest header the caller may have set
  let value = HeaderValue::from_str(&digest.to_string())?;
  parts.headers.insert(HeaderName::from_static(DIGEST_HEADER), value);

  Ok(Request::from_parts(parts, Full::new(body)))
}

/// Tower layer for generating the HTTP digest header
#[derive(Clone, Debug)]
pub struct SignerLayer {
  algorithm: DigestAlgorithm,
  buffer_size: usize,
}

impl SignerLayer {
  /// Create a new signer layer with the default buffer size
  pub fn new(algorithm: DigestAlgorithm) -> Self {
    Self::new_with_buffer_size(algorithm, DEFAULT_BUFFER_SIZE)
  }

  /// Create a new signer layer with a custom buffer size
  pub fn new_with_buffer_size(algorithm: DigestAlgorithm, buffer_size: usize) -> Self {
    Self {
      algorithm,
      buffer_size: buffer_size.max(1),
    }
  }
}

impl<S> Layer<S> for SignerLayer {
  type Service = Signer<S>;

  fn layer(&self, service: S) -> Self::Service {
    Signer::new_with_buffer_size(service, self.algorithm, self.buffer_size)
  }
}

/// Service to generate the digest header for an HTTP request
#[derive(Clone)]
pub struct Signer<S> {
  inner: S,
  algorithm: DigestAlgorithm,
  buffer_size: usize,
}

impl<S> Signer<S> {
  /// Create a new signer service with the default buffer size
  pub fn new(inner: S, algorithm: DigestAlgorithm) -> Self {
    Self::new_with_buffer_size(inner, algorithm, DEFAULT_BUFFER_SIZE)
  }

  /// Create a new signer service with a custom buffer size
  pub fn new_with_buffer_size(inner: S, algorithm: DigestAlgorithm, buffer_size: usize) -> Self {
    Self {
      inner,
      algorithm,
      buffer_size: buffer_size.max(1),
    }
  }
}

impl<S, B> Service<Request<B>> for Signer<S>
where
  S: Service<Request<Full<Bytes>>> + Clone + Send + 'static,
  S::Error: Into<BoxError>,
  S::Future: Send,
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
      let req = sign_request(algorithm, buffer_size, req).await?;
      inner.call(req).await.map_err(|e| Error::InnerService(e.into()))
    })
  }
}

/* ----------------------------------------------------------------- */
