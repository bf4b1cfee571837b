//! # httpdigest-tower
//!
//! Tower middleware for computing and verifying the HTTP digest header over
//! streaming bodies.
//!
//! The [`Signer`] computes the digest of an outgoing request body and attaches
//! it as the `Digest` header; the [`Verifier`] reads the declared header on an
//! incoming request, recomputes the digest while the body streams through the
//! wrapped service, and rejects the exchange on mismatch. Both are built on
//! [`DigestBody`], a pass-through body adapter that accumulates the digest in
//! bounded memory, so neither middleware needs the whole body in memory to
//! know its hash.

use std::{future::Future, pin::Pin};

pub use self::{
  body::{DigestBody, DigestReceiver},
  error::{BoxError, Error},
  sign::{Signer, SignerLayer},
  verify::{Verifier, VerifierLayer},
};
pub use httpdigest::prelude;
pub use httpdigest::prelude::{DigestAlgorithm, DigestValue};

mod body;
mod error;
mod sign;
mod verify;

/// Name of the digest header
pub(crate) const DIGEST_HEADER: &str = "digest";

/// Default bound, in bytes, on one accumulator update
pub(crate) const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Boxed future
pub type BoxFuture<'a, O> = Pin<Box<dyn Future<Output = O> + Send + 'a>>;

/* ----------------------------------------------------------------- */
#[cfg(test)]
mod tests {
  use super::*;
  use bytes::Bytes;
  use http::Request;
  use http_body_util::{BodyExt, Full};
  use httpdigest::prelude::{header, DigestError};
  use std::{
    convert::Infallible,
    sync::{
      atomic::{AtomicBool, Ordering},
      Arc,
    },
  };
  use tower::{Layer, Service, ServiceExt};

  type TestBody = Full<Bytes>;

  const ALL: &[DigestAlgorithm] = &[
    DigestAlgorithm::Crc32c,
    DigestAlgorithm::Sha256,
    DigestAlgorithm::Sha512,
    DigestAlgorithm::Unixcksum,
    DigestAlgorithm::Unixsum,
  ];

  /// Inner service for the verifier: drains the streaming body and echoes it
  fn echo() -> impl Service<Request<DigestBody<TestBody>>, Response = Bytes, Error = Error, Future: Send> + Clone {
    tower::service_fn(|req: Request<DigestBody<TestBody>>| async move {
      Ok::<_, Error>(req.into_body().collect().await?.to_bytes())
    })
  }

  /// Run a request through a signer whose inner service hands it back
  async fn signed_request(algorithm: DigestAlgorithm, body: &'static [u8]) -> Request<TestBody> {
    let mut signer = SignerLayer::new(algorithm)
      .layer(tower::service_fn(|req: Request<TestBody>| async move { Ok::<_, Infallible>(req) }));
    let req = Request::builder().body(Full::new(Bytes::from_static(body))).unwrap();
    ServiceExt::<Request<TestBody>>::ready(&mut signer).await.unwrap().call(req).await.unwrap()
  }

  #[tokio::test]
  async fn signer_verifier_round_trip_for_every_algorithm() {
    for &alg in ALL {
      let req = signed_request(alg, b"a body that is longer than one chunk boundary").await;
      let verifier = VerifierLayer::new(alg).layer(echo());

      let echoed = ServiceExt::<Request<TestBody>>::oneshot(verifier, req).await.unwrap();
      assert_eq!(echoed, Bytes::from_static(b"a body that is longer than one chunk boundary"));
    }
  }

  #[tokio::test]
  async fn altering_one_byte_fails_every_algorithm() {
    for &alg in ALL {
      let (parts, _) = signed_request(alg, b"hello").await.into_parts();
      // the inner service still sees the body and answers; the trailing
      // comparison replaces its response with the mismatch
      let tampered = Request::from_parts(parts, Full::new(Bytes::from_static(b"hallo")));
      let verifier = VerifierLayer::new(alg).layer(echo());

      let err = ServiceExt::<Request<TestBody>>::oneshot(verifier, tampered).await.unwrap_err();
      assert!(matches!(err, Error::HashMismatch { .. }), "{alg} accepted a tampered body");
    }
  }

  #[tokio::test]
  async fn missing_header_fails_before_the_body_is_touched() {
    let touched = Arc::new(AtomicBool::new(false));
    let sentinel = {
      let touched = touched.clone();
      tower::service_fn(move |_req: Request<DigestBody<TestBody>>| {
        let touched = touched.clone();
        async move {
          touched.store(true, Ordering::SeqCst);
          Ok::<_, Infallible>(())
        }
      })
    };
    let verifier = VerifierLayer::new(DigestAlgorithm::Sha256).layer(sentinel);

    let req = Request::builder().body(Full::new(Bytes::from_static(b"hello"))).unwrap();
    let err = ServiceExt::<Request<TestBody>>::oneshot(verifier, req).await.unwrap_err();

    assert!(matches!(err, Error::MissingHeader));
    assert!(!touched.load(Ordering::SeqCst));
  }

  #[tokio::test]
  async fn unsupported_token_fails_and_the_inner_service_never_runs() {
    let touched = Arc::new(AtomicBool::new(false));
    let sentinel = {
      let touched = touched.clone();
      tower::service_fn(move |_req: Request<DigestBody<TestBody>>| {
        let touched = touched.clone();
        async move {
          touched.store(true, Ordering::SeqCst);
          Ok::<_, Infallible>(())
        }
      })
    };
    let verifier = VerifierLayer::new(DigestAlgorithm::Sha256).layer(sentinel);

    let req = Request::builder()
      .header("digest", "sha=2jmj7l5rSw0yVb/vlWAYkK/YBwk=")
      .body(Full::new(Bytes::from_static(b"hello")))
      .unwrap();
    let err = ServiceExt::<Request<TestBody>>::oneshot(verifier, req).await.unwrap_err();

    assert!(matches!(err, Error::Digest(DigestError::UnsupportedDigest(_))));
    assert!(!touched.load(Ordering::SeqCst));
  }

  #[tokio::test]
  async fn undecodable_declared_value_fails_fast() {
    for bad in ["sha-256=not/base64!!", "sha-256=YWJj", "crc32c=ninehundred"] {
      let verifier = VerifierLayer::new(DigestAlgorithm::Sha256).layer(echo());
      let req = Request::builder()
        .header("digest", bad)
        .body(Full::new(Bytes::from_static(b"hello")))
        .unwrap();
      let err = ServiceExt::<Request<TestBody>>::oneshot(verifier, req).await.unwrap_err();
      assert!(matches!(err, Error::Digest(DigestError::InvalidDigest(_))), "{bad} was accepted");
    }
  }

  #[tokio::test]
  async fn multi_entry_header_verifies_only_the_configured_algorithm() {
    let body = b"a body declared under two algorithms";
    let mut crc = DigestAlgorithm::Crc32c.context();
    crc.update(body);
    let mut sha = DigestAlgorithm::Sha256.context();
    sha.update(body);
    let declared = header::encode(&[crc.finalize(), sha.finalize()]);

    let req = Request::builder()
      .header("digest", declared.as_str())
      .body(Full::new(Bytes::from_static(body)))
      .unwrap();
    let verifier = VerifierLayer::new(DigestAlgorithm::Sha256).layer(echo());
    assert!(ServiceExt::<Request<TestBody>>::oneshot(verifier, req).await.is_ok());

    // the same header lacks sha-512, which counts as missing
    let req = Request::builder()
      .header("digest", declared.as_str())
      .body(Full::new(Bytes::from_static(body)))
      .unwrap();
    let verifier = VerifierLayer::new(DigestAlgorithm::Sha512).layer(echo());
    let err = ServiceExt::<Request<TestBody>>::oneshot(verifier, req).await.unwrap_err();
    assert!(matches!(err, Error::MissingHeader));
  }

  #[tokio::test]
  async fn inner_service_failure_is_reported_as_such() {
    let failing = tower::service_fn(|req: Request<DigestBody<TestBody>>| async move {
      // drain the body first, as a handler normally would
      let _ = req.into_body().collect().await?;
      Err::<(), BoxError>("handler refused the payload".into())
    });
    let verifier = VerifierLayer::new(DigestAlgorithm::Sha256).layer(failing);

    let req = signed_request(DigestAlgorithm::Sha256, b"hello").await;
    let err = ServiceExt::<Request<TestBody>>::oneshot(verifier, req).await.unwrap_err();
    assert!(matches!(err, Error::InnerService(_)));
  }

  #[tokio::test]
  async fn verifier_reports_an_unfinished_body_stream() {
    // an inner service that answers without ever draining the body
    let lazy = tower::service_fn(|_req: Request<DigestBody<TestBody>>| async move { Ok::<_, Infallible>(()) });
    let verifier = VerifierLayer::new(DigestAlgorithm::Sha256).layer(lazy);

    let req = signed_request(DigestAlgorithm::Sha256, b"hello").await;
    let err = ServiceExt::<Request<TestBody>>::oneshot(verifier, req).await.unwrap_err();
    assert!(matches!(err, Error::BodyOperation(_)));
  }
}
