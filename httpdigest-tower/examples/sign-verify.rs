use bytes::Bytes;
use http::Request;
use http_body_util::{BodyExt, Full};
use httpdigest_tower::{DigestAlgorithm, DigestBody, Error, SignerLayer, VerifierLayer};
use std::convert::Infallible;
use tower::{Layer, Service, ServiceExt};

/// Sender side: attach a digest header to an outgoing request
async fn sender() -> Request<Full<Bytes>> {
  let mut signer = SignerLayer::new(DigestAlgorithm::Sha256)
    .layer(tower::service_fn(|req: Request<Full<Bytes>>| async move { Ok::<_, Infallible>(req) }));

  let req = Request::builder()
    .method("POST")
    .uri("https://example.com/upload")
    .header("content-type", "application/json")
    .body(Full::new(Bytes::from_static(b"{\"hello\": \"world\"}")))
    .unwrap();

  ServiceExt::<Request<Full<Bytes>>>::ready(&mut signer).await.unwrap().call(req).await.unwrap()
}

/// Receiver side: the handler consumes the streaming body while the digest is
/// recomputed alongside; the verdict arrives after the last byte
async fn receiver(req: Request<Full<Bytes>>) -> Result<Bytes, Error> {
  let handler = tower::service_fn(|req: Request<DigestBody<Full<Bytes>>>| async move {
    Ok::<_, Error>(req.into_body().collect().await?.to_bytes())
  });

  ServiceExt::<Request<Full<Bytes>>>::oneshot(VerifierLayer::new(DigestAlgorithm::Sha256).layer(handler), req).await
}

#[tokio::main]
async fn main() {
  let request = sender().await;
  let digest = request.headers().get("digest").unwrap().to_str().unwrap().to_string();
  println!("digest header: {digest}");

  let body = receiver(request).await.unwrap();
  println!("verified body: {}", String::from_utf8_lossy(&body));

  // a tampered body is rejected once the full stream has passed
  let request = sender().await;
  let (parts, _) = request.into_parts();
  let tampered = Request::from_parts(parts, Full::new(Bytes::from_static(b"{\"hello\": \"w0rld\"}")));
  let err = receiver(tampered).await.unwrap_err();
  println!("tampered body rejected: {err}");
}
