use crate::{error::BoxError, Error};
use bytes::{Buf, Bytes};
use futures::channel::oneshot;
use http_body::{Body, Frame, SizeHint};
use httpdigest::prelude::{DigestAlgorithm, DigestContext, DigestValue};
use std::{
  pin::Pin,
  task::{Context, Poll},
};

/// Resolves with the digest once the wrapped body reaches end-of-stream.
///
/// The sender side is dropped if the body errors or is discarded before its
/// final chunk, so a partial digest is never observable: the receiver then
/// resolves as cancelled.
pub type DigestReceiver = oneshot::Receiver<DigestValue>;

/// Body adapter that feeds every data frame into a digest accumulator while
/// re-emitting the identical bytes downstream.
///
/// The adapter never holds more than the frame currently in flight;
/// `buffer_size` bounds how many bytes are pushed through the accumulator in
/// one step, so memory use is independent of total body size. Trailer frames
/// pass through untouched.
pub struct DigestBody<B> {
  inner: B,
  context: Option<DigestContext>,
  completion: Option<oneshot::Sender<DigestValue>>,
  buffer_size: usize,
}

impl<B> DigestBody<B> {
  /// Wrap `inner`, accumulating a digest for `algorithm` as the bytes pass
  /// through. The returned receiver resolves once the stream has ended.
  pub fn new(inner: B, algorithm: DigestAlgorithm, buffer_size: usize) -> (Self, DigestReceiver) {
    let (tx, rx) = oneshot::channel();
    let body = Self {
      inner,
      context: Some(algorithm.context()),
      completion: Some(tx),
      buffer_size: buffer_size.max(1),
    };
    (body, rx)
  }
}

impl<B> Body for DigestBody<B>
where
  B: Body + Unpin,
  B::Error: Into<BoxError>,
{
  type Data = Bytes;
  type Error = Error;

  fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
    let this = self.get_mut();
    match Pin::new(&mut this.inner).poll_frame(cx) {
      Poll::Pending => Poll::Pending,
      Poll::Ready(Some(Ok(frame))) => {
        let frame = frame.map_data(|mut data| {
          let data = data.copy_to_bytes(data.remaining());
          if let Some(context) = this.context.as_mut() {
            for piece in data.chunks(this.buffer_size) {
              context.update(piece);
            }
          }
          data
        });
        Poll::Ready(Some(Ok(frame)))
      }
      Poll::Ready(Some(Err(e))) => {
        // digesting is abandoned; the receiver observes cancellation
        this.context = None;
        this.completion = None;
        Poll::Ready(Some(Err(Error::BodyOperation(e.into()))))
      }
      Poll::Ready(None) => {
        if let (Some(context), Some(tx)) = (this.context.take(), this.completion.take()) {
          let _ = tx.send(context.finalize());
        }
        Poll::Ready(None)
      }
    }
  }

  fn is_end_stream(&self) -> bool {
    // keep reporting a live stream until the terminal frame has been polled,
    // so consumers cannot skip the poll that finalizes the digest
    self.completion.is_none() && self.inner.is_end_stream()
  }

  fn size_hint(&self) -> SizeHint {
    self.inner.size_hint()
  }
}

/* ----------------------------------------------------------------- */
