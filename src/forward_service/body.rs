use std::fmt::Display;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use actix_web::http::header::{HeaderMap, CONTENT_LENGTH, TRANSFER_ENCODING};
use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::forward_service::forward_error::ForwardError;

/// Chunks buffered between the inbound payload and the outbound request.
pub const PIPE_CAPACITY: usize = 16;

pub fn has_body(headers: &HeaderMap) -> bool {
  if headers.contains_key(TRANSFER_ENCODING) {
    return true;
  }

  headers
    .get(CONTENT_LENGTH)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.trim().parse::<u64>().ok())
    .map_or(false, |length| length > 0)
}

/// Moves `source` into a bounded channel from a worker-local task.
///
/// The inbound payload is tied to its worker thread while the outbound body must
/// be `Send`, so the receiving half is what travels with the request. A full
/// channel suspends the producer. The pump stops after the first read error or
/// once the receiving side is gone.
pub fn pipe<S, E>(mut source: S) -> ReceiverStream<io::Result<Bytes>>
where
  S: Stream<Item = Result<Bytes, E>> + Unpin + 'static,
  E: Display,
{
  let (sender, receiver) = mpsc::channel(PIPE_CAPACITY);

  actix_web::rt::spawn(async move {
    while let Some(chunk) = source.next().await {
      let item = chunk.map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()));
      let failed = item.is_err();

      if sender.send(item).await.is_err() {
        debug!("Upstream stopped reading the request body");
        break;
      }

      if failed {
        error!("Reading inbound request body failed");
        break;
      }
    }
  });

  ReceiverStream::new(receiver)
}

pub fn request_body<S, E>(source: S) -> reqwest::Body
where
  S: Stream<Item = Result<Bytes, E>> + Unpin + 'static,
  E: Display,
{
  reqwest::Body::wrap_stream(pipe(source))
}

/// Upstream body as it is handed to the client, chunk by chunk.
///
/// Owns the upstream stream: dropping the relay releases the upstream body,
/// whether the copy completed, failed, or the client went away.
pub struct RelayBody<S> {
  upstream: S,
  relayed: u64,
  finished: bool,
}

impl<S> RelayBody<S> {
  pub fn new(upstream: S) -> Self {
    Self {
      upstream,
      relayed: 0,
      finished: false,
    }
  }
}

impl<S, E> Stream for RelayBody<S>
where
  S: Stream<Item = Result<Bytes, E>> + Unpin,
  E: Display,
{
  type Item = Result<Bytes, ForwardError>;

  fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    if self.finished {
      return Poll::Ready(None);
    }

    match self.upstream.poll_next_unpin(cx) {
      Poll::Ready(Some(Ok(chunk))) => {
        self.relayed += chunk.len() as u64;
        Poll::Ready(Some(Ok(chunk)))
      }
      Poll::Ready(Some(Err(err))) => {
        self.finished = true;
        let err = ForwardError::ResponseRelay(err.to_string());
        // Head already sent, abort the connection.
        error!("{} after {} bytes, response status already sent", err, self.relayed);
        Poll::Ready(Some(Err(err)))
      }
      Poll::Ready(None) => {
        self.finished = true;
        info!("Successfully relayed {} bytes", self.relayed);
        Poll::Ready(None)
      }
      Poll::Pending => Poll::Pending,
    }
  }
}

impl<S> Drop for RelayBody<S> {
  fn drop(&mut self) {
    if !self.finished {
      warn!("Client went away after {} bytes, releasing upstream body", self.relayed);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;
  use futures_util::stream;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::Arc;

  struct ReleaseGuard(Arc<AtomicBool>);

  impl Drop for ReleaseGuard {
    fn drop(&mut self) {
      self.0.store(true, Ordering::SeqCst);
    }
  }

  fn chunks(parts: &[&'static [u8]]) -> Vec<Result<Bytes, String>> {
    parts.iter().map(|part| Ok(Bytes::from_static(part))).collect()
  }

  #[test]
  fn bodyless_get_has_no_body() {
    let request = TestRequest::get().to_http_request();
    assert!(!has_body(request.headers()));

    let request = TestRequest::get().insert_header((CONTENT_LENGTH, "0")).to_http_request();
    assert!(!has_body(request.headers()));
  }

  #[test]
  fn content_length_or_chunked_means_body() {
    let request = TestRequest::get().insert_header((CONTENT_LENGTH, "12")).to_http_request();
    assert!(has_body(request.headers()));

    let request = TestRequest::get()
      .insert_header((TRANSFER_ENCODING, "chunked"))
      .to_http_request();
    assert!(has_body(request.headers()));
  }

  #[actix_web::test]
  async fn pipe_delivers_every_chunk_in_order() {
    let source = stream::iter(chunks(&[b"alpha", b"-", b"omega"]));

    let received: Vec<Bytes> = pipe(source).map(|chunk| chunk.unwrap()).collect().await;

    assert_eq!(received.concat(), b"alpha-omega".to_vec());
  }

  #[actix_web::test]
  async fn pipe_holds_more_chunks_than_its_capacity() {
    let parts: Vec<Result<Bytes, String>> = (0..PIPE_CAPACITY * 4)
      .map(|i| Ok(Bytes::from(vec![i as u8; 1024])))
      .collect();

    let received: Vec<Bytes> = pipe(stream::iter(parts)).map(|chunk| chunk.unwrap()).collect().await;

    assert_eq!(received.len(), PIPE_CAPACITY * 4);
    assert_eq!(received[PIPE_CAPACITY * 2][0], (PIPE_CAPACITY * 2) as u8);
  }

  #[actix_web::test]
  async fn pipe_stops_after_read_error() {
    let source = stream::iter(vec![
      Ok(Bytes::from_static(b"head")),
      Err("payload reset".to_string()),
      Ok(Bytes::from_static(b"never")),
    ]);

    let received: Vec<io::Result<Bytes>> = pipe(source).collect().await;

    assert_eq!(received.len(), 2);
    assert!(received[0].is_ok());
    assert_eq!(received[1].as_ref().unwrap_err().to_string(), "payload reset");
  }

  #[actix_web::test]
  async fn relay_passes_bytes_through_unchanged() {
    let mut relay = RelayBody::new(stream::iter(chunks(&[b"{\"error\":", b"\"not found\"}"])));

    let mut body = Vec::new();
    while let Some(chunk) = relay.next().await {
      body.extend_from_slice(&chunk.unwrap());
    }

    assert_eq!(body, b"{\"error\":\"not found\"}".to_vec());
    assert_eq!(relay.relayed, 21);
    assert!(relay.finished);
  }

  #[actix_web::test]
  async fn relay_surfaces_upstream_failure_and_ends() {
    let mut relay = RelayBody::new(stream::iter(vec![
      Ok(Bytes::from_static(b"partial")),
      Err("connection reset".to_string()),
    ]));

    assert!(relay.next().await.unwrap().is_ok());
    let failure = relay.next().await.unwrap();
    assert!(matches!(failure, Err(ForwardError::ResponseRelay(_))));
    assert!(relay.next().await.is_none());
  }

  #[actix_web::test]
  async fn dropping_relay_releases_upstream() {
    let released = Arc::new(AtomicBool::new(false));
    let guard = ReleaseGuard(released.clone());
    let upstream = stream::iter(chunks(&[b"one", b"two"])).map(move |chunk| {
      let _ = &guard;
      chunk
    });

    let mut relay = RelayBody::new(upstream);
    assert!(relay.next().await.is_some());
    assert!(!released.load(Ordering::SeqCst));

    drop(relay);
    assert!(released.load(Ordering::SeqCst));
  }
}
