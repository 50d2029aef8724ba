//! Body stream that records what it yields.
//!
//! Chunks pass through untouched; a copy is accumulated up to a byte limit
//! and handed to a completion callback once the inner stream ends cleanly.
//! An inner error, an overflow or the stream being dropped early all discard
//! the copy.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use futures_util::Stream;

type OnComplete = Box<dyn FnOnce(Bytes) + Send>;

pub struct TeeStream<S> {
    inner: S,
    buffer: Option<Vec<u8>>,
    limit: usize,
    on_complete: Option<OnComplete>,
}

impl<S> TeeStream<S> {
    pub fn new<F>(inner: S, limit: usize, on_complete: F) -> Self
    where
        F: FnOnce(Bytes) + Send + 'static,
    {
        Self {
            inner,
            buffer: Some(Vec::new()),
            limit,
            on_complete: Some(Box::new(on_complete)),
        }
    }
}

impl<S, E> Stream for TeeStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                if let Some(buffer) = this.buffer.as_mut() {
                    if buffer.len() + chunk.len() > this.limit {
                        this.buffer = None;
                    } else {
                        buffer.extend_from_slice(&chunk);
                    }
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.buffer = None;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if let (Some(buffer), Some(on_complete)) = (this.buffer.take(), this.on_complete.take()) {
                    on_complete(Bytes::from(buffer));
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
