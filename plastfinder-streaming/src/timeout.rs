//! Inactivity timeout for streams.

use crate::error::{StreamError, StreamResult};
use futures::Stream;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Instant, Sleep};

/// Default inactivity window for relay and consumer loops.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

pin_project! {
    /// Ends a stream with [`StreamError::Timeout`] when no item arrives
    /// within the window. The window restarts after every item.
    pub struct IdleTimeout<S> {
        #[pin]
        inner: S,
        #[pin]
        sleep: Sleep,
        window: Duration,
        expired: bool,
    }
}

impl<S: Stream> IdleTimeout<S> {
    /// Wrap a stream.
    pub fn new(inner: S, window: Duration) -> Self {
        Self {
            inner,
            sleep: tokio::time::sleep(window),
            window,
            expired: false,
        }
    }

    /// The inactivity window.
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl<S: Stream> Stream for IdleTimeout<S> {
    type Item = StreamResult<S::Item>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.expired {
            return Poll::Ready(None);
        }

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(item)) => {
                this.sleep.as_mut().reset(Instant::now() + *this.window);
                Poll::Ready(Some(Ok(item)))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => match this.sleep.poll(cx) {
                Poll::Ready(()) => {
                    *this.expired = true;
                    Poll::Ready(Some(Err(StreamError::Timeout(*this.window))))
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

/// Extension trait adding [`IdleTimeout`] to any stream.
pub trait StreamTimeoutExt: Stream + Sized {
    /// End the stream with a timeout error after `window` without items.
    fn idle_timeout(self, window: Duration) -> IdleTimeout<Self> {
        IdleTimeout::new(self, window)
    }
}

impl<S: Stream> StreamTimeoutExt for S {}
