//! Request body access logging.
//!
//! Every request body is wrapped in a [`TeeBody`]: data frames are appended
//! to the access log as they are polled and handed on untouched, so the
//! handler reads exactly the bytes that arrived and nothing is buffered.
//!
//! Handlers that never look at the body (deletes, lookups, fallbacks) drop
//! it unread. The dropped remainder is sent back to the middleware, which
//! drains it through the same tee once the response is ready.

use std::fs::File;
use std::io::{self, Write};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http_body::{Body as _, Frame, SizeHint};
use http_body_util::BodyExt;
use pin_project_lite::pin_project;
use tokio::sync::oneshot;

/// Append-only sink for raw request bytes.
#[derive(Clone, Debug)]
pub struct AccessLog {
    file: Arc<File>,
}

impl AccessLog {
    /// Wrap a file opened in append mode.
    pub fn new(file: Arc<File>) -> Self {
        Self { file }
    }

    /// Append one chunk with a single `write_all`.
    pub fn append(&self, bytes: &[u8]) -> io::Result<()> {
        (&*self.file).write_all(bytes)
    }

    /// Append, reporting failures instead of returning them.
    fn record(&self, bytes: &[u8]) {
        if let Err(e) = self.append(bytes) {
            tracing::warn!(error = %e, len = bytes.len(), "Failed to append request body to access log");
        }
    }
}

pin_project! {
    /// A body that copies every data frame into an [`AccessLog`].
    pub struct TeeBody<B> {
        #[pin]
        inner: B,
        sink: AccessLog,
    }
}

impl<B> TeeBody<B> {
    pub fn new(inner: B, sink: AccessLog) -> Self {
        Self { inner, sink }
    }
}

impl<B> http_body::Body for TeeBody<B>
where
    B: http_body::Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();
        let frame = ready!(this.inner.poll_frame(cx));

        if let Some(Ok(frame)) = &frame {
            if let Some(data) = frame.data_ref() {
                this.sink.record(data);
            }
        }

        Poll::Ready(frame)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

/// The body a handler receives. Dropping it before the end of the stream
/// returns the unread tail through `leftover`.
struct Unread {
    body: Option<TeeBody<Body>>,
    finished: bool,
    leftover: Option<oneshot::Sender<TeeBody<Body>>>,
}

impl Unread {
    fn new(body: TeeBody<Body>, leftover: oneshot::Sender<TeeBody<Body>>) -> Self {
        Self {
            body: Some(body),
            finished: false,
            leftover: Some(leftover),
        }
    }
}

impl http_body::Body for Unread {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = &mut *self;
        let Some(body) = this.body.as_mut() else {
            return Poll::Ready(None);
        };

        let frame = ready!(Pin::new(body).poll_frame(cx));
        // end of stream or a read error: nothing is left to hand back
        if !matches!(frame, Some(Ok(_))) {
            this.finished = true;
        }
        Poll::Ready(frame)
    }

    fn is_end_stream(&self) -> bool {
        self.body.as_ref().map_or(true, |body| body.is_end_stream())
    }

    fn size_hint(&self) -> SizeHint {
        self.body
            .as_ref()
            .map_or_else(|| SizeHint::with_exact(0), |body| body.size_hint())
    }
}

impl Drop for Unread {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let (Some(body), Some(leftover)) = (self.body.take(), self.leftover.take()) {
            if !body.is_end_stream() {
                let _ = leftover.send(body);
            }
        }
    }
}

/// Read the rest of a body through its tee, discarding the bytes.
async fn drain(mut body: TeeBody<Body>) {
    while let Some(frame) = body.frame().await {
        if let Err(e) = frame {
            tracing::debug!(error = %e, "Unread request body could not be drained");
            break;
        }
    }
}

/// Middleware that tees every request body into the access log, including
/// bodies the handler never reads.
pub async fn access_log_middleware(
    State(log): State<AccessLog>,
    request: Request,
    next: Next,
) -> Response {
    let (leftover, mut returned) = oneshot::channel();
    let request = request.map(|body| Body::new(Unread::new(TeeBody::new(body, log), leftover)));
    let response = next.run(request).await;

    if let Ok(rest) = returned.try_recv() {
        drain(rest).await;
    }
    response
}
