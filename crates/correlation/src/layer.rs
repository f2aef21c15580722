//! Tower middleware that stamps every request with a request id.
//!
//! Reads `x-request-id` from the inbound headers, generates a UUID v4
//! when the header is absent or empty, stores the chosen [`RequestId`] in
//! the request extensions so downstream components can read it, and
//! echoes the id back on the response header regardless of origin.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::header::HeaderValue;
use http::{Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};

use crate::context::REQUEST_ID_HEADER;
use crate::id::RequestId;

/// Layer applying [`RequestIdService`] to the wrapped service.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Middleware establishing the per-request id.
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(RequestId::from_string)
            .unwrap_or_default();

        let echo = HeaderValue::from_str(id.as_str()).ok();
        req.extensions_mut().insert(id);

        ResponseFuture {
            inner: self.inner.call(req),
            echo,
        }
    }
}

pin_project! {
    /// Response future echoing the request id header once the inner
    /// service completes.
    pub struct ResponseFuture<F> {
        #[pin]
        inner: F,
        echo: Option<HeaderValue>,
    }
}

impl<F, ResBody, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let mut response = match this.inner.poll(cx) {
            Poll::Ready(Ok(response)) => response,
            Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
            Poll::Pending => return Poll::Pending,
        };

        if let Some(echo) = this.echo.take() {
            response.headers_mut().insert(REQUEST_ID_HEADER, echo);
        }

        Poll::Ready(Ok(response))
    }
}
