//! Trace-context middleware.
//!
//! Derives a request [`Logger`] from the base logger and the inbound
//! `traceparent` header and stores it in the request extensions, where
//! handlers pick it up through the `Logger` extractor.

use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};

use crate::observability::Logger;

/// Layer that attaches a request-scoped [`Logger`].
#[derive(Debug, Clone)]
pub struct TraceContextLayer {
    base: Logger,
}

impl TraceContextLayer {
    pub fn new(base: Logger) -> Self {
        Self { base }
    }
}

impl<S> Layer<S> for TraceContextLayer {
    type Service = TraceContext<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceContext {
            inner,
            base: self.base.clone(),
        }
    }
}

/// Service produced by [`TraceContextLayer`].
#[derive(Debug, Clone)]
pub struct TraceContext<S> {
    inner: S,
    base: Logger,
}

impl<S, B> Service<Request<B>> for TraceContext<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let logger = self.base.attach(request.headers());
        request.extensions_mut().insert(logger);
        self.inner.call(request)
    }
}
