//! Request-scoped structured logger.
//!
//! A [`Logger`] is a thin handle over a `tracing` span. The composition root
//! creates one base logger per process; the trace-context layer derives a
//! child per request, bound to the inbound `traceparent` header, and stores
//! it in the request extensions. Everything emitted through the child carries
//! that identifier.
//!
//! Both spans are created at ERROR level so that a stricter filter never
//! drops them while still letting the events inside them through.

use std::convert::Infallible;
use std::future::Future;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Extensions, HeaderMap, HeaderName},
};
use tracing::{instrument::Instrumented, Instrument, Span};

/// W3C Trace Context correlation header.
pub const TRACEPARENT: HeaderName = HeaderName::from_static("traceparent");

/// Structured logging handle.
///
/// Cheap to clone; clones share the underlying span.
#[derive(Debug, Clone)]
pub struct Logger {
    span: Span,
    traceparent: Option<String>,
}

impl Logger {
    /// Base logger for the process, bound to the host name.
    pub fn new(hostname: &str) -> Self {
        Self {
            span: tracing::error_span!("checkin", hostname = %hostname),
            traceparent: None,
        }
    }

    /// A logger over a disabled span. Emitting through it is always safe.
    pub fn disabled() -> Self {
        Self {
            span: Span::none(),
            traceparent: None,
        }
    }

    /// Derive a request logger bound to `traceparent`.
    ///
    /// The receiver is left untouched.
    pub fn with_traceparent(&self, traceparent: &str) -> Self {
        let span = tracing::error_span!(parent: &self.span, "request", traceparent = %traceparent);
        Self {
            span,
            traceparent: Some(traceparent.to_string()),
        }
    }

    /// Derive a request logger from inbound headers.
    ///
    /// A missing or non-UTF-8 `traceparent` header binds the empty string.
    pub fn attach(&self, headers: &HeaderMap) -> Self {
        let traceparent = headers
            .get(&TRACEPARENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        self.with_traceparent(traceparent)
    }

    /// Look up the logger attached to a request, or fall back to a disabled one.
    pub fn from_extensions(extensions: &Extensions) -> Self {
        extensions.get::<Logger>().cloned().unwrap_or_default()
    }

    /// The bound trace identifier, if this is a request logger.
    pub fn traceparent(&self) -> Option<&str> {
        self.traceparent.as_deref()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Run `future` inside this logger's span.
    pub fn instrument<F: Future>(&self, future: F) -> Instrumented<F> {
        future.instrument(self.span.clone())
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::disabled()
    }
}

impl<S> FromRequestParts<S> for Logger
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Logger::from_extensions(&parts.extensions))
    }
}
