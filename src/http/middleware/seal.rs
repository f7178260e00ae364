//! Body transcoding ("sealing") middleware.
//!
//! Every request body arrives base64-encoded (standard alphabet, padded) and
//! is decoded before it reaches the routes. Everything the routes write is
//! buffered and base64-encoded exactly once on the way out. Status and
//! headers pass through untouched, except `Content-Length`, which no longer
//! matches the transformed body.
//!
//! Encoding is done over the whole buffered body: standard base64 cannot be
//! applied to arbitrary chunks without breaking the 3-byte block alignment.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::observability::Logger;

/// Failure to unseal a request body.
#[derive(Debug, Error)]
pub enum SealError {
    #[error("malformed base64 body: {0}")]
    Malformed(#[from] base64::DecodeError),
}

/// Encode cleartext bytes for the wire.
pub fn seal(cleartext: &[u8]) -> String {
    STANDARD.encode(cleartext)
}

/// Decode wire bytes back to cleartext.
///
/// Rejects anything that is not canonical standard base64, so that
/// `seal(unseal(e)?) == e` holds for every accepted input.
pub fn unseal(encoded: &[u8]) -> Result<Vec<u8>, SealError> {
    Ok(STANDARD.decode(encoded)?)
}

/// State for [`seal_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct SealState {
    /// Maximum encoded request body size in bytes.
    pub max_body_size: usize,
}

/// Unseal the request body, run the rest of the chain, seal the response body.
///
/// Runs inside the request logger's span, so rejections carry `traceparent`.
pub async fn seal_middleware(
    State(state): State<SealState>,
    request: Request,
    next: Next,
) -> Response {
    let logger = Logger::from_extensions(request.extensions());
    logger.instrument(seal_exchange(state, request, next)).await
}

async fn seal_exchange(state: SealState, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let encoded = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, limit = state.max_body_size, "Failed to read request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let cleartext = match unseal(&encoded) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, encoded_len = encoded.len(), "Rejecting request");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    let request = Request::from_parts(parts, Body::from(cleartext));

    let response = next.run(request).await;
    seal_response(response).await
}

async fn seal_response(response: Response) -> Response {
    let (mut parts, body) = response.into_parts();

    let cleartext: Bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(seal(&cleartext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderValue, Method},
        middleware,
        routing::post,
        Router,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/echo",
                post(move |body: Bytes| {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        let mut response = body.into_response();
                        response
                            .headers_mut()
                            .insert("x-handler", HeaderValue::from_static("yes"));
                        (StatusCode::CREATED, response)
                    }
                }),
            )
            .route("/empty", post(|| async {}))
            .layer(middleware::from_fn_with_state(
                SealState { max_body_size: 64 },
                seal_middleware,
            ))
    }

    fn post_to(uri: &str, body: impl Into<Body>) -> Request {
        axum::http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(body.into())
            .unwrap()
    }

    async fn raw_body(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    #[test]
    fn test_round_trip_over_varied_lengths() {
        let data: Vec<u8> = (0..=255u8).collect();
        for len in [0, 1, 2, 3, 4, 5, 63, 64, 65, 256] {
            let bytes = &data[..len.min(data.len())];
            assert_eq!(unseal(seal(bytes).as_bytes()).unwrap(), bytes);
        }
    }

    #[test]
    fn test_valid_encodings_reencode_identically() {
        for encoded in ["", "YQ==", "YWI=", "YWJj", "eyJpZCI6MSwicGxhY2VfaWQiOjQyfQ=="] {
            let decoded = unseal(encoded.as_bytes()).unwrap();
            assert_eq!(seal(&decoded), encoded);
        }
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        for encoded in [
            "%%%not-base64%%%",
            "YQ",      // missing padding
            "YR==",    // non-canonical trailing bits
            "YWJj\n",  // trailing newline
            "YW-j",    // url-safe alphabet
            "=YWJ",
        ] {
            assert!(unseal(encoded.as_bytes()).is_err(), "accepted {encoded:?}");
        }
    }

    #[tokio::test]
    async fn test_response_is_encoded_exactly_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let request = post_to("/echo", seal(b"hello, world"));

        let response = app(hits.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-handler"], "yes");
        assert_eq!(raw_body(response).await, seal(b"hello, world").as_bytes());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_short_circuits() {
        let hits = Arc::new(AtomicUsize::new(0));
        let request = post_to("/echo", "%%%not-base64%%%");

        let response = app(hits.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(raw_body(response).await.is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let hits = Arc::new(AtomicUsize::new(0));
        let request = post_to("/echo", seal(&[b'x'; 128]));

        let response = app(hits.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_response_stays_empty() {
        let hits = Arc::new(AtomicUsize::new(0));
        let response = app(hits).oneshot(post_to("/empty", "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(raw_body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_content_length_is_dropped() {
        let hits = Arc::new(AtomicUsize::new(0));
        let response = app(hits)
            .oneshot(post_to("/echo", seal(b"abc")))
            .await
            .unwrap();

        if let Some(length) = response.headers().get(header::CONTENT_LENGTH) {
            assert_eq!(length, "4");
        }
        assert_eq!(raw_body(response).await, "YWJj".as_bytes());
    }
}
