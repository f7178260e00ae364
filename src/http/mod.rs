//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeouts, HTTP tracing)
//!     → middleware::trace_context (request Logger bound to `traceparent`)
//!     → middleware::seal (base64 in, base64 out)
//!     → handlers.rs (/checkin, /currents, /checkout)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod server;

pub use handlers::{AppState, CheckInRequest};
pub use server::{build_router, HttpServer};
