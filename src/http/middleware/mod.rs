//! Request-processing middleware.
//!
//! Order (outermost first) is fixed by `server.rs`:
//! ```text
//! trace_context (attach request Logger)
//!     → seal (base64-decode request body, base64-encode response body)
//!         → routes
//! ```

pub mod seal;
pub mod trace_context;

pub use seal::{seal_middleware, SealError, SealState};
pub use trace_context::{TraceContext, TraceContextLayer};
