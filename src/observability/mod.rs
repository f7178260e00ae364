//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! main.rs
//!     → logging.rs (install the process-wide subscriber once)
//!     → logger.rs (build the base Logger, handed to the HTTP layer)
//!
//! Per request:
//!     trace-context layer derives a child Logger bound to `traceparent`
//!     → handlers read it back from the request extensions
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing`; JSON for production, pretty for development
//! - No ambient logger object: the base logger is passed explicitly
//! - A missing request logger degrades to a disabled span, never an error

pub mod logger;
pub mod logging;

pub use logger::{Logger, TRACEPARENT};
pub use logging::init_logging;
