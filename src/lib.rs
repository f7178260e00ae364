//! Location check-in service.
//!
//! Requests and responses travel base64-sealed; every request carries its
//! own logger bound to the inbound `traceparent`; persistence sits behind
//! the [`store::VisitRecorder`] capability.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::Logger;
