//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging → Open store → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → broadcast → stop accepting → drain → close store
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
