//! Observability infrastructure for the marketplace core.
//!
//! This crate provides:
//! - `RequestId` - Unique identifier correlating the log lines of one call
//! - `StructuredLogger` - Structured logging with request context
//! - `LogBuilder` - Fluent construction of log entries with typed fields

mod logging;
mod request;

pub use logging::*;
pub use request::*;
