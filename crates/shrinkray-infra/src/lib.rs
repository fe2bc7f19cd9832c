//! Shrinkray Infrastructure Library
//!
//! Shared infrastructure used by the Shrinkray binaries:
//! - Telemetry initialization (tracing subscriber setup)
//! - Request ID middleware for the local gateway
//! - The JSON error body returned by HTTP routes

pub mod error;
pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use error::ErrorResponse;
pub use middleware::{request_id_middleware, RequestId};
pub use telemetry::{init_telemetry, TelemetryOptions};
