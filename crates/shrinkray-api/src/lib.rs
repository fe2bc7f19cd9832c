//! Shrinkray API Library
//!
//! Axum application standing in for the gateway's two public routes during
//! local development and integration testing.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

pub use error::{HttpAppError, ValidatedJson};
pub use setup::{setup_routes, setup_state, start_server};
pub use state::{AppState, UploadConfig};
