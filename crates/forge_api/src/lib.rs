//! Transport-only client for the DevForge execution and auto-debug service.
//!
//! This crate owns request building, response decoding, and error mapping for
//! the `/run` and `/debug` endpoints. It holds no session state and no UI
//! coupling; callers map its results into `forge_backend` values.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod url;

pub use client::{CancellationSignal, ForgeApiClient};
pub use config::ForgeApiConfig;
pub use error::ForgeApiError;
pub use payload::{DebugPayload, DebugResponse, RunPayload, RunResponse};
pub use url::{endpoint_url, DEFAULT_BASE_URL};
