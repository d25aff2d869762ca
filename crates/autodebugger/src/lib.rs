//! Console auto-debugger session: edit code, run it in a remote sandbox, ask
//! a model for a fix, and review the fix as a split diff before applying it.
//!
//! ## Backend bootstrap
//!
//! The remote backend is chosen explicitly at startup:
//!
//! - `AUTODEBUGGER_BACKEND=mock` (default) answers locally and deterministically
//! - `AUTODEBUGGER_BACKEND=http` talks to a DevForge service over HTTP
//!
//! `AUTODEBUGGER_CONFIG_PATH` may name a UTF-8 JSON file with this shape:
//!
//! ```json
//! {
//!   "base_url": "http://localhost:8000",
//!   "request_timeout_sec": 30,
//!   "operation_timeout_sec": 60
//! }
//! ```
//!
//! Contract notes:
//! - every field is optional; timeouts must be > 0 when provided.
//! - unknown JSON fields are rejected.
//! - `AUTODEBUGGER_BASE_URL` overrides `base_url`.
//! - `AUTODEBUGGER_LOG_PATH` sets the log file (default `autodebugger.log`);
//!   `RUST_LOG` sets the level (default `info`).
//!
//! Rendering honours `FORGE_NO_COLOR`, `NO_COLOR`, `FORGE_NO_HIGHLIGHT` and
//! `FORGE_COLUMNS`.

pub mod app;
pub mod backends;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod runtime;
pub mod sample;
pub mod tui;
pub mod view;
