//! # plastfinder-server
//!
//! HTTP surface for plastfinder.
//!
//! - **[`router`]**: axum router with `POST /api/search` and `GET /health`
//! - **[`ServerConfig`]**: settings read from the environment
//! - **[`init_tracing`]**: `tracing-subscriber` setup for the binary
//!
//! The search route builds the sourcing prompt, starts a grounded upstream
//! search and relays it to the client as JSON Lines (see
//! [`plastfinder_streaming::wire`]).

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod server;
pub mod telemetry;

pub use config::{ServerConfig, DEFAULT_BIND};
pub use error::{ErrorResponse, ServerError, ServerResult, UPSTREAM_FAILURE_MESSAGE};
pub use server::{router, serve, AppState, SEARCH_PATH};
pub use telemetry::{init_tracing, json_logs_requested};
