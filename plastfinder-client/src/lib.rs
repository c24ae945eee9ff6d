//! # plastfinder-client
//!
//! Consumes the plastfinder search stream and drives the command-line
//! interface.
//!
//! - **[`SearchClient`]**: posts criteria and pumps the JSON Lines body into a
//!   [`SearchController`](plastfinder_streaming::SearchController)
//! - **[`FileHistoryStore`]**: keeps recent searches in a JSON file
//! - **[`render`]**: plain-text result lines, summary table and price chart
//! - **[`cli`]**: `clap` arguments for the `plastfinder` binary
//!
//! ```no_run
//! use plastfinder_client::{ClientConfig, SearchClient};
//! use plastfinder_core::SearchCriteria;
//! use plastfinder_streaming::SearchController;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SearchClient::new(&ClientConfig::default())?;
//! let mut controller = SearchController::new();
//! let cancel = CancellationToken::new();
//!
//! client
//!     .search(&mut controller, SearchCriteria::default(), &cancel, |_, update| {
//!         println!("{update:?}");
//!     })
//!     .await?;
//! println!("{} suppliers", controller.results().len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod render;
pub mod telemetry;
pub mod transport;

pub use config::{default_history_path, ClientConfig, DEFAULT_ENDPOINT};
pub use error::{ClientError, ClientResult};
pub use history::FileHistoryStore;
pub use telemetry::init_tracing;
pub use transport::{ByteStream, SearchClient};
