//! EPUB hyphenation server.
//!
//! An HTTP service that accepts an uploaded EPUB, runs it through an
//! external hyphenation tool, and returns the transformed document as a
//! binary attachment, or a structured JSON error.
//!
//! The core is the pipeline behind `POST /api/process-epub`:
//!
//! 1. **Validate**: file presence, `.epub` extension, size ceiling, and a
//!    closed set of language codes ([`validate`]).
//! 2. **Stage**: write the upload to a collision-free temp path in the
//!    scratch directory ([`scratch`]).
//! 3. **Invoke**: run the hyphenation tool as a child process with a
//!    bounded wait ([`invoke`]).
//! 4. **Respond**: binary attachment on success, JSON error on failure
//!    ([`response`]).
//! 5. **Release**: every allocated temp path is removed on every branch.
//!
//! The pipeline is request-scoped and stateless between calls: no retries,
//! no queues, nothing persisted.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Endpoints
//!
//! - `GET /`: service info
//! - `GET /health`: liveness probe
//! - `GET /ready`: readiness probe (scratch directory check)
//! - `POST /api/process-epub`: multipart form with `file` and `language`

pub mod config;
pub mod error;
pub mod invoke;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod scratch;
pub mod server;
pub mod state;
pub mod validate;

pub use crate::config::{ConfigError, ServerConfig};
pub use crate::error::{HyphenError, ServerResult};
pub use crate::invoke::{Hyphenator, ToolHyphenator};
pub use crate::response::ProcessingOutcome;
pub use crate::scratch::{ArtifactRole, ScratchStore, TempArtifactSet};
pub use crate::server::{build_router, start_server};
pub use crate::state::ServerState;
pub use crate::validate::{validate, ValidUpload};
