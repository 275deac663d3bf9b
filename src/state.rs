use crate::config::ServerConfig;
use crate::error::{HyphenError, ServerResult};
use crate::invoke::{Hyphenator, ToolHyphenator};
use crate::scratch::ScratchStore;
use std::sync::Arc;

/// Shared application state.
///
/// Holds no mutable data: requests share only the configuration, the scratch
/// directory handle, and the invoker. Path uniqueness in [`ScratchStore`] is
/// the only cross-request safety property.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<ServerConfig>,

    /// Temp artifact manager bound to the configured scratch directory
    pub scratch: ScratchStore,

    /// Transformation invoker; a real child-process runner in production,
    /// a fake in tests.
    pub hyphenator: Arc<dyn Hyphenator>,
}

impl ServerState {
    /// Create state with the real tool invoker.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let hyphenator = Arc::new(ToolHyphenator::from_config(&config));
        Self::with_hyphenator(config, hyphenator)
    }

    /// Create state with an injected invoker. Ensures the scratch directory
    /// exists so staging failures at request time mean real I/O trouble.
    pub fn with_hyphenator(
        config: ServerConfig,
        hyphenator: Arc<dyn Hyphenator>,
    ) -> ServerResult<Self> {
        std::fs::create_dir_all(&config.scratch_dir).map_err(|e| {
            HyphenError::Internal(format!(
                "cannot create scratch directory {}: {e}",
                config.scratch_dir.display()
            ))
        })?;

        let scratch = ScratchStore::new(&config.scratch_dir);

        Ok(Self {
            config: Arc::new(config),
            scratch,
            hyphenator,
        })
    }
}
