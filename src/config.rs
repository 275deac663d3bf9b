use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Server configuration.
///
/// Everything the pipeline depends on is injected through this struct: the
/// scratch directory, the upload size ceiling, the supported language set,
/// and the tool command. Nothing in the pipeline reaches for ambient process
/// state.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upload size ceiling in MiB. Uploads strictly larger are rejected.
    #[serde(default = "default_max_upload_size_mb")]
    pub max_upload_size_mb: usize,

    /// Language codes the hyphenation tool accepts. Closed set; the
    /// validator rejects anything else before it can reach a command line.
    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,

    /// Directory for request-scoped temporary artifacts
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Hyphenation executable (name on PATH or absolute path)
    #[serde(default = "default_tool_command")]
    pub tool_command: String,

    /// Upper bound on a single tool invocation, in seconds. The child is
    /// killed on expiry.
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Enable CORS (the upload form is a browser client)
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_upload_size_mb: default_max_upload_size_mb(),
            supported_languages: default_supported_languages(),
            scratch_dir: default_scratch_dir(),
            tool_command: default_tool_command(),
            tool_timeout_secs: default_tool_timeout_secs(),
            enable_cors: default_true(),
            log_level: default_log_level(),
        }
    }
}

/// Configuration mistakes caught at startup rather than at request time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("supported_languages must not be empty")]
    EmptyLanguageSet,

    #[error("max_upload_size_mb must be greater than zero")]
    ZeroSizeCeiling,

    #[error("tool_timeout_secs must be greater than zero")]
    ZeroToolTimeout,
}

impl ServerConfig {
    /// Load configuration from an optional `server` file and
    /// `EPUB_SERVER__*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(config::Environment::with_prefix("EPUB_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Validate internal consistency. Cheap, in-memory, meant for startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supported_languages.is_empty() {
            return Err(ConfigError::EmptyLanguageSet);
        }
        if self.max_upload_size_mb == 0 {
            return Err(ConfigError::ZeroSizeCeiling);
        }
        if self.tool_timeout_secs == 0 {
            return Err(ConfigError::ZeroToolTimeout);
        }
        Ok(())
    }

    /// Socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Whole-request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Tool invocation deadline as a Duration
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Upload size ceiling in bytes
    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size_mb as u64 * 1024 * 1024
    }

    /// Request body limit: the ceiling plus slack for multipart framing.
    /// Uploads within the slack reach the validator; bodies beyond it fail
    /// the multipart read, which the handler reports as the size rejection.
    pub fn body_limit(&self) -> usize {
        (self.max_upload_size_mb + 1) * 1024 * 1024
    }

    /// The supported set rendered for the error message, e.g. `"en" or "ru"`.
    pub fn allowed_languages(&self) -> String {
        self.supported_languages
            .iter()
            .map(|code| format!("\"{code}\""))
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_upload_size_mb() -> usize {
    50
}

fn default_supported_languages() -> Vec<String> {
    vec!["en".to_string(), "ru".to_string()]
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_tool_command() -> String {
    "hyphenatepub".to_string()
}

fn default_tool_timeout_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
