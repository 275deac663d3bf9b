//! Invocation of the external hyphenation tool.
//!
//! The invoker knows nothing about temp-path allocation or cleanup: it maps
//! an input path to an output path for a language code, and translates tool
//! failure into a typed error. The tool is spawned with a discrete argument
//! vector and no shell, so nothing user-influenced is ever reinterpreted by
//! one.

use crate::config::ServerConfig;
use crate::error::{HyphenError, ServerResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// The transformation boundary. Object-safe so tests can inject fakes in
/// place of the real child process.
#[async_trait]
pub trait Hyphenator: Send + Sync {
    /// Transform `input` into `output` for `language`. On success the tool
    /// must have left a readable file at `output`.
    async fn hyphenate(&self, input: &Path, output: &Path, language: &str) -> ServerResult<()>;
}

/// Runs the configured executable as
/// `<tool> -l <language> <input> -o <output>` and waits, bounded by the
/// configured deadline. On expiry the child is killed.
#[derive(Debug, Clone)]
pub struct ToolHyphenator {
    command: String,
    timeout: Duration,
}

impl ToolHyphenator {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    pub fn from_config(cfg: &ServerConfig) -> Self {
        Self::new(cfg.tool_command.clone(), cfg.tool_timeout())
    }
}

#[async_trait]
impl Hyphenator for ToolHyphenator {
    async fn hyphenate(&self, input: &Path, output: &Path, language: &str) -> ServerResult<()> {
        debug!(
            tool = %self.command,
            language,
            input = %input.display(),
            output = %output.display(),
            "tool_invocation"
        );

        let mut cmd = Command::new(&self.command);
        cmd.arg("-l")
            .arg(language)
            .arg(input)
            .arg("-o")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            HyphenError::Invocation(format!("failed to start {}: {e}", self.command))
        })?;

        // kill_on_drop terminates the child when the timeout drops the
        // wait future.
        let waited = tokio::time::timeout(self.timeout, child.wait_with_output()).await;

        match waited {
            Err(_) => Err(HyphenError::Timeout {
                secs: self.timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(HyphenError::Invocation(e.to_string())),
            Ok(Ok(out)) if out.status.success() => Ok(()),
            Ok(Ok(out)) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                let detail = stderr.trim();
                if detail.is_empty() {
                    Err(HyphenError::Invocation(format!(
                        "tool exited with {}",
                        out.status
                    )))
                } else {
                    Err(HyphenError::Invocation(detail.to_string()))
                }
            }
        }
    }
}
