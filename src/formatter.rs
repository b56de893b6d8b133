use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::process::{pipe_through, PipeError};

/// Handed to `--config` so black never picks up a `pyproject.toml` from the
/// server's working directory or the user's config; default mode only.
#[cfg(not(windows))]
const EMPTY_CONFIG: &str = "/dev/null";
#[cfg(windows)]
const EMPTY_CONFIG: &str = "NUL";

#[derive(Debug, Error)]
pub enum FormatError {
    /// The formatter could not parse the input.
    #[error("{0}")]
    Rejected(String),

    #[error("code formatter unavailable: {0}")]
    Unavailable(String),

    #[error("code formatter timed out after {0} seconds")]
    Timeout(u64),
}

#[async_trait]
pub trait CodeFormatter: Send + Sync {
    async fn format(&self, code: &str) -> Result<String, FormatError>;
}

/// Formats Python source with the `black` command line tool.
pub struct BlackFormatter {
    binary: PathBuf,
    timeout: Duration,
}

impl BlackFormatter {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl CodeFormatter for BlackFormatter {
    async fn format(&self, code: &str) -> Result<String, FormatError> {
        let output = pipe_through(
            &self.binary,
            &["--config", EMPTY_CONFIG, "--quiet", "-"],
            code.as_bytes().to_vec(),
            self.timeout,
        )
        .await
        .map_err(|e| match e {
            PipeError::Timeout { seconds, .. } => FormatError::Timeout(seconds),
            other => FormatError::Unavailable(other.to_string()),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FormatError::Rejected(clean_black_message(&stderr)));
        }

        let formatted = String::from_utf8_lossy(&output.stdout).into_owned();
        if formatted.is_empty() || formatted == code {
            debug!("formatter reported no changes");
            return Ok(code.to_string());
        }
        Ok(formatted)
    }
}

/// Black prefixes stdin failures with `error: cannot format -: `; the rest
/// is the parser message callers care about.
fn clean_black_message(stderr: &str) -> String {
    let message = stderr.trim();
    let message = message.strip_prefix("error: ").unwrap_or(message);
    let message = message.strip_prefix("cannot format -: ").unwrap_or(message);
    if message.is_empty() {
        "Code could not be formatted".to_string()
    } else {
        message.to_string()
    }
}
