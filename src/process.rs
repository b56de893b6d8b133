//! Piping a buffer through an external tool.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PipeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("i/o error while talking to {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} timed out after {seconds} seconds")]
    Timeout { program: String, seconds: u64 },
}

/// Runs `program args...` with `input` on stdin and collects its output.
/// The child is killed if it outlives `timeout`.
pub async fn pipe_through(
    program: &Path,
    args: &[&str],
    input: Vec<u8>,
    timeout: Duration,
) -> Result<Output, PipeError> {
    let name = program.display().to_string();

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| PipeError::Spawn {
            program: name.clone(),
            source,
        })?;

    // Feed stdin concurrently so a child that fills its stdout pipe before
    // draining stdin cannot deadlock us.
    let writer = child.stdin.take().map(|mut stdin| {
        tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        })
    });

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| PipeError::Timeout {
            program: name.clone(),
            seconds: timeout.as_secs(),
        })?
        .map_err(|source| PipeError::Io {
            program: name.clone(),
            source,
        })?;

    if let Some(writer) = writer {
        // A child that exits early closes its stdin; its exit status tells
        // the real story.
        if let Ok(Err(e)) = writer.await {
            debug!(program = %name, error = %e, "stdin write did not complete");
        }
    }

    Ok(output)
}
