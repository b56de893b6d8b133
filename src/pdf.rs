//! Chat transcript export.
//!
//! The transcript is assembled as one HTML page (see `views`) and handed to
//! an HTML-to-PDF renderer. The bundled renderer drives `wkhtmltopdf`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::ChatExportRequest;
use crate::process::{pipe_through, PipeError};
use crate::views::create_chat_document;

pub const DEFAULT_STYLESHEET: &str = include_str!("../static/pdf-style.css");

#[derive(Debug, Error)]
pub enum PdfError {
    /// The renderer ran but reported a failure.
    #[error("{0}")]
    Render(String),

    #[error("PDF renderer timed out after {0} seconds")]
    Timeout(u64),

    #[error("PDF renderer produced no output")]
    EmptyOutput,

    #[error(transparent)]
    Spawn(std::io::Error),
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>, PdfError>;
}

pub struct WkhtmltopdfRenderer {
    binary: PathBuf,
    timeout: Duration,
}

impl WkhtmltopdfRenderer {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PdfRenderer for WkhtmltopdfRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, PdfError> {
        let output = pipe_through(
            &self.binary,
            &[
                "--quiet",
                "--encoding",
                "utf-8",
                "--disable-javascript",
                "--disable-local-file-access",
                "-",
                "-",
            ],
            html.as_bytes().to_vec(),
            self.timeout,
        )
        .await
        .map_err(|e| match e {
            PipeError::Timeout { seconds, .. } => PdfError::Timeout(seconds),
            PipeError::Spawn { source, .. } | PipeError::Io { source, .. } => PdfError::Spawn(source),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(PdfError::Render(format!(
                "wkhtmltopdf exited with code {}: {}",
                code,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(PdfError::EmptyOutput);
        }
        Ok(output.stdout)
    }
}

pub async fn generate_chat_pdf(
    renderer: &dyn PdfRenderer,
    request: &ChatExportRequest,
    stylesheet: &str,
) -> Result<Vec<u8>, PdfError> {
    let html = create_chat_document(&request.title, &request.messages, stylesheet).into_string();
    debug!(bytes = html.len(), "built chat html");

    let pdf = renderer.render(&html).await?;
    info!(
        messages = request.messages.len(),
        bytes = pdf.len(),
        "exported chat as pdf"
    );
    Ok(pdf)
}
