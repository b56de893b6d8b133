use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::StreamBody,
    extract::{FromRef, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use crate::auth::{AdminUser, AuthState};
use crate::config::Config;
use crate::database::Database;
use crate::error::{AppError, DB_NOT_SQLITE};
use crate::formatter::{BlackFormatter, CodeFormatter};
use crate::models::{
    ChatExportRequest, CodeFormatRequest, CodeFormatResponse, GravatarParams, HtmlResponse,
    MarkdownForm,
};
use crate::pdf::{generate_chat_pdf, PdfRenderer, WkhtmltopdfRenderer, DEFAULT_STYLESHEET};
use crate::utils::{convert_markdown_to_html, gravatar_url};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub database: Database,
    pub auth: AuthState,
    pub pdf_renderer: Arc<dyn PdfRenderer>,
    pub code_formatter: Arc<dyn CodeFormatter>,
    pub stylesheet: Arc<str>,
}

impl AppState {
    /// State wired to the real external tools.
    pub async fn new(config: Config, database: Database) -> Self {
        let stylesheet = load_stylesheet(config.pdf_stylesheet.as_deref()).await;
        Self {
            auth: AuthState::new(config.admin_api_keys.clone()),
            pdf_renderer: Arc::new(WkhtmltopdfRenderer::new(
                config.wkhtmltopdf_path.clone(),
                config.tool_timeout,
            )),
            code_formatter: Arc::new(BlackFormatter::new(
                config.code_formatter_path.clone(),
                config.tool_timeout,
            )),
            stylesheet,
            database,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

async fn load_stylesheet(path: Option<&Path>) -> Arc<str> {
    let Some(path) = path else {
        return Arc::from(DEFAULT_STYLESHEET);
    };
    match tokio::fs::read_to_string(path).await {
        Ok(css) => {
            info!(path = %path.display(), "loaded pdf stylesheet");
            Arc::from(css)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read pdf stylesheet, using built-in");
            Arc::from(DEFAULT_STYLESHEET)
        }
    }
}

pub async fn handle_gravatar_request(Query(params): Query<GravatarParams>) -> Json<String> {
    Json(gravatar_url(&params.email))
}

pub async fn handle_format_request(
    State(state): State<AppState>,
    Json(request): Json<CodeFormatRequest>,
) -> Result<Json<CodeFormatResponse>, AppError> {
    debug!(bytes = request.code.len(), "formatting code");
    let code = state.code_formatter.format(&request.code).await?;
    Ok(Json(CodeFormatResponse { code }))
}

pub async fn handle_markdown_request(Json(form): Json<MarkdownForm>) -> Json<HtmlResponse> {
    Json(HtmlResponse {
        html: convert_markdown_to_html(&form.md),
    })
}

pub async fn handle_pdf_request(
    State(state): State<AppState>,
    Json(request): Json<ChatExportRequest>,
) -> Result<Response, AppError> {
    let pdf = generate_chat_pdf(state.pdf_renderer.as_ref(), &request, &state.stylesheet).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "attachment;filename=chat.pdf"),
        ],
        pdf,
    )
        .into_response())
}

pub async fn handle_db_download_request(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    if !state.config.enable_admin_export {
        return Err(AppError::access_prohibited());
    }

    let Some(path) = state.database.sqlite_path().map(PathBuf::from) else {
        debug!(engine = state.database.engine(), "database export refused");
        return Err(AppError::BadRequest(DB_NOT_SQLITE.to_string()));
    };

    state.database.checkpoint().await?;
    info!(path = %path.display(), "admin downloading database");
    create_file_response(&path, "webui.db").await
}

pub async fn handle_litellm_config_request(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let path = state.config.litellm_config_path();
    info!(path = %path.display(), "admin downloading litellm config");
    create_file_response(&path, "config.yaml").await
}

pub async fn handle_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}

/// Streams a file from disk as an attachment. The handle lives as long as
/// the response body.
async fn create_file_response(path: &Path, filename: &str) -> Result<Response, AppError> {
    let file = tokio::fs::File::open(path).await?;
    let body = StreamBody::new(ReaderStream::new(file));

    // No Content-Length: SQLite may checkpoint into the file mid-stream.
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
