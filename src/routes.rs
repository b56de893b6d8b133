use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    handle_404, handle_db_download_request, handle_format_request, handle_gravatar_request,
    handle_litellm_config_request, handle_markdown_request, handle_pdf_request, AppState,
};

pub fn setup_router(state: AppState) -> Router {
    Router::new()
        .route("/gravatar", get(handle_gravatar_request))
        .route("/code/format", post(handle_format_request))
        .route("/markdown", post(handle_markdown_request))
        .route("/pdf", post(handle_pdf_request))
        .route("/db/download", get(handle_db_download_request))
        .route("/litellm/config", get(handle_litellm_config_request))
        .fallback(handle_404)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
