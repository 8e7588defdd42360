use super::handlers::{self, assistant, audio, documents, export, meetings};
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Room for multipart framing around an upload of the maximum size
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the HTTP router with all routes
///
/// With `static_dir`, paths no route matches are served from that directory.
pub fn create_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let body_limit = usize::try_from(state.store.max_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/agenda/split", post(handlers::split_agenda_text))
        // Meetings
        .route(
            "/meetings",
            get(meetings::list_meetings).post(meetings::create_meeting),
        )
        .route("/meetings/:meeting_id", get(meetings::load_meeting))
        .route("/meetings/:meeting_id/rename", post(meetings::rename_meeting))
        .route(
            "/meetings/:meeting_id/state",
            get(meetings::get_state).put(meetings::put_state),
        )
        // Documents
        .route(
            "/meetings/:meeting_id/agenda",
            get(documents::get_agenda).put(documents::put_agenda),
        )
        .route(
            "/meetings/:meeting_id/transcript",
            get(documents::get_transcript).put(documents::put_transcript),
        )
        .route(
            "/meetings/:meeting_id/chat",
            get(documents::get_chat)
                .put(documents::put_chat)
                .post(assistant::chat),
        )
        .route("/meetings/:meeting_id/errors", get(documents::get_error_log))
        // Audio
        .route(
            "/meetings/:meeting_id/audio",
            get(audio::list_audio).post(audio::upload_audio),
        )
        .route(
            "/meetings/:meeting_id/audio/:filename",
            get(audio::download_audio),
        )
        // Transcription, template filling and export
        .route("/meetings/:meeting_id/transcribe", post(assistant::transcribe))
        .route("/meetings/:meeting_id/fill", post(assistant::fill_template))
        .route("/meetings/:meeting_id/export", get(export::export_filled))
        .route("/meetings/:meeting_id/export/all", get(export::export_all));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(
            ServiceBuilder::new()
                // Add tracing middleware for request logging
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
