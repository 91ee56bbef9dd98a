use crate::state::AppState;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use std::fmt::Write;

/// Most shortened domains as `"<domain>: <count>"` lines.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut body = String::new();
    for entry in state.allocator().top_domains(state.top_domains()) {
        let _ = writeln!(body, "{}: {}", entry.key, entry.count);
    }

    ([(header::CONTENT_TYPE, "text/plain")], body)
}
