use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Request};
use axum::routing::{get, post};
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{create_short_path_handler, metrics_handler, redirect_handler};
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

        Router::new()
            .route("/", post(create_short_path_handler))
            .route("/metrics", get(metrics_handler))
            .route("/{short_path}", get(redirect_handler))
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }),
            )
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
            .with_state(state)
    }
}
