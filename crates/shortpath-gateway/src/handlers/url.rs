use crate::error::Result;
use crate::model::{CreateShortPathRequest, CreateShortPathResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

pub async fn create_short_path_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateShortPathRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    let ctx = state.request_context();

    let short_path = state
        .allocator()
        .allocate(&ctx, request.short_path.as_deref(), &request.target_url)
        .await?;
    info!(short_path = %short_path, target_url = %request.target_url, "Short path ready");

    let body = CreateShortPathResponse {
        short_url: short_path.to_url(state.base_url()),
        short_path: short_path.to_string(),
    };

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/{short_path}"))],
        Json(body),
    )
        .into_response())
}

pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(short_path): Path<String>,
) -> Result<Response> {
    let ctx = state.request_context();
    let target_url = state.allocator().resolve(&ctx, &short_path).await?;

    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, target_url)],
    )
        .into_response())
}
