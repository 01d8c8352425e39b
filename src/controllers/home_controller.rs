use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::HttpError;

pub async fn health() -> &'static str {
    "OK"
}

pub async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(HttpError {
            code: StatusCode::NOT_FOUND.as_u16(),
            message: format!("no route for {}", uri.path()),
        }),
    )
        .into_response()
}
