//! Errors raised by the server layer itself. API errors live in
//! `carelog_api::ApiError`.

use axum::{
  Json,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

const CHALLENGE: &str = "Basic realm=\"carelog\", charset=\"UTF-8\"";

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthenticated")]
  Unauthorized,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, CHALLENGE)],
        Json(json!({ "message": "Unauthenticated." })),
      )
        .into_response(),
    }
  }
}
