//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Error bodies follow the shape the admin frontend already reads:
//! `{"message": ..}` everywhere, plus `"errors": {field: [messages]}` on 422.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use carelog_core::ValidationErrors;
use serde_json::json;
use thiserror::Error;

/// Message returned for failures whose detail is only logged.
const SERVER_ERROR: &str = "保存に失敗しました";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed")]
  Validation(ValidationErrors),

  /// Well-formed request that cannot be processed, without field errors.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// A single field error.
  pub fn field(field: &str, message: impl Into<String>) -> Self {
    let mut errors = ValidationErrors::new();
    errors.add(field, message);
    Self::Validation(errors)
  }
}

/// Summary line for a 422: the first message, with a count of the rest.
fn summary(errors: &ValidationErrors) -> String {
  let first = errors.first_message().unwrap_or("The given data was invalid.");
  let rest = errors.fields().filter_map(|f| errors.get(f)).map(<[String]>::len).sum::<usize>();
  match rest.saturating_sub(1) {
    0 => first.to_owned(),
    1 => format!("{first} (and 1 more error)"),
    n => format!("{first} (and {n} more errors)"),
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "message": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "message": m }))).into_response()
      }
      ApiError::Validation(errors) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "message": summary(&errors), "errors": errors })),
      )
        .into_response(),
      ApiError::Unprocessable(m) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "message": m, "errors": {} })),
      )
        .into_response(),
      ApiError::Conflict(m) => {
        (StatusCode::CONFLICT, Json(json!({ "message": m }))).into_response()
      }
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        let body = Json(json!({ "message": SERVER_ERROR }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
      }
    }
  }
}

// ─── Conversions ─────────────────────────────────────────────────────────────

impl From<carelog_core::Error> for ApiError {
  fn from(e: carelog_core::Error) -> Self {
    use carelog_core::Error;
    match e {
      Error::NotFound { resource, id } => {
        ApiError::NotFound(format!("No {resource} found with id {id}."))
      }
      Error::Validation(errors) => ApiError::Validation(errors),
      Error::Conflict(detail) => {
        tracing::debug!(%detail, "unique constraint rejected write");
        ApiError::Conflict("A record with the same values already exists.".into())
      }
      Error::InvalidReference(detail) => {
        tracing::debug!(%detail, "foreign key constraint rejected write");
        ApiError::Unprocessable("A referenced record does not exist.".into())
      }
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl From<carelog_media::Error> for ApiError {
  fn from(e: carelog_media::Error) -> Self {
    use carelog_media::{Error, mime::ALLOWED};
    match e {
      Error::UnsupportedMediaType(_) => {
        let types = ALLOWED.iter().map(|(_, ext)| *ext).collect::<Vec<_>>().join(", ");
        ApiError::field("file", format!("The file must be a file of type: {types}."))
      }
      Error::EmptyFile => ApiError::field("file", "The file must not be empty."),
      Error::S3NotConfigured => ApiError::BadRequest("S3 storage is not configured.".into()),
      Error::Core(e) => e.into(),
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::Unprocessable(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn summary_counts_remaining_messages() {
    let mut errors = ValidationErrors::new();
    errors.add("name", "The name field is required.");
    assert_eq!(summary(&errors), "The name field is required.");

    errors.add("telephone", "The telephone field is required.");
    errors.add("telephone", "The telephone field format is invalid.");
    assert!(summary(&errors).ends_with("(and 2 more errors)"));
  }

  #[test]
  fn core_not_found_maps_to_404() {
    let err: ApiError = carelog_core::Error::NotFound { resource: "facility", id: 3 }.into();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn internal_detail_is_not_returned() {
    let err = ApiError::Internal("disk I/O error at /var/lib/carelog".into());
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "message": "保存に失敗しました" }));
  }

  #[test]
  fn unsupported_media_type_is_a_file_error() {
    let err: ApiError = carelog_media::Error::UnsupportedMediaType("text/html".into()).into();
    match err {
      ApiError::Validation(errors) => assert!(errors.contains("file")),
      other => panic!("unexpected {other:?}"),
    }
  }
}
