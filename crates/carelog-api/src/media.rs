//! Handlers for `/medias` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/medias/store` | multipart: `file`, optional `vendor` (`local`\|`s3`) |
//! | `GET`  | `/medias/show/{id}` | record plus a freshly resolved `url` |
//! | `DELETE` | `/medias/destroy/{id}` | removes the object, then the row |

use axum::{
  Json,
  extract::{Multipart, Path, State, multipart::MultipartError},
  http::StatusCode,
  response::IntoResponse,
};
use carelog_core::{RecordStore, models::media::Vendor};
use carelog_media::{MediaView, Upload};

use crate::{ApiState, error::ApiError};

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn multipart_error(e: MultipartError) -> ApiError { ApiError::BadRequest(e.body_text()) }

/// `POST /medias/store`
pub async fn store<S>(
  State(state): State<ApiState<S>>,
  mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  let mut file = None;
  let mut vendor = Vendor::default();

  while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
    let name = field.name().unwrap_or_default().to_owned();
    match name.as_str() {
      "file" => {
        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        file = Some((file_name, content_type, bytes));
      }
      "vendor" => {
        let text = field.text().await.map_err(multipart_error)?;
        let text = text.trim();
        if !text.is_empty() {
          vendor = text
            .parse()
            .map_err(|_| ApiError::field("vendor", "The selected vendor is invalid."))?;
        }
      }
      _ => {}
    }
  }

  let Some((file_name, content_type, bytes)) = file else {
    return Err(ApiError::field("file", "The file field is required."));
  };

  let view = state.media.upload(Upload { file_name, content_type, bytes, vendor }).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /medias/show/{id}`
pub async fn show<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<MediaView>, ApiError>
where
  S: RecordStore + 'static,
{
  Ok(Json(state.media.find(id).await?))
}

/// `DELETE /medias/destroy/{id}`
pub async fn destroy<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
{
  state.media.destroy(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
