//! Generic CRUD handlers, instantiated once per [`Resource`].
//!
//! | Handler | Action-style route | Resourceful route |
//! |---------|--------------------|-------------------|
//! | [`index`] | `GET /{res}/index` | `GET /{res}` |
//! | [`index_scoped`] | `GET /{res}/index/{scope}` | |
//! | [`show`] | `GET /{res}/show/{id}` | `GET /{res}/{id}` |
//! | [`store`] | `POST /{res}/store` | `POST /{res}` |
//! | [`update`] | `PUT\|POST /{res}/update/{id}` | `PUT /{res}/{id}` |
//! | [`destroy`] | `DELETE /{res}/destroy/{id}` | `DELETE /{res}/{id}` |
//!
//! `index` accepts `?page=&per_page=&year=&search=` and answers with the
//! pagination envelope.

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use carelog_core::{ListQuery, Page, RecordStore, Repository, Resource, Stored};

use crate::{ApiState, error::ApiError};

/// `GET /{res}/index`
pub async fn index<S, R>(
  State(state): State<ApiState<S>>,
  query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Page<Stored<R>>>, ApiError>
where
  S: RecordStore + 'static,
  R: Resource,
{
  let Query(query) = query?;
  let page = Repository::<S, R>::new(state.store.as_ref()).index(query).await?;
  Ok(Json(page))
}

/// `GET /{res}/index/{scope}`, restricted to rows whose scope column
/// (e.g. `facility_id`) equals `scope`.
pub async fn index_scoped<S, R>(
  State(state): State<ApiState<S>>,
  Path(scope): Path<i64>,
  query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Page<Stored<R>>>, ApiError>
where
  S: RecordStore + 'static,
  R: Resource,
{
  let Query(mut query) = query?;
  query.scope = Some(scope);
  let page = Repository::<S, R>::new(state.store.as_ref()).index(query).await?;
  Ok(Json(page))
}

/// `GET /{res}/show/{id}`
pub async fn show<S, R>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Stored<R>>, ApiError>
where
  S: RecordStore + 'static,
  R: Resource,
{
  let record = Repository::<S, R>::new(state.store.as_ref()).show(id).await?;
  Ok(Json(record))
}

/// `POST /{res}/store`
pub async fn store<S, R>(
  State(state): State<ApiState<S>>,
  body: Result<Json<R>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
  R: Resource,
{
  let Json(input) = body?;
  let record = Repository::<S, R>::new(state.store.as_ref()).store(&input).await?;
  tracing::info!(table = R::TABLE.name, id = record.id, "created");
  Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /{res}/update/{id}`
pub async fn update<S, R>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
  body: Result<Json<R>, JsonRejection>,
) -> Result<Json<Stored<R>>, ApiError>
where
  S: RecordStore + 'static,
  R: Resource,
{
  let Json(input) = body?;
  let record = Repository::<S, R>::new(state.store.as_ref()).update(id, &input).await?;
  tracing::info!(table = R::TABLE.name, id, "updated");
  Ok(Json(record))
}

/// `DELETE /{res}/destroy/{id}`
pub async fn destroy<S, R>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
  R: Resource,
{
  Repository::<S, R>::new(state.store.as_ref()).destroy(id).await?;
  tracing::info!(table = R::TABLE.name, id, "deleted");
  Ok(StatusCode::NO_CONTENT)
}
