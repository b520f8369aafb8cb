//! `GET /deposits/balance/{service_user_id}`

use axum::{
  Json,
  extract::{Path, State},
};
use carelog_core::{
  RecordStore, Repository,
  models::{
    deposit::{Balance, Deposit},
    service_user::ServiceUser,
  },
};

use crate::{ApiState, error::ApiError};

/// Running balance of the money held for one service user.
pub async fn balance<S>(
  State(state): State<ApiState<S>>,
  Path(service_user_id): Path<i64>,
) -> Result<Json<Balance>, ApiError>
where
  S: RecordStore + 'static,
{
  let store = state.store.as_ref();
  Repository::<S, ServiceUser>::new(store).show(service_user_id).await?;
  let entries =
    Repository::<S, Deposit>::new(store).all_where("service_user_id", service_user_id).await?;
  Ok(Json(Balance::from_entries(service_user_id, &entries)))
}
