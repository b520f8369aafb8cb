//! JSON REST API for carelog.
//!
//! Exposes an axum [`Router`] backed by any [`carelog_core::RecordStore`].
//! Auth, TLS, static file serving and transport concerns are the caller's
//! responsibility.
//!
//! Two route shapes are served, matching what the admin frontend calls:
//!
//! - action style: `/{res}/index[/{scope}]`, `/{res}/show/{id}`,
//!   `/{res}/store`, `/{res}/update/{id}`, `/{res}/destroy/{id}`
//! - resourceful: `/{res}` and `/{res}/{id}`
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", carelog_api::api_router(state))
//! ```

pub mod deposits;
pub mod error;
pub mod media;
pub mod resource;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, post, put},
};
use carelog_core::{
  RecordStore, Resource,
  models::{
    assessment::Assessment,
    consultation::Consultation,
    daily_report::DailyReport,
    deposit::Deposit,
    document::{Document, Signature},
    facility::{Facility, FacilityUser},
    incident::Incident,
    service_provision_log::ServiceProvisionLog,
    service_user::ServiceUser,
    support_plan::SupportPlan,
    user::{Profile, User},
  },
};
use carelog_media::MediaRepository;

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub media: MediaRepository<S>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone(), media: self.media.clone() } }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Routes for an action-style resource under `/{base}`.
fn action_routes<S, R>(router: Router<ApiState<S>>, base: &str) -> Router<ApiState<S>>
where
  S: RecordStore + 'static,
  R: Resource,
{
  let router = router
    .route(&format!("/{base}/index"), get(resource::index::<S, R>))
    .route(&format!("/{base}/show/{{id}}"), get(resource::show::<S, R>))
    .route(&format!("/{base}/store"), post(resource::store::<S, R>))
    .route(
      &format!("/{base}/update/{{id}}"),
      put(resource::update::<S, R>).post(resource::update::<S, R>),
    )
    .route(&format!("/{base}/destroy/{{id}}"), delete(resource::destroy::<S, R>));

  if R::TABLE.scope.is_some() {
    router.route(&format!("/{base}/index/{{scope}}"), get(resource::index_scoped::<S, R>))
  } else {
    router
  }
}

/// Routes for a resourceful controller under `/{base}`.
fn resourceful_routes<S, R>(router: Router<ApiState<S>>, base: &str) -> Router<ApiState<S>>
where
  S: RecordStore + 'static,
  R: Resource,
{
  router
    .route(&format!("/{base}"), get(resource::index::<S, R>).post(resource::store::<S, R>))
    .route(
      &format!("/{base}/{{id}}"),
      get(resource::show::<S, R>)
        .put(resource::update::<S, R>)
        .delete(resource::destroy::<S, R>),
    )
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  let router = Router::new();

  let router = action_routes::<S, Facility>(router, "facilities");
  let router = action_routes::<S, ServiceUser>(router, "service-users");
  let router = action_routes::<S, Assessment>(router, "assessments");
  let router = action_routes::<S, SupportPlan>(router, "support-plans");
  let router = action_routes::<S, DailyReport>(router, "daily-reports");
  let router = action_routes::<S, Deposit>(router, "deposits");
  let router = action_routes::<S, Document>(router, "documents");

  let router = resourceful_routes::<S, User>(router, "user");
  let router = resourceful_routes::<S, Profile>(router, "profile");
  let router = resourceful_routes::<S, FacilityUser>(router, "facility-user");
  let router = resourceful_routes::<S, Consultation>(router, "consultation");
  let router = resourceful_routes::<S, Incident>(router, "incident");
  let router = resourceful_routes::<S, ServiceProvisionLog>(router, "service-provision-log");
  let router = resourceful_routes::<S, Signature>(router, "signature");

  router
    // Media
    .route(
      "/medias/store",
      post(media::store::<S>).layer(DefaultBodyLimit::max(media::MAX_UPLOAD_BYTES)),
    )
    .route("/medias/show/{id}", get(media::show::<S>))
    .route("/medias/destroy/{id}", delete(media::destroy::<S>))
    // Deposits
    .route("/deposits/balance/{service_user_id}", get(deposits::balance::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
