//! HTTP server for carelog.
//!
//! Mounts the JSON API under `/api` behind Basic auth, serves locally stored
//! uploads under the configured public URL, and answers `/up` for health
//! checks.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware, routing::get};
use carelog_api::ApiState;
use carelog_core::RecordStore;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CARELOG_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_database_path")]
  pub database_path:      PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  #[serde(default)]
  pub storage:            StorageConfig,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8000 }

fn default_database_path() -> PathBuf { PathBuf::from("carelog.sqlite") }

/// Where uploads go.
#[derive(Deserialize, Clone, Debug)]
pub struct StorageConfig {
  /// Directory for `local` uploads.
  #[serde(default = "default_local_root")]
  pub local_root: PathBuf,
  /// URL prefix the local directory is served under.
  #[serde(default = "default_public_url")]
  pub public_url: String,
  /// Enables the `s3` vendor when present.
  #[serde(default)]
  pub s3:         Option<S3Config>,
}

fn default_local_root() -> PathBuf { PathBuf::from("storage/app/public") }

fn default_public_url() -> String { "/storage".into() }

impl Default for StorageConfig {
  fn default() -> Self {
    Self { local_root: default_local_root(), public_url: default_public_url(), s3: None }
  }
}

#[derive(Deserialize, Clone, Debug)]
pub struct S3Config {
  pub bucket:          String,
  #[serde(default = "default_region")]
  pub region:          String,
  /// Custom endpoint for S3-compatible services (MinIO and the like).
  pub endpoint:        Option<String>,
  /// Static credentials. When absent the default AWS credential chain is used.
  pub access_key:      Option<String>,
  pub secret_key:      Option<String>,
  /// Lifetime of presigned download URLs.
  #[serde(default = "default_url_expiry_secs")]
  pub url_expiry_secs: u64,
}

fn default_region() -> String { "us-east-1".into() }

fn default_url_expiry_secs() -> u64 { 300 }

// ─── Router ───────────────────────────────────────────────────────────────────

async fn health() -> &'static str { "ok" }

/// Build the application router.
pub fn router<S>(api: ApiState<S>, auth: AuthConfig, storage: &StorageConfig) -> Router
where
  S: RecordStore + 'static,
{
  let protected = carelog_api::api_router(api)
    .layer(middleware::from_fn_with_state(Arc::new(auth), require_auth));

  let mut router = Router::new().route("/up", get(health)).nest("/api", protected);

  let mount = storage.public_url.trim_end_matches('/');
  if !mount.is_empty() {
    router = router.nest_service(mount, ServeDir::new(&storage.local_root));
  }

  router.layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use carelog_media::{LocalDisk, MediaRepository};
  use carelog_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use tower::ServiceExt as _;

  struct TestServer {
    router: Router,
    dir:    tempfile::TempDir,
  }

  async fn server(password: &str) -> TestServer {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageConfig { local_root: dir.path().to_path_buf(), ..Default::default() };
    let media = MediaRepository::new(
      store.clone(),
      Arc::new(LocalDisk::new(&storage.local_root, &storage.public_url)),
      None,
    );

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    let auth = AuthConfig { username: "staff".to_string(), password_hash: hash };

    TestServer { router: router(ApiState { store, media }, auth, &storage), dir }
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn fetch(server: &TestServer, uri: &str, auth: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(auth) = auth {
      builder = builder.header(header::AUTHORIZATION, auth);
    }
    server.router.clone().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
  }

  #[tokio::test]
  async fn health_check_is_public() {
    let server = server("secret").await;
    let resp = fetch(&server, "/up", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn api_requires_credentials() {
    let server = server("secret").await;
    let resp = fetch(&server, "/api/facilities/index", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert!(challenge.to_str().unwrap().starts_with("Basic"));

    let wrong = auth_header("staff", "nope");
    let resp = fetch(&server, "/api/facilities/index", Some(&wrong)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn authenticated_api_request_succeeds() {
    let server = server("secret").await;
    let auth = auth_header("staff", "secret");
    let resp = fetch(&server, "/api/facilities/index", Some(&auth)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total"], 0);
    assert_eq!(body["last_page"], 1);
  }

  #[tokio::test]
  async fn local_uploads_are_served() {
    let server = server("secret").await;
    std::fs::create_dir_all(server.dir.path().join("uploads")).unwrap();
    std::fs::write(server.dir.path().join("uploads/a.txt"), "hello").unwrap();

    let resp = fetch(&server, "/storage/uploads/a.txt", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"hello");
  }

  #[test]
  fn config_defaults_fill_missing_keys() {
    let settings = config::Config::builder()
      .add_source(config::File::from_str(
        r#"
          auth_username = "staff"
          auth_password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"

          [storage.s3]
          bucket = "carelog"
        "#,
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap();
    let cfg: ServerConfig = settings.try_deserialize().unwrap();

    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.storage.public_url, "/storage");
    let s3 = cfg.storage.s3.unwrap();
    assert_eq!(s3.bucket, "carelog");
    assert_eq!(s3.url_expiry_secs, 300);
    assert!(s3.endpoint.is_none());
  }
}
