//! carelog server binary.
//!
//! Settings come from an optional TOML file (`--config`, default
//! `config.toml`) overlaid with `CARELOG_*` environment variables. Nested
//! keys use a double underscore, e.g. `CARELOG_STORAGE__S3__BUCKET`.
//!
//! Run with `--hash-password` to turn a password read from stdin into the
//! value expected in `auth_password_hash`:
//!
//! ```text
//! cargo run -p carelog-server --bin server -- --hash-password
//! ```

use std::{
  io::{self, BufRead, Write},
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use carelog_api::ApiState;
use carelog_media::{LocalDisk, MediaRepository, ObjectStorage, S3Storage};
use carelog_server::{S3Config, ServerConfig, StorageConfig, auth::AuthConfig};
use carelog_store_sqlite::SqliteStore;
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "carelog case-management API server")]
struct Cli {
  /// TOML settings file. Missing files are ignored.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Hash a password from stdin for `auth_password_hash`, then exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  if cli.hash_password {
    return print_password_hash();
  }

  let cfg = load_config(cli.config)?;

  let database_path = expand_tilde(&cfg.database_path);
  let store = SqliteStore::open(&database_path)
    .await
    .with_context(|| format!("failed to open database {}", database_path.display()))?;
  let store = Arc::new(store);
  tracing::info!(path = %database_path.display(), "database ready");

  let media = media_repository(store.clone(), &cfg.storage).await?;
  let auth = AuthConfig {
    username:      cfg.auth_username.clone(),
    password_hash: cfg.auth_password_hash.clone(),
  };
  let app = carelog_server::router(ApiState { store, media }, auth, &cfg.storage);

  let address = format!("{}:{}", cfg.host, cfg.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("carelog listening on http://{address}");

  axum::serve(listener, app).await.context("server error")
}

fn load_config(path: PathBuf) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("CARELOG")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read settings")?
    .try_deserialize()
    .context("invalid settings")
}

// ─── Media backends ───────────────────────────────────────────────────────────

async fn media_repository(
  store: Arc<SqliteStore>,
  storage: &StorageConfig,
) -> anyhow::Result<MediaRepository<SqliteStore>> {
  let root = expand_tilde(&storage.local_root);
  tokio::fs::create_dir_all(&root)
    .await
    .with_context(|| format!("failed to create upload directory {}", root.display()))?;
  let local = Arc::new(LocalDisk::new(root, storage.public_url.as_str()));

  let s3: Option<Arc<dyn ObjectStorage>> = match &storage.s3 {
    Some(s3) => {
      tracing::info!(bucket = %s3.bucket, endpoint = ?s3.endpoint, "s3 uploads enabled");
      Some(Arc::new(s3_storage(s3).await))
    }
    None => None,
  };

  Ok(MediaRepository::new(store, local, s3))
}

/// A custom endpoint means an S3-compatible service, which wants path-style
/// bucket addressing.
async fn s3_storage(cfg: &S3Config) -> S3Storage {
  let mut loader =
    aws_config::defaults(BehaviorVersion::latest()).region(Region::new(cfg.region.clone()));
  if let Some(endpoint) = &cfg.endpoint {
    loader = loader.endpoint_url(endpoint);
  }
  if let (Some(access_key), Some(secret_key)) = (&cfg.access_key, &cfg.secret_key) {
    loader = loader.credentials_provider(Credentials::new(
      access_key.clone(),
      secret_key.clone(),
      None,
      None,
      "carelog-config",
    ));
  }
  let shared = loader.load().await;
  let s3_config = aws_sdk_s3::config::Builder::from(&shared)
    .force_path_style(cfg.endpoint.is_some())
    .build();

  S3Storage::new(
    aws_sdk_s3::Client::from_conf(s3_config),
    cfg.bucket.as_str(),
    Duration::from_secs(cfg.url_expiry_secs),
  )
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn print_password_hash() -> anyhow::Result<()> {
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\r', '\n']);

  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
  println!("{hash}");
  Ok(())
}

fn expand_tilde(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
