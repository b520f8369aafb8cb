//! Staff login over HTTP Basic.
//!
//! carelog has one shared staff account. Its password is stored only as an
//! argon2 PHC string in the server config.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::error::Error;

#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// e.g. `$argon2id$v=19$m=19456,t=2,p=1$...`
  pub password_hash: String,
}

impl AuthConfig {
  /// Check a username/password pair against the configured account.
  pub fn accepts(&self, username: &str, password: &str) -> bool {
    if username != self.username {
      return false;
    }
    match PasswordHash::new(&self.password_hash) {
      Ok(hash) => Argon2::default().verify_password(password.as_bytes(), &hash).is_ok(),
      Err(e) => {
        tracing::error!(error = %e, "configured auth_password_hash is not a PHC string");
        false
      }
    }
  }
}

/// Pull `user:password` out of an `Authorization: Basic ...` header.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, encoded) = value.split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("basic") {
    return None;
  }
  let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
  let (user, pass) = decoded.split_once(':')?;
  Some((user.to_string(), pass.to_string()))
}

pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  match basic_credentials(headers) {
    Some((user, pass)) if config.accepts(&user, &pass) => Ok(()),
    _ => Err(Error::Unauthorized),
  }
}

/// Middleware guarding the `/api` tree.
pub async fn require_auth(
  State(config): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Result<Response, Error> {
  if let Err(e) = verify_auth(req.headers(), &config) {
    tracing::debug!(method = %req.method(), path = %req.uri().path(), "rejected credentials");
    return Err(e);
  }
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::HeaderValue;
  use rand_core::OsRng;

  fn staff(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    AuthConfig {
      username:      "staff".to_string(),
      password_hash: Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string(),
    }
  }

  fn with_authorization(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  fn basic(user: &str, pass: &str) -> HeaderMap {
    with_authorization(&format!("Basic {}", B64.encode(format!("{user}:{pass}"))))
  }

  #[test]
  fn accepts_configured_account() {
    assert!(verify_auth(&basic("staff", "secret"), &staff("secret")).is_ok());
  }

  #[test]
  fn scheme_is_case_insensitive() {
    let value = format!("basic {}", B64.encode("staff:secret"));
    assert!(verify_auth(&with_authorization(&value), &staff("secret")).is_ok());
  }

  #[test]
  fn password_may_contain_colons() {
    let config = staff("a:b:c");
    assert!(verify_auth(&basic("staff", "a:b:c"), &config).is_ok());
  }

  #[test]
  fn rejects_bad_credentials() {
    let config = staff("secret");
    for headers in [basic("staff", "wrong"), basic("admin", "secret"), HeaderMap::new()] {
      assert!(matches!(verify_auth(&headers, &config), Err(Error::Unauthorized)));
    }
  }

  #[test]
  fn rejects_malformed_headers() {
    let config = staff("secret");
    for value in ["Basic !!!not-base64!!!", "Bearer abc", "Basic"] {
      let result = verify_auth(&with_authorization(value), &config);
      assert!(matches!(result, Err(Error::Unauthorized)), "{value}");
    }
  }

  #[test]
  fn broken_hash_never_authenticates() {
    let config = AuthConfig { username: "staff".into(), password_hash: "plaintext".into() };
    assert!(!config.accepts("staff", "plaintext"));
  }
}
