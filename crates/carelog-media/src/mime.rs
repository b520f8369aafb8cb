//! Allowed upload types.

/// MIME types accepted for upload, with the extension used for object keys.
pub const ALLOWED: &[(&str, &str)] = &[
  ("image/jpeg", "jpg"),
  ("image/png", "png"),
  ("image/gif", "gif"),
  ("image/webp", "webp"),
  ("application/pdf", "pdf"),
];

/// Resolve the MIME type of an upload.
///
/// The declared content type wins unless it is missing or the generic
/// `application/octet-stream`, in which case the type is guessed from the
/// file name. Parameters such as `; charset=...` are dropped.
pub fn resolve(content_type: Option<&str>, file_name: &str) -> String {
  let declared = content_type
    .and_then(|ct| ct.split(';').next())
    .map(|ct| ct.trim().to_ascii_lowercase())
    .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

  declared.unwrap_or_else(|| {
    mime_guess::from_path(file_name)
      .first_raw()
      .unwrap_or("application/octet-stream")
      .to_owned()
  })
}

/// The key extension for an allowed MIME type, or `None` if not allowed.
pub fn extension(mime: &str) -> Option<&'static str> {
  ALLOWED.iter().find(|(m, _)| *m == mime).map(|(_, ext)| *ext)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn declared_type_wins() {
    assert_eq!(resolve(Some("image/PNG"), "scan.pdf"), "image/png");
    assert_eq!(resolve(Some("application/pdf; name=x"), "x"), "application/pdf");
  }

  #[test]
  fn octet_stream_falls_back_to_file_name() {
    assert_eq!(resolve(Some("application/octet-stream"), "receipt.jpeg"), "image/jpeg");
    assert_eq!(resolve(None, "contract.pdf"), "application/pdf");
    assert_eq!(resolve(None, "noext"), "application/octet-stream");
  }

  #[test]
  fn only_listed_types_have_extensions() {
    assert_eq!(extension("image/webp"), Some("webp"));
    assert_eq!(extension("text/html"), None);
    assert_eq!(extension("application/octet-stream"), None);
  }
}
