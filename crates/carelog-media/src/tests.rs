use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicU32, Ordering},
  },
};

use async_trait::async_trait;
use carelog_core::{
  Error as CoreError, RecordStore, Repository,
  models::{
    document::Document,
    facility::{Facility, ServiceType},
    media::MEDIAS,
    service_user::ServiceUser,
  },
};
use carelog_store_sqlite::SqliteStore;

use super::*;

/// In-memory stand-in for a bucket. Every `url` call signs anew.
#[derive(Default)]
struct FakeBucket {
  objects: Mutex<HashMap<String, Bytes>>,
  signed:  AtomicU32,
}

#[async_trait]
impl ObjectStorage for FakeBucket {
  async fn put(&self, key: &str, bytes: Bytes, _mime_type: &str) -> Result<String> {
    self.objects.lock().unwrap().insert(key.to_owned(), bytes);
    Ok(key.to_owned())
  }

  async fn url(&self, path: &str) -> Result<String> {
    let n = self.signed.fetch_add(1, Ordering::SeqCst);
    Ok(format!("https://bucket.example/{path}?signature={n}"))
  }

  async fn delete(&self, path: &str) -> Result<()> {
    self.objects.lock().unwrap().remove(path);
    Ok(())
  }
}

struct Fixture {
  store:  Arc<SqliteStore>,
  media:  MediaRepository<SqliteStore>,
  bucket: Arc<FakeBucket>,
  dir:    tempfile::TempDir,
}

async fn fixture(with_s3: bool) -> Fixture {
  let store = Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"));
  let dir = tempfile::tempdir().unwrap();
  let bucket = Arc::new(FakeBucket::default());
  let s3 = with_s3.then(|| bucket.clone() as Arc<dyn ObjectStorage>);
  let media = MediaRepository::new(
    store.clone(),
    Arc::new(LocalDisk::new(dir.path(), "/storage")),
    s3,
  );
  Fixture { store, media, bucket, dir }
}

fn upload(name: &str, content_type: Option<&str>, bytes: &'static [u8], vendor: Vendor) -> Upload {
  Upload {
    file_name: name.into(),
    content_type: content_type.map(Into::into),
    bytes: Bytes::from_static(bytes),
    vendor,
  }
}

#[tokio::test]
async fn local_upload_is_written_and_recorded() {
  let f = fixture(false).await;
  let view = f
    .media
    .upload(upload("photo.png", Some("image/png"), b"\x89PNG", Vendor::Local))
    .await
    .unwrap();

  assert_eq!(view.media.data.mime_type, "image/png");
  assert_eq!(view.media.data.size, 4);
  assert_eq!(view.media.data.content_hash, content_hash(b"\x89PNG"));
  assert!(view.url.starts_with("/storage/uploads/") && view.url.ends_with(".png"));
  assert_eq!(view.url, view.media.data.path);

  let key = view.url.trim_start_matches("/storage/");
  assert_eq!(std::fs::read(f.dir.path().join(key)).unwrap(), b"\x89PNG");
}

#[tokio::test]
async fn mime_is_guessed_when_not_declared() {
  let f = fixture(false).await;
  let view = f.media.upload(upload("scan.pdf", None, b"%PDF-1.7", Vendor::Local)).await.unwrap();
  assert_eq!(view.media.data.mime_type, "application/pdf");
}

#[tokio::test]
async fn disallowed_type_is_rejected_before_storing() {
  let f = fixture(false).await;
  let err = f
    .media
    .upload(upload("page.html", Some("text/html"), b"<html>", Vendor::Local))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UnsupportedMediaType(ref m) if m == "text/html"));

  let rows = f.store.list(&MEDIAS, Default::default()).await.unwrap();
  assert_eq!(rows.total, 0);
  assert!(!f.dir.path().join("uploads").exists());
}

#[tokio::test]
async fn empty_file_is_rejected() {
  let f = fixture(false).await;
  let err = f.media.upload(upload("a.png", None, b"", Vendor::Local)).await.unwrap_err();
  assert!(matches!(err, Error::EmptyFile));
}

#[tokio::test]
async fn s3_without_configuration_is_rejected() {
  let f = fixture(false).await;
  let err = f.media.upload(upload("a.png", None, b"png", Vendor::S3)).await.unwrap_err();
  assert!(matches!(err, Error::S3NotConfigured));
}

#[tokio::test]
async fn s3_urls_are_signed_on_every_read() {
  let f = fixture(true).await;
  let created = f.media.upload(upload("a.jpg", None, b"jpeg", Vendor::S3)).await.unwrap();
  let key = created.media.data.path.clone();
  assert!(key.starts_with("uploads/") && key.ends_with(".jpg"));

  let first = f.media.find(created.media.id).await.unwrap();
  let second = f.media.find(created.media.id).await.unwrap();
  assert_ne!(first.url, second.url);
  assert!(first.url.contains(&key));

  // The stored row still holds the bare key.
  let row = Repository::<_, Media>::new(f.store.as_ref()).show(created.media.id).await.unwrap();
  assert_eq!(row.data.path, key);
}

#[tokio::test]
async fn destroy_removes_object_and_row() {
  let f = fixture(true).await;
  let created = f.media.upload(upload("a.gif", None, b"GIF89a", Vendor::S3)).await.unwrap();
  assert_eq!(f.bucket.objects.lock().unwrap().len(), 1);

  f.media.destroy(created.media.id).await.unwrap();
  assert!(f.bucket.objects.lock().unwrap().is_empty());

  let err = f.media.find(created.media.id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn destroy_clears_document_reference() {
  let f = fixture(false).await;
  let store = f.store.as_ref();

  let facility = Repository::new(store)
    .store(&Facility {
      name: "Sakura".into(),
      service_type: Some(ServiceType::GroupHome),
      telephone: "0312345678".into(),
      ..Default::default()
    })
    .await
    .unwrap();
  let service_user = Repository::new(store)
    .store(&ServiceUser {
      facility_id: Some(facility.id),
      furigana: "サトウ".into(),
      full_name: "佐藤".into(),
      ..Default::default()
    })
    .await
    .unwrap();

  let media = f.media.upload(upload("c.pdf", None, b"%PDF", Vendor::Local)).await.unwrap();
  let documents = Repository::<_, Document>::new(store);
  let document = documents
    .store(&Document {
      service_user_id: Some(service_user.id),
      title: "Contract".into(),
      file: Some(media.media.id),
      ..Default::default()
    })
    .await
    .unwrap();

  f.media.destroy(media.media.id).await.unwrap();
  assert_eq!(documents.show(document.id).await.unwrap().data.file, None);
}
