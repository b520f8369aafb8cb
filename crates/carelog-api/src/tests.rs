//! Router tests against an in-memory store and a temporary upload directory.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use carelog_media::{LocalDisk, MediaRepository};
use carelog_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;

struct TestApp {
  state: ApiState<SqliteStore>,
  _dir:  tempfile::TempDir,
}

async fn app() -> TestApp {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let dir = tempfile::tempdir().unwrap();
  let media = MediaRepository::new(
    store.clone(),
    Arc::new(LocalDisk::new(dir.path(), "/storage")),
    None,
  );
  TestApp { state: ApiState { store, media }, _dir: dir }
}

impl TestApp {
  async fn send(&self, req: Request<Body>) -> Response {
    api_router(self.state.clone()).oneshot(req).await.unwrap()
  }

  async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(body) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = self.send(req).await;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value =
      if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
  }

  async fn create(&self, uri: &str, body: Value) -> i64 {
    let (status, value) = self.call("POST", uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value["id"].as_i64().unwrap()
  }

  async fn facility(&self) -> i64 {
    self
      .create(
        "/facilities/store",
        json!({ "name": "Sakura Home", "service_type": "group_home", "telephone": "0312345678" }),
      )
      .await
  }

  async fn service_user(&self, facility_id: i64) -> i64 {
    self
      .create(
        "/service-users/store",
        json!({ "facility_id": facility_id, "furigana": "サトウ", "full_name": "佐藤 一郎" }),
      )
      .await
  }

  async fn upload(&self, file_name: &str, content_type: &str, bytes: &[u8]) -> (StatusCode, Value) {
    let boundary = "carelog-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
      format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
      )
      .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(
      format!(
        "\r\n--{boundary}\r\nContent-Disposition: form-data; name=\"vendor\"\r\n\r\nlocal\r\n--{boundary}--\r\n"
      )
      .as_bytes(),
    );

    let req = Request::builder()
      .method("POST")
      .uri("/medias/store")
      .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
      .body(Body::from(body))
      .unwrap();
    let resp = self.send(req).await;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }
}

// ─── CRUD ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn facility_crud_round_trip() {
  let app = app().await;
  let id = app.facility().await;

  let (status, body) = app.call("GET", &format!("/facilities/show/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "Sakura Home");
  assert_eq!(body["service_type"], "group_home");
  assert!(body["created_at"].is_string());

  let update = json!({
    "name": "Sakura Home East", "service_type": "group_home", "telephone": "0312345678",
    "capacity": 8,
  });
  let (status, body) = app.call("PUT", &format!("/facilities/update/{id}"), Some(update)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "Sakura Home East");
  assert_eq!(body["capacity"], 8);

  let (status, _) = app.call("DELETE", &format!("/facilities/destroy/{id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, body) = app.call("GET", &format!("/facilities/show/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["message"].is_string());
}

#[tokio::test]
async fn update_accepts_post() {
  let app = app().await;
  let id = app.facility().await;
  let update = json!({ "name": "Renamed", "service_type": "life_care", "telephone": "0312345678" });
  let (status, body) = app.call("POST", &format!("/facilities/update/{id}"), Some(update)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["service_type"], "life_care");
}

#[tokio::test]
async fn resourceful_routes_round_trip() {
  let app = app().await;
  let id = app.create("/user", json!({ "name": "Hanako", "email": "hanako@example.com" })).await;

  let (status, body) = app.call("GET", &format!("/user/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["email"], "hanako@example.com");

  let (status, body) = app.call("GET", "/user", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 1);

  let (status, _) = app.call("DELETE", &format!("/user/{id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn consultation_with_family_members() {
  let app = app().await;
  let facility_id = app.facility().await;
  let id = app
    .create(
      "/consultation",
      json!({
        "facility_id": facility_id,
        "consultation_date": "2024-05-10",
        "furigana": "ヤマダ ハナコ",
        "full_name": "山田 花子",
        "telephone": "09012345678",
        "family_members": [{ "name": "山田 太郎", "relationship": "father", "living_together": true }],
      }),
    )
    .await;

  let (_, body) = app.call("GET", &format!("/consultation/{id}"), None).await;
  assert_eq!(body["response_status"], "0");
  assert_eq!(body["family_members"][0]["name"], "山田 太郎");
  assert_eq!(body["family_members"][0]["living_together"], true);
}

#[tokio::test]
async fn update_without_family_members_keeps_them() {
  let app = app().await;
  let facility_id = app.facility().await;
  let mut payload = json!({
    "facility_id": facility_id,
    "consultation_date": "2024-05-10",
    "furigana": "ヤマダ ハナコ",
    "full_name": "山田 花子",
    "telephone": "09012345678",
  });
  let mut with_members = payload.clone();
  with_members["family_members"] = json!([{ "name": "山田 太郎" }]);
  let id = app.create("/consultation", with_members).await;

  payload["content"] = json!("Follow-up call");
  let (status, body) = app.call("PUT", &format!("/consultation/{id}"), Some(payload.clone())).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["content"], "Follow-up call");
  assert_eq!(body["family_members"].as_array().map(Vec::len), Some(1));

  payload["family_members"] = json!([]);
  let (_, body) = app.call("PUT", &format!("/consultation/{id}"), Some(payload)).await;
  assert_eq!(body["family_members"].as_array().map(Vec::len), Some(0));
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_and_malformed_fields_are_422() {
  let app = app().await;
  let (status, body) = app
    .call("POST", "/facilities/store", Some(json!({ "name": "X", "fax": "03-1234" })))
    .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["errors"]["telephone"][0], "The telephone field is required.");
  assert_eq!(body["errors"]["fax"][0], "The fax field format is invalid.");
  assert!(body["errors"]["service_type"].is_array());
  assert!(body["message"].as_str().unwrap().contains("more error"));
}

#[tokio::test]
async fn referral_facility_required_when_referred() {
  let app = app().await;
  let facility_id = app.facility().await;
  let payload = json!({
    "facility_id": facility_id,
    "consultation_date": "2024-05-10",
    "furigana": "ヤマダ",
    "full_name": "山田",
    "telephone": "09012345678",
    "response_status": "1",
  });
  let (status, body) = app.call("POST", "/consultation", Some(payload)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(
    body["errors"]["referral_facility_id"][0],
    "The referral facility id field is required when response status is 1."
  );
}

#[tokio::test]
async fn disability_grade_required_with_type() {
  let app = app().await;
  let facility_id = app.facility().await;
  let service_user_id = app.service_user(facility_id).await;
  let payload = json!({
    "service_user_id": service_user_id,
    "assessment_date": "2024-05-10",
    "physical_disability_type": "limb",
  });
  let (status, body) = app.call("POST", "/assessments/store", Some(payload)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["errors"]["physical_disability_grade"].is_array());
}

#[tokio::test]
async fn malformed_json_is_422() {
  let app = app().await;
  let req = Request::builder()
    .method("POST")
    .uri("/facilities/store")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{\"name\": "))
    .unwrap();
  let resp = app.send(req).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_assignment_is_409() {
  let app = app().await;
  let facility_id = app.facility().await;
  let user_id = app.create("/user", json!({ "name": "A", "email": "a@example.com" })).await;
  let assignment = json!({ "user_id": user_id, "facility_id": facility_id, "role": "manager" });
  app.create("/facility-user", assignment.clone()).await;

  let (status, _) = app.call("POST", "/facility-user", Some(assignment)).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_reference_is_422() {
  let app = app().await;
  let (status, body) = app
    .call(
      "POST",
      "/service-users/store",
      Some(json!({ "facility_id": 999, "furigana": "サトウ", "full_name": "佐藤" })),
    )
    .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["message"].is_string());
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn index_returns_pagination_envelope() {
  let app = app().await;
  let facility_id = app.facility().await;
  for furigana in ["ア", "イ", "ウ", "エ", "オ"] {
    app
      .create(
        "/service-users/store",
        json!({ "facility_id": facility_id, "furigana": furigana, "full_name": "利用者" }),
      )
      .await;
  }

  let uri = format!("/service-users/index/{facility_id}?page=2&per_page=2&year=&search=");
  let (status, body) = app.call("GET", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 5);
  assert_eq!(body["current_page"], 2);
  assert_eq!(body["last_page"], 3);
  assert_eq!(body["from"], 3);
  assert_eq!(body["to"], 4);
  assert_eq!(body["data"].as_array().unwrap().len(), 2);
  assert_eq!(body["data"][0]["furigana"], "ウ");
}

#[tokio::test]
async fn index_filters_by_year_and_scope() {
  let app = app().await;
  let a = app.facility().await;
  let b = app.facility().await;
  for (facility_id, date) in [(a, "2023-04-01"), (a, "2024-04-01"), (b, "2024-06-01")] {
    app
      .create(
        "/consultation",
        json!({
          "facility_id": facility_id, "consultation_date": date,
          "furigana": "ヤマダ", "full_name": "山田", "telephone": "09012345678",
        }),
      )
      .await;
  }

  let (_, body) = app.call("GET", "/consultation?year=2024", None).await;
  assert_eq!(body["total"], 2);

  let (_, body) = app.call("GET", &format!("/service-users/index/{b}"), None).await;
  assert_eq!(body["total"], 0);
  assert_eq!(body["from"], Value::Null);
}

// ─── Cascades ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_facility_removes_its_records() {
  let app = app().await;
  let facility_id = app.facility().await;
  let service_user_id = app.service_user(facility_id).await;

  let (status, _) = app.call("DELETE", &format!("/facilities/destroy/{facility_id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = app.call("GET", &format!("/service-users/show/{service_user_id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Media ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn media_upload_show_and_delete_clears_document() {
  let app = app().await;
  let facility_id = app.facility().await;
  let service_user_id = app.service_user(facility_id).await;

  let (status, media) = app.upload("contract.pdf", "application/pdf", b"%PDF-1.7").await;
  assert_eq!(status, StatusCode::CREATED, "{media}");
  assert_eq!(media["vendor"], "local");
  assert!(media["url"].as_str().unwrap().starts_with("/storage/uploads/"));
  let media_id = media["id"].as_i64().unwrap();

  let (status, shown) = app.call("GET", &format!("/medias/show/{media_id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(shown["url"], media["url"]);

  let document_id = app
    .create(
      "/documents/store",
      json!({ "service_user_id": service_user_id, "title": "Contract", "file": media_id }),
    )
    .await;

  let (status, _) = app.call("DELETE", &format!("/medias/destroy/{media_id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, document) = app.call("GET", &format!("/documents/show/{document_id}"), None).await;
  assert_eq!(document["file"], Value::Null);
  assert_eq!(document["title"], "Contract");
}

#[tokio::test]
async fn disallowed_upload_type_is_422() {
  let app = app().await;
  let (status, body) = app.upload("page.html", "text/html", b"<html></html>").await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["errors"]["file"][0].as_str().unwrap().contains("pdf"));
}

// ─── Deposits ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn balance_sums_deposits_and_withdrawals() {
  let app = app().await;
  let facility_id = app.facility().await;
  let service_user_id = app.service_user(facility_id).await;

  for (kind, amount) in [("deposit", 10_000), ("withdrawal", 3_000), ("withdrawal", 500)] {
    app
      .create(
        "/deposits/store",
        json!({
          "service_user_id": service_user_id, "transaction_date": "2024-07-01",
          "transaction_type": kind, "amount": amount,
        }),
      )
      .await;
  }

  let (status, body) = app.call("GET", &format!("/deposits/balance/{service_user_id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["balance"], 6_500);
  assert_eq!(body["withdrawals_total"], 3_500);

  let (status, _) = app.call("GET", "/deposits/balance/999", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_deposit_is_rejected() {
  let app = app().await;
  let facility_id = app.facility().await;
  let service_user_id = app.service_user(facility_id).await;

  for _ in 0..2 {
    let (status, body) = app
      .call(
        "POST",
        "/deposits/store",
        Some(json!({
          "service_user_id": service_user_id, "transaction_date": "2024-07-01",
          "transaction_type": "deposit", "amount": i64::MAX,
        })),
      )
      .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["amount"].is_array());
  }

  let (status, body) = app.call("GET", &format!("/deposits/balance/{service_user_id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["balance"], 0);
}
