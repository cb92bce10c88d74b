use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::{json, Value as JsonValue};
use shared::database::{
    DatabaseConfig, DatabaseError, DatabaseResult, DocumentStore, Filter, InMemoryDocumentStore,
    UpsertOutcome,
};
use shared::storage::{InMemoryObjectStore, ObjectStore, StorageConfig, StorageGateway};
use shared::types::Document;
use tower::ServiceExt;

use crate::config::{AppConfig, ServerConfig};
use crate::routes::create_router;
use crate::AppState;

const BOUNDARY: &str = "realdeal-test-boundary";

struct Harness {
    documents: Arc<InMemoryDocumentStore>,
    objects: Arc<InMemoryObjectStore>,
    app: Router,
}

fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig::default(),
        storage: StorageConfig::default(),
    })
}

async fn harness() -> Harness {
    let documents = Arc::new(InMemoryDocumentStore::new());
    let objects = Arc::new(InMemoryObjectStore::default());
    let storage = StorageGateway::new(objects.clone(), "media");
    storage.ensure_bucket().await.unwrap();

    let app = create_router(AppState {
        documents: documents.clone(),
        storage: Arc::new(storage),
        config: test_config(),
    });

    Harness {
        documents,
        objects,
        app,
    }
}

fn app_with(documents: Arc<dyn DocumentStore>, objects: Arc<dyn ObjectStore>) -> Router {
    create_router(AppState {
        documents,
        storage: Arc::new(StorageGateway::new(objects, "media")),
        config: test_config(),
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, JsonValue) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(JsonValue::Null)
    };
    (status, headers, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, JsonValue) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, _, body) = send(app, request).await;
    (status, body)
}

fn multipart_body(parts: &[(&str, Option<(&str, &str)>, &str)]) -> Body {
    let mut body = String::new();
    for (name, file, content) in parts {
        body.push_str(&format!("--{}\r\n", BOUNDARY));
        match file {
            Some((file_name, content_type)) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                name, file_name, content_type
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                name
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    Body::from(body)
}

fn upload_request(body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/media")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(body)
        .unwrap()
}

/// Document store whose every call fails.
struct DownDocumentStore;

#[async_trait]
impl DocumentStore for DownDocumentStore {
    async fn find_one(&self, _: &str, _: &Filter) -> DatabaseResult<Option<Document>> {
        Err(DatabaseError::Query("connection refused".to_string()))
    }

    async fn find(&self, _: &str, _: &Filter) -> DatabaseResult<Vec<Document>> {
        Err(DatabaseError::Query("connection refused".to_string()))
    }

    async fn upsert(&self, _: &str, _: &Filter, _: &Document) -> DatabaseResult<UpsertOutcome> {
        Err(DatabaseError::Query("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

/// Object store that cannot be reached.
struct DownObjectStore;

#[async_trait]
impl ObjectStore for DownObjectStore {
    async fn bucket_exists(&self, _: &str) -> anyhow::Result<bool> {
        Err(anyhow::anyhow!("dial tcp: connection refused"))
    }

    async fn make_bucket(&self, _: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("dial tcp: connection refused"))
    }

    async fn put_object(&self, _: &str, _: &str, _: Bytes, _: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("dial tcp: connection refused"))
    }

    async fn presign_get(&self, _: &str, _: &str, _: Duration) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("signature: credentials rejected"))
    }
}

#[tokio::test]
async fn test_entity_returned_verbatim() {
    let h = harness().await;
    h.documents
        .insert(
            "companies",
            Document::new()
                .with("id", "c1")
                .with("name", "Acme")
                .with("tags", vec!["ai", "b2b"])
                .with("verified", true),
        )
        .await;

    let (status, body) = get(&h.app, "/api/companies/c1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"id": "c1", "name": "Acme", "tags": ["ai", "b2b"], "verified": true})
    );
}

#[tokio::test]
async fn test_missing_entity_is_404() {
    let h = harness().await;
    let (status, body) = get(&h.app, "/api/users/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "not found"}));
}

#[tokio::test]
async fn test_lookups_use_their_foreign_keys() {
    let h = harness().await;
    h.documents
        .insert("content_moderation", Document::new().with("contentId", "p1").with("status", "ok"))
        .await;
    h.documents
        .insert("company_verifications", Document::new().with("companyId", "c1").with("level", "gold"))
        .await;
    h.documents
        .insert("job_compliance", Document::new().with("jobId", "j1").with("status", "clear"))
        .await;

    assert_eq!(get(&h.app, "/api/content-moderation/p1").await.1["status"], "ok");
    assert_eq!(get(&h.app, "/api/company-verifications/c1").await.1["level"], "gold");
    assert_eq!(get(&h.app, "/api/job-compliance/j1").await.1["status"], "clear");
}

#[tokio::test]
async fn test_explore_bundles_five_scans() {
    let h = harness().await;
    h.documents.insert("projects", Document::new().with("id", "pr1")).await;
    h.documents.insert("jobs", Document::new().with("id", "j1")).await;
    h.documents.insert("jobs", Document::new().with("id", "j2")).await;

    let (status, body) = get(&h.app, "/api/explore").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "projects": [{"id": "pr1"}],
            "products": [],
            "posts": [],
            "jobs": [{"id": "j1"}, {"id": "j2"}],
            "companies": []
        })
    );
}

#[tokio::test]
async fn test_investors_scan_profiles_collection() {
    let h = harness().await;
    h.documents
        .insert("investor_profiles", Document::new().with("id", "i1").with("thesis", "infra"))
        .await;

    let (status, body) = get(&h.app, "/api/investors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": "i1", "thesis": "infra"}]));
}

#[tokio::test]
async fn test_user_scoped_lists_filter_by_user() {
    let h = harness().await;
    for (id, user) in [("m1", "u1"), ("m2", "u2"), ("m3", "u1")] {
        h.documents
            .insert("inbox_items", Document::new().with("id", id).with("userId", user))
            .await;
    }

    let (status, body) = get(&h.app, "/api/inbox?userId=u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"id": "m1", "userId": "u1"}, {"id": "m3", "userId": "u1"}])
    );

    let (status, body) = get(&h.app, "/api/charges?userId=u9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_user_scoped_single_records() {
    let h = harness().await;
    h.documents
        .insert("quotas", Document::new().with("userId", "u1").with("transcodeLimit", 120i64))
        .await;

    let (status, body) = get(&h.app, "/api/quota?userId=u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transcodeLimit"], 120);

    let (status, _) = get(&h.app, "/api/usage?userId=u1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_user_id_is_bad_request() {
    let h = harness().await;
    let (status, body) = get(&h.app, "/api/job-slots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "userId is required"}));
}

#[tokio::test]
async fn test_media_read_attaches_fifteen_minute_url() {
    let h = harness().await;
    h.documents
        .insert(
            "media_assets",
            Document::new()
                .with("id", "m1")
                .with("key", "media/m1/clip.mp4")
                .with("title", "Demo"),
        )
        .await;

    let (status, body) = get(&h.app, "/api/media/m1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Demo");
    assert_eq!(
        body["contentUrl"],
        "http://localhost:9000/media/media/m1/clip.mp4?X-Amz-Expires=900"
    );

    let expires_at = body["contentUrlExpiresAt"].as_str().unwrap();
    let expires_at = chrono::DateTime::parse_from_rfc3339(expires_at).unwrap();
    let remaining = expires_at.with_timezone(&chrono::Utc) - chrono::Utc::now();
    assert!(remaining <= chrono::Duration::minutes(15));
    assert!(remaining > chrono::Duration::minutes(14));
}

#[tokio::test]
async fn test_media_read_without_key_has_no_url() {
    let h = harness().await;
    h.documents
        .insert("media_assets", Document::new().with("id", "m2").with("title", "pending"))
        .await;

    let (status, body) = get(&h.app, "/api/media/m2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("contentUrl").is_none());
}

#[tokio::test]
async fn test_media_presign_failure_is_bad_gateway() {
    let documents = Arc::new(InMemoryDocumentStore::new());
    documents
        .insert("media_assets", Document::new().with("id", "m1").with("key", "media/m1/a.png"))
        .await;
    let app = app_with(documents, Arc::new(DownObjectStore));

    let (status, body) = get(&app, "/api/media/m1").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "storage_read_failed"}));
}

#[tokio::test]
async fn test_upload_stores_object_and_asset() {
    let h = harness().await;
    let request = upload_request(multipart_body(&[
        ("title", None, "Launch video"),
        ("file", Some(("clip.mp4", "video/mp4")), "frames"),
    ]));

    let (status, _, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["id"].as_str().unwrap().to_string();
    let key = format!("media/{}/clip.mp4", id);
    assert_eq!(body["key"], key.as_str());
    assert_eq!(body["title"], "Launch video");
    assert_eq!(body["type"], "video");
    assert_eq!(body["size"], 6);

    let object = h.objects.object("media", &key).await.unwrap();
    assert_eq!(&object.data[..], b"frames");
    assert_eq!(object.content_type, "video/mp4");

    let stored = h
        .documents
        .find_one("media_assets", &Filter::eq("id", id.as_str()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.get_str("key"), Some(key.as_str()));

    let (status, body) = get(&h.app, &format!("/api/media/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["contentUrl"].as_str().unwrap().contains(&key));
}

#[tokio::test]
async fn test_upload_without_file_is_bad_request() {
    let h = harness().await;
    let request = upload_request(multipart_body(&[("title", None, "nothing attached")]));

    let (status, _, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "no file provided"}));
    assert_eq!(h.documents.count("media_assets").await, 0);
}

#[tokio::test]
async fn test_upload_write_failure_is_bad_gateway() {
    let documents = Arc::new(InMemoryDocumentStore::new());
    let app = app_with(documents.clone(), Arc::new(DownObjectStore));
    let request = upload_request(multipart_body(&[("file", Some(("a.png", "image/png")), "px")]));

    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "storage_write_failed"}));
    assert_eq!(documents.count("media_assets").await, 0);
}

fn login_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_login_sets_session_cookie_and_me_resolves_it() {
    let h = harness().await;
    h.documents
        .insert(
            "users",
            Document::new().with("id", "u1").with("email", "ada@example.com").with("name", "Ada"),
        )
        .await;

    let (status, headers, body) = send(&h.app, login_request(r#"{"email":"ada@example.com"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "u1");

    let cookie = headers
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("uid=u1"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=604800"));

    let request = Request::builder()
        .uri("/api/me")
        .header(header::COOKIE, "uid=u1")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");
}

#[tokio::test]
async fn test_login_rejections() {
    let h = harness().await;

    let (status, _, _) = send(&h.app, login_request(r#"{"email":"ghost@example.com"}"#)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&h.app, login_request("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_requires_known_session() {
    let h = harness().await;

    let (status, body) = get(&h.app, "/api/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "unauthenticated"}));

    let request = Request::builder()
        .uri("/api/me")
        .header(header::COOKIE, "uid=deleted-user")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let app = app_with(Arc::new(DownDocumentStore), Arc::new(InMemoryObjectStore::default()));

    let (status, body) = get(&app, "/api/projects").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "internal error"}));
}

#[tokio::test]
async fn test_health_reports_each_dependency() {
    let h = harness().await;
    let (status, body) = get(&h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let app = app_with(Arc::new(DownDocumentStore), Arc::new(DownObjectStore));
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["services"], json!({"database": "unhealthy", "storage": "unhealthy"}));
}
