//! End-to-end tests for the HTTP surface
//!
//! Each test builds the full router over a temporary data directory and
//! drives it with `oneshot` requests.

use api::{AppState, Settings, create_router};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "photos-test-boundary";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

async fn test_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();

    let mut settings = Settings::default();
    settings.storage.data_dir = dir.path().join("data");
    settings.uploads.uploads_dir = dir.path().join("uploads");
    settings.uploads.max_file_size = 1024;

    let state = AppState::initialize(&settings).await.unwrap();
    (create_router(state), dir)
}

fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, json_request(Method::GET, uri, token, None)).await
}

async fn delete(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, json_request(Method::DELETE, uri, token, None)).await
}

async fn register(app: &Router, username: &str, admin: bool) -> Value {
    let mut body = json!({ "username": username, "password": "secret123" });
    if admin {
        body["role"] = json!("admin");
        body["registerKey"] = json!("default_register_key");
    }
    let (status, body) = send(
        app,
        json_request(Method::POST, "/api/users/register", None, Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "username": username, "password": "secret123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_photo(app: &Router, token: Option<&str>, body: Value) -> Value {
    let (status, body) = send(
        app,
        json_request(Method::POST, "/api/photos", token, Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

fn multipart_request(
    token: Option<&str>,
    field: &str,
    file_name: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nSunset\r\n\
             --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"tags\"\r\n\r\nsky, evening\r\n\
             --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/photos/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_health_and_fallback() {
    let (app, _dir) = test_app().await;

    let (status, body) = get(&app, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Photos API is running");
    assert_eq!(body["data"]["storage"], "ok");
    assert!(body["timestamp"].is_string());

    let (status, body) = get(&app, "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "API endpoint not found");
}

#[tokio::test]
async fn test_register_login_and_profile() {
    let (app, _dir) = test_app().await;

    let user = register(&app, "alice", false).await;
    assert_eq!(user["role"], "user");
    assert!(user.get("password").is_none());

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({ "username": "alice", "password": "another1" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong-password" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let token = login(&app, "alice").await;

    let (status, body) = get(&app, "/api/users/profile", Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"]["lastLogin"].is_string());

    let (status, _) = get(&app, "/api/users/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        json_request(Method::GET, "/api/users/profile", Some("not-a-token"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_validation() {
    let (app, _dir) = test_app().await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({ "username": "", "password": "123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Validation failed");
    assert!(body["errors"]["username"].is_string());
    assert!(body["errors"]["password"].is_string());

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({
                "username": "mallory",
                "password": "secret123",
                "role": "admin",
                "registerKey": "guess",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_user_management() {
    let (app, _dir) = test_app().await;

    let admin = register(&app, "root", true).await;
    assert_eq!(admin["role"], "admin");
    let alice = register(&app, "alice", false).await;

    let admin_token = login(&app, "root").await;
    let alice_token = login(&app, "alice").await;

    let (status, _) = get(&app, "/api/users", Some(alice_token.as_str())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get(&app, "/api/users?limit=1", Some(admin_token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["totalItems"], 2);

    let (status, body) = get(&app, "/api/users/stats", Some(admin_token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);

    let toggle = format!("/api/users/{}/toggle-status", alice["id"]);
    let (status, body) = send(
        &app,
        json_request(Method::PATCH, &toggle, Some(admin_token.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);

    // Deactivated accounts lose access with their existing token
    let (status, _) = get(&app, "/api/users/profile", Some(alice_token.as_str())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let own = format!("/api/users/{}", admin["id"]);
    let (status, _) = delete(&app, &own, Some(admin_token.as_str())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let target = format!("/api/users/{}", alice["id"]);
    let (status, body) = delete(&app, &target, Some(admin_token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    let (status, _) = delete(&app, &target, Some(admin_token.as_str())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_photo_lifecycle() {
    let (app, _dir) = test_app().await;

    register(&app, "alice", false).await;
    register(&app, "bob", false).await;
    register(&app, "root", true).await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let admin = login(&app, "root").await;

    let photo = create_photo(
        &app,
        Some(alice.as_str()),
        json!({ "url": "https://example.com/a.jpg", "title": "Beach", "tags": ["sea", "sand"] }),
    )
    .await;
    let uri = format!("/api/photos/{}", photo["id"]);
    assert!(photo["userId"].is_u64());

    let anonymous = create_photo(&app, None, json!({ "url": "https://example.com/b.jpg" })).await;
    assert!(anonymous["userId"].is_null());

    let (status, body) = get(&app, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Beach");

    let (status, _) = send(
        &app,
        json_request(Method::PUT, &uri, None, Some(json!({ "title": "Nope" }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        json_request(Method::PUT, &uri, Some(bob.as_str()), Some(json!({ "title": "Mine now" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Permission denied");

    let (status, body) = send(
        &app,
        json_request(Method::PUT, &uri, Some(alice.as_str()), Some(json!({ "title": "Dunes" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Dunes");
    assert_eq!(body["data"]["tags"], json!(["sea", "sand"]));

    let (status, _) = delete(&app, &uri, Some(admin.as_str())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = delete(&app, &uri, Some(admin.as_str())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Photo not found");
}

#[tokio::test]
async fn test_photo_queries() {
    let (app, _dir) = test_app().await;

    let (status, body) = get(&app, "/api/photos/random", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No photos available");

    let photos = [
        json!({ "url": "https://example.com/1.jpg", "title": "Mountain lake", "tags": "nature, water" }),
        json!({ "url": "https://example.com/2.jpg", "title": "City", "tags": ["urban"] }),
        json!({ "url": "https://example.com/3.jpg", "description": "Lake at dawn", "tags": ["nature"] }),
    ];
    for photo in photos {
        create_photo(&app, None, photo).await;
    }

    let (status, body) = get(&app, "/api/photos?page=2&limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "City");
    assert_eq!(body["pagination"]["currentPage"], 2);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["hasNextPage"], true);
    assert_eq!(body["pagination"]["hasPrevPage"], true);

    let (status, body) = get(&app, "/api/photos?tags=nature", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["totalItems"], 2);

    let (status, body) = get(&app, "/api/photos/search?q=LAKE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["totalItems"], 2);

    let (status, body) = get(&app, "/api/photos/search", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["q"], "Search term is required");

    let (status, body) = get(&app, "/api/photos/tags?tags=urban", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "City");

    let (status, body) = get(&app, "/api/photos/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["popularTags"][0]["tag"], "nature");
    assert_eq!(body["data"]["popularTags"][0]["count"], 2);

    let (status, body) = get(&app, "/api/photos/random", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["id"].is_u64());

    let (status, _) = get(&app, "/api/photos/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_out_of_range_paging_is_clamped() {
    let (app, _dir) = test_app().await;
    for n in 1..=3 {
        create_photo(&app, None, json!({ "url": format!("https://example.com/{n}.jpg") })).await;
    }

    let (status, body) = get(&app, "/api/photos?page=-1&limit=-5", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["itemsPerPage"], 1);
    assert_eq!(body["pagination"]["totalPages"], 3);

    let (status, body) = get(&app, "/api/photos?page=0&limit=1000", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["itemsPerPage"], 100);

    let (status, body) = get(&app, "/api/users/1/photos?page=-3", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["pagination"]["currentPage"], 1);
}

#[tokio::test]
async fn test_photo_validation() {
    let (app, _dir) = test_app().await;

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/photos", None, Some(json!({ "title": "No url" }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"]["url"], "Photo URL is required");
}

#[tokio::test]
async fn test_user_photos() {
    let (app, _dir) = test_app().await;

    let alice = register(&app, "alice", false).await;
    let token = login(&app, "alice").await;
    create_photo(&app, Some(token.as_str()), json!({ "url": "https://example.com/1.jpg" })).await;
    create_photo(&app, None, json!({ "url": "https://example.com/2.jpg" })).await;

    let uri = format!("/api/users/{}/photos", alice["id"]);
    let (status, body) = get(&app, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User photos retrieved successfully");
    assert_eq!(body["pagination"]["totalItems"], 1);
    assert_eq!(body["data"][0]["userId"], alice["id"]);
}

#[tokio::test]
async fn test_upload_serve_and_delete() {
    let (app, _dir) = test_app().await;

    register(&app, "alice", false).await;
    let token = login(&app, "alice").await;

    let upload = multipart_request(Some(token.as_str()), "photo", "sunset.png", PNG_BYTES);
    let (status, body) = send(&app, upload).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Photo uploaded successfully");
    assert_eq!(body["data"]["title"], "Sunset");
    assert_eq!(body["data"]["tags"], json!(["sky", "evening"]));

    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/") && url.ends_with(".png"));

    let response = app
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&served[..], PNG_BYTES);

    let uri = format!("/api/photos/{}", body["data"]["id"]);
    let (status, _) = delete(&app, &uri, Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_a_borrowed_upload_url_keeps_the_file() {
    let (app, _dir) = test_app().await;

    register(&app, "alice", false).await;
    register(&app, "mallory", false).await;
    let alice = login(&app, "alice").await;
    let mallory = login(&app, "mallory").await;

    let upload = multipart_request(Some(alice.as_str()), "photo", "sunset.png", PNG_BYTES);
    let (status, body) = send(&app, upload).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let url = body["data"]["url"].as_str().unwrap().to_string();

    let borrowed = create_photo(&app, Some(mallory.as_str()), json!({ "url": url.as_str() })).await;
    let uri = format!("/api/photos/{}", borrowed["id"]);
    let (status, _) = delete(&app, &uri, Some(mallory.as_str())).await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_rejections() {
    let (app, dir) = test_app().await;

    let upload = multipart_request(None, "image", "sunset.png", PNG_BYTES);
    let (status, body) = send(&app, upload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unexpected field name. Expected: photo");

    let (status, body) = send(&app, multipart_request(None, "photo", "notes.txt", PNG_BYTES)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "File type not allowed. Allowed types: jpg, jpeg, png, gif, webp"
    );

    let (status, _) = send(&app, multipart_request(None, "photo", "huge.png", &[0u8; 2048])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/photos/upload", None, Some(json!({ "title": "x" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");

    // Nothing was written for any rejected upload
    let stored = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_batch_delete() {
    let (app, _dir) = test_app().await;

    register(&app, "alice", false).await;
    register(&app, "root", true).await;
    let alice = login(&app, "alice").await;
    let admin = login(&app, "root").await;

    let first = create_photo(
        &app,
        Some(alice.as_str()),
        json!({ "url": "https://example.com/1.jpg" }),
    )
    .await;
    let second = create_photo(&app, None, json!({ "url": "https://example.com/2.jpg" })).await;
    let ids = json!({ "photoIds": [first["id"], second["id"], 99] });

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/photos/batch-delete",
            Some(alice.as_str()),
            Some(ids.clone()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/photos/batch-delete",
            Some(admin.as_str()),
            Some(json!({})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["photoIds"], "Photo IDs array is required");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/photos/batch-delete",
            Some(admin.as_str()),
            Some(ids),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], json!([first["id"], second["id"]]));
    assert_eq!(body["data"]["failed"][0]["id"], 99);
    assert_eq!(body["data"]["failed"][0]["error"], "Photo not found");
}
