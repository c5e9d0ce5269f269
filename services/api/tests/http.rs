//! End-to-end tests of the router over the in-memory store and a temp-dir
//! blob store.

use api_lib::adapters::{Argon2Hasher, FsBlobStore};
use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use photo_sharing_core::memory::InMemoryStore;
use photo_sharing_core::ports::SystemClock;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "photo-sharing-test-boundary";

struct TestApp {
    router: Router,
    images: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let images = tempfile::tempdir().unwrap();
        let config = Arc::new(Config::local(images.path().to_path_buf()));
        let blobs = FsBlobStore::create(images.path(), &config.images_url_prefix)
            .await
            .unwrap();
        let state = AppState::assemble(
            config,
            Arc::new(InMemoryStore::new()),
            Arc::new(blobs),
            Arc::new(Argon2Hasher::new()),
            Arc::new(SystemClock),
        );
        Self {
            router: build_router(Arc::new(state)),
            images,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, headers, body)
    }

    async fn json(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Value,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let (status, _, body) = self.send(builder.body(Body::empty()).unwrap()).await;
        (status, body)
    }

    async fn upload(&self, cookie: Option<&str>, mime: &str, bytes: &[u8]) -> (StatusCode, Value) {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"upload\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/photos/new")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let (status, _, body) = self.send(builder.body(Body::from(body)).unwrap()).await;
        (status, body)
    }

    /// Registers `login` and returns the session cookie of a fresh login.
    async fn sign_up(&self, login: &str) -> String {
        let (status, _, _) = self
            .json(
                Method::POST,
                "/user",
                None,
                json!({
                    "login_name": login,
                    "password": "pw",
                    "confirm_password": "pw",
                    "first_name": login.to_uppercase(),
                    "last_name": "Tester",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, headers, _) = self
            .json(
                Method::POST,
                "/admin/login",
                None,
                json!({ "login_name": login, "password": "pw" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        session_cookie(&headers)
    }

    fn stored_files(&self) -> usize {
        std::fs::read_dir(self.images.path()).unwrap().count()
    }
}

fn session_cookie(headers: &HeaderMap) -> String {
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("login sets a cookie");
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn register_login_check_logout() {
    let app = TestApp::new().await;
    let cookie = app.sign_up("ada").await;
    assert!(cookie.starts_with("session="));

    let (status, identity) = app.get("/admin/check", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(identity["login_name"], "ada");
    assert!(identity.get("password").is_none());

    let (status, headers, _) = app
        .json(Method::POST, "/admin/logout", Some(&cookie), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let cleared = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let (status, _) = app.get("/admin/check", Some(&cookie)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_errors_are_bad_requests() {
    let app = TestApp::new().await;
    app.sign_up("ada").await;

    let (status, _, body) = app
        .json(
            Method::POST,
            "/user",
            None,
            json!({
                "login_name": "ada",
                "password": "pw",
                "confirm_password": "pw",
                "first_name": "A",
                "last_name": "B",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Login name already exists");

    let (status, _, body) = app
        .json(
            Method::POST,
            "/user",
            None,
            json!({
                "login_name": "bob",
                "password": "pw",
                "confirm_password": "other",
                "first_name": "B",
                "last_name": "B",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passwords do not match");

    let (status, _, _) = app
        .json(
            Method::POST,
            "/user",
            None,
            json!({ "login_name": "eve", "is_admin": true }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_and_unknown_login_look_the_same() {
    let app = TestApp::new().await;
    app.sign_up("ada").await;

    let (wrong_status, _, wrong) = app
        .json(
            Method::POST,
            "/admin/login",
            None,
            json!({ "login_name": "ada", "password": "nope" }),
        )
        .await;
    let (unknown_status, _, unknown) = app
        .json(
            Method::POST,
            "/admin/login",
            None,
            json!({ "login_name": "nobody", "password": "pw" }),
        )
        .await;
    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn anonymous_callers_are_turned_away() {
    let app = TestApp::new().await;

    for uri in ["/posts", "/user/list", "/users/stats", "/admin/check"] {
        let (status, _) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let (status, _, body) = app
        .json(Method::POST, "/admin/logout", None, json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Not logged in");

    let (status, _) = app.upload(None, "image/png", b"png-bytes").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.stored_files(), 0);

    let (status, _) = app.get("/test/info", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn upload_serve_and_delete_a_photo() {
    let app = TestApp::new().await;
    let cookie = app.sign_up("ada").await;

    let (status, photo) = app.upload(Some(&cookie), "image/png", b"png-bytes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.stored_files(), 1);
    let photo_id = photo["id"].as_str().unwrap().to_string();
    let url = photo["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/images/") && url.ends_with(".png"));

    let (status, served) = app.get(&url, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, Value::String("png-bytes".to_string()));

    let (status, feed) = app.get("/posts", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed[0]["id"], photo_id.as_str());
    assert_eq!(feed[0]["owner"]["first_name"], "ADA");

    let (status, _, _) = app
        .json(Method::DELETE, &format!("/photos/{photo_id}"), Some(&cookie), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.stored_files(), 0);

    let (_, feed) = app.get("/posts", Some(&cookie)).await;
    assert_eq!(feed, json!([]));
}

#[tokio::test]
async fn rejected_uploads_leave_no_file() {
    let app = TestApp::new().await;
    let cookie = app.sign_up("ada").await;

    let (status, body) = app.upload(Some(&cookie), "text/plain", b"hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid file type"));

    let (status, body) = app.upload(Some(&cookie), "image/png", b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No photo uploaded");

    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn comment_permissions_over_http() {
    let app = TestApp::new().await;
    let owner = app.sign_up("owner").await;
    let guest = app.sign_up("guest").await;

    let (_, photo) = app.upload(Some(&owner), "image/jpeg", b"jpeg").await;
    let photo_id = photo["id"].as_str().unwrap().to_string();

    let (status, _, body) = app
        .json(
            Method::POST,
            &format!("/commentsOfPhoto/{photo_id}"),
            Some(&guest),
            json!({ "comment": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Comment cannot be empty");

    let (status, _, comment) = app
        .json(
            Method::POST,
            &format!("/commentsOfPhoto/{photo_id}"),
            Some(&guest),
            json!({ "comment": "  nice shot  " }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comment["text"], "nice shot");
    assert_eq!(comment["author"]["first_name"], "GUEST");
    let comment_id = comment["id"].as_str().unwrap().to_string();
    let comment_uri = format!("/commentsOfPhoto/{photo_id}/{comment_id}");

    // Only the author may edit, even the photo owner may not.
    let (status, _, _) = app
        .json(Method::PUT, &comment_uri, Some(&owner), json!({ "comment": "edited" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, edited) = app
        .json(Method::PUT, &comment_uri, Some(&guest), json!({ "comment": "edited" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["text"], "edited");

    // The photo owner may delete someone else's comment.
    let (status, _, _) = app
        .json(Method::DELETE, &comment_uri, Some(&owner), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = app
        .json(Method::DELETE, &comment_uri, Some(&owner), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_owner_edits_or_deletes_a_photo() {
    let app = TestApp::new().await;
    let owner = app.sign_up("owner").await;
    let guest = app.sign_up("guest").await;

    let (_, photo) = app.upload(Some(&owner), "image/gif", b"gif").await;
    let photo_uri = format!("/photos/{}", photo["id"].as_str().unwrap());

    let (status, _, _) = app
        .json(Method::PUT, &photo_uri, Some(&guest), json!({ "description": "mine now" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = app
        .json(Method::DELETE, &photo_uri, Some(&guest), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, updated) = app
        .json(Method::PUT, &photo_uri, Some(&owner), json!({ "description": "sunset" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "sunset");
    assert_eq!(app.stored_files(), 1);
}

#[tokio::test]
async fn likes_toggle_and_stats_count() {
    let app = TestApp::new().await;
    let ada = app.sign_up("ada").await;
    let bob = app.sign_up("bob").await;

    let (_, photo) = app.upload(Some(&ada), "image/webp", b"webp").await;
    let photo_id = photo["id"].as_str().unwrap().to_string();
    let like_uri = format!("/photos/{photo_id}/like");

    let (status, _, likes) = app.json(Method::POST, &like_uri, Some(&bob), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(likes.as_array().unwrap().len(), 1);

    let (_, _, likes) = app.json(Method::POST, &like_uri, Some(&ada), json!({})).await;
    assert_eq!(likes.as_array().unwrap().len(), 2);

    let (_, _, likes) = app.json(Method::POST, &like_uri, Some(&bob), json!({})).await;
    assert_eq!(likes.as_array().unwrap().len(), 1);

    app.json(
        Method::POST,
        &format!("/commentsOfPhoto/{photo_id}"),
        Some(&bob),
        json!({ "comment": "hi" }),
    )
    .await;

    let (_, check) = app.get("/admin/check", Some(&bob)).await;
    let bob_id = check["id"].as_str().unwrap().to_string();
    let (_, check) = app.get("/admin/check", Some(&ada)).await;
    let ada_id = check["id"].as_str().unwrap().to_string();

    let (status, stats) = app.get("/users/stats", Some(&ada)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats[&ada_id], json!({ "photo_count": 1, "comment_count": 0 }));
    assert_eq!(stats[&bob_id], json!({ "photo_count": 0, "comment_count": 1 }));

    let (status, comments) = app
        .get(&format!("/commentsOfUser/{bob_id}"), Some(&ada))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments[0]["photo"]["id"], photo_id.as_str());
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::new().await;
    let cookie = app.sign_up("ada").await;

    let (status, _) = app.get("/user/not-a-uuid", Some(&cookie)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = app.get(&format!("/photosOfUser/{missing}"), Some(&cookie)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = app
        .json(Method::POST, &format!("/photos/{missing}/like"), Some(&cookie), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Photo not found");

    // The session check still comes first for a malformed id.
    let (status, _, _) = app
        .json(Method::DELETE, "/photos/garbage", None, json!({}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
