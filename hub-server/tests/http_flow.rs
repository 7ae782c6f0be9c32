//! HTTP surface against the in-memory backend
//! Run: cargo test -p hub-server --test http_flow

use std::io::Cursor;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use hub_server::db::Stores;
use hub_server::services::LogMailer;
use hub_server::{Config, ErrorCode, ServerState};

struct TestApp {
    _tmp: tempfile::TempDir,
    app: Router,
}

impl TestApp {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::in_memory(tmp.path().to_string_lossy().to_string());
        let state = ServerState::with_stores(config, Stores::memory(), Arc::new(LogMailer));
        Self {
            _tmp: tmp,
            app: hub_server::api::router(state),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec(), content_type)
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, bytes, _) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Register and return (token, user id)
    async fn register(&self, name: &str, role: &str) -> (String, String) {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "name": name,
                    "email": format!("{}@example.com", name.to_lowercase()),
                    "password": "correct-horse-42",
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["user"]["id"].as_str().unwrap().to_string(),
        )
    }
}

fn gig_payload() -> Value {
    json!({
        "title": "Landing page copy",
        "description": "Conversion-focused copy for one page",
        "category": "writing",
        "keywords": ["copywriting"],
        "price_plans": [
            {"tier": "Basic", "price": 30.0, "delivery_days": 2, "revisions": 0},
            {"tier": "Standard", "price": 100.0, "delivery_days": 4, "revisions": 2}
        ]
    })
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(3, 3, image::Rgb([10, 120, 200]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

fn multipart_request(uri: &str, token: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let boundary = "hub-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "memory");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], ErrorCode::NotAuthenticated.code());

    let (status, body) = app
        .call(Method::GET, "/api/orders/my-orders", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], ErrorCode::TokenInvalid.code());

    let (status, _) = app.call(Method::GET, "/api/gigs", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn event_socket_accepts_query_token() {
    let app = TestApp::new();
    let (token, _) = app.register("Bob", "client").await;

    let (status, body) = app
        .call(Method::GET, "/api/orders/o1/events?token=not-a-jwt", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], ErrorCode::TokenInvalid.code());

    // past authentication; the plain request is not an upgrade
    let request = Request::builder()
        .uri(format!("/api/orders/o1/events?token={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = app.send(request).await;
    assert_ne!(status, StatusCode::UNAUTHORIZED);

    // other routes still want the header
    let (status, _) = app
        .call(Method::GET, &format!("/api/orders/my-orders?token={token}"), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn order_flow_over_http() {
    let app = TestApp::new();
    let (seller_token, seller_id) = app.register("Sally", "freelancer").await;
    let (buyer_token, _) = app.register("Bob", "client").await;

    // clients cannot sell
    let (status, body) = app
        .call(Method::POST, "/api/gigs", Some(&buyer_token), Some(gig_payload()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], ErrorCode::RoleRequired.code());

    let (status, body) = app
        .call(Method::POST, "/api/gigs", Some(&seller_token), Some(gig_payload()))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let gig_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(Method::GET, "/api/gigs?search=copy", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/orders",
            Some(&buyer_token),
            Some(json!({"gig_id": gig_id, "tier": "Standard", "requirements": "Tone: friendly"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["amount"], 100.0);
    assert_eq!(body["data"]["revisions_left"], 2);
    assert_eq!(body["data"]["seller_id"], seller_id.as_str());
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    // revision on a pending order
    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/orders/{order_id}/revision"),
            Some(&buyer_token),
            Some(json!({"note": "Shorter headline"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], ErrorCode::InvalidTransition.code());

    // status changes are seller-only
    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/api/orders/{order_id}/status"),
            Some(&buyer_token),
            Some(json!({"status": "in_progress"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/orders/{order_id}/status"),
            Some(&seller_token),
            Some(json!({"status": "In Progress"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "in_progress");
    assert_eq!(body["data"]["version"], 1);

    let (status, body) = app
        .call(
            Method::GET,
            "/api/orders/my-orders?status=in_progress",
            Some(&seller_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/orders/{order_id}/status"),
            Some(&seller_token),
            Some(json!({"status": "delivered", "delivery_files": ["/api/files/draft.pdf"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // the note may be left out
    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/orders/{order_id}/revision"),
            Some(&buyer_token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "in_progress");
    assert_eq!(body["data"]["revisions_left"], 1);

    let (status, body) = app
        .call(Method::GET, "/api/orders/stats", Some(&buyer_token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn messages_are_read_by_the_receiver() {
    let app = TestApp::new();
    let (seller_token, seller_id) = app.register("Sally", "freelancer").await;
    let (buyer_token, _) = app.register("Bob", "client").await;
    let (outsider_token, _) = app.register("Olive", "client").await;

    let (_, body) = app
        .call(Method::POST, "/api/gigs", Some(&seller_token), Some(gig_payload()))
        .await;
    let gig_id = body["data"]["id"].as_str().unwrap().to_string();
    let (_, body) = app
        .call(
            Method::POST,
            "/api/orders",
            Some(&buyer_token),
            Some(json!({"gig_id": gig_id, "tier": "Basic"})),
        )
        .await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/messages",
            Some(&buyer_token),
            Some(json!({"order_id": order_id, "receiver_id": seller_id, "content": "Hello!"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["is_read"], false);

    let conversation = format!("/api/messages/conversation/{order_id}");

    let (status, body) = app
        .call(Method::GET, &conversation, Some(&outsider_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], ErrorCode::NotOrderParticipant.code());

    let (status, body) = app
        .call(Method::GET, &conversation, Some(&seller_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["data"][0]["is_read"], true);

    let (status, body) = app
        .call(Method::GET, "/api/messages/conversations", Some(&buyer_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["order_id"], order_id.as_str());
}

#[tokio::test]
async fn uploads_are_served_back() {
    let app = TestApp::new();
    let (token, _) = app.register("Sally", "freelancer").await;

    let (status, bytes, _) = app
        .send(multipart_request("/api/files/upload", &token, "mockup.png", &png_bytes()))
        .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["format"], "png");
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/api/files/"));

    let request = Request::builder().uri(&url).body(Body::empty()).unwrap();
    let (status, served, content_type) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, png_bytes());
    assert_eq!(content_type.as_deref(), Some("image/png"));

    let (status, bytes, _) = app
        .send(multipart_request("/api/files/upload", &token, "notes.exe", b"MZ"))
        .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], ErrorCode::UnsupportedFileFormat.code());

    let (status, _) = app
        .call(Method::GET, "/api/files/missing.png", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_with_form_and_picture() {
    let app = TestApp::new();
    let boundary = "hub-form-boundary";
    let mut body = Vec::new();
    for (name, value) in [
        ("name", "Sally"),
        ("email", "sally@example.com"),
        ("password", "correct-horse-42"),
        ("role", "freelancer"),
        ("skills", "logo, branding"),
    ] {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"profile_pic\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&png_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, bytes, _) = app.send(request).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::OK, "{body}");

    let user = &body["data"]["user"];
    assert_eq!(user["role"], "freelancer");
    assert_eq!(user["skills"], json!(["logo", "branding"]));
    let pic = user["profile_pic"].as_str().unwrap().to_string();
    assert!(pic.starts_with("/api/files/"));

    let request = Request::builder().uri(&pic).body(Body::empty()).unwrap();
    let (status, served, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, png_bytes());
}
