//! HTTP-level tests: the full router over an in-memory database with fake
//! identity provider and notifier.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::{CustomerCreate, Order};
use tower::ServiceExt;

use shop_server::api::build_app;
use shop_server::auth::{IdentityClaims, IdentityError, IdentityVerifier};
use shop_server::db::DbService;
use shop_server::db::repository::customer;
use shop_server::notify::{Notifier, NotifyError};
use shop_server::{Config, ServerState};

#[derive(Default)]
struct FakeNotifier {
    fail: bool,
    confirmations: AtomicUsize,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send_order_confirmation(&self, _order: &Order) -> Result<(), NotifyError> {
        self.confirmations.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NotifyError::Sms("gateway down".into()));
        }
        Ok(())
    }

    async fn send_status_update(&self, _order: &Order) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Email("ses down".into()));
        }
        Ok(())
    }
}

struct FakeIdentity;

#[async_trait]
impl IdentityVerifier for FakeIdentity {
    async fn authorize_url(&self, state: &str) -> Result<String, IdentityError> {
        Ok(format!("https://id.example.com/authorize?state={state}"))
    }

    async fn authenticate(&self, code: &str) -> Result<IdentityClaims, IdentityError> {
        if code != "good-code" {
            return Err(IdentityError::Exchange("invalid_grant".into()));
        }
        Ok(IdentityClaims {
            subject: "provider-sub-1".into(),
            email: "jane@example.com".into(),
            name: "Jane Wanjiru Doe".into(),
        })
    }
}

struct TestApp {
    state: ServerState,
    router: Router,
    notifier: Arc<FakeNotifier>,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_notifier(FakeNotifier::default()).await
    }

    async fn with_notifier(notifier: FakeNotifier) -> Self {
        let pool = DbService::in_memory().await.unwrap().pool;
        let notifier = Arc::new(notifier);
        let state = ServerState::new(
            Config::default(),
            pool,
            notifier.clone(),
            Arc::new(FakeIdentity),
        );
        let router = build_app(&state).with_state(state.clone());
        Self {
            state,
            router,
            notifier,
        }
    }

    /// Create a customer and return a session token for it
    async fn login_as(&self, oauth_id: &str) -> String {
        let customer = customer::create(
            &self.state.pool,
            CustomerCreate {
                first_name: "Test".into(),
                last_name: oauth_id.into(),
                email: format!("{oauth_id}@example.com"),
                oauth_id: oauth_id.into(),
            },
        )
        .await
        .unwrap();
        self.state.jwt_service.generate_token(&customer).unwrap()
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, http::HeaderMap, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let (status, _, body) = self.send(builder.body(body).unwrap()).await;
        (status, body)
    }

    async fn create_category(&self, token: &str, name: &str, parent_id: Option<i64>) -> i64 {
        let (status, body) = self
            .call(
                "POST",
                "/api/v1/categories",
                Some(token),
                Some(json!({ "name": name, "parent_id": parent_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }

    async fn create_product(&self, token: &str, sku: &str, price: f64, category_id: i64) -> i64 {
        let (status, body) = self
            .call(
                "POST",
                "/api/v1/products",
                Some(token),
                Some(json!({
                    "name": format!("Product {sku}"),
                    "price": price,
                    "sku": sku,
                    "category_id": category_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_api_requires_token() {
    let app = TestApp::new().await;

    let (status, body) = app.call("GET", "/api/v1/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let (status, _) = app
        .call("GET", "/api/v1/orders", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let app = TestApp::new().await;
    let token = app.login_as("sub-a").await;

    for uri in [
        "/api/v1/orders/abc",
        "/api/v1/categories/xyz",
        "/api/v1/products/1.5",
    ] {
        let (status, body) = app.call("GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], 5);
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new().await;
    let token = app.login_as("sub-a").await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/orders")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"items\": [oops"))
        .unwrap();
    let (status, _, _) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/v1/orders",
            Some(&token),
            Some(json!({ "items": "not-a-list" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_and_get_order() {
    let app = TestApp::new().await;
    let token = app.login_as("sub-a").await;
    let category = app.create_category(&token, "Kitchen", None).await;
    let mug = app.create_product(&token, "MUG", 5.00, category).await;
    let pen = app.create_product(&token, "PEN", 3.00, category).await;

    let (status, body) = app
        .call(
            "POST",
            "/api/v1/orders",
            Some(&token),
            Some(json!({ "items": [
                { "product_id": mug, "quantity": 2 },
                { "product_id": pen, "quantity": 1 },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["total"], 13.0);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(app.notifier.confirmations.load(Ordering::SeqCst), 1);

    let order_id = body["data"]["id"].as_i64().unwrap();
    let (status, body) = app
        .call("GET", &format!("/api/v1/orders/{order_id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["price"], 5.0);

    let (status, body) = app.call("GET", "/api/v1/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let token = app.login_as("sub-a").await;

    let (status, body) = app
        .call(
            "POST",
            "/api/v1/orders",
            Some(&token),
            Some(json!({ "items": [{ "product_id": 404, "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);
}

#[tokio::test]
async fn test_other_customers_order_is_not_found() {
    let app = TestApp::new().await;
    let alice = app.login_as("sub-alice").await;
    let bob = app.login_as("sub-bob").await;
    let category = app.create_category(&alice, "Books", None).await;
    let book = app.create_product(&alice, "BOOK", 12.5, category).await;

    let (_, body) = app
        .call(
            "POST",
            "/api/v1/orders",
            Some(&alice),
            Some(json!({ "items": [{ "product_id": book, "quantity": 1 }] })),
        )
        .await;
    let order_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .call("GET", &format!("/api/v1/orders/{order_id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
}

#[tokio::test]
async fn test_update_status() {
    let app = TestApp::new().await;
    let token = app.login_as("sub-a").await;
    let category = app.create_category(&token, "Garden", None).await;
    let hose = app.create_product(&token, "HOSE", 20.0, category).await;
    let (_, body) = app
        .call(
            "POST",
            "/api/v1/orders",
            Some(&token),
            Some(json!({ "items": [{ "product_id": hose, "quantity": 1 }] })),
        )
        .await;
    let order_id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/orders/{order_id}/status");

    let (status, body) = app
        .call("PUT", &uri, Some(&token), Some(json!({ "status": "completed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");

    let (status, body) = app
        .call("PUT", &uri, Some(&token), Some(json!({ "status": "pending" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pending");

    let (status, _) = app
        .call("PUT", &uri, Some(&token), Some(json!({ "status": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "PUT",
            "/api/v1/orders/9999/status",
            Some(&token),
            Some(json!({ "status": "cancelled" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notifier_failure_does_not_fail_order() {
    let app = TestApp::with_notifier(FakeNotifier {
        fail: true,
        ..Default::default()
    })
    .await;
    let token = app.login_as("sub-a").await;
    let category = app.create_category(&token, "Toys", None).await;
    let ball = app.create_product(&token, "BALL", 2.5, category).await;

    let (status, body) = app
        .call(
            "POST",
            "/api/v1/orders",
            Some(&token),
            Some(json!({ "items": [{ "product_id": ball, "quantity": 4 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["total"], 10.0);
    assert_eq!(app.notifier.confirmations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_category_endpoints() {
    let app = TestApp::new().await;
    let token = app.login_as("sub-a").await;

    let root = app.create_category(&token, "Electronics", None).await;
    let phones = app.create_category(&token, "Phones", Some(root)).await;
    let cases = app.create_category(&token, "Cases", Some(phones)).await;
    app.create_product(&token, "TV", 10.0, root).await;
    app.create_product(&token, "PHONE", 20.0, phones).await;
    app.create_product(&token, "CASE", 99.0, cases).await;

    let (status, body) = app
        .call(
            "POST",
            "/api/v1/categories",
            Some(&token),
            Some(json!({ "name": "Phones", "parent_id": root })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, body) = app.call("GET", "/api/v1/categories", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let roots = body["data"].as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["children"][0]["name"], "Phones");

    // grandchildren are outside the one-level subtree
    let (status, body) = app
        .call(
            "GET",
            &format!("/api/v1/categories/{root}/products?page=1&limit=10"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 2);

    let (_, body) = app
        .call(
            "GET",
            &format!("/api/v1/categories/{root}/average-price"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(body["data"]["average_price"], 15.0);

    let (status, _) = app
        .call("GET", "/api/v1/categories/999/average-price", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call("DELETE", &format!("/api/v1/categories/{phones}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let empty = app.create_category(&token, "Empty", None).await;
    let (status, _) = app
        .call("DELETE", &format!("/api/v1/categories/{empty}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_login_redirects_with_state_cookie() {
    let app = TestApp::new().await;
    let req = Request::builder()
        .uri("/auth/login")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = app.send(req).await;

    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("oauthstate="));
    assert!(cookie.contains("HttpOnly"));

    let state = cookie
        .trim_start_matches("oauthstate=")
        .split(';')
        .next()
        .unwrap();
    let location = headers.get(LOCATION).unwrap().to_str().unwrap();
    assert!(location.ends_with(&format!("state={state}")));
}

fn callback(query: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(format!("/auth/callback?{query}"));
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_callback_rejects_state_mismatch() {
    let app = TestApp::new().await;

    let (status, _, body) = app
        .send(callback("state=abc&code=good-code", Some("oauthstate=xyz")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1008);

    let (status, _, _) = app.send(callback("state=abc&code=good-code", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = app
        .send(callback("state=abc", Some("oauthstate=abc")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1009);
}

#[tokio::test]
async fn test_callback_failed_exchange_is_server_error() {
    let app = TestApp::new().await;
    let (status, _, _) = app
        .send(callback("state=abc&code=bad-code", Some("oauthstate=abc")))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_callback_logs_customer_in() {
    let app = TestApp::new().await;

    let (status, _, body) = app
        .send(callback("state=abc&code=good-code", Some("oauthstate=abc")))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["customer"]["first_name"], "Jane");
    assert_eq!(body["data"]["customer"]["last_name"], "Wanjiru Doe");
    assert!(body["data"]["customer"].get("oauth_id").is_none());
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, body) = app.call("GET", "/api/v1/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "jane@example.com");

    // second login finds the same customer
    let (_, _, again) = app
        .send(callback("state=def&code=good-code", Some("oauthstate=def")))
        .await;
    assert_eq!(again["data"]["customer"]["id"], body["data"]["id"]);

    let (status, body) = app
        .call(
            "PUT",
            "/api/v1/profile",
            Some(&token),
            Some(json!({ "phone": "+254711000000" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone"], "+254711000000");
    assert_eq!(body["data"]["first_name"], "Jane");
}
