use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{admin, auth, plans};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api",
              Router::new()
                  .merge(auth::router())
                  .merge(plans::router())
                  .merge(admin::router())
        )
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, storage::UserStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestApp {
        _dir: tempfile::TempDir,
        state: AppState,
    }

    impl TestApp {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let state = AppState::fake(dir.path().join("users.json"));
            Self { _dir: dir, state }
        }

        fn with_config(mut self, edit: impl FnOnce(&mut AppConfig)) -> Self {
            let mut config = (*self.state.config).clone();
            edit(&mut config);
            self.state.config = Arc::new(config);
            self
        }

        fn without_generator(mut self) -> Self {
            self.state.generator = None;
            self
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            headers: &[(&str, &str)],
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            for (k, v) in headers {
                req = req.header(*k, *v);
            }
            let req = match body {
                Some(b) => req
                    .header("content-type", "application/json")
                    .body(Body::from(b.to_string()))
                    .unwrap(),
                None => req.body(Body::empty()).unwrap(),
            };

            let res = build_app(self.state.clone()).oneshot(req).await.unwrap();
            let status = res.status();
            let bytes = axum::body::to_bytes(res.into_body(), 1_048_576).await.unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }

        async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send("POST", uri, &[], Some(body)).await
        }

        async fn admin_users(&self, secret: &str) -> (StatusCode, Value) {
            self.send("GET", "/api/admin/users", &[("x-admin-secret", secret)], None)
                .await
        }

        async fn set_status(&self, user_id: &str, status: &str) -> (StatusCode, Value) {
            self.send(
                "POST",
                "/api/admin/update-user-status",
                &[("x-admin-secret", "admin-secret")],
                Some(json!({ "userId": user_id, "status": status })),
            )
            .await
        }

        async fn request_plan(&self, token: &str, body: Value) -> (StatusCode, Value) {
            self.send("POST", "/api/plan", &[("x-session-token", token)], Some(body))
                .await
        }
    }

    fn ana() -> Value {
        json!({ "name": "Ana", "email": "a@x.com", "password": "secret1", "plan": "pro" })
    }

    fn ana_login() -> Value {
        json!({ "email": "a@x.com", "password": "secret1" })
    }

    async fn registered_id(app: &TestApp) -> String {
        let (_, body) = app.admin_users("admin-secret").await;
        body["users"][0]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = TestApp::new();
        let res = build_app(app.state.clone())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn full_approval_flow() {
        let app = TestApp::new();

        let (status, body) = app.post("/api/auth/register", ana()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert!(body["message"].as_str().unwrap().contains("approved"));

        let (status, body) = app.post("/api/auth/login", ana_login()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["status"], "pending");

        let (_, users) = app.admin_users("admin-secret").await;
        assert_eq!(users["users"][0]["status"], "pending");
        assert!(users["users"][0]["createdAt"].is_string());

        let id = registered_id(&app).await;
        let (status, body) = app.set_status(&id, "approved").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));

        let (status, body) = app.post("/api/auth/login", ana_login()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ana");
        assert_eq!(body["email"], "a@x.com");
        assert_eq!(body["plan"], "pro");
        assert_eq!(body["status"], "approved");
        let token = body["token"].as_str().unwrap().to_string();
        assert_eq!(token.len(), 32);

        let (status, body) = app
            .request_plan(&token, json!({ "segmento": "loja de roupas" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["plan"], "Plano de 30 dias para loja de roupas");

        let (status, body) = app
            .send("GET", "/api/auth/me", &[("x-session-token", token.as_str())], None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ana");

        // revoking approval locks the existing session out
        app.set_status(&id, "rejected").await;
        let (status, body) = app.request_plan(&token, json!({})).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["status"], "rejected");
    }

    #[tokio::test]
    async fn register_rejects_bad_input() {
        let app = TestApp::new();

        let (status, _) = app
            .post("/api/auth/register", json!({ "name": "Ana", "email": "a@x.com" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut short = ana();
        short["password"] = json!("12345");
        let (status, body) = app.post("/api/auth/register", short).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = app.post("/api/auth/register", ana()).await;
        assert_eq!(status, StatusCode::OK);

        let mut upper = ana();
        upper["email"] = json!("A@X.COM");
        let (status, _) = app.post("/api/auth/register", upper).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let app = TestApp::new();
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header("content-type", "application/json")
            .body(Body::from("{ nope"))
            .unwrap();
        let res = build_app(app.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_failures() {
        let app = TestApp::new();
        app.post("/api/auth/register", ana()).await;

        let (status, _) = app.post("/api/auth/login", json!({ "email": "a@x.com" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .post("/api/auth/login", json!({ "email": "a@x.com", "password": "nope123" }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.get("status").is_none());
    }

    #[tokio::test]
    async fn plan_requires_a_valid_session() {
        let app = TestApp::new();

        let (status, _) = app.send("POST", "/api/plan", &[], Some(json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.request_plan("not-a-token", json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn plan_without_ai_credential_is_a_server_error() {
        let app = TestApp::new().without_generator();
        app.post("/api/auth/register", ana()).await;
        let id = registered_id(&app).await;
        app.set_status(&id, "approved").await;
        let (_, body) = app.post("/api/auth/login", ana_login()).await;
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = app.request_plan(&token, json!({})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn admin_endpoints_require_the_exact_secret() {
        let app = TestApp::new();
        app.post("/api/auth/register", ana()).await;

        for secret in ["", "wrong", "admin-secret ", "ADMIN-SECRET"] {
            let (status, _) = app.admin_users(secret).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "secret {secret:?}");

            let (status, _) = app
                .send(
                    "POST",
                    "/api/admin/update-user-status",
                    &[("x-admin-secret", secret)],
                    Some(json!({ "userId": "x", "status": "approved" })),
                )
                .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "secret {secret:?}");
        }

        let (status, _) = app.send("GET", "/api/admin/users", &[], None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app.admin_users("admin-secret").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"].as_array().unwrap().len(), 1);
        assert!(body["users"][0].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn admin_endpoints_fail_when_unconfigured() {
        let app = TestApp::new().with_config(|c| c.admin_password = None);

        let (status, _) = app.admin_users("admin-secret").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = app.set_status("x", "approved").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = app
            .post("/api/admin/login", json!({ "password": "admin-secret" }))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn admin_login_checks_the_password() {
        let app = TestApp::new();

        let (status, body) = app
            .post("/api/admin/login", json!({ "password": "admin-secret" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));

        let (status, _) = app.post("/api/admin/login", json!({ "password": "guess" })).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.post("/api/admin/login", json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn update_status_errors_and_idempotence() {
        let app = TestApp::new();
        app.post("/api/auth/register", ana()).await;
        let id = registered_id(&app).await;

        let (status, _) = app
            .send(
                "POST",
                "/api/admin/update-user-status",
                &[("x-admin-secret", "admin-secret")],
                Some(json!({ "userId": id })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.set_status("0000000000000000", "approved").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        for _ in 0..2 {
            let (status, _) = app.set_status(&id, "approved").await;
            assert_eq!(status, StatusCode::OK);
        }
        let (_, body) = app.admin_users("admin-secret").await;
        assert_eq!(body["users"][0]["status"], "approved");
    }

    #[tokio::test]
    async fn state_survives_a_fresh_store_handle() {
        let app = TestApp::new();
        app.post("/api/auth/register", ana()).await;

        let reopened = UserStore::new(app.state.users.path().to_path_buf());
        let users = reopened.load().await.users;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "a@x.com");
    }
}
