//! Tests for the refresh-aware API client
//!
//! Client-level tests drive a real axum server bound to an ephemeral port,
//! so the whole pipeline (cookie jar, snapshot, interception, replay) runs
//! over actual HTTP.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::client::{ApiClient, LoginRedirect, NoRedirect};
use crate::form::FormOutcome;
use platform::contract::{LoginRequest, SignupRequest};
use platform::routes;

/// Scripted backend state shared with the test body
struct TestBackend {
    authorized: AtomicBool,
    refresh_allowed: AtomicBool,
    refresh_calls: AtomicUsize,
    refresh_delay: Duration,
}

impl TestBackend {
    fn new(authorized: bool, refresh_allowed: bool) -> Arc<Self> {
        Self::with_delay(authorized, refresh_allowed, Duration::ZERO)
    }

    fn with_delay(authorized: bool, refresh_allowed: bool, refresh_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            authorized: AtomicBool::new(authorized),
            refresh_allowed: AtomicBool::new(refresh_allowed),
            refresh_calls: AtomicUsize::new(0),
            refresh_delay,
        })
    }

    fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

fn invalid_token_json() -> serde_json::Value {
    serde_json::json!({
        "detail": { "error_code": "invalid_token", "msg": "Could not validate token" }
    })
}

async fn data(State(backend): State<Arc<TestBackend>>) -> Response {
    if backend.authorized.load(Ordering::SeqCst) {
        Json(serde_json::json!({ "ok": true })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(invalid_token_json())).into_response()
    }
}

async fn echo(
    State(backend): State<Arc<TestBackend>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if backend.authorized.load(Ordering::SeqCst) {
        let note = headers
            .get("x-request-note")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        ([("x-request-note", note)], body).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(invalid_token_json())).into_response()
    }
}

async fn plain() -> impl IntoResponse {
    (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})))
}

async fn me(State(backend): State<Arc<TestBackend>>) -> Response {
    if backend.authorized.load(Ordering::SeqCst) {
        Json(serde_json::json!({
            "id": 7, "username": "ada", "email": "ada@example.com"
        }))
        .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(invalid_token_json())).into_response()
    }
}

async fn refresh(State(backend): State<Arc<TestBackend>>) -> Response {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(backend.refresh_delay).await;

    if backend.refresh_allowed.load(Ordering::SeqCst) {
        backend.authorized.store(true, Ordering::SeqCst);
        (
            StatusCode::OK,
            [(header::SET_COOKIE, "access_token=fresh; HttpOnly; Path=/")],
            Json(serde_json::json!({ "message": "Token refreshed successfully" })),
        )
            .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(invalid_token_json())).into_response()
    }
}

async fn login(Json(credentials): Json<LoginRequest>) -> Response {
    match credentials.password.as_str() {
        "expired" => (StatusCode::UNAUTHORIZED, Json(invalid_token_json())).into_response(),
        "wrong" => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "detail": { "error_code": "invalid_credentials", "msg": "Invalid username or password" }
            })),
        )
            .into_response(),
        short if short.len() < 8 => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "detail": [
                    { "loc": ["body", "password"], "msg": "ensure this value has at least 8 characters" }
                ]
            })),
        )
            .into_response(),
        _ => Json(serde_json::json!({ "message": "Login successful" })).into_response(),
    }
}

async fn signup(Json(details): Json<SignupRequest>) -> Response {
    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": 1, "username": details.username, "email": details.email
        })),
    )
        .into_response()
}

async fn start_backend(backend: Arc<TestBackend>) -> String {
    let app = Router::new()
        .route("/api/data", get(data))
        .route("/api/echo", post(echo))
        .route("/api/plain", get(plain))
        .route(routes::AUTH_ME, get(me))
        .route(routes::AUTH_TOKEN_REFRESH, post(refresh))
        .route(routes::AUTH_LOGIN, post(login))
        .route(routes::AUTH_SIGNUP, post(signup))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// Records whether the redirect side effect fired
#[derive(Default)]
struct RecordingRedirect {
    fired: AtomicBool,
}

impl RecordingRedirect {
    fn fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for RecordingRedirect {
    fn redirect_to_login(&self) {
        self.fired.store(true, Ordering::SeqCst);
    }
}

mod gate_tests {
    use crate::refresh::RefreshGate;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_attempt() {
        let gate = RefreshGate::new();
        let attempts = Arc::new(AtomicUsize::new(0));

        let attempt = |outcome: bool| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                outcome
            }
        };

        let (first, second) = tokio::join!(gate.run(attempt(true)), gate.run(attempt(false)));

        // Only the installed future ran; both callers saw its outcome
        assert!(first);
        assert!(second);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gate_is_cleared_after_settling() {
        let gate = RefreshGate::new();
        let attempts = Arc::new(AtomicUsize::new(0));

        for expected in 1..=2 {
            let counter = attempts.clone();
            let renewed = gate
                .run(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    false
                })
                .await;
            assert!(!renewed);
            assert!(!gate.is_refreshing());
            assert_eq!(attempts.load(Ordering::SeqCst), expected);
        }
    }
}

mod client_tests {
    use super::*;
    use reqwest::Method;

    fn client(base_url: &str, redirect: Arc<RecordingRedirect>) -> ApiClient {
        ApiClient::new(base_url, redirect).unwrap()
    }

    fn quiet_client(base_url: &str) -> ApiClient {
        ApiClient::new(base_url, Arc::new(NoRedirect)).unwrap()
    }

    #[tokio::test]
    async fn test_transparent_refresh_and_replay() {
        let backend = TestBackend::new(false, true);
        let base_url = start_backend(backend.clone()).await;
        let api = quiet_client(&base_url);

        let request = api.request(Method::GET, "/api/data").build().unwrap();
        let response = api.execute(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.refresh_calls(), 1);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let backend = TestBackend::with_delay(false, true, Duration::from_millis(50));
        let base_url = start_backend(backend.clone()).await;
        let api = quiet_client(&base_url);

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let api = api.clone();
            tasks.push(tokio::spawn(async move {
                let request = api.request(Method::GET, "/api/data").build().unwrap();
                api.execute(request).await.unwrap().status()
            }));
        }

        for task in tasks {
            assert_eq!(task.await.unwrap(), StatusCode::OK);
        }
        assert_eq!(backend.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_unrelated_401_passes_through_unchanged() {
        let backend = TestBackend::new(false, true);
        let base_url = start_backend(backend.clone()).await;
        let api = quiet_client(&base_url);

        let request = api.request(Method::GET, "/api/plain").build().unwrap();
        let response = api.execute(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(backend.refresh_calls(), 0);
        assert_eq!(response.bytes().await.unwrap().as_ref(), b"{}");
    }

    #[tokio::test]
    async fn test_refresh_endpoint_401_is_not_intercepted() {
        let backend = TestBackend::new(false, false);
        let base_url = start_backend(backend.clone()).await;
        let api = quiet_client(&base_url);

        let request = api
            .request(Method::POST, routes::AUTH_TOKEN_REFRESH)
            .build()
            .unwrap();
        let response = api.execute(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        // Only the explicit call reached the endpoint; no recursion
        assert_eq!(backend.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_redirects_and_returns_original() {
        let backend = TestBackend::new(false, false);
        let base_url = start_backend(backend.clone()).await;
        let redirect = Arc::new(RecordingRedirect::default());
        let api = client(&base_url, redirect.clone());

        let request = api.request(Method::GET, "/api/data").build().unwrap();
        let response = api.execute(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(redirect.fired());
        assert_eq!(backend.refresh_calls(), 1);

        // The caller still sees the original error body
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, invalid_token_json());
    }

    #[tokio::test]
    async fn test_gate_resets_between_cycles() {
        let backend = TestBackend::new(false, false);
        let base_url = start_backend(backend.clone()).await;
        let api = quiet_client(&base_url);

        let request = api.request(Method::GET, "/api/data").build().unwrap();
        let response = api.execute(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(backend.refresh_calls(), 1);

        // A later 401 starts a brand-new attempt, which now succeeds
        backend.refresh_allowed.store(true, Ordering::SeqCst);
        let request = api.request(Method::GET, "/api/data").build().unwrap();
        let response = api.execute(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.refresh_calls(), 2);
    }

    #[tokio::test]
    async fn test_replay_preserves_method_headers_and_body() {
        let backend = TestBackend::new(false, true);
        let base_url = start_backend(backend.clone()).await;
        let api = quiet_client(&base_url);

        let request = api
            .request(Method::POST, "/api/echo")
            .header("x-request-note", "alpha")
            .body("hello world")
            .build()
            .unwrap();
        let response = api.execute(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.refresh_calls(), 1);
        assert_eq!(
            response.headers().get("x-request-note").unwrap(),
            "alpha"
        );
        assert_eq!(response.text().await.unwrap(), "hello world");
    }

    #[tokio::test]
    async fn test_entry_endpoints_skip_the_refresh_protocol() {
        let backend = TestBackend::new(false, true);
        let base_url = start_backend(backend.clone()).await;
        let api = quiet_client(&base_url);

        let credentials = LoginRequest {
            username: "ada".to_string(),
            password: "expired".to_string(),
        };
        let outcome = api.login(&credentials).await;

        assert_eq!(
            outcome,
            FormOutcome::Rejected("Could not validate token".to_string())
        );
        assert_eq!(backend.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_current_user_refreshes_transparently() {
        let backend = TestBackend::new(false, true);
        let base_url = start_backend(backend.clone()).await;
        let api = quiet_client(&base_url);

        let user = api.current_user().await.unwrap().expect("user after refresh");
        assert_eq!(user.username, "ada");
        assert_eq!(backend.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_current_user_none_on_terminal_failure() {
        let backend = TestBackend::new(false, false);
        let base_url = start_backend(backend.clone()).await;
        let redirect = Arc::new(RecordingRedirect::default());
        let api = client(&base_url, redirect.clone());

        assert_eq!(api.current_user().await.unwrap(), None);
        assert!(redirect.fired());
    }

    #[tokio::test]
    async fn test_login_form_outcomes() {
        let backend = TestBackend::new(true, true);
        let base_url = start_backend(backend.clone()).await;
        let api = quiet_client(&base_url);

        let ok = api
            .login(&LoginRequest {
                username: "ada".to_string(),
                password: "correct-horse".to_string(),
            })
            .await;
        assert!(ok.is_accepted());
        match ok {
            FormOutcome::Accepted(auth) => assert_eq!(auth.message, "Login successful"),
            other => panic!("expected Accepted, got {other:?}"),
        }

        let invalid = api
            .login(&LoginRequest {
                username: "ada".to_string(),
                password: "short".to_string(),
            })
            .await;
        match invalid {
            FormOutcome::Invalid(errors) => {
                assert_eq!(
                    errors.get("password").map(String::as_str),
                    Some("ensure this value has at least 8 characters")
                );
            }
            other => panic!("expected Invalid, got {other:?}"),
        }

        let rejected = api
            .login(&LoginRequest {
                username: "ada".to_string(),
                password: "wrong".to_string(),
            })
            .await;
        assert_eq!(
            rejected,
            FormOutcome::Rejected("Invalid username or password".to_string())
        );
    }

    #[tokio::test]
    async fn test_signup_accepted() {
        let backend = TestBackend::new(true, true);
        let base_url = start_backend(backend.clone()).await;
        let api = quiet_client(&base_url);

        let outcome = api
            .signup(&SignupRequest {
                username: "grace".to_string(),
                email: "grace@example.com".to_string(),
                password: "long-enough".to_string(),
            })
            .await;

        match outcome {
            FormOutcome::Accepted(user) => {
                assert_eq!(user.username, "grace");
                assert_eq!(user.email, "grace@example.com");
            }
            other => panic!("expected Accepted, got {other:?}"),
        }
    }
}
