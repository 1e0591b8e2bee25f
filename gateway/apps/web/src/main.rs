//! Web Gateway Entry Point
//!
//! Front-end server: every inbound request passes through the session
//! relay before reaching a page handler, so handlers only ever see
//! requests the routing decision let through.

use axum::{Extension, Json, Router, middleware, routing::get};
use session::{CurrentUser, HttpAuthBackend, RelayState, SessionConfig, session_relay};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "web=info,session=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // There is no link between the backend and the browser when requests
    // arrive here; cookies are forwarded to the backend per request, so
    // the relay cannot start without knowing where the backend lives
    let backend_url = env::var("BACKEND_URL").expect("BACKEND_URL must be set in environment");

    let config = Arc::new(SessionConfig::with_backend(backend_url));
    let backend = Arc::new(HttpAuthBackend::new(&config)?);

    let state = RelayState { backend, config };

    // Build router
    let app = Router::new()
        .route("/", get(root))
        .route("/login", get(login_page))
        .route("/signup", get(signup_page))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/{*rest}", get(dashboard))
        .layer(middleware::from_fn_with_state(
            state,
            session_relay::<HttpAuthBackend>,
        ))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Never rendered: the relay always redirects the root path
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "page": "root" }))
}

async fn login_page() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "page": "login" }))
}

async fn signup_page() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "page": "signup" }))
}

/// Authenticated landing area; the relay guarantees an identity here
async fn dashboard(user: Option<Extension<CurrentUser>>) -> Json<serde_json::Value> {
    let username = user.map(|Extension(CurrentUser(user))| user.username);
    Json(serde_json::json!({ "page": "dashboard", "user": username }))
}
