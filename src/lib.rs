//! Twilio voice utilities: a call-routing webhook that answers with TwiML and
//! access-token minting for the browser dialer.

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use routing::RoutingPolicy;
use secrets::Secrets;
use static_toml::static_toml;
use tower_http::cors::{Any, CorsLayer};

static_toml! { pub static CONFIG = include_toml!("Config.toml"); }

pub mod routing;
pub mod secrets;
pub mod token;
pub mod twiml;
pub mod voice;
pub mod webcall;

/// Assemble the full application router.
pub fn app(secrets: Secrets, policy: RoutingPolicy) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health_check", get(health_check))
        .merge(voice::router())
        .merge(webcall::router())
        .fallback(not_found)
        .layer(cors)
        .layer(Extension(secrets))
        .layer(Extension(policy))
}

pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not Found" })),
    )
}
