use crate::CONFIG;
use axum::{routing::post, Router};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfig, GovernorLayer};

mod check;
mod token;

pub use token::{TokenRequest, TokenResponse};

/// Token endpoint for the browser dialer, rate limited per peer address.
pub fn router() -> Router {
    routes().layer(GovernorLayer {
        config: Arc::new(GovernorConfig::default()),
    })
}

fn routes() -> Router {
    Router::new().route(CONFIG.settings.token_route, post(token::generate_jwt))
}
