use super::check::check_token;
use crate::{
    secrets::Secrets,
    token::{mint, IdentityStrategy, TokenConfig, TokenError},
    CONFIG,
};
use axum::{http::StatusCode, Extension, Json};
use axum_auth::AuthBearer;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    pub identity: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub identity: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn generate_jwt(
    secrets: Extension<Secrets>,
    AuthBearer(token): AuthBearer,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, StatusCode> {
    // Check whether the caller should be allowed to generate a token
    if !check_token(&token, &secrets) {
        log::warn!("Rejected token request with an unknown bearer token");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let identity = match request.identity {
        Some(identity) => IdentityStrategy::Fixed(identity),
        None => IdentityStrategy::TimeDerived {
            prefix: CONFIG.settings.identity_prefix.to_owned(),
        },
    };

    let config = TokenConfig {
        credentials: secrets.twilio.clone(),
        identity,
        ttl: Duration::seconds(CONFIG.settings.twilio_token_expiry),
        incoming_allow: true,
    };

    match mint(&config, Utc::now()) {
        Ok(access) => {
            log::info!("Issued access token for {}", access.identity);
            Ok(Json(TokenResponse {
                token: access.jwt,
                identity: access.identity,
                expires_at: access.expires_at,
            }))
        }
        Err(TokenError::InvalidIdentity(identity)) => {
            log::debug!("Refusing to mint a token for identity {identity:?}");
            Err(StatusCode::BAD_REQUEST)
        }
        Err(e) => {
            log::error!("Error encoding Twilio token: {e:?}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
