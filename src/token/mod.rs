//! Access token minting.
//!
//! Produces the signed JWT the Twilio Voice SDK expects: HS256 signed with an
//! API key secret, `cty: twilio-fpa;v=1`, and a single voice grant.

mod claims;

pub use claims::{Claims, Grants, IncomingVoiceGrant, OutgoingVoiceGrant, VoiceGrant};

use crate::secrets::TwilioCredentials;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

pub const TOKEN_CONTENT_TYPE: &str = "twilio-fpa;v=1";

/// Twilio refuses access tokens that live longer than a day.
pub const MAX_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("identity {0:?} must be non-empty and contain only letters, digits and underscores")]
    InvalidIdentity(String),
    #[error("token ttl must be between 1 and 86400 seconds, got {0}")]
    InvalidTtl(i64),
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// How the token bearer's identity is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStrategy {
    /// Always the same identity, e.g. `user_123`.
    Fixed(String),
    /// `{prefix}_{unix millis}`, unique per mint.
    TimeDerived { prefix: String },
}

impl IdentityStrategy {
    pub fn resolve(&self, now: DateTime<Utc>) -> String {
        match self {
            IdentityStrategy::Fixed(identity) => identity.clone(),
            IdentityStrategy::TimeDerived { prefix } => {
                format!("{}_{}", prefix, now.timestamp_millis())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub credentials: TwilioCredentials,
    pub identity: IdentityStrategy,
    pub ttl: Duration,
    pub incoming_allow: bool,
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub jwt: String,
    pub identity: String,
    pub expires_at: DateTime<Utc>,
}

pub fn validate_identity(identity: &str) -> Result<(), TokenError> {
    let valid = !identity.is_empty()
        && identity
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(TokenError::InvalidIdentity(identity.to_owned()))
    }
}

/// Mint an access token valid from `now` for `config.ttl`.
pub fn mint(config: &TokenConfig, now: DateTime<Utc>) -> Result<AccessToken, TokenError> {
    let ttl = config.ttl.num_seconds();
    if ttl <= 0 || ttl > MAX_TTL_SECONDS {
        return Err(TokenError::InvalidTtl(ttl));
    }

    let identity = config.identity.resolve(now);
    validate_identity(&identity)?;

    let credentials = &config.credentials;
    let iat = now.timestamp();
    let exp = iat + ttl;

    // Build grants
    let grants = Grants {
        identity: identity.clone(),
        voice: VoiceGrant {
            incoming: IncomingVoiceGrant {
                allow: config.incoming_allow,
            },
            outgoing: OutgoingVoiceGrant {
                application_sid: credentials.app_sid.clone(),
            },
        },
    };

    // Build claims
    let claims = Claims {
        jti: format!("{}-{}", credentials.api_key_sid, iat),
        iss: credentials.api_key_sid.clone(),
        sub: credentials.account_sid.clone(),
        iat,
        nbf: iat,
        exp,
        grants,
    };

    let header = Header {
        cty: Some(TOKEN_CONTENT_TYPE.to_string()),
        ..Default::default()
    };

    let jwt = encode(
        &header,
        &claims,
        &EncodingKey::from_secret(credentials.api_key_secret.as_bytes()),
    )?;

    log::debug!("Minted access token for {identity} expiring at {exp}");

    Ok(AccessToken {
        jwt,
        identity,
        expires_at: Utc.timestamp_opt(exp, 0).single().unwrap_or(now + config.ttl),
    })
}

/// Verify a token's signature and expiry and return its claims.
pub fn inspect(jwt: &str, api_key_secret: &str) -> Result<Claims, TokenError> {
    let data = decode::<Claims>(
        jwt,
        &DecodingKey::from_secret(api_key_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}
