//! Credentials loaded from the environment.
//!
//! Nothing here has a default: every required value must be supplied, and
//! values that look like template placeholders are rejected so a
//! misconfigured deployment fails at startup instead of minting tokens Twilio
//! will refuse.

use std::env::var;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SecretsError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} still holds a placeholder value")]
    Placeholder(&'static str),
    #[error("{name} must be a Twilio SID starting with {prefix} followed by 32 hex digits")]
    MalformedSid {
        name: &'static str,
        prefix: &'static str,
    },
}

/// Markers of template values, matched case-sensitively.
const PLACEHOLDER_MARKERS: [&str; 4] = ["REPLACE", "PASTE_", "YOUR_", "CHANGE_ME"];

fn is_placeholder(value: &str) -> bool {
    let masked = value.len() >= 3 && value.chars().all(|c| c == 'x' || c == 'X');
    masked || PLACEHOLDER_MARKERS.iter().any(|marker| value.contains(marker))
}

/// Account credentials needed to mint access tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub api_key_sid: String,
    pub api_key_secret: String,
    pub app_sid: String,
}

impl TwilioCredentials {
    pub fn from_env() -> Result<Self, SecretsError> {
        Self::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SecretsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            account_sid: sid(&lookup, "TWILIO_ACCOUNT_SID", "AC")?,
            api_key_sid: sid(&lookup, "TWILIO_API_KEY", "SK")?,
            api_key_secret: required(&lookup, "TWILIO_API_SECRET")?,
            app_sid: sid(&lookup, "TWILIO_APP_SID", "AP")?,
        })
    }
}

/// Everything the server needs at runtime.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub twilio: TwilioCredentials,
    /// Bearer token the browser dialer presents to obtain an access token.
    pub webcall_token: String,
    /// Enables webhook signature verification when set.
    pub twilio_auth_token: Option<String>,
    /// Base URL Twilio uses to reach this service, e.g. `https://calls.example.com`.
    pub public_url: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Result<Self, SecretsError> {
        Self::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SecretsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            twilio: TwilioCredentials::from_lookup(&lookup)?,
            webcall_token: required(&lookup, "WEBCALL_TOKEN")?,
            twilio_auth_token: optional(&lookup, "TWILIO_AUTH_TOKEN")?,
            public_url: optional(&lookup, "PUBLIC_URL")?
                .map(|url| url.trim_end_matches('/').to_owned()),
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, SecretsError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name)?.ok_or(SecretsError::Missing(name))
}

fn optional<F>(lookup: &F, name: &'static str) -> Result<Option<String>, SecretsError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(name) {
        Some(v) if !v.trim().is_empty() => v.trim().to_owned(),
        _ => return Ok(None),
    };

    if is_placeholder(&value) {
        return Err(SecretsError::Placeholder(name));
    }

    Ok(Some(value))
}

fn sid<F>(lookup: &F, name: &'static str, prefix: &'static str) -> Result<String, SecretsError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = required(lookup, name)?;
    let well_formed = value.len() == 34
        && value.starts_with(prefix)
        && value[2..].chars().all(|c| c.is_ascii_hexdigit());

    if !well_formed {
        return Err(SecretsError::MalformedSid { name, prefix });
    }

    Ok(value)
}
