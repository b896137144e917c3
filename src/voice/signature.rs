//! `X-Twilio-Signature` verification for webhook requests.
//!
//! Twilio signs every webhook with HMAC-SHA1 keyed by the account auth token
//! over the full request URL followed by each POST parameter's name and value,
//! sorted by name.

use crate::secrets::Secrets;
use axum::{
    body::{to_bytes, Body},
    extract::{OriginalUri, Request},
    http::{header::HOST, request::Parts, Method, StatusCode},
    middleware::Next,
    response::Response,
    Extension,
};
use base64::prelude::*;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::BTreeMap;

pub const SIGNATURE_HEADER: &str = "x-twilio-signature";

/// Largest webhook body that is read; Twilio's own payloads are a few KiB.
pub(crate) const MAX_BODY_BYTES: usize = 64 * 1024;

pub(crate) fn args_from_urlencoded(enc: &[u8]) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(enc).into_owned().collect()
}

/// Every `key=value` pair of a form body, repeated keys included.
pub fn pairs_from_urlencoded(enc: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(enc).into_owned().collect()
}

fn digest(auth_token: &str, url: &str, params: &[(String, String)]) -> Option<Hmac<Sha1>> {
    let mut hasher = Hmac::<Sha1>::new_from_slice(auth_token.as_bytes()).ok()?;
    hasher.update(url.as_bytes());

    // Stable sort: values of a repeated key keep their request order.
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    for (key, value) in sorted {
        hasher.update(key.as_bytes());
        hasher.update(value.as_bytes());
    }
    Some(hasher)
}

/// Compute the signature Twilio would send for this request.
pub fn sign(auth_token: &str, url: &str, params: &[(String, String)]) -> Option<String> {
    let hasher = digest(auth_token, url, params)?;
    Some(BASE64_STANDARD.encode(hasher.finalize().into_bytes()))
}

pub fn is_valid(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
    signature: &str,
) -> bool {
    let Ok(expected) = BASE64_STANDARD.decode(signature.trim()) else {
        return false;
    };
    match digest(auth_token, url, params) {
        Some(hasher) => hasher.verify_slice(&expected).is_ok(),
        None => false,
    }
}

/// The URL Twilio signed: the configured public base URL, or `https://` plus
/// the `Host` header, followed by the original path and query.
fn effective_url(parts: &Parts, public_url: Option<&str>) -> Option<String> {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    match public_url {
        Some(base) => Some(format!("{}{}", base, path)),
        None => {
            let host = parts.headers.get(HOST)?.to_str().ok()?;
            Some(format!("https://{}{}", host, path))
        }
    }
}

/// Middleware rejecting webhooks without a valid signature. A no-op unless
/// `TWILIO_AUTH_TOKEN` is configured.
pub async fn verify(
    secrets: Extension<Secrets>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(auth_token) = secrets.twilio_auth_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let (parts, body) = request.into_parts();

    let signature = match parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(signature) => signature.to_owned(),
        None => {
            log::warn!("Rejecting webhook to {} without signature", parts.uri);
            return Err(StatusCode::FORBIDDEN);
        }
    };

    let url = effective_url(&parts, secrets.public_url.as_deref()).ok_or_else(|| {
        log::warn!("Cannot determine the signed URL for {}", parts.uri);
        StatusCode::BAD_REQUEST
    })?;

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let params = if parts.method == Method::POST {
        pairs_from_urlencoded(&body)
    } else {
        Vec::new()
    };

    if !is_valid(auth_token, &url, &params, &signature) {
        log::warn!("Rejecting webhook to {url} with invalid signature");
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(Request::from_parts(parts, Body::from(body))).await)
}
