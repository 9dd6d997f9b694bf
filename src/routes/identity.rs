//! Extraction of the caller's voter identity from request headers.
//!
//! The external auth layer terminates sessions upstream and forwards the
//! established user id in the `x-user-id` header; anonymous browsers are
//! tracked by the long-lived `anon_id` cookie.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use rand::Rng;
use uuid::Uuid;

use crate::{dao::models::CallerIdentity, error::AppError};

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Cookie carrying the anonymous pseudo-identity.
pub const ANON_COOKIE: &str = "anon_id";

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.headers.get(USER_ID_HEADER) {
            Some(value) => {
                let raw = value.to_str().map_err(|_| {
                    AppError::BadRequest(format!("invalid `{USER_ID_HEADER}` header"))
                })?;
                let parsed = Uuid::parse_str(raw).map_err(|_| {
                    AppError::BadRequest(format!("invalid `{USER_ID_HEADER}` header"))
                })?;
                Some(parsed)
            }
            None => None,
        };

        let anon_id = parts
            .headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|cookies| cookie_value(cookies, ANON_COOKIE));

        Ok(CallerIdentity { user, anon_id })
    }
}

/// Mint a fresh pseudo-identity for a browser presenting no identity at all.
pub fn mint_anon_id() -> String {
    format!("{:032x}", rand::rng().random::<u128>())
}

/// `Set-Cookie` value installing the pseudo-identity for `ttl_days`.
pub fn anon_cookie(anon_id: &str, ttl_days: u64) -> String {
    let max_age = ttl_days * 24 * 60 * 60;
    format!("{ANON_COOKIE}={anon_id}; Path=/; Max-Age={max_age}; SameSite=Lax")
}

fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}
