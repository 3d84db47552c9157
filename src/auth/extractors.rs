use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use cookie::Cookie;
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::store::Role;

/// Name of the session cookie carrying the signed token.
pub const SESSION_COOKIE: &str = "access_token";

/// Verified identity of the caller, decoded from the session token.
///
/// This extractor is the authentication stage of the request gate: the token
/// comes from the `access_token` cookie or a `Bearer` header, and a missing,
/// invalid or expired token rejects with an authentication error before the
/// handler body runs. Role checks happen separately against the policy table.
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub subject: Uuid,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let token = cookie_token(&parts.headers, SESSION_COOKIE)
            .or_else(|| bearer_from_header(&parts.headers))
            .ok_or_else(|| ApiError::authentication("missing session token"))?;

        let claims = keys.verify(&token).map_err(|_| {
            warn!("invalid or expired session token");
            ApiError::authentication("invalid or expired session")
        })?;

        Ok(AuthIdentity {
            subject: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

fn bearer_from_header(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

fn cookie_token(headers: &axum::http::HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        if let Ok(parsed) = Cookie::parse(part.trim().to_string()) {
            if parsed.name() == name {
                return Some(parsed.value().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    #[test]
    fn reads_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc.def.ghi"),
        );
        assert_eq!(
            cookie_token(&headers, SESSION_COOKIE).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn reads_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_from_header(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_headers_yield_none() {
        let headers = HeaderMap::new();
        assert!(cookie_token(&headers, SESSION_COOKIE).is_none());
        assert!(bearer_from_header(&headers).is_none());
    }
}
