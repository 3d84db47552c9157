use axum::{
    extract::{FromRef, State},
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{Ack, LoginRequest, LoginResponse, PublicUser, SignupRequest},
        extractors::SESSION_COOKIE,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    config::AppConfig,
    error::ApiError,
    state::AppState,
    store::{NewUser, Role, UserStore as _},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let name = payload.name.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("invalid email"));
    }
    if payload.password.len() < 6 {
        warn!("password too short");
        return Err(ApiError::validation(
            "password must be at least 6 characters",
        ));
    }
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }

    if state.users.user_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("email already in use"));
    }

    let hash = hash_password(&payload.password)?;
    let user = state
        .users
        .insert_user(NewUser {
            name,
            email: payload.email,
            password_hash: hash,
            role: Role::User,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = state
        .users
        .user_by_email(&payload.email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown or inactive email");
            ApiError::authentication("invalid credentials")
        })?;

    let ok = verify_password(&payload.password, &user.password_hash)?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::authentication("invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(&user)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    let mut res = Json(LoginResponse {
        access_token: access_token.clone(),
        user: user.into(),
    })
    .into_response();
    attach_session_cookie(&mut res, &state.config, &access_token)?;
    Ok(res)
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut res = Json(Ack {
        message: "logged out".into(),
    })
    .into_response();
    clear_session_cookie(&mut res, &state.config)?;
    Ok(res)
}

/// Cookie lifetime is the token TTL, so the cookie never outlives the
/// session it carries.
fn attach_session_cookie(
    res: &mut Response,
    config: &AppConfig,
    token: &str,
) -> Result<(), ApiError> {
    let session_cookie = Cookie::build((SESSION_COOKIE, token.to_string()))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::minutes(config.jwt.ttl_minutes))
        .path("/")
        .build()
        .to_string();
    res.headers_mut().append(
        SET_COOKIE,
        session_cookie
            .parse()
            .map_err(|e| anyhow::anyhow!("cookie header: {e}"))?,
    );
    Ok(())
}

fn clear_session_cookie(res: &mut Response, config: &AppConfig) -> Result<(), ApiError> {
    let session_cookie = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(0))
        .path("/")
        .build()
        .to_string();
    res.headers_mut().append(
        SET_COOKIE,
        session_cookie
            .parse()
            .map_err(|e| anyhow::anyhow!("cookie header: {e}"))?,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plausible_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("user.name+tag@sub.example.org"));
    }

    #[test]
    fn email_validation_rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@b"));
    }
}
