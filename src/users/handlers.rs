use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{Ack, PublicUser},
        extractors::AuthIdentity,
        password::hash_password,
        policy::{self, Operation},
    },
    error::ApiError,
    state::AppState,
    store::{Role, UserChanges, UserStore as _},
    users::dto::{UpdateProfileRequest, UpdateUserRequest},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", patch(update_profile))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(deactivate_user),
        )
}

fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found("user not found"))
}

fn validated_name(name: Option<String>) -> Result<Option<String>, ApiError> {
    match name {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() {
                return Err(ApiError::validation("name must not be empty"));
            }
            Ok(Some(trimmed))
        }
    }
}

fn validated_password(password: Option<String>) -> Result<Option<String>, ApiError> {
    match password {
        None => Ok(None),
        Some(raw) => {
            if raw.len() < 6 {
                return Err(ApiError::validation(
                    "password must be at least 6 characters",
                ));
            }
            Ok(Some(raw))
        }
    }
}

fn validated_role(role: Option<String>) -> Result<Option<Role>, ApiError> {
    match role {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::validation("role must be user or admin")),
    }
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    policy::authorize(Operation::GetUser, identity.role)?;
    let id = parse_user_id(&id)?;

    let user = state
        .users
        .user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    policy::authorize(Operation::UpdateProfile, identity.role)?;

    let name = validated_name(payload.name)?;
    let password_hash = validated_password(payload.password)?
        .map(|p| hash_password(&p))
        .transpose()?;

    let user = state
        .users
        .update_user(
            identity.subject,
            UserChanges {
                name,
                password_hash,
                role: None,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    policy::authorize(Operation::UpdateUser, identity.role)?;
    let id = parse_user_id(&id)?;

    let name = validated_name(payload.name)?;
    let password_hash = validated_password(payload.password)?
        .map(|p| hash_password(&p))
        .transpose()?;
    let role = validated_role(payload.role)?;

    let user = state
        .users
        .update_user(
            id,
            UserChanges {
                name,
                password_hash,
                role,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    info!(user_id = %user.id, "user updated by admin");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    policy::authorize(Operation::DeactivateUser, identity.role)?;
    let id = parse_user_id(&id)?;

    let removed = state.users.deactivate_user(id).await?;
    if !removed {
        return Err(ApiError::not_found("user not found"));
    }

    info!(user_id = %id, "user deactivated");
    Ok(Json(Ack {
        message: "user deactivated".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation_trims_and_rejects_empty() {
        assert_eq!(
            validated_name(Some("  Alice  ".into())).unwrap(),
            Some("Alice".into())
        );
        assert!(validated_name(Some("   ".into())).is_err());
        assert_eq!(validated_name(None).unwrap(), None);
    }

    #[test]
    fn password_validation_enforces_minimum_length() {
        assert!(validated_password(Some("short".into())).is_err());
        assert!(validated_password(Some("longenough".into())).is_ok());
        assert_eq!(validated_password(None).unwrap(), None);
    }

    #[test]
    fn role_validation_parses_known_roles_only() {
        assert_eq!(validated_role(Some("admin".into())).unwrap(), Some(Role::Admin));
        assert_eq!(validated_role(Some("user".into())).unwrap(), Some(Role::User));
        assert!(validated_role(Some("root".into())).is_err());
    }
}
