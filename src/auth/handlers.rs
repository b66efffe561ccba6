use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::dto::{
    AuthResponse, LoginRequest, ProfileResponse, PublicUser, RegisterRequest, RegisterResponse,
};
use crate::auth::jwt::{AuthUser, JwtKeys};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{self, NewUser, ROLE_CLIENT};
use crate::error::{is_unique_violation, ApiError};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();
    payload.phone = payload.phone.trim().to_string();

    if payload.username.is_empty() {
        return Err(ApiError::bad_request("username is required"));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::bad_request("invalid email"));
    }
    if payload.phone.is_empty() {
        return Err(ApiError::bad_request("phone is required"));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::bad_request("password too short"));
    }

    // Duplicate pre-checks, first match wins: username, then email, then phone.
    if repo::username_exists(&state.db, &payload.username).await? {
        warn!(username = %payload.username, "username already registered");
        return Err(ApiError::bad_request("username already registered"));
    }
    if repo::email_exists(&state.db, &payload.email).await? {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::bad_request("email already registered"));
    }
    if repo::phone_exists(&state.db, &payload.phone).await? {
        warn!(phone = %payload.phone, "phone already registered");
        return Err(ApiError::bad_request("phone already registered"));
    }

    let hash = hash_password(&payload.password)?;

    let user = match repo::create(
        &state.db,
        NewUser {
            username: &payload.username,
            first_name: &payload.first_name,
            last_name: &payload.last_name,
            email: Some(&payload.email),
            phone: &payload.phone,
            password_hash: &hash,
            role: ROLE_CLIENT,
        },
    )
    .await
    {
        Ok(user) => user,
        // The unique constraints are the backstop for concurrent registrations
        // that race past the pre-checks.
        Err(e) if is_unique_violation(&e) => {
            warn!(username = %payload.username, "registration lost a uniqueness race");
            return Err(ApiError::bad_request("user already registered"));
        }
        Err(e) => return Err(anyhow::Error::from(e).into()),
    };

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(Json(RegisterResponse {
        message: "user registered".into(),
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let identifier = payload.username.trim();

    let user = repo::find_by_identifier(&state.db, identifier)
        .await?
        .ok_or_else(|| {
            warn!(identifier = %identifier, "login unknown identifier");
            ApiError::Unauthorized("user not found".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("invalid password".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        message: "login successful".into(),
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = repo::find_by_id(&state.db, caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    let created_at = user.created_at;
    Ok(Json(ProfileResponse {
        user: PublicUser::from(user),
        created_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("juan@example.com"));
        assert!(is_valid_email("admin@urbanbarber.com"));
    }

    #[test]
    fn email_regex_rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn public_user_never_serializes_the_hash() {
        let user = crate::auth::repo::User {
            id: 1,
            username: "juanperez".into(),
            first_name: "Juan".into(),
            last_name: "Pérez".into(),
            email: Some("juan@example.com".into()),
            phone: "3001234567".into(),
            password_hash: "super-secret-hash".into(),
            role: ROLE_CLIENT.into(),
            created_at: time::OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("juanperez"));
        assert!(!json.contains("super-secret-hash"));
        assert!(!json.contains("password_hash"));
    }
}
