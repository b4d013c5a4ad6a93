use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use rand::RngCore;
use uuid::Uuid;

use ripplr_db::Database;
use ripplr_types::api::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ApiError;
use crate::middleware::CurrentUser;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

const MIN_PASSWORD_LEN: usize = 8;

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;

    validate_email(&req.email)?;
    validate_password(&req.password)?;

    if state.db.get_user_by_email(&req.email)?.is_some() {
        return Err(ApiError::Validation(
            "user with this email already exists.".into(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    state
        .db
        .create_user(&user_id.to_string(), &req.email, &password_hash, &Utc::now())?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user_id,
            email: req.email,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;

    let user = state
        .db
        .get_user_by_email(&req.email)?
        .ok_or(ApiError::BadCredentials)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash unreadable: {e}")))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::BadCredentials)?;

    let token = generate_token();
    state.db.insert_token(&token, &user.id, &Utc::now())?;

    Ok(Json(LoginResponse { token }))
}

/// Deletes the presented token. Other sessions of the same user stay valid.
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_token(&user.token)?;
    Ok(Json(serde_json::json!({ "message": "Logged out successfully" })))
}

/// 32 random bytes, URL-safe base64. Opaque by design; the only record of it
/// is the auth_tokens row.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    if !email.contains('@') || email.len() < 3 {
        return Err(ApiError::Validation("Enter a valid email address.".into()));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Ensure this field has at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("password1").unwrap();
        assert_ne!(hash, "password1");

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"password1", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"password2", &parsed)
                .is_err()
        );
    }

    #[test]
    fn tokens_are_unique_and_opaque() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        // 32 bytes of entropy in URL-safe base64
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn password_length_is_enforced() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("password1").is_ok());
    }

    #[test]
    fn email_needs_an_at_sign() {
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@x.com").is_ok());
    }
}
