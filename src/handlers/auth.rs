use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::models::error::AppError;
use crate::models::user::{LoginRequest, LoginResponse, LoginUser, NewUser, PublicUser, RegisterRequest};
use crate::state::AppState;
use crate::store::StoreError;

const EMAIL_TAKEN: &str = "Email already registered";

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Users created through a third-party sign-in have no password hash and can
/// never pass this check.
async fn verify_password(password: String, hash: Option<String>) -> Result<bool, AppError> {
    let Some(hash) = hash else {
        return Ok(false);
    };
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let email = request.email.trim().to_string();
    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    }

    let existing = state
        .users
        .find_by_email(&email)
        .await
        .map_err(AppError::store("Server error"))?;
    if existing.is_some() {
        return Err(AppError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    let name = request.display_name();
    let hashed_password = hash_password(request.password, state.bcrypt_cost).await?;

    let user = state
        .users
        .create_user(NewUser {
            email,
            name,
            hashed_password,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => AppError::BadRequest(EMAIL_TAKEN.to_string()),
            other => AppError::Store {
                context: "Server error",
                source: other,
            },
        })?;

    info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".to_string()));
    }

    let user = state
        .users
        .find_by_email(email)
        .await
        .map_err(AppError::store("Server error"))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !verify_password(request.password, user.hashed_password.clone()).await? {
        return Err(AppError::InvalidCredentials("Invalid password".to_string()));
    }

    let token = state.jwt.issue(user.id, &user.email)?;
    Ok(Json(LoginResponse {
        token,
        user: LoginUser {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    }))
}
