use axum::extract::State;
use axum::{Extension, Json};

use crate::jwt_auth::AuthUser;
use crate::models::error::AppError;
use crate::models::user::UserProfile;
use crate::state::AppState;

pub async fn get_user_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<UserProfile>, AppError> {
    let user = state
        .users
        .find_by_id(caller.id)
        .await
        .map_err(AppError::store("Internal server error"))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile {
        id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
    }))
}
