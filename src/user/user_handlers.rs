use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{error::Result, middleware::AuthUser, state::AppState};

/// Get current user profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "User profile retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_current_user(user_id).await?;

    Ok((StatusCode::OK, Json(user)))
}

/// Delete current user together with all of their data
#[utoipa::path(
    delete,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode> {
    state.user_service.delete_account(user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
