use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::{
    dtos::auth::MeResponse,
    middleware::AuthUser,
    AppState,
};

/// Profile of the session's subject; doubles as the token verification
/// endpoint for clients revalidating a stored session.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Missing token", body = crate::dtos::ErrorResponse),
        (status = 403, description = "Invalid or expired token", body = crate::dtos::ErrorResponse),
        (status = 404, description = "User no longer exists", body = crate::dtos::ErrorResponse)
    ),
    tag = "Authentication",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let user = state
        .auth_service
        .current_user(identity.subject_id)
        .await?;

    Ok(Json(MeResponse { user }))
}
