//! Registration and login endpoints

use axum::{extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    api::Json,
    error::AppResult,
    models::user::{LoginUser, RegisterUser, User},
};

/// Registration result
#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub registered: bool,
    pub user: User,
}

/// Login result
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub authed: bool,
    pub user: User,
}

/// Register a new reader account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let user = state.services.users.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            registered: true,
            user,
        }),
    ))
}

/// Check credentials for a user or admin
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginUser,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Wrong password"),
        (status = 403, description = "Role mismatch"),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginUser>,
) -> AppResult<Json<LoginResponse>> {
    let user = state.services.users.login(request).await?;

    Ok(Json(LoginResponse { authed: true, user }))
}
