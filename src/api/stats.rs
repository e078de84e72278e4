//! Dashboard summary endpoints

use axum::extract::State;

use crate::{
    api::{Json, Path},
    error::AppResult,
    models::{stats::AdminSummary, user::UserSummary},
};

/// Totals for the admin dashboard
#[utoipa::path(
    get,
    path = "/admin/summary",
    tag = "admin",
    responses(
        (status = 200, description = "Catalog, user and borrow totals", body = AdminSummary)
    )
)]
pub async fn admin_summary(State(state): State<crate::AppState>) -> AppResult<Json<AdminSummary>> {
    let summary = state.services.stats.admin_summary().await?;
    Ok(Json(summary))
}

/// Borrowing summary for a user
#[utoipa::path(
    get,
    path = "/users/{id}/summary",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User borrowing summary", body = UserSummary),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_summary(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserSummary>> {
    let summary = state.services.stats.user_summary(user_id).await?;
    Ok(Json(summary))
}
