//! User management endpoints

use axum::extract::State;

use crate::{
    api::{Json, Query},
    error::AppResult,
    models::user::{UserPage, UserQuery},
};

/// List users with their current borrow counts
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    params(UserQuery),
    responses(
        (status = 200, description = "Page of users", body = UserPage),
        (status = 400, description = "Invalid paging parameters")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<UserPage>> {
    let page = state.services.users.search_users(&query).await?;
    Ok(Json(page))
}
