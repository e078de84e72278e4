//! Borrow history endpoints

use axum::extract::State;

use crate::{
    api::{Json, Path, Query},
    error::AppResult,
    models::borrow::{HistoryPage, HistoryQuery, MyHistoryPage, MyHistoryQuery},
};

/// List all borrows, newest first
#[utoipa::path(
    get,
    path = "/admin/history",
    tag = "admin",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Page of borrow history", body = HistoryPage),
        (status = 400, description = "Invalid paging or search parameters")
    )
)]
pub async fn list_history(
    State(state): State<crate::AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryPage>> {
    let page = state.services.history.search_history(&query).await?;
    Ok(Json(page))
}

/// List a user's borrows, newest first
#[utoipa::path(
    get,
    path = "/users/{id}/history",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID"),
        MyHistoryQuery
    ),
    responses(
        (status = 200, description = "Page of the user's borrows", body = MyHistoryPage),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_user_history(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<MyHistoryQuery>,
) -> AppResult<Json<MyHistoryPage>> {
    let page = state.services.history.user_history(user_id, &query).await?;
    Ok(Json(page))
}
