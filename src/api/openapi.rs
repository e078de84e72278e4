//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, health, history, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Book Lending API",
        version = "1.0.0",
        description = "Library book lending REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrows
        borrows::borrow_book,
        borrows::return_book,
        // History
        history::list_history,
        history::list_user_history,
        // Users
        users::list_users,
        // Stats
        stats::admin_summary,
        stats::user_summary,
    ),
    components(
        schemas(
            // Health
            health::HealthResponse,
            // Auth
            auth::RegisterResponse,
            auth::LoginResponse,
            crate::models::user::RegisterUser,
            crate::models::user::LoginUser,
            crate::models::user::Role,
            crate::models::user::User,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookSearchField,
            crate::models::book::BookPage,
            crate::models::pagination::SortDirection,
            // Borrows
            borrows::BorrowResponse,
            borrows::ReturnResponse,
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowRequest,
            crate::models::borrow::ReturnRequest,
            // History
            crate::models::borrow::HistorySearchType,
            crate::models::borrow::HistoryEntry,
            crate::models::borrow::HistoryPage,
            crate::models::borrow::MyHistoryEntry,
            crate::models::borrow::MyHistoryPage,
            // Users
            crate::models::user::UserShort,
            crate::models::user::UserPage,
            crate::models::user::UserSummary,
            // Stats
            crate::models::stats::AdminSummary,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "auth", description = "Registration and login"),
        (name = "books", description = "Catalog browsing"),
        (name = "borrows", description = "Borrowing and returning books"),
        (name = "users", description = "Reader summaries and history"),
        (name = "admin", description = "Catalog, user and ledger administration")
    )
)]
pub struct ApiDoc;

/// Create OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
