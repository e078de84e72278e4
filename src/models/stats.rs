//! Dashboard counters

use serde::Serialize;
use utoipa::ToSchema;

/// Admin dashboard summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AdminSummary {
    pub user_count: i64,
    pub book_count: i64,
    /// All borrows ever recorded
    pub borrowed_count: i64,
}
