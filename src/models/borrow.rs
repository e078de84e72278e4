//! Borrow ledger model and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Ledger entry, one per borrow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i64,
    /// Display token: `YYYYMMDD` + user id + book id + seconds since midnight
    pub borrow_id: String,
    pub user_id: i64,
    pub book_id: i64,
    pub borrowed_at: DateTime<Utc>,
    pub returned: bool,
    pub returned_at: Option<DateTime<Utc>>,
}

/// Build the display borrow token for a borrow made at `at`.
///
/// Not unique: two borrows of the same book by the same user within one
/// second share a token. The ledger primary key is the identity.
pub fn borrow_token(user_id: i64, book_id: i64, at: DateTime<Utc>) -> String {
    let seconds_since_midnight = at.timestamp().rem_euclid(86_400);
    format!(
        "{}{}{}{}",
        at.format("%Y%m%d"),
        user_id,
        book_id,
        seconds_since_midnight
    )
}

/// Borrow request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub user_id: i64,
    pub book_id: i64,
}

/// Return request; all three fields must match the ledger entry
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReturnRequest {
    pub borrow_id: String,
    pub user_id: i64,
    pub book_id: i64,
}

/// Field an admin history search applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HistorySearchType {
    Email,
    #[serde(alias = "name")]
    Title,
    Isbn,
}

impl HistorySearchType {
    pub fn column(&self) -> &'static str {
        match self {
            HistorySearchType::Email => "u.email",
            HistorySearchType::Title => "b.title",
            HistorySearchType::Isbn => "b.isbn",
        }
    }
}

/// Admin history query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    pub search_type: Option<HistorySearchType>,
    pub search_target: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl HistoryQuery {
    pub fn filter(&self) -> Option<(HistorySearchType, String)> {
        match (self.search_type, self.search_target.as_deref().map(str::trim)) {
            (Some(kind), Some(target)) if !target.is_empty() => {
                Some((kind, format!("%{}%", target.to_lowercase())))
            }
            _ => None,
        }
    }
}

/// A user's own history query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct MyHistoryQuery {
    /// Substring of the book title
    pub name: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl MyHistoryQuery {
    pub fn title_pattern(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()))
    }
}

/// History row joined with user and book, for admins
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct HistoryEntry {
    pub id: i64,
    pub borrow_id: String,
    pub email: String,
    pub book_name: String,
    pub book_isbn: Option<String>,
    pub borrowed_at: DateTime<Utc>,
    pub returned: bool,
}

/// Raw row for a user's own history
#[derive(Debug, Clone, FromRow)]
pub struct MyHistoryRow {
    pub id: i64,
    pub borrow_id: String,
    pub user_id: i64,
    pub book_id: i64,
    pub borrowed_at: DateTime<Utc>,
    pub returned: bool,
    pub returned_at: Option<DateTime<Utc>>,
    pub title: String,
    pub isbn: Option<String>,
}

/// History row for a user, with how long the book was kept
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MyHistoryEntry {
    pub id: i64,
    pub borrow_id: String,
    pub user_id: i64,
    pub book_id: i64,
    pub borrowed_at: DateTime<Utc>,
    pub returned: bool,
    pub returned_at: Option<DateTime<Utc>>,
    /// Time held so far, or until the return
    pub keep: String,
    pub name: String,
    pub isbn: Option<String>,
}

impl MyHistoryEntry {
    pub fn from_row(row: MyHistoryRow, now: DateTime<Utc>) -> Self {
        let until = row.returned_at.unwrap_or(now);
        Self {
            keep: format_keep(until - row.borrowed_at),
            id: row.id,
            borrow_id: row.borrow_id,
            user_id: row.user_id,
            book_id: row.book_id,
            borrowed_at: row.borrowed_at,
            returned: row.returned,
            returned_at: row.returned_at,
            name: row.title,
            isbn: row.isbn,
        }
    }
}

/// Human readable hold duration, e.g. `3d 4h 12m`
pub fn format_keep(held: Duration) -> String {
    let minutes = held.num_minutes().max(0);
    let (days, hours, minutes) = (minutes / 1440, (minutes % 1440) / 60, minutes % 60);

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Paginated admin history
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryPage {
    pub histories: Vec<HistoryEntry>,
    pub page_count: i64,
}

/// Paginated user history
#[derive(Debug, Serialize, ToSchema)]
pub struct MyHistoryPage {
    pub histories: Vec<MyHistoryEntry>,
    pub page_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_borrow_token_layout() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 1, 2, 3).unwrap();
        // 1h 2m 3s = 3723 seconds since midnight
        assert_eq!(borrow_token(7, 42, at), "202403097423723");
    }

    #[test]
    fn test_borrow_token_at_midnight() {
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(borrow_token(1, 2, at), "20251231120");
    }

    #[test]
    fn test_format_keep() {
        assert_eq!(format_keep(Duration::seconds(59)), "0m");
        assert_eq!(format_keep(Duration::minutes(75)), "1h 15m");
        assert_eq!(format_keep(Duration::hours(50) + Duration::minutes(3)), "2d 2h 3m");
        assert_eq!(format_keep(Duration::minutes(-5)), "0m");
    }

    #[test]
    fn test_history_entry_uses_return_time() {
        let borrowed_at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let returned_at = Utc.with_ymd_and_hms(2024, 1, 2, 12, 30, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let row = MyHistoryRow {
            id: 1,
            borrow_id: "x".to_string(),
            user_id: 7,
            book_id: 3,
            borrowed_at,
            returned: true,
            returned_at: Some(returned_at),
            title: "Dune".to_string(),
            isbn: None,
        };

        let entry = MyHistoryEntry::from_row(row, now);
        assert_eq!(entry.keep, "1d 2h 30m");
        assert_eq!(entry.name, "Dune");
    }

    #[test]
    fn test_history_filter() {
        let query = HistoryQuery {
            search_type: Some(HistorySearchType::Email),
            search_target: Some("Reader@".to_string()),
            ..Default::default()
        };
        let (kind, pattern) = query.filter().unwrap();
        assert_eq!(kind.column(), "u.email");
        assert_eq!(pattern, "%reader@%");

        let legacy: HistorySearchType = serde_json::from_str("\"name\"").unwrap();
        assert_eq!(legacy, HistorySearchType::Title);

        assert!(HistoryQuery::default().filter().is_none());
    }
}
