//! Borrow ledger repository: the borrow/return units of work and history reads

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{BorrowRecord, HistoryEntry, HistoryQuery, MyHistoryRow},
        pagination::Page,
    },
};

/// Store port for the borrow/return workflow.
///
/// Each call is one atomic unit of work spanning the books and the ledger:
/// either every statement commits or none does.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Take one copy of `book_id` off the shelf and record the borrow.
    ///
    /// Fails with `NotFound` when the user or book does not exist and with
    /// `BusinessRule` when no copy is available.
    async fn borrow(
        &self,
        user_id: i64,
        book_id: i64,
        borrow_id: &str,
        at: DateTime<Utc>,
    ) -> AppResult<BorrowRecord>;

    /// Mark one unreturned ledger entry as returned and put the copy back.
    ///
    /// Fails with `NotFound` when no unreturned entry matches all three keys.
    async fn return_borrow(
        &self,
        borrow_id: &str,
        user_id: i64,
        book_id: i64,
        at: DateTime<Utc>,
    ) -> AppResult<BorrowRecord>;
}

const RECORD_COLUMNS: &str = "id, borrow_id, user_id, book_id, borrowed_at, returned, returned_at";

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Admin history: every ledger entry with user email and book, newest first
    pub async fn search_history(
        &self,
        query: &HistoryQuery,
        page: Page,
    ) -> AppResult<(Vec<HistoryEntry>, i64)> {
        let filter = query.filter();

        let where_clause = match filter {
            Some((kind, _)) => format!("WHERE LOWER({}) LIKE $1", kind.column()),
            None => String::new(),
        };

        let count_query = format!(
            r#"
            SELECT COUNT(*)
            FROM borrow_history h
            JOIN users u ON u.id = h.user_id
            JOIN books b ON b.id = h.book_id
            {}
            "#,
            where_clause
        );
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some((_, ref pattern)) = filter {
            count_builder = count_builder.bind(pattern);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            r#"
            SELECT h.id, h.borrow_id, u.email, b.title AS book_name, b.isbn AS book_isbn,
                   h.borrowed_at, h.returned
            FROM borrow_history h
            JOIN users u ON u.id = h.user_id
            JOIN books b ON b.id = h.book_id
            {}
            ORDER BY h.borrowed_at DESC, h.id DESC
            LIMIT {} OFFSET {}
            "#,
            where_clause,
            page.limit(),
            page.offset()
        );
        let mut select_builder = sqlx::query_as::<_, HistoryEntry>(&select_query);
        if let Some((_, ref pattern)) = filter {
            select_builder = select_builder.bind(pattern);
        }
        let entries = select_builder.fetch_all(&self.pool).await?;

        Ok((entries, total))
    }

    /// A user's own history, optionally filtered by book title, newest first
    pub async fn user_history(
        &self,
        user_id: i64,
        title_pattern: Option<&str>,
        page: Page,
    ) -> AppResult<(Vec<MyHistoryRow>, i64)> {
        let title_clause = if title_pattern.is_some() {
            "AND LOWER(b.title) LIKE $2"
        } else {
            ""
        };

        let count_query = format!(
            r#"
            SELECT COUNT(*)
            FROM borrow_history h
            JOIN books b ON b.id = h.book_id
            WHERE h.user_id = $1 {}
            "#,
            title_clause
        );
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query).bind(user_id);
        if let Some(pattern) = title_pattern {
            count_builder = count_builder.bind(pattern);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            r#"
            SELECT h.id, h.borrow_id, h.user_id, h.book_id, h.borrowed_at,
                   h.returned, h.returned_at, b.title, b.isbn
            FROM borrow_history h
            JOIN books b ON b.id = h.book_id
            WHERE h.user_id = $1 {}
            ORDER BY h.borrowed_at DESC, h.id DESC
            LIMIT {} OFFSET {}
            "#,
            title_clause,
            page.limit(),
            page.offset()
        );
        let mut select_builder = sqlx::query_as::<_, MyHistoryRow>(&select_query).bind(user_id);
        if let Some(pattern) = title_pattern {
            select_builder = select_builder.bind(pattern);
        }
        let rows = select_builder.fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    /// Count every borrow ever recorded
    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrow_history")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count a user's borrows: `(unreturned, all)`
    pub async fn count_for_user(&self, user_id: i64) -> AppResult<(i64, i64)> {
        let counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE returned = FALSE), COUNT(*)
            FROM borrow_history
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }
}

#[async_trait]
impl LedgerStore for BorrowsRepository {
    async fn borrow(
        &self,
        user_id: i64,
        book_id: i64,
        borrow_id: &str,
        at: DateTime<Utc>,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let user_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if !user_exists {
            return Err(AppError::NotFound(format!("User with id {} not found", user_id)));
        }

        // Availability check and decrement in one statement
        let taken = sqlx::query(
            r#"
            UPDATE books SET residual = residual - 1, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL AND residual > 0
            "#,
        )
        .bind(book_id)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        if taken.rows_affected() == 0 {
            let book_exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM books WHERE id = $1 AND deleted_at IS NULL)",
            )
            .bind(book_id)
            .fetch_one(&mut *tx)
            .await?;

            return Err(if book_exists {
                AppError::BusinessRule(format!("No copies of book {} are available", book_id))
            } else {
                AppError::NotFound(format!("Book with id {} not found", book_id))
            });
        }

        let record = sqlx::query_as::<_, BorrowRecord>(&format!(
            r#"
            INSERT INTO borrow_history (borrow_id, user_id, book_id, borrowed_at, returned, created_at, updated_at)
            VALUES ($1, $2, $3, $4, FALSE, $4, $4)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(borrow_id)
        .bind(user_id)
        .bind(book_id)
        .bind(at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn return_borrow(
        &self,
        borrow_id: &str,
        user_id: i64,
        book_id: i64,
        at: DateTime<Utc>,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        // Borrow tokens can repeat, so exactly one matching entry is flipped.
        let record = sqlx::query_as::<_, BorrowRecord>(&format!(
            r#"
            UPDATE borrow_history SET returned = TRUE, returned_at = $4, updated_at = $4
            WHERE id = (
                SELECT id FROM borrow_history
                WHERE borrow_id = $1 AND user_id = $2 AND book_id = $3 AND returned = FALSE
                ORDER BY id
                LIMIT 1
                FOR UPDATE
            )
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(borrow_id)
        .bind(user_id)
        .bind(book_id)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No unreturned borrow {} for user {} and book {}",
                borrow_id, user_id, book_id
            ))
        })?;

        let restored = sqlx::query(
            r#"
            UPDATE books SET residual = residual + 1, updated_at = $2
            WHERE id = $1 AND residual < total
            "#,
        )
        .bind(book_id)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        if restored.rows_affected() == 0 {
            return Err(AppError::Internal(format!(
                "Residual count of book {} is out of sync with its ledger",
                book_id
            )));
        }

        tx.commit().await?;

        Ok(record)
    }
}
