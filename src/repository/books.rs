//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        pagination::Page,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a live (not deleted) book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books with an optional single-column filter, sort and pagination
    pub async fn search(&self, query: &BookQuery, page: Page) -> AppResult<(Vec<Book>, i64)> {
        let filter = query.filter();

        let where_clause = match filter {
            Some((field, _)) => format!(
                "WHERE deleted_at IS NULL AND LOWER({}) LIKE $1",
                field.column()
            ),
            None => "WHERE deleted_at IS NULL".to_string(),
        };

        // Count total
        let count_query = format!("SELECT COUNT(*) FROM books {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some((_, ref pattern)) = filter {
            count_builder = count_builder.bind(pattern);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT * FROM books {} ORDER BY {} LIMIT {} OFFSET {}",
            where_clause,
            query.order_by(),
            page.limit(),
            page.offset()
        );
        let mut select_builder = sqlx::query_as::<_, Book>(&select_query);
        if let Some((_, ref pattern)) = filter {
            select_builder = select_builder.bind(pattern);
        }
        let books = select_builder.fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                title, author, publisher, year, isbn, price, remark, cover_url,
                total, residual, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.year)
        .bind(&book.isbn)
        .bind(book.price)
        .bind(&book.remark)
        .bind(&book.cover_url)
        .bind(book.total)
        .bind(book.initial_residual())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book. The row is locked while the new copy counts are checked
    /// against the copies still out on loan.
    pub async fn update(&self, id: i64, update: &UpdateBook) -> AppResult<Book> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let on_loan: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_history WHERE book_id = $1 AND returned = FALSE",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let (total, residual) = update
            .resolve_copies(&current, on_loan)
            .map_err(AppError::Validation)?;

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                publisher = COALESCE($4, publisher),
                year = COALESCE($5, year),
                isbn = COALESCE($6, isbn),
                price = COALESCE($7, price),
                remark = COALESCE($8, remark),
                cover_url = COALESCE($9, cover_url),
                total = $10,
                residual = $11,
                updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.publisher)
        .bind(update.year)
        .bind(&update.isbn)
        .bind(update.price)
        .bind(&update.remark)
        .bind(&update.cover_url)
        .bind(total)
        .bind(residual)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Soft delete a book. Refused while copies are still out on loan.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i64>(
            "SELECT id FROM books WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let on_loan: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_history WHERE book_id = $1 AND returned = FALSE",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if on_loan > 0 {
            return Err(AppError::Conflict(format!(
                "Book {} has {} unreturned borrow(s)",
                id, on_loan
            )));
        }

        sqlx::query("UPDATE books SET deleted_at = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Count live books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
