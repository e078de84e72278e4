//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        pagination::Page,
        user::{Role, User, UserQuery, UserShort},
    },
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a live user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get a live user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Create a user unless the email is already taken.
    ///
    /// The lookup and insert share a transaction; a racing insert that slips
    /// past the lookup is caught by the unique index and reported the same way.
    pub async fn create(&self, email: &str, password_hash: &str, role: Role) -> AppResult<User> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&mut *tx)
                .await?;

        if taken {
            return Err(AppError::Conflict(format!("User {} already exists", email)));
        }

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let e = AppError::from(e);
            if e.is_unique_violation() {
                AppError::Conflict(format!("User {} already exists", email))
            } else {
                e
            }
        })?;

        tx.commit().await?;

        Ok(created)
    }

    /// Whether any live admin exists
    pub async fn admin_exists(&self) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin' AND deleted_at IS NULL)",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Search live users with pagination, each with their unreturned borrow count
    pub async fn search(&self, query: &UserQuery, page: Page) -> AppResult<(Vec<UserShort>, i64)> {
        let pattern = query.email_pattern();

        let where_clause = if pattern.is_some() {
            "WHERE u.deleted_at IS NULL AND LOWER(u.email) LIKE $1"
        } else {
            "WHERE u.deleted_at IS NULL"
        };

        let count_query = format!("SELECT COUNT(*) FROM users u {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(ref pattern) = pattern {
            count_builder = count_builder.bind(pattern);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            r#"
            SELECT u.id, u.email, u.role, u.created_at, u.updated_at,
                   (SELECT COUNT(*) FROM borrow_history h
                    WHERE h.user_id = u.id AND h.returned = FALSE) AS borrowed_nums
            FROM users u
            {}
            ORDER BY u.id
            LIMIT {} OFFSET {}
            "#,
            where_clause,
            page.limit(),
            page.offset()
        );
        let mut select_builder = sqlx::query_as::<_, UserShort>(&select_query);
        if let Some(ref pattern) = pattern {
            select_builder = select_builder.bind(pattern);
        }
        let users = select_builder.fetch_all(&self.pool).await?;

        Ok((users, total))
    }

    /// Count live users
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
