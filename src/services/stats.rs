//! Dashboard statistics service

use crate::{
    error::AppResult,
    models::{stats::AdminSummary, user::UserSummary},
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Totals for the admin dashboard
    pub async fn admin_summary(&self) -> AppResult<AdminSummary> {
        let (user_count, book_count, borrowed_count) = tokio::try_join!(
            self.repository.users.count(),
            self.repository.books.count(),
            self.repository.borrows.count_all(),
        )?;

        Ok(AdminSummary {
            user_count,
            book_count,
            borrowed_count,
        })
    }

    /// Borrowing summary for one user
    pub async fn user_summary(&self, user_id: i64) -> AppResult<UserSummary> {
        self.repository.users.get_by_id(user_id).await?;

        let ((unreturned, borrowed_nums), all_borrows) = tokio::try_join!(
            self.repository.borrows.count_for_user(user_id),
            self.repository.borrows.count_all(),
        )?;

        Ok(UserSummary::new(unreturned, borrowed_nums, all_borrows))
    }
}
