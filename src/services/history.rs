//! Borrow history listings

use chrono::Utc;

use crate::{
    config::PaginationConfig,
    error::AppResult,
    models::{
        borrow::{HistoryPage, HistoryQuery, MyHistoryEntry, MyHistoryPage, MyHistoryQuery},
        pagination::Page,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct HistoryService {
    repository: Repository,
    pagination: PaginationConfig,
}

impl HistoryService {
    pub fn new(repository: Repository, pagination: PaginationConfig) -> Self {
        Self {
            repository,
            pagination,
        }
    }

    /// All borrows, for admins
    pub async fn search_history(&self, query: &HistoryQuery) -> AppResult<HistoryPage> {
        let page = Page::resolve(query.page, query.size, self.pagination)?;
        let (histories, total) = self.repository.borrows.search_history(query, page).await?;

        Ok(HistoryPage {
            histories,
            page_count: page.page_count(total),
        })
    }

    /// A single user's borrows
    pub async fn user_history(&self, user_id: i64, query: &MyHistoryQuery) -> AppResult<MyHistoryPage> {
        let page = Page::resolve(query.page, query.size, self.pagination)?;
        self.repository.users.get_by_id(user_id).await?;

        let pattern = query.title_pattern();
        let (rows, total) = self
            .repository
            .borrows
            .user_history(user_id, pattern.as_deref(), page)
            .await?;

        let now = Utc::now();
        Ok(MyHistoryPage {
            histories: rows
                .into_iter()
                .map(|row| MyHistoryEntry::from_row(row, now))
                .collect(),
            page_count: page.page_count(total),
        })
    }
}
