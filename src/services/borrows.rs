//! Borrow/return workflow service

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::borrow::{borrow_token, BorrowRecord, BorrowRequest, ReturnRequest},
    repository::borrows::LedgerStore,
};

#[derive(Clone)]
pub struct BorrowsService {
    store: Arc<dyn LedgerStore>,
}

impl BorrowsService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Borrow a book now
    pub async fn borrow(&self, request: &BorrowRequest) -> AppResult<BorrowRecord> {
        self.borrow_at(request, Utc::now()).await
    }

    /// Borrow a book with an explicit clock reading
    pub async fn borrow_at(&self, request: &BorrowRequest, now: DateTime<Utc>) -> AppResult<BorrowRecord> {
        if request.user_id <= 0 || request.book_id <= 0 {
            return Err(AppError::BadRequest(
                "user_id and book_id must be positive".to_string(),
            ));
        }

        let borrow_id = borrow_token(request.user_id, request.book_id, now);

        match self
            .store
            .borrow(request.user_id, request.book_id, &borrow_id, now)
            .await
        {
            Ok(record) => {
                tracing::info!(
                    "Book {} borrowed by user {} (borrow {}, ledger id {})",
                    record.book_id,
                    record.user_id,
                    record.borrow_id,
                    record.id
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(
                    "Borrow of book {} by user {} rejected: {}",
                    request.book_id,
                    request.user_id,
                    e
                );
                Err(e)
            }
        }
    }

    /// Return a borrowed book now
    pub async fn return_borrow(&self, request: &ReturnRequest) -> AppResult<BorrowRecord> {
        self.return_borrow_at(request, Utc::now()).await
    }

    /// Return a borrowed book with an explicit clock reading
    pub async fn return_borrow_at(&self, request: &ReturnRequest, now: DateTime<Utc>) -> AppResult<BorrowRecord> {
        let borrow_id = request.borrow_id.trim();
        if borrow_id.is_empty() || request.user_id <= 0 || request.book_id <= 0 {
            return Err(AppError::BadRequest(
                "borrow_id, user_id and book_id are required".to_string(),
            ));
        }

        match self
            .store
            .return_borrow(borrow_id, request.user_id, request.book_id, now)
            .await
        {
            Ok(record) => {
                tracing::info!(
                    "Book {} returned by user {} (borrow {})",
                    record.book_id,
                    record.user_id,
                    record.borrow_id
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!("Return of borrow {} rejected: {}", borrow_id, e);
                Err(e)
            }
        }
    }
}
