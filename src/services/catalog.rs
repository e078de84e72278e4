//! Catalog (book) management service

use validator::Validate;

use crate::{
    config::PaginationConfig,
    error::{AppError, AppResult},
    models::{
        book::{Book, BookPage, BookQuery, CreateBook, UpdateBook},
        pagination::Page,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    pagination: PaginationConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, pagination: PaginationConfig) -> Self {
        Self {
            repository,
            pagination,
        }
    }

    /// Search books with pagination
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<BookPage> {
        let page = Page::resolve(query.page, query.size, self.pagination)?;
        let (books, total) = self.repository.books.search(query, page).await?;

        Ok(BookPage {
            books,
            page_count: page.page_count(total),
            total_books: total,
        })
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;

        let created = self.repository.books.create(&book).await?;
        tracing::info!(
            "Book {} created: {:?} ({} copies)",
            created.id,
            created.title,
            created.total
        );
        Ok(created)
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i64, book: UpdateBook) -> AppResult<Book> {
        if book.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }
        book.validate()?;

        self.repository.books.update(id, &book).await
    }

    /// Delete a book (soft delete)
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Book {} deleted", id);
        Ok(())
    }
}
