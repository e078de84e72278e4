//! Data models for the lending server

pub mod book;
pub mod borrow;
pub mod pagination;
pub mod stats;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookQuery, CreateBook, UpdateBook};
pub use borrow::{BorrowRecord, HistoryEntry, MyHistoryEntry};
pub use pagination::{Page, SortDirection};
pub use user::{Role, User, UserShort};
