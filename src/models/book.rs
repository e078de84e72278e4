//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::pagination::SortDirection;

/// Book record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub isbn: Option<String>,
    #[schema(value_type = Option<String>, example = "12.50")]
    pub price: Option<Decimal>,
    pub remark: Option<String>,
    pub cover_url: Option<String>,
    /// Copies owned by the library
    pub total: i32,
    /// Copies currently on the shelf
    pub residual: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_new_copies"))]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub isbn: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub remark: Option<String>,
    pub cover_url: Option<String>,
    #[validate(range(min = 0, message = "Total must not be negative"))]
    pub total: i32,
    /// Defaults to `total` when omitted
    pub residual: Option<i32>,
}

impl CreateBook {
    /// Residual copies the new book starts with
    pub fn initial_residual(&self) -> i32 {
        self.residual.unwrap_or(self.total)
    }
}

fn validate_new_copies(book: &CreateBook) -> Result<(), ValidationError> {
    let residual = book.initial_residual();
    if residual < 0 || residual > book.total {
        let mut error = ValidationError::new("residual_out_of_range");
        error.message = Some("residual must be between 0 and total".into());
        return Err(error);
    }
    Ok(())
}

/// Partial book update (admin)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub isbn: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub remark: Option<String>,
    pub cover_url: Option<String>,
    #[validate(range(min = 0, message = "Total must not be negative"))]
    pub total: Option<i32>,
    #[validate(range(min = 0, message = "Residual must not be negative"))]
    pub residual: Option<i32>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.publisher.is_none()
            && self.year.is_none()
            && self.isbn.is_none()
            && self.price.is_none()
            && self.remark.is_none()
            && self.cover_url.is_none()
            && self.total.is_none()
            && self.residual.is_none()
    }

    /// New `(total, residual)` for `book` after this update, given the
    /// number of copies currently out on loan.
    ///
    /// Changing `total` alone shifts `residual` by the same delta so copies
    /// currently on loan stay accounted for. Shelf and loaned copies together
    /// may never exceed `total`.
    pub fn resolve_copies(&self, book: &Book, on_loan: i64) -> Result<(i32, i32), String> {
        let total = self.total.unwrap_or(book.total);
        let residual = match self.residual {
            Some(residual) => residual,
            None => book.residual + (total - book.total),
        };

        if residual < 0 || residual > total {
            return Err(format!(
                "residual ({}) must be between 0 and total ({})",
                residual, total
            ));
        }
        if i64::from(total) < on_loan {
            return Err(format!(
                "total ({}) is below the {} copies out on loan",
                total, on_loan
            ));
        }
        if i64::from(residual) > i64::from(total) - on_loan {
            return Err(format!(
                "residual ({}) leaves no room for the {} copies out on loan (total {})",
                residual, on_loan, total
            ));
        }
        Ok((total, residual))
    }
}

/// Column a book listing can be filtered and sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookSearchField {
    #[serde(alias = "name")]
    Title,
    Author,
    Publisher,
    Isbn,
}

impl BookSearchField {
    pub fn column(&self) -> &'static str {
        match self {
            BookSearchField::Title => "title",
            BookSearchField::Author => "author",
            BookSearchField::Publisher => "publisher",
            BookSearchField::Isbn => "isbn",
        }
    }
}

/// Book listing query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Column to search and sort on
    pub search_by: Option<BookSearchField>,
    /// Substring to look for in `search_by`
    pub search_content: Option<String>,
    /// Sort direction applied to `search_by`
    pub search_sort: Option<SortDirection>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl BookQuery {
    /// Filter to apply, if both a column and a non-blank needle were given
    pub fn filter(&self) -> Option<(BookSearchField, String)> {
        match (self.search_by, self.search_content.as_deref().map(str::trim)) {
            (Some(field), Some(content)) if !content.is_empty() => {
                Some((field, format!("%{}%", content.to_lowercase())))
            }
            _ => None,
        }
    }

    /// ORDER BY clause; id order unless a column and direction were given
    pub fn order_by(&self) -> String {
        match (self.search_by, self.search_sort) {
            (Some(field), Some(direction)) => {
                format!("{} {}, id ASC", field.column(), direction.as_sql())
            }
            _ => "id ASC".to_string(),
        }
    }
}

/// Paginated book listing
#[derive(Debug, Serialize, ToSchema)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub page_count: i64,
    pub total_books: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(total: i32, residual: Option<i32>) -> CreateBook {
        CreateBook {
            title: "Dune".to_string(),
            author: Some("Frank Herbert".to_string()),
            publisher: None,
            year: Some(1965),
            isbn: Some("9780441013593".to_string()),
            price: None,
            remark: None,
            cover_url: None,
            total,
            residual,
        }
    }

    #[test]
    fn test_create_book_residual_defaults_to_total() {
        let book = new_book(3, None);
        assert_eq!(book.initial_residual(), 3);
        assert!(book.validate().is_ok());
    }

    #[test]
    fn test_create_book_rejects_residual_above_total() {
        assert!(new_book(3, Some(4)).validate().is_err());
        assert!(new_book(3, Some(-1)).validate().is_err());
        assert!(new_book(-1, None).validate().is_err());
    }

    #[test]
    fn test_filter_requires_column_and_content() {
        let query = BookQuery {
            search_by: Some(BookSearchField::Author),
            search_content: Some("  Herbert ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.filter(),
            Some((BookSearchField::Author, "%herbert%".to_string()))
        );

        let blank = BookQuery {
            search_by: Some(BookSearchField::Author),
            search_content: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.filter(), None);

        let no_column = BookQuery {
            search_content: Some("dune".to_string()),
            ..Default::default()
        };
        assert_eq!(no_column.filter(), None);
    }

    #[test]
    fn test_order_by() {
        let query = BookQuery {
            search_by: Some(BookSearchField::Isbn),
            search_sort: Some(SortDirection::Desc),
            ..Default::default()
        };
        assert_eq!(query.order_by(), "isbn DESC, id ASC");

        let sort_only = BookQuery {
            search_sort: Some(SortDirection::Desc),
            ..Default::default()
        };
        assert_eq!(sort_only.order_by(), "id ASC");
    }

    #[test]
    fn test_search_field_accepts_legacy_name() {
        let field: BookSearchField = serde_json::from_str("\"name\"").unwrap();
        assert_eq!(field, BookSearchField::Title);
        assert_eq!(field.column(), "title");
    }

    fn stored_book(total: i32, residual: i32) -> Book {
        Book {
            id: 1,
            title: "Dune".to_string(),
            author: None,
            publisher: None,
            year: None,
            isbn: None,
            price: None,
            remark: None,
            cover_url: None,
            total,
            residual,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_resolve_copies_shifts_residual_with_total() {
        // 3 owned, 1 on the shelf, so 2 on loan
        let book = stored_book(3, 1);

        let grow = UpdateBook {
            total: Some(5),
            ..Default::default()
        };
        assert_eq!(grow.resolve_copies(&book, 2), Ok((5, 3)));

        let shrink = UpdateBook {
            total: Some(2),
            ..Default::default()
        };
        assert_eq!(shrink.resolve_copies(&book, 2), Ok((2, 0)));

        // Cannot own fewer copies than are out on loan
        let too_small = UpdateBook {
            total: Some(1),
            ..Default::default()
        };
        assert!(too_small.resolve_copies(&book, 2).is_err());
    }

    #[test]
    fn test_resolve_copies_explicit_residual() {
        let book = stored_book(3, 1);

        // Everything back on the shelf once no copy is on loan
        let update = UpdateBook {
            residual: Some(3),
            ..Default::default()
        };
        assert_eq!(update.resolve_copies(&book, 0), Ok((3, 3)));

        let over = UpdateBook {
            residual: Some(4),
            ..Default::default()
        };
        assert!(over.resolve_copies(&book, 0).is_err());

        let untouched = UpdateBook {
            title: Some("Dune Messiah".to_string()),
            ..Default::default()
        };
        assert_eq!(untouched.resolve_copies(&book, 2), Ok((3, 1)));
    }

    #[test]
    fn test_resolve_copies_keeps_room_for_open_borrows() {
        // One copy owned and out on loan
        let book = stored_book(1, 0);

        let restock_shelf = UpdateBook {
            residual: Some(1),
            ..Default::default()
        };
        assert!(restock_shelf.resolve_copies(&book, 1).is_err());

        // 3 owned, 2 on loan: at most one copy can sit on the shelf
        let book = stored_book(3, 1);
        let overfill = UpdateBook {
            residual: Some(3),
            ..Default::default()
        };
        assert!(overfill.resolve_copies(&book, 2).is_err());

        let buy_more = UpdateBook {
            total: Some(4),
            residual: Some(2),
            ..Default::default()
        };
        assert_eq!(buy_more.resolve_copies(&book, 2), Ok((4, 2)));
    }

    #[test]
    fn test_update_is_empty() {
        assert!(UpdateBook::default().is_empty());
        let update = UpdateBook {
            total: Some(4),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
