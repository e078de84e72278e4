//! Page-based pagination shared by every listing

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    config::PaginationConfig,
    error::{AppError, AppResult},
};

/// Sort direction for a single sortable column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub size: i64,
}

impl Page {
    /// Resolve optional query values against the configured limits.
    ///
    /// Missing values fall back to page 1 and the default size; sizes above
    /// the maximum are clamped. Non-positive values and pages whose offset
    /// does not fit in an `i64` are rejected.
    pub fn resolve(page: Option<i64>, size: Option<i64>, limits: PaginationConfig) -> AppResult<Self> {
        let page = page.unwrap_or(1);
        let size = size.unwrap_or(limits.default_size);

        if page < 1 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }
        if size < 1 {
            return Err(AppError::BadRequest("size must be at least 1".to_string()));
        }

        let size = size.min(limits.max_size);
        if (page - 1).checked_mul(size).is_none() {
            return Err(AppError::BadRequest(format!("page {} is out of range", page)));
        }

        Ok(Self { page, size })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Number of pages needed to hold `total` rows
    pub fn page_count(&self, total: i64) -> i64 {
        (total + self.size - 1) / self.size
    }
}
