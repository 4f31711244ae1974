use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::validation::{common, Validate};

// Re-export UserRole from the permission module
pub use crate::domains::permission::UserRole;

/// Backend row identifier - the hosted backend hands out integer, UUID or text keys
/// depending on the table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Uuid(Uuid),
    Text(String),
}

impl RowId {
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            RowId::Uuid(uuid) => Some(uuid),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            RowId::Int(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            RowId::Int(id) => id.to_string(),
            RowId::Uuid(uuid) => uuid.to_string(),
            RowId::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<i64> for RowId {
    fn from(id: i64) -> Self {
        RowId::Int(id)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        RowId::Text(id.to_string())
    }
}

impl From<Uuid> for RowId {
    fn from(id: Uuid) -> Self {
        RowId::Uuid(id)
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl PaginationParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.per_page as usize
    }
}

impl Validate for PaginationParams {
    fn validate(&self) -> DomainResult<()> {
        common::validate_page_number(self.page)?;
        common::validate_page_size(self.per_page)
    }
}

/// Paginated result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, params: PaginationParams) -> Self {
        let total_pages = (total as f64 / params.per_page as f64).ceil() as u32;
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
            total_pages,
        }
    }

    /// Slice an already materialized list into the requested page
    pub fn from_slice(all: &[T], params: PaginationParams) -> Self
    where
        T: Clone,
    {
        let items = all
            .iter()
            .skip(params.offset())
            .take(params.per_page as usize)
            .cloned()
            .collect();
        Self::new(items, all.len() as u64, params)
    }
}
