//! Error types

use thiserror::Error;

use crate::filter::FilterType;

/// Caller contract violations against a table's column schema.
///
/// These are never produced by user input alone; they signal that the page
/// wired up a column or a page size the schema does not support.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The column key is not part of the column definition.
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    /// A sort was requested on a column without a comparator.
    #[error("column `{0}` is not sortable")]
    NotSortable(String),

    /// A filter was set on a column without filter settings.
    #[error("column `{0}` has no filter settings")]
    NotFilterable(String),

    /// The filter value kind does not match the column's filter kind.
    #[error("filter on column `{column}` expects a {expected} value, got {actual}")]
    FilterTypeMismatch {
        /// The column the filter was set on.
        column: String,
        /// The filter kind declared by the column.
        expected: FilterType,
        /// The kind of the rejected value.
        actual: FilterType,
    },

    /// The page size is not one of the offered presets.
    #[error("{0} rows per page is not one of the offered page sizes")]
    InvalidRowsPerPage(usize),

    /// The page index lies past the last page.
    #[error("page {page} is out of range ({page_count} pages)")]
    PageOutOfRange {
        /// The requested zero-based page.
        page: usize,
        /// The number of pages available.
        page_count: usize,
    },
}

/// Error reported by a data source when loading rows fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    /// Error message
    pub message: String,
}

impl LoadError {
    /// Create a new load error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for LoadError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for LoadError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Error reported when computing multi-select filter options fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load filter options: {message}")]
pub struct OptionsError {
    /// Error message
    pub message: String,
}

impl OptionsError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for OptionsError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
