//! Ordering types for item queries.

use songbook_table::Order;

/// Sort direction for ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl From<Order> for Direction {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => Direction::Asc,
            Order::Desc => Direction::Desc,
        }
    }
}

/// Specifies the ordering of query results.
///
/// Multiple fields can be chained together for secondary sorting.
///
/// # Example
///
/// ```
/// use songbook_lib::api::query::Sort;
///
/// let sort = Sort::asc("name").then_desc("date_created");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub(crate) fields: Vec<(String, Direction)>,
}

impl Sort {
    /// Creates an ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::by(field, Direction::Asc)
    }

    /// Creates a descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::by(field, Direction::Desc)
    }

    /// Creates an order on a field in the given direction.
    pub fn by(field: impl Into<String>, direction: impl Into<Direction>) -> Self {
        Self {
            fields: vec![(field.into(), direction.into())],
        }
    }

    /// Adds a secondary ascending order on a field.
    pub fn then_asc(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), Direction::Asc));
        self
    }

    /// Adds a secondary descending order on a field.
    pub fn then_desc(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), Direction::Desc));
        self
    }

    /// Returns the ordered fields with their directions.
    pub fn fields(&self) -> &[(String, Direction)] {
        &self.fields
    }
}
