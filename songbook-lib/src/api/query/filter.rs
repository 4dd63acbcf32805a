//! Filter types for item queries.

use serde_json::Value;

/// A filter condition for querying items.
///
/// Fields are dotted paths; relational fields are walked segment by
/// segment, so `authors.authors_id.id` targets the id of a song's linked
/// author through the junction collection.
///
/// # Example
///
/// ```
/// use songbook_lib::api::query::Filter;
///
/// let filter = Filter::and([
///     Filter::icontains("title", "grace"),
///     Filter::in_list("genres.genres_id.id", [3, 7]),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Equality: `{field: {_eq: value}}`
    Eq(String, Value),
    /// Not equal: `{field: {_neq: value}}`
    Neq(String, Value),
    /// Membership: `{field: {_in: [values]}}`
    In(String, Vec<Value>),
    /// Case-insensitive substring: `{field: {_icontains: value}}`
    IContains(String, String),
    /// Is null: `{field: {_null: true}}`
    IsNull(String),
    /// Is not null: `{field: {_nnull: true}}`
    NotNull(String),
    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Neq(field.into(), value.into())
    }

    pub fn in_list<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn icontains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::IContains(field.into(), value.into())
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Filter::IsNull(field.into())
    }

    pub fn not_null(field: impl Into<String>) -> Self {
        Filter::NotNull(field.into())
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    /// Combines this filter with another using logical AND.
    ///
    /// Nested ANDs are flattened.
    pub fn and_also(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::And(mut a), Filter::And(b)) => {
                a.extend(b);
                Filter::And(a)
            }
            (Filter::And(mut a), other) => {
                a.push(other);
                Filter::And(a)
            }
            (this, Filter::And(mut b)) => {
                b.insert(0, this);
                Filter::And(b)
            }
            (this, other) => Filter::And(vec![this, other]),
        }
    }

    /// ANDs together any number of optional filters.
    ///
    /// Returns `None` when no filter is present and the filter itself when
    /// only one is.
    pub fn all(filters: impl IntoIterator<Item = Option<Filter>>) -> Option<Filter> {
        let mut present: Vec<Filter> = filters.into_iter().flatten().collect();
        match present.len() {
            0 => None,
            1 => present.pop(),
            _ => Some(Filter::And(present)),
        }
    }
}
