//! Filter values and the per-column filter model.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::column::ColumnDefinition;
use crate::column::OptionId;
use crate::error::TableError;

/// Kind of filter a column declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    Boolean,
    Text,
    MultiSelect,
}

impl FilterType {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Boolean => "boolean",
            FilterType::Text => "text",
            FilterType::MultiSelect => "multi-select",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Boolean(bool),
    Text(String),
    MultiSelect(BTreeSet<OptionId>),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }

    pub fn options<I, O>(ids: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<OptionId>,
    {
        FilterValue::MultiSelect(ids.into_iter().map(Into::into).collect())
    }

    pub fn filter_type(&self) -> FilterType {
        match self {
            FilterValue::Boolean(_) => FilterType::Boolean,
            FilterValue::Text(_) => FilterType::Text,
            FilterValue::MultiSelect(_) => FilterType::MultiSelect,
        }
    }

    /// Whether this value places no constraint on the rows.
    ///
    /// `false`, the empty string and the empty set are all equivalent to an
    /// absent value.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Boolean(enabled) => !enabled,
            FilterValue::Text(text) => text.is_empty(),
            FilterValue::MultiSelect(ids) => ids.is_empty(),
        }
    }

    /// Maps empty values to `None`.
    pub fn normalized(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

/// Filter state of one filterable column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub column_id: String,
    pub filter_type: FilterType,
    pub filter_value: Option<FilterValue>,
}

impl FilterEntry {
    pub fn is_active(&self) -> bool {
        self.filter_value.as_ref().is_some_and(|v| !v.is_empty())
    }
}

/// The filterable columns of a table and the kind of filter each declares.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSchema {
    columns: BTreeMap<String, FilterType>,
}

impl FilterSchema {
    pub fn from_columns<T>(columns: &ColumnDefinition<T>) -> Self {
        columns
            .iter()
            .filter_map(|(key, column)| {
                column
                    .filter_settings()
                    .map(|settings| (key.to_string(), settings.filter_type()))
            })
            .collect()
    }

    pub fn get(&self, column: &str) -> Option<FilterType> {
        self.columns.get(column).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FilterType)> {
        self.columns.iter().map(|(k, t)| (k.as_str(), *t))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Checks that a value may be set on a column.
    pub fn validate(&self, column: &str, value: &FilterValue) -> Result<(), TableError> {
        let expected = self
            .get(column)
            .ok_or_else(|| TableError::NotFilterable(column.to_string()))?;
        let actual = value.filter_type();
        if expected != actual {
            return Err(TableError::FilterTypeMismatch {
                column: column.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

impl FromIterator<(String, FilterType)> for FilterSchema {
    fn from_iter<I: IntoIterator<Item = (String, FilterType)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Current filter value of every filterable column, keyed by column id.
///
/// Only filterable columns have an entry. Values are stored normalized, so
/// two models with the same constraints always compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterModel {
    entries: BTreeMap<String, FilterEntry>,
}

impl FilterModel {
    /// A model with every filterable column unset.
    pub fn from_schema(schema: &FilterSchema) -> Self {
        let entries = schema
            .iter()
            .map(|(key, filter_type)| {
                (
                    key.to_string(),
                    FilterEntry {
                        column_id: key.to_string(),
                        filter_type,
                        filter_value: None,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn for_columns<T>(columns: &ColumnDefinition<T>) -> Self {
        Self::from_schema(&FilterSchema::from_columns(columns))
    }

    /// Builder form of setting a value; columns without an entry are ignored.
    pub fn with(mut self, column: &str, value: FilterValue) -> Self {
        self.set_value(column, Some(value));
        self
    }

    pub fn get(&self, column: &str) -> Option<&FilterEntry> {
        self.entries.get(column)
    }

    pub fn value(&self, column: &str) -> Option<&FilterValue> {
        self.entries.get(column).and_then(|e| e.filter_value.as_ref())
    }

    pub fn bool_value(&self, column: &str) -> bool {
        matches!(self.value(column), Some(FilterValue::Boolean(true)))
    }

    pub fn text_value(&self, column: &str) -> Option<&str> {
        match self.value(column) {
            Some(FilterValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn option_values(&self, column: &str) -> Option<&BTreeSet<OptionId>> {
        match self.value(column) {
            Some(FilterValue::MultiSelect(ids)) => Some(ids),
            _ => None,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &FilterEntry> {
        self.entries.values()
    }

    /// Entries that constrain the rows.
    pub fn active(&self) -> impl Iterator<Item = &FilterEntry> {
        self.entries.values().filter(|e| e.is_active())
    }

    pub fn is_unconstrained(&self) -> bool {
        self.active().next().is_none()
    }

    /// Sets a value without validating its kind. Returns whether the model changed.
    ///
    /// Columns without an entry are ignored.
    pub(crate) fn set_value(&mut self, column: &str, value: Option<FilterValue>) -> bool {
        let value = value.and_then(FilterValue::normalized);
        match self.entries.get_mut(column) {
            Some(entry) if entry.filter_value != value => {
                entry.filter_value = value;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear(&mut self) -> bool {
        let mut changed = false;
        for entry in self.entries.values_mut() {
            changed |= entry.filter_value.take().is_some();
        }
        changed
    }
}
