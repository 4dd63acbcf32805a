//! Displayed and committed filter models.
//!
//! Edits land in the displayed model immediately. The committed model, the
//! one loads and the URL see, only catches up when [`FilterStore::commit`]
//! is called, which the table does once its debounce timer fires.

use crate::column::OptionId;
use crate::error::TableError;
use crate::filter::FilterModel;
use crate::filter::FilterSchema;
use crate::filter::FilterType;
use crate::filter::FilterValue;

#[derive(Debug, Clone)]
pub struct FilterStore {
    schema: FilterSchema,
    displayed: FilterModel,
    committed: FilterModel,
}

impl FilterStore {
    pub fn new(schema: FilterSchema) -> Self {
        let model = FilterModel::from_schema(&schema);
        Self {
            schema,
            displayed: model.clone(),
            committed: model,
        }
    }

    /// Starts with `initial` both displayed and committed.
    pub fn with_model(schema: FilterSchema, initial: FilterModel) -> Self {
        let mut store = Self::new(schema);
        store.replace(initial);
        store
    }

    pub fn schema(&self) -> &FilterSchema {
        &self.schema
    }

    pub fn displayed(&self) -> &FilterModel {
        &self.displayed
    }

    pub fn committed(&self) -> &FilterModel {
        &self.committed
    }

    /// Sets the displayed value of a column.
    ///
    /// Returns `Ok(false)` when the displayed model is unchanged.
    pub fn set_filter(
        &mut self,
        column: &str,
        value: Option<FilterValue>,
    ) -> Result<bool, TableError> {
        match &value {
            Some(value) => self.schema.validate(column, value)?,
            None => {
                if self.schema.get(column).is_none() {
                    return Err(TableError::NotFilterable(column.to_string()));
                }
            }
        }
        Ok(self.displayed.set_value(column, value))
    }

    /// Adds or removes one option of a multi-select filter.
    pub fn toggle_option(&mut self, column: &str, id: OptionId) -> Result<bool, TableError> {
        let expected = self
            .schema
            .get(column)
            .ok_or_else(|| TableError::NotFilterable(column.to_string()))?;
        if expected != FilterType::MultiSelect {
            return Err(TableError::FilterTypeMismatch {
                column: column.to_string(),
                expected,
                actual: FilterType::MultiSelect,
            });
        }

        let mut ids = self.displayed.option_values(column).cloned().unwrap_or_default();
        if !ids.remove(&id) {
            ids.insert(id);
        }
        self.set_filter(column, Some(FilterValue::MultiSelect(ids)))
    }

    /// Clears one column, keeping its entry.
    pub fn reset_filter(&mut self, column: &str) -> Result<bool, TableError> {
        self.set_filter(column, None)
    }

    /// Clears every column.
    pub fn reset_all(&mut self) -> bool {
        self.displayed.clear()
    }

    /// Whether the displayed model has edits not yet committed.
    pub fn is_pending(&self) -> bool {
        self.displayed != self.committed
    }

    /// Promotes the displayed model. Returns the new committed model if it changed.
    pub fn commit(&mut self) -> Option<FilterModel> {
        if !self.is_pending() {
            return None;
        }
        self.committed = self.displayed.clone();
        Some(self.committed.clone())
    }

    /// Replaces both models, dropping any pending edit.
    ///
    /// Values for columns outside the schema are ignored.
    pub fn replace(&mut self, model: FilterModel) {
        let mut next = FilterModel::from_schema(&self.schema);
        for entry in model.entries() {
            if let Some(value) = &entry.filter_value
                && self.schema.validate(&entry.column_id, value).is_ok()
            {
                next.set_value(&entry.column_id, Some(value.clone()));
            }
        }
        self.displayed = next.clone();
        self.committed = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FilterStore {
        FilterStore::new(
            [
                ("title".to_string(), FilterType::Text),
                ("audio".to_string(), FilterType::Boolean),
                ("authors".to_string(), FilterType::MultiSelect),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn test_set_filter_is_noop_when_equal() {
        let mut store = store();
        assert_eq!(store.set_filter("title", Some(FilterValue::text("Wind"))), Ok(true));
        assert_eq!(store.set_filter("title", Some(FilterValue::text("Wind"))), Ok(false));
        assert_eq!(store.set_filter("audio", Some(FilterValue::Boolean(false))), Ok(false));
    }

    #[test]
    fn test_displayed_updates_before_commit() {
        let mut store = store();
        store.set_filter("title", Some(FilterValue::text("Wind"))).unwrap();

        assert_eq!(store.displayed().text_value("title"), Some("Wind"));
        assert_eq!(store.committed().text_value("title"), None);
        assert!(store.is_pending());

        let committed = store.commit().unwrap();
        assert_eq!(committed.text_value("title"), Some("Wind"));
        assert!(!store.is_pending());
        assert!(store.commit().is_none());
    }

    #[test]
    fn test_edit_and_revert_commits_nothing() {
        let mut store = store();
        store.set_filter("audio", Some(FilterValue::Boolean(true))).unwrap();
        store.set_filter("audio", Some(FilterValue::Boolean(false))).unwrap();
        assert!(!store.is_pending());
        assert!(store.commit().is_none());
    }

    #[test]
    fn test_toggle_option() {
        let mut store = store();
        store.toggle_option("authors", OptionId::Int(3)).unwrap();
        store.toggle_option("authors", OptionId::Int(7)).unwrap();
        store.toggle_option("authors", OptionId::Int(3)).unwrap();
        assert_eq!(
            store.displayed().value("authors"),
            Some(&FilterValue::options([7]))
        );

        store.toggle_option("authors", OptionId::Int(7)).unwrap();
        assert_eq!(store.displayed().value("authors"), None);
    }

    #[test]
    fn test_toggle_option_on_text_column_fails() {
        let mut store = store();
        assert!(matches!(
            store.toggle_option("title", OptionId::Int(1)),
            Err(TableError::FilterTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_reset_filter_keeps_entry() {
        let mut store = store();
        store.set_filter("title", Some(FilterValue::text("a"))).unwrap();
        store.set_filter("audio", Some(FilterValue::Boolean(true))).unwrap();

        assert_eq!(store.reset_filter("title"), Ok(true));
        assert!(store.displayed().get("title").is_some());
        assert!(store.displayed().bool_value("audio"));

        assert!(store.reset_all());
        assert!(store.displayed().is_unconstrained());
        assert_eq!(store.reset_filter("cover"), Err(TableError::NotFilterable("cover".into())));
    }

    #[test]
    fn test_replace_drops_pending_edit() {
        let mut store = store();
        store.set_filter("title", Some(FilterValue::text("local"))).unwrap();

        let mut incoming = FilterModel::from_schema(store.schema());
        incoming.set_value("audio", Some(FilterValue::Boolean(true)));
        store.replace(incoming);

        assert!(!store.is_pending());
        assert_eq!(store.displayed().text_value("title"), None);
        assert!(store.committed().bool_value("audio"));
    }
}
