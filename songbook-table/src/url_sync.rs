//! Filter model persistence in the `filter` URL query parameter.
//!
//! The parameter holds a JSON object mapping column ids to primitives:
//! `true` for boolean filters, a string for text filters and an array of
//! ids for multi-select filters. Columns without a constraint are omitted.

use serde_json::Map;
use serde_json::Value;
use url::Url;

use crate::column::OptionId;
use crate::filter::FilterModel;
use crate::filter::FilterSchema;
use crate::filter::FilterType;
use crate::filter::FilterValue;

/// Name of the query parameter holding the filter model.
pub const FILTER_PARAM: &str = "filter";

/// Serializes the active entries of a model.
pub fn serialize(model: &FilterModel) -> Map<String, Value> {
    model
        .active()
        .filter_map(|entry| {
            entry
                .filter_value
                .as_ref()
                .map(|value| (entry.column_id.clone(), value_to_json(value)))
        })
        .collect()
}

/// The query parameter value, or `None` when no filter is active.
pub fn to_param(model: &FilterModel) -> Option<String> {
    let object = serialize(model);
    if object.is_empty() {
        None
    } else {
        Some(Value::Object(object).to_string())
    }
}

/// Parses a query parameter value against a schema.
///
/// Never fails: an unparseable parameter leaves every column unset, a value
/// of the wrong kind leaves its column unset and unknown keys are ignored.
pub fn parse_param(schema: &FilterSchema, raw: Option<&str>) -> FilterModel {
    let mut model = FilterModel::from_schema(schema);
    let Some(raw) = raw else {
        return model;
    };

    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            log::debug!("Ignoring filter parameter that is not an object: {}", other);
            return model;
        }
        Err(e) => {
            log::debug!("Ignoring unparseable filter parameter: {}", e);
            return model;
        }
    };

    for (column, filter_type) in schema.iter() {
        if let Some(raw_value) = object.get(column) {
            model.set_value(column, value_from_json(filter_type, raw_value));
        }
    }
    model
}

/// Reads the raw `filter` parameter of a URL.
pub fn filter_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == FILTER_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Derives the filter model from a URL.
pub fn model_from_url(schema: &FilterSchema, url: &Url) -> FilterModel {
    parse_param(schema, filter_param(url).as_deref())
}

/// Returns `url` with its `filter` parameter set from `model`.
///
/// Other query parameters are kept. The parameter is removed when no
/// filter is active.
pub fn with_filter_param(url: &Url, model: &FilterModel) -> Url {
    let others: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != FILTER_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let param = to_param(model);

    let mut next = url.clone();
    if others.is_empty() && param.is_none() {
        next.set_query(None);
        return next;
    }

    {
        let mut pairs = next.query_pairs_mut();
        pairs.clear();
        for (key, value) in &others {
            pairs.append_pair(key, value);
        }
        if let Some(param) = &param {
            pairs.append_pair(FILTER_PARAM, param);
        }
    }
    next
}

fn value_to_json(value: &FilterValue) -> Value {
    match value {
        FilterValue::Boolean(enabled) => Value::Bool(*enabled),
        FilterValue::Text(text) => Value::String(text.clone()),
        FilterValue::MultiSelect(ids) => Value::Array(ids.iter().map(Value::from).collect()),
    }
}

fn value_from_json(filter_type: FilterType, value: &Value) -> Option<FilterValue> {
    match filter_type {
        FilterType::Boolean => value.as_bool().map(FilterValue::Boolean),
        FilterType::Text => value.as_str().map(FilterValue::text),
        FilterType::MultiSelect => {
            let ids = value.as_array()?.iter().filter_map(|element| match element {
                Value::Number(n) => n.as_i64().map(OptionId::Int),
                Value::String(s) => Some(OptionId::Text(s.clone())),
                _ => None,
            });
            Some(FilterValue::MultiSelect(ids.collect()))
        }
    }
}

/// Tracks the last URL-derived filter model so repeated URL observations
/// without a filter change can be skipped.
#[derive(Debug, Clone)]
pub struct FilterUrlSync {
    schema: FilterSchema,
    previous: Option<FilterModel>,
}

impl FilterUrlSync {
    pub fn new(schema: FilterSchema) -> Self {
        Self {
            schema,
            previous: None,
        }
    }

    pub fn schema(&self) -> &FilterSchema {
        &self.schema
    }

    /// Reads the model from the URL and takes it as the first snapshot.
    pub fn initial_model(&mut self, url: &Url) -> FilterModel {
        let model = model_from_url(&self.schema, url);
        self.previous = Some(model.clone());
        model
    }

    /// Returns the URL-derived model if it differs from the last snapshot.
    pub fn observe(&mut self, url: &Url) -> Option<FilterModel> {
        let model = model_from_url(&self.schema, url);
        if self.previous.as_ref() == Some(&model) {
            return None;
        }
        self.previous = Some(model.clone());
        Some(model)
    }

    /// Records a model about to be pushed into the URL, so observing the
    /// pushed URL is a no-op.
    pub fn record_push(&mut self, model: &FilterModel) {
        self.previous = Some(parse_param(&self.schema, to_param(model).as_deref()));
    }

    /// Whether `url` carries different filters than `model`.
    pub fn is_out_of_sync(&self, url: &Url, model: &FilterModel) -> bool {
        model_from_url(&self.schema, url) != parse_param(&self.schema, to_param(model).as_deref())
    }

    /// Builds the URL to push for `model`.
    pub fn url_for(&self, current: &Url, model: &FilterModel) -> Url {
        with_filter_param(current, model)
    }
}
