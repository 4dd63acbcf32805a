//! Query string generation.

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use super::Direction;
use super::Filter;
use super::Sort;

/// Converts a `Filter` to the CMS JSON filter syntax.
pub fn filter_to_json(filter: &Filter) -> Value {
    match filter {
        Filter::Eq(field, value) => nest(field, "_eq", value.clone()),
        Filter::Neq(field, value) => nest(field, "_neq", value.clone()),
        Filter::In(field, values) => nest(field, "_in", Value::Array(values.clone())),
        Filter::IContains(field, value) => nest(field, "_icontains", Value::String(value.clone())),
        Filter::IsNull(field) => nest(field, "_null", Value::Bool(true)),
        Filter::NotNull(field) => nest(field, "_nnull", Value::Bool(true)),
        Filter::And(filters) => json!({ "_and": filters.iter().map(filter_to_json).collect::<Vec<_>>() }),
        Filter::Or(filters) => json!({ "_or": filters.iter().map(filter_to_json).collect::<Vec<_>>() }),
    }
}

/// Wraps an operator in one object per path segment, innermost last.
fn nest(path: &str, operator: &str, operand: Value) -> Value {
    let mut value = Value::Object(Map::from_iter([(operator.to_string(), operand)]));
    for segment in path.rsplit('.') {
        value = Value::Object(Map::from_iter([(segment.to_string(), value)]));
    }
    value
}

/// Converts a `Sort` to the comma separated `sort` parameter.
pub fn sort_to_param(sort: &Sort) -> String {
    sort.fields
        .iter()
        .map(|(field, direction)| match direction {
            Direction::Asc => field.clone(),
            Direction::Desc => format!("-{}", field),
        })
        .collect::<Vec<_>>()
        .join(",")
}
