//! List pages backed by the CMS
//!
//! Column schemas and [`DataSource`](songbook_table::DataSource)
//! implementations that translate the table's committed filter model, sort
//! state and page window into item queries.

pub mod authors;
pub mod genres;
pub mod songs;

pub use authors::AuthorListSource;
pub use genres::GenreListSource;
pub use songs::SongListSource;
pub use songs::SongScope;

use serde_json::Value;
use songbook_table::FilterModel;
use songbook_table::LoadRequest;

use crate::api::query::Filter;
use crate::api::query::QueryOptions;
use crate::api::query::Sort;

/// Query options for one page of a list.
pub(crate) fn page_options(request: &LoadRequest, filter: Option<Filter>) -> QueryOptions {
    let options = QueryOptions::new()
        .sort(Sort::by(&request.order_by, request.order))
        .limit(request.limit)
        .offset(request.offset);
    match filter {
        Some(filter) => options.filter(filter),
        None => options,
    }
}

/// Whether a request asks for no rows at all.
pub(crate) fn is_empty_window(request: &LoadRequest) -> bool {
    request.limit == 0
}

/// `_icontains` on a field for an active text filter.
pub(crate) fn text_filter(model: &FilterModel, column: &str, field: &str) -> Option<Filter> {
    model
        .text_value(column)
        .map(|needle| Filter::icontains(field, needle))
}

/// `_in` on a relational path for an active multi-select filter.
pub(crate) fn options_filter(model: &FilterModel, column: &str, path: &str) -> Option<Filter> {
    model
        .option_values(column)
        .map(|ids| Filter::In(path.to_string(), ids.iter().map(Value::from).collect()))
}

/// `_nnull` on a file field for an enabled boolean filter.
pub(crate) fn presence_filter(model: &FilterModel, column: &str, field: &str) -> Option<Filter> {
    model.bool_value(column).then(|| Filter::not_null(field))
}
