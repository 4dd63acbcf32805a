//! Searchable table engine
//!
//! A headless, column-driven table: pagination, sorting, boolean/text/
//! multi-select filters with debounced propagation, optional persistence
//! of the filters in a URL query parameter and asynchronous row loading
//! that ignores out-of-date results.

pub mod column;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod loader;
pub mod location;
pub mod selection;
pub mod surface;
pub mod url_sync;

mod table;

pub use column::Column;
pub use column::ColumnDefinition;
pub use column::FilterOption;
pub use column::FilterSettings;
pub use column::OptionId;
pub use column::OptionSource;
pub use column::Order;
pub use column::TableRow;
pub use error::LoadError;
pub use error::OptionsError;
pub use error::TableError;
pub use fetch::Fetch;
pub use filter::FilterModel;
pub use filter::FilterValue;
pub use loader::DataSource;
pub use loader::LoadRequest;
pub use location::Location;
pub use surface::Interaction;
pub use table::*;
