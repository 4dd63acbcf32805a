//! Query builders for item collections.
//!
//! - [`Filter`] - Filter conditions, serialised to the CMS JSON filter syntax
//! - [`Sort`] - Ordering specification for query results
//! - [`ItemsQuery`] - Builder bound to a client and a collection
//! - [`QueryOptions`] - Caller overrides for the `find_*` functions

mod builder;
mod filter;
mod order;
pub mod url;

pub use builder::ItemsQuery;
pub use builder::QueryOptions;
pub use filter::Filter;
pub use order::Direction;
pub use order::Sort;
