//! Filter model and store.

mod model;
mod store;

pub use model::FilterEntry;
pub use model::FilterModel;
pub use model::FilterSchema;
pub use model::FilterType;
pub use model::FilterValue;
pub use store::FilterStore;
