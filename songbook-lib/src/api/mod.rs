//! CMS REST operations

mod items;
pub mod query;

pub use items::*;
