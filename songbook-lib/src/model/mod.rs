//! Catalog models

mod author;
pub(crate) mod de;
mod genre;
mod song;
mod static_page;

pub use author::*;
pub use genre::*;
pub use song::*;
pub use static_page::*;
