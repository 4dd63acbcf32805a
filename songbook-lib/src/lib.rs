//! Songbook CMS client library
//!
//! An async client for the songbook's headless CMS (Directus-style REST API),
//! the catalog models and the song/author/genre list pages that plug into
//! the `songbook-table` engine.

pub mod api;
pub mod error;
pub mod model;
pub mod pages;

mod client;

pub use client::*;
