//! Personal photo library.
//!
//! Users own albums, albums share photos, photos carry `(type, value)` tags
//! and a capture time. The [`search`] module finds photos across a user's
//! whole collection by date range or by tag predicates, and [`model::Album`]
//! keeps its earliest/latest capture dates current as photos come and go.
//! [`session::Session`] loads and saves everything through a [`db`] backend.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod scanner;
pub mod search;
pub mod session;

pub use error::{Error, NameKind, Result};
pub use model::{Album, Library, Photo, PhotoRef, Tag, User};
pub use search::{
    create_album_from, search_by_date, search_by_tags, Conditional, PhotoSearch, TagPredicate,
};
pub use session::Session;
