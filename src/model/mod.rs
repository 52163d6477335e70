//! Domain model: users own albums, albums share photos, photos carry tags.

mod album;
mod library;
mod photo;
mod tag;
mod user;

pub use album::Album;
pub use library::{Library, ADMIN_USERNAME};
pub use photo::{Photo, PhotoRef, DEFAULT_CAPTION};
pub(crate) use photo::identity;
pub use tag::Tag;
pub use user::{ImportSummary, User, DEFAULT_TAG_TYPES};

/// Case-insensitive name comparison used for usernames, album names,
/// tag type names and tag values.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
