//! Photo records and the shared handle albums hold them by.

use chrono::{NaiveDateTime, Timelike};
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::tag::Tag;
use crate::error::{Error, NameKind, Result};

pub const DEFAULT_CAPTION: &str = "No Caption";

/// Shared handle to a photo.
///
/// Albums store handles, not values: a photo copied into a second album is
/// the same photo, and caption or tag edits through one album show up in
/// every other album holding it. Identity is the allocation, not the path.
pub type PhotoRef = Rc<RefCell<Photo>>;

/// Identity key for a [`PhotoRef`], used to deduplicate search results.
pub(crate) fn identity(photo: &PhotoRef) -> *const RefCell<Photo> {
    Rc::as_ptr(photo)
}

#[derive(Debug, Clone)]
pub struct Photo {
    location: PathBuf,
    caption: String,
    captured_at: NaiveDateTime,
    tags: Vec<Tag>,
}

impl Photo {
    /// Sub-second precision is dropped from `captured_at`.
    pub fn new(location: impl Into<PathBuf>, captured_at: NaiveDateTime) -> Self {
        Self {
            location: location.into(),
            caption: DEFAULT_CAPTION.to_string(),
            captured_at: truncate_to_seconds(captured_at),
            tags: Vec::new(),
        }
    }

    pub fn into_ref(self) -> PhotoRef {
        Rc::new(RefCell::new(self))
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// A blank caption resets to the default.
    pub fn set_caption(&mut self, caption: &str) {
        if caption.trim().is_empty() {
            self.caption = DEFAULT_CAPTION.to_string();
        } else {
            self.caption = caption.to_string();
        }
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn has_tag(&self, tag_type: &str, value: &str) -> bool {
        self.tags.iter().any(|t| t.matches(tag_type, value))
    }

    /// Append a tag. The value is trimmed; a tag equal to an existing one
    /// (exact type, case-insensitive value) is rejected.
    pub fn add_tag(&mut self, tag: Tag) -> Result<()> {
        if tag.tag_type.trim().is_empty() {
            return Err(Error::InvalidInput("tag type is required".into()));
        }
        let value = tag.value.trim();
        if value.is_empty() {
            return Err(Error::InvalidInput("tag value is required".into()));
        }

        let tag = Tag::new(tag.tag_type, value);
        if self.tags.iter().any(|t| t.same_as(&tag)) {
            return Err(Error::duplicate(NameKind::Tag, tag.to_string()));
        }
        self.tags.push(tag);
        Ok(())
    }

    pub fn remove_tag(&mut self, index: usize) -> Result<Tag> {
        if index >= self.tags.len() {
            return Err(Error::InvalidInput(format!(
                "tag index {} out of range (photo has {} tags)",
                index,
                self.tags.len()
            )));
        }
        Ok(self.tags.remove(index))
    }

    /// Rebuild a photo verbatim from storage, bypassing tag validation.
    pub(crate) fn restore(
        location: PathBuf,
        caption: String,
        captured_at: NaiveDateTime,
        tags: Vec<Tag>,
    ) -> Self {
        Self {
            location,
            caption,
            captured_at: truncate_to_seconds(captured_at),
            tags,
        }
    }
}

impl fmt::Display for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.caption)
    }
}

fn truncate_to_seconds(at: NaiveDateTime) -> NaiveDateTime {
    at.with_nanosecond(0).unwrap_or(at)
}
