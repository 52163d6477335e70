//! Key/value labels attached to photos.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::same_name;

/// A `(type, value)` label owned by exactly one photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag_type: String,
    pub value: String,
}

impl Tag {
    pub fn new(tag_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            value: value.into(),
        }
    }

    /// Type compares exactly, value compares case-insensitively.
    pub fn matches(&self, tag_type: &str, value: &str) -> bool {
        self.tag_type == tag_type && same_name(&self.value, value)
    }

    pub fn same_as(&self, other: &Tag) -> bool {
        self.matches(&other.tag_type, &other.value)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.tag_type, self.value)
    }
}
