//! Query engine over a user's whole photo collection.
//!
//! Every search walks the user's albums in order and each album's photos in
//! order, keeping a photo the first time it matches. A photo reachable from
//! several albums is reported once, keyed on identity rather than on its
//! path. Results are in discovery order, not sorted by date.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::{identity, Photo, PhotoRef, Tag, User};

/// How two tag predicates combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Conditional {
    /// Only the first predicate is used.
    #[default]
    None,
    And,
    Or,
}

impl FromStr for Conditional {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Conditional::None),
            "AND" => Ok(Conditional::And),
            "OR" => Ok(Conditional::Or),
            other => Err(Error::InvalidInput(format!(
                "conditional must be NONE, AND or OR (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Conditional::None => "NONE",
            Conditional::And => "AND",
            Conditional::Or => "OR",
        };
        f.write_str(label)
    }
}

/// One `(type, value)` condition of a tag search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPredicate {
    pub tag_type: String,
    pub value: String,
}

impl TagPredicate {
    pub fn new(tag_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag_type: tag_type.into(),
            value: value.into(),
        }
    }

    /// Satisfied by a tag of exactly this type whose value matches ignoring case.
    pub fn matches(&self, tag: &Tag) -> bool {
        tag.matches(&self.tag_type, self.value.trim())
    }

    fn held_by(&self, photo: &Photo) -> bool {
        photo.tags().iter().any(|t| self.matches(t))
    }

    fn validate(&self, position: &str) -> Result<()> {
        if self.tag_type.trim().is_empty() {
            return Err(Error::InvalidInput(format!("{} tag type is required", position)));
        }
        if self.value.trim().is_empty() {
            return Err(Error::InvalidInput(format!("{} tag value is required", position)));
        }
        Ok(())
    }
}

/// Photos captured on a calendar day within `from..=to`, time of day ignored.
///
/// Both bounds are required. A reversed range matches nothing.
pub fn search_by_date(
    user: &User,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<PhotoRef>> {
    let from = from.ok_or_else(|| Error::InvalidInput("from date is required".into()))?;
    let to = to.ok_or_else(|| Error::InvalidInput("to date is required".into()))?;

    let results = collect_matches(user, |photo| {
        let day = photo.captured_at().date();
        from <= day && day <= to
    });
    tracing::debug!(user = %user.username(), %from, %to, matches = results.len(), "Date search");
    Ok(results)
}

/// Photos whose tags satisfy `first`, combined with `second` per `mode`.
///
/// `second` is ignored for [`Conditional::None`] and required otherwise.
/// Both predicates are validated before any photo is examined.
pub fn search_by_tags(
    user: &User,
    mode: Conditional,
    first: &TagPredicate,
    second: Option<&TagPredicate>,
) -> Result<Vec<PhotoRef>> {
    first.validate("first")?;
    let second = match mode {
        Conditional::None => None,
        Conditional::And | Conditional::Or => {
            let second = second
                .ok_or_else(|| Error::InvalidInput("second tag type is required".into()))?;
            second.validate("second")?;
            Some(second)
        }
    };

    let results = match (mode, second) {
        (Conditional::And, Some(second)) => {
            collect_matches(user, |photo| first.held_by(photo) && second.held_by(photo))
        }
        (Conditional::Or, Some(second)) => {
            collect_matches(user, |photo| first.held_by(photo) || second.held_by(photo))
        }
        _ => collect_matches(user, |photo| first.held_by(photo)),
    };
    tracing::debug!(user = %user.username(), %mode, matches = results.len(), "Tag search");
    Ok(results)
}

/// Create an album called `name` holding `photos` by reference.
///
/// Returns the new album's index in the user's album list.
pub fn create_album_from(user: &mut User, name: &str, photos: &[PhotoRef]) -> Result<usize> {
    if photos.is_empty() {
        return Err(Error::EmptyResult);
    }

    let index = user.create_album(name)?;
    let album = user.album_mut(index)?;
    for photo in photos {
        album.add_photo(Rc::clone(photo));
    }
    tracing::debug!(
        user = %user.username(),
        album = %name.trim(),
        photos = photos.len(),
        "Album created from search results"
    );
    Ok(index)
}

fn collect_matches<F>(user: &User, mut predicate: F) -> Vec<PhotoRef>
where
    F: FnMut(&Photo) -> bool,
{
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for album in user.albums() {
        for photo in album.photos() {
            if seen.contains(&identity(photo)) {
                continue;
            }
            if predicate(&*photo.borrow()) {
                seen.insert(identity(photo));
                results.push(Rc::clone(photo));
            }
        }
    }

    results
}

/// Holds the results of the most recent search so they can be turned into
/// an album afterwards.
#[derive(Debug, Default)]
pub struct PhotoSearch {
    results: Vec<PhotoRef>,
}

impl PhotoSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[PhotoRef] {
        &self.results
    }

    /// On error the previous results are kept.
    pub fn by_date(
        &mut self,
        user: &User,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<&[PhotoRef]> {
        self.results = search_by_date(user, from, to)?;
        Ok(&self.results)
    }

    /// On error the previous results are kept.
    pub fn by_tags(
        &mut self,
        user: &User,
        mode: Conditional,
        first: &TagPredicate,
        second: Option<&TagPredicate>,
    ) -> Result<&[PhotoRef]> {
        self.results = search_by_tags(user, mode, first, second)?;
        Ok(&self.results)
    }

    pub fn create_album(&self, user: &mut User, name: &str) -> Result<usize> {
        create_album_from(user, name, &self.results)
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}
