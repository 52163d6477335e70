//! Albums and their incrementally maintained date range.

use chrono::NaiveDateTime;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use super::photo::PhotoRef;
use crate::error::{Error, Result};

/// Ordered collection of shared photos.
///
/// `earliest_date`/`latest_date` are `None` exactly when the album is
/// empty, and otherwise equal the min/max capture time of its photos.
#[derive(Debug, Clone)]
pub struct Album {
    name: String,
    photos: Vec<PhotoRef>,
    earliest_date: Option<NaiveDateTime>,
    latest_date: Option<NaiveDateTime>,
}

impl Album {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            photos: Vec::new(),
            earliest_date: None,
            latest_date: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn photos(&self) -> &[PhotoRef] {
        &self.photos
    }

    pub fn photo(&self, index: usize) -> Option<&PhotoRef> {
        self.photos.get(index)
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn earliest_date(&self) -> Option<NaiveDateTime> {
        self.earliest_date
    }

    pub fn latest_date(&self) -> Option<NaiveDateTime> {
        self.latest_date
    }

    /// Whether this exact photo (by identity) is in the album.
    pub fn contains(&self, photo: &PhotoRef) -> bool {
        self.photos.iter().any(|p| Rc::ptr_eq(p, photo))
    }

    /// Index of the photo at `location`, compared case-insensitively.
    pub fn position_of(&self, location: &Path) -> Option<usize> {
        let wanted = location.to_string_lossy().to_lowercase();
        self.photos
            .iter()
            .position(|p| p.borrow().location().to_string_lossy().to_lowercase() == wanted)
    }

    /// Append a photo. The date range is widened by direct comparison.
    pub fn add_photo(&mut self, photo: PhotoRef) {
        let date = photo.borrow().captured_at();
        if self.earliest_date.map_or(true, |d| date < d) {
            self.earliest_date = Some(date);
        }
        if self.latest_date.map_or(true, |d| date > d) {
            self.latest_date = Some(date);
        }
        self.photos.push(photo);
    }

    /// Remove the photo at `index`.
    ///
    /// A bound is rescanned only when the removed photo sat on it.
    pub fn remove_photo(&mut self, index: usize) -> Result<PhotoRef> {
        if index >= self.photos.len() {
            return Err(Error::InvalidInput(format!(
                "photo index {} out of range (album '{}' has {} photos)",
                index,
                self.name,
                self.photos.len()
            )));
        }

        let removed = self.photos.remove(index);
        if self.photos.is_empty() {
            self.earliest_date = None;
            self.latest_date = None;
            return Ok(removed);
        }

        let date = removed.borrow().captured_at();
        if self.earliest_date == Some(date) {
            self.earliest_date = self.dates().min();
        }
        if self.latest_date == Some(date) {
            self.latest_date = self.dates().max();
        }
        Ok(removed)
    }

    fn dates(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.photos.iter().map(|p| p.borrow().captured_at())
    }
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{} Photos", self.photo_count())?;
        match (self.earliest_date, self.latest_date) {
            (Some(from), Some(to)) => write!(f, "{} to {}", from, to),
            _ => f.write_str("No Date Range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Photo;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn photo(name: &str, d: u32) -> PhotoRef {
        Photo::new(format!("/pics/{}.jpg", name), day(d)).into_ref()
    }

    fn assert_invariants(album: &Album) {
        assert_eq!(album.photo_count(), album.photos().len());
        assert_eq!(album.earliest_date().is_none(), album.is_empty());
        assert_eq!(album.latest_date().is_none(), album.is_empty());
        if !album.is_empty() {
            let dates: Vec<_> = album.photos().iter().map(|p| p.borrow().captured_at()).collect();
            assert_eq!(album.earliest_date(), dates.iter().copied().min());
            assert_eq!(album.latest_date(), dates.iter().copied().max());
            assert!(album.earliest_date() <= album.latest_date());
        }
    }

    #[test]
    fn test_empty_album_has_no_range() {
        let album = Album::new("Trip");
        assert_eq!(album.photo_count(), 0);
        assert!(album.earliest_date().is_none());
        assert!(album.latest_date().is_none());
        assert!(album.to_string().ends_with("No Date Range"));
    }

    #[test]
    fn test_add_widens_range() {
        let mut album = Album::new("Trip");
        album.add_photo(photo("b", 10));
        assert_eq!(album.earliest_date(), Some(day(10)));
        assert_eq!(album.latest_date(), Some(day(10)));

        album.add_photo(photo("a", 5));
        album.add_photo(photo("c", 20));
        assert_eq!(album.earliest_date(), Some(day(5)));
        assert_eq!(album.latest_date(), Some(day(20)));
        assert_invariants(&album);
    }

    #[test]
    fn test_removing_earliest_recomputes() {
        let mut album = Album::new("Trip");
        album.add_photo(photo("d1", 1));
        album.add_photo(photo("d2", 2));
        album.add_photo(photo("d3", 3));

        album.remove_photo(0).unwrap();
        assert_eq!(album.earliest_date(), Some(day(2)));
        assert_eq!(album.latest_date(), Some(day(3)));
        assert_invariants(&album);
    }

    #[test]
    fn test_removing_latest_recomputes() {
        let mut album = Album::new("Trip");
        album.add_photo(photo("d3", 3));
        album.add_photo(photo("d1", 1));
        album.add_photo(photo("d2", 2));

        album.remove_photo(0).unwrap();
        assert_eq!(album.latest_date(), Some(day(2)));
        assert_eq!(album.earliest_date(), Some(day(1)));
    }

    #[test]
    fn test_removing_interior_photo_keeps_bounds() {
        let mut album = Album::new("Trip");
        album.add_photo(photo("d1", 1));
        album.add_photo(photo("d2", 2));
        album.add_photo(photo("d3", 3));

        album.remove_photo(1).unwrap();
        assert_eq!(album.earliest_date(), Some(day(1)));
        assert_eq!(album.latest_date(), Some(day(3)));
    }

    #[test]
    fn test_tied_extreme_survives_removal() {
        let mut album = Album::new("Trip");
        album.add_photo(photo("a", 1));
        album.add_photo(photo("b", 1));
        album.add_photo(photo("c", 4));

        album.remove_photo(0).unwrap();
        assert_eq!(album.earliest_date(), Some(day(1)));
        assert_invariants(&album);
    }

    #[test]
    fn test_removing_last_photo_clears_range() {
        let mut album = Album::new("Trip");
        album.add_photo(photo("a", 7));
        album.remove_photo(0).unwrap();
        assert_invariants(&album);
        assert!(album.earliest_date().is_none());
    }

    #[test]
    fn test_remove_out_of_range_leaves_album_untouched() {
        let mut album = Album::new("Trip");
        album.add_photo(photo("a", 7));
        let err = album.remove_photo(1).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(album.photo_count(), 1);
        assert_eq!(album.earliest_date(), Some(day(7)));
    }

    #[test]
    fn test_invariants_over_mixed_sequence() {
        let mut album = Album::new("Mixed");
        let days = [9, 3, 3, 27, 14, 1, 27, 8];
        for (i, d) in days.iter().enumerate() {
            album.add_photo(photo(&format!("p{}", i), *d));
            assert_invariants(&album);
        }
        for index in [3, 0, 4, 0, 2, 1, 0, 0] {
            album.remove_photo(index).unwrap();
            assert_invariants(&album);
        }
        assert!(album.is_empty());
    }

    #[test]
    fn test_contains_uses_identity() {
        let mut album = Album::new("Trip");
        let original = photo("a", 1);
        let lookalike = photo("a", 1);
        album.add_photo(Rc::clone(&original));
        assert!(album.contains(&original));
        assert!(!album.contains(&lookalike));
    }

    #[test]
    fn test_position_of_ignores_case() {
        let mut album = Album::new("Trip");
        album.add_photo(photo("Beach", 1));
        assert_eq!(album.position_of(Path::new("/PICS/beach.JPG")), Some(0));
        assert_eq!(album.position_of(Path::new("/pics/other.jpg")), None);
    }
}
