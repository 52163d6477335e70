//! Storage-shaped snapshot of a user.
//!
//! Albums share photos by handle in memory. On disk each distinct photo is
//! written once into a numbered slot and albums list slot numbers, so the
//! sharing is rebuilt exactly on load.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::model::{identity, Album, Photo, PhotoRef, Tag, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub location: PathBuf,
    pub caption: String,
    pub captured_at: NaiveDateTime,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub name: String,
    /// Slots into [`UserRecord::photos`], in album order.
    #[serde(default)]
    pub photos: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub tag_types: Vec<String>,
    #[serde(default)]
    pub photos: Vec<PhotoRecord>,
    #[serde(default)]
    pub albums: Vec<AlbumRecord>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        let mut slots = HashMap::new();
        let mut photos = Vec::new();
        let mut albums = Vec::with_capacity(user.albums().len());

        for album in user.albums() {
            let mut members = Vec::with_capacity(album.photo_count());
            for photo in album.photos() {
                let slot = *slots.entry(identity(photo)).or_insert_with(|| {
                    photos.push(PhotoRecord::from(photo));
                    photos.len() - 1
                });
                members.push(slot);
            }
            albums.push(AlbumRecord {
                name: album.name().to_string(),
                photos: members,
            });
        }

        Self {
            username: user.username().to_string(),
            tag_types: user.tag_types().to_vec(),
            photos,
            albums,
        }
    }
}

impl From<&PhotoRef> for PhotoRecord {
    fn from(photo: &PhotoRef) -> Self {
        let photo = photo.borrow();
        Self {
            location: photo.location().to_path_buf(),
            caption: photo.caption().to_string(),
            captured_at: photo.captured_at(),
            tags: photo.tags().to_vec(),
        }
    }
}

impl UserRecord {
    /// Rebuild the user. Album date ranges are recomputed by re-adding
    /// each photo.
    pub fn into_user(self) -> Result<User> {
        let photos: Vec<PhotoRef> = self
            .photos
            .into_iter()
            .map(|p| Photo::restore(p.location, p.caption, p.captured_at, p.tags).into_ref())
            .collect();

        let mut albums = Vec::with_capacity(self.albums.len());
        for record in self.albums {
            let mut album = Album::new(record.name);
            for slot in record.photos {
                let photo = photos.get(slot).ok_or_else(|| {
                    Error::Serialization(format!(
                        "album '{}' refers to missing photo slot {}",
                        album.name(),
                        slot
                    ))
                })?;
                album.add_photo(Rc::clone(photo));
            }
            albums.push(album);
        }

        Ok(User::restore(self.username, albums, self.tag_types))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 8, d)
            .unwrap()
            .and_hms_opt(14, 15, 16)
            .unwrap()
    }

    #[test]
    fn test_shared_photo_written_once() {
        let mut user = User::new("alice");
        let a = user.create_album("A").unwrap();
        let b = user.create_album("B").unwrap();
        let shared = Photo::new("/pics/shared.jpg", day(2)).into_ref();
        user.album_mut(a).unwrap().add_photo(Photo::new("/pics/solo.jpg", day(1)).into_ref());
        user.album_mut(a).unwrap().add_photo(Rc::clone(&shared));
        user.album_mut(b).unwrap().add_photo(shared);

        let record = UserRecord::from(&user);
        assert_eq!(record.photos.len(), 2);
        assert_eq!(record.albums[0].photos, vec![0, 1]);
        assert_eq!(record.albums[1].photos, vec![1]);

        let restored = record.into_user().unwrap();
        let first = restored.album(0).unwrap().photo(1).unwrap();
        let second = restored.album(1).unwrap().photo(0).unwrap();
        assert!(Rc::ptr_eq(first, second));
        assert_eq!(restored.album(0).unwrap().earliest_date(), Some(day(1)));
        assert_eq!(restored.album(0).unwrap().latest_date(), Some(day(2)));
    }

    #[test]
    fn test_dangling_slot_is_rejected() {
        let record = UserRecord {
            username: "alice".into(),
            tag_types: vec!["person".into()],
            photos: Vec::new(),
            albums: vec![AlbumRecord {
                name: "Broken".into(),
                photos: vec![3],
            }],
        };
        assert!(matches!(record.into_user(), Err(Error::Serialization(_))));
    }
}
