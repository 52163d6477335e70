//! SQLite backend implementation.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::record::{AlbumRecord, PhotoRecord, UserRecord};
use super::schema::SCHEMA;
use super::LibraryStore;
use crate::error::{Error, Result};
use crate::model::{Library, Tag};

/// Storage format for capture timestamps.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct SqliteStore {
    pub(crate) conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn user_exists(&self, username: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM users WHERE username = ?",
                [username],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl LibraryStore for SqliteStore {
    fn load_library(&self) -> Result<Library> {
        let saved = self
            .conn
            .query_row("SELECT 1 FROM library WHERE id = 1", [], |_| Ok(()))
            .optional()?;
        if saved.is_none() {
            return Err(Error::NotFound("library".into()));
        }

        let mut stmt = self
            .conn
            .prepare("SELECT username FROM library_users ORDER BY position")?;
        let usernames = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Library::from_users(usernames))
    }

    fn save_library(&self, library: &Library) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("INSERT OR REPLACE INTO library (id) VALUES (1)", [])?;
        tx.execute("DELETE FROM library_users", [])?;
        {
            let mut insert =
                tx.prepare("INSERT INTO library_users (username, position) VALUES (?, ?)")?;
            for (position, username) in library.users().iter().enumerate() {
                insert.execute(params![username, position as i64])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_user_record(&self, username: &str) -> Result<UserRecord> {
        if !self.user_exists(username)? {
            return Err(Error::NotFound(format!("user '{}'", username)));
        }

        let tag_types = {
            let mut stmt = self
                .conn
                .prepare("SELECT name FROM tag_types WHERE username = ? ORDER BY position")?;
            let names = stmt
                .query_map([username], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            names
        };

        let mut photos = Vec::new();
        {
            let mut stmt = self.conn.prepare(
                r#"
                SELECT slot, location, caption, captured_at
                FROM photos
                WHERE username = ?
                ORDER BY slot
                "#,
            )?;
            let rows = stmt
                .query_map([username], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            for (slot, location, caption, captured_at) in rows {
                if slot_index(slot)? != photos.len() {
                    return Err(Error::Serialization(format!(
                        "photo slots for '{}' are not contiguous at {}",
                        username, slot
                    )));
                }
                photos.push(PhotoRecord {
                    location: PathBuf::from(location),
                    caption,
                    captured_at: parse_timestamp(&captured_at)?,
                    tags: Vec::new(),
                });
            }
        }

        {
            let mut stmt = self.conn.prepare(
                r#"
                SELECT slot, tag_type, value
                FROM photo_tags
                WHERE username = ?
                ORDER BY slot, position
                "#,
            )?;
            let rows = stmt
                .query_map([username], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            for (slot, tag_type, value) in rows {
                let photo = photos.get_mut(slot_index(slot)?).ok_or_else(|| {
                    Error::Serialization(format!("tag refers to missing photo slot {}", slot))
                })?;
                photo.tags.push(Tag::new(tag_type, value));
            }
        }

        let mut albums = Vec::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT name FROM albums WHERE username = ? ORDER BY position")?;
            let names = stmt
                .query_map([username], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            for name in names {
                albums.push(AlbumRecord {
                    name,
                    photos: Vec::new(),
                });
            }

            let mut stmt = self.conn.prepare(
                r#"
                SELECT album_position, slot
                FROM album_photos
                WHERE username = ?
                ORDER BY album_position, position
                "#,
            )?;
            let rows = stmt
                .query_map([username], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            for (album_position, slot) in rows {
                let album = albums.get_mut(slot_index(album_position)?).ok_or_else(|| {
                    Error::Serialization(format!(
                        "membership refers to missing album {}",
                        album_position
                    ))
                })?;
                album.photos.push(slot_index(slot)?);
            }
        }

        Ok(UserRecord {
            username: username.to_string(),
            tag_types,
            photos,
            albums,
        })
    }

    /// Replaces every row of the user inside one transaction.
    fn save_user_record(&self, record: &UserRecord) -> Result<()> {
        let username = record.username.as_str();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM users WHERE username = ?", [username])?;
        tx.execute("INSERT INTO users (username) VALUES (?)", [username])?;
        {
            let mut insert = tx
                .prepare("INSERT INTO tag_types (username, position, name) VALUES (?, ?, ?)")?;
            for (position, name) in record.tag_types.iter().enumerate() {
                insert.execute(params![username, position as i64, name])?;
            }

            let mut insert_photo = tx.prepare(
                r#"
                INSERT INTO photos (username, slot, location, caption, captured_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )?;
            let mut insert_tag = tx.prepare(
                r#"
                INSERT INTO photo_tags (username, slot, position, tag_type, value)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )?;
            for (slot, photo) in record.photos.iter().enumerate() {
                insert_photo.execute(params![
                    username,
                    slot as i64,
                    photo.location.to_string_lossy().into_owned(),
                    photo.caption,
                    photo.captured_at.format(TIMESTAMP_FORMAT).to_string(),
                ])?;
                for (position, tag) in photo.tags.iter().enumerate() {
                    insert_tag.execute(params![
                        username,
                        slot as i64,
                        position as i64,
                        tag.tag_type,
                        tag.value
                    ])?;
                }
            }

            let mut insert_album =
                tx.prepare("INSERT INTO albums (username, position, name) VALUES (?, ?, ?)")?;
            let mut insert_member = tx.prepare(
                r#"
                INSERT INTO album_photos (username, album_position, position, slot)
                VALUES (?, ?, ?, ?)
                "#,
            )?;
            for (album_position, album) in record.albums.iter().enumerate() {
                insert_album.execute(params![username, album_position as i64, album.name])?;
                for (position, slot) in album.photos.iter().enumerate() {
                    insert_member.execute(params![
                        username,
                        album_position as i64,
                        position as i64,
                        *slot as i64
                    ])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_user(&self, username: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM users WHERE username = ?", [username])?;
        Ok(())
    }
}

fn slot_index(value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::Serialization(format!("negative index {} in database", value)))
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|e| Error::Serialization(format!("bad timestamp '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Photo, User};
    use chrono::NaiveDate;
    use std::rc::Rc;
    use tempfile::tempdir;

    fn sample_user() -> User {
        let mut user = User::new("alice");
        user.add_tag_type("event").unwrap();
        let trip = user.create_album("Trip").unwrap();
        let best = user.create_album("Best of").unwrap();

        let when = NaiveDate::from_ymd_opt(2020, 2, 29)
            .unwrap()
            .and_hms_opt(18, 5, 9)
            .unwrap();
        let mut photo = Photo::new("/pics/leap.jpg", when);
        photo.set_caption("Leap day");
        photo.add_tag(Tag::new("person", "Bob")).unwrap();
        photo.add_tag(Tag::new("event", "party")).unwrap();
        let photo = photo.into_ref();

        user.album_mut(trip)
            .unwrap()
            .add_photo(Photo::new("/pics/other.jpg", when).into_ref());
        user.album_mut(trip).unwrap().add_photo(Rc::clone(&photo));
        user.album_mut(best).unwrap().add_photo(photo);
        user
    }

    #[test]
    fn test_missing_records_are_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load_library().unwrap_err().is_not_found());
        assert!(store.load_user("nobody").unwrap_err().is_not_found());
    }

    #[test]
    fn test_library_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut library = Library::new();
        store.save_library(&library).unwrap();
        assert_eq!(store.load_library().unwrap(), library);

        library.add_user("zed").unwrap();
        library.add_user("amy").unwrap();
        store.save_library(&library).unwrap();
        assert_eq!(store.load_library().unwrap().users(), ["zed", "amy"]);
    }

    #[test]
    fn test_user_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = sample_user();
        store.save_user(&user).unwrap();

        let loaded = store.load_user("alice").unwrap();
        assert_eq!(UserRecord::from(&loaded), UserRecord::from(&user));
        assert!(Rc::ptr_eq(
            loaded.album(0).unwrap().photo(1).unwrap(),
            loaded.album(1).unwrap().photo(0).unwrap()
        ));
    }

    #[test]
    fn test_save_replaces_previous_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut user = sample_user();
        store.save_user(&user).unwrap();

        user.delete_album(0).unwrap();
        store.save_user(&user).unwrap();

        let loaded = store.load_user("alice").unwrap();
        assert_eq!(loaded.albums().len(), 1);
        assert_eq!(loaded.album(0).unwrap().name(), "Best of");
        assert_eq!(UserRecord::from(&loaded).photos.len(), 1);
    }

    #[test]
    fn test_delete_user() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("db/library.db")).unwrap();
        store.save_user(&sample_user()).unwrap();
        store.delete_user("alice").unwrap();
        assert!(store.load_user("alice").unwrap_err().is_not_found());

        let leftover: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM photo_tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(leftover, 0);
    }
}
