//! JSON file backend: one library file plus one file per user.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::record::UserRecord;
use super::LibraryStore;
use crate::error::{Error, Result};
use crate::model::Library;

const LIBRARY_FILE: &str = "library.json";
const USERS_DIR: &str = "users";

pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root.join(USERS_DIR))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn library_path(&self) -> PathBuf {
        self.root.join(LIBRARY_FILE)
    }

    fn user_path(&self, username: &str) -> PathBuf {
        self.root
            .join(USERS_DIR)
            .join(format!("{}.json", file_stem(username)))
    }
}

impl LibraryStore for JsonStore {
    fn load_library(&self) -> Result<Library> {
        read_json(&self.library_path(), "library")
    }

    fn save_library(&self, library: &Library) -> Result<()> {
        write_json(&self.library_path(), library)
    }

    fn load_user_record(&self, username: &str) -> Result<UserRecord> {
        read_json(&self.user_path(username), &format!("user '{}'", username))
    }

    fn save_user_record(&self, record: &UserRecord) -> Result<()> {
        write_json(&self.user_path(&record.username), record)
    }

    fn delete_user(&self, username: &str) -> Result<()> {
        match fs::remove_file(self.user_path(username)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(what.to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&content)?)
}

/// Write through a temporary file so a crash never leaves a torn record.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// File-name-safe form of a username; bytes outside `[A-Za-z0-9_-]` are
/// percent-encoded.
fn file_stem(username: &str) -> String {
    let mut stem = String::with_capacity(username.len());
    for byte in username.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Photo, Tag, User};
    use chrono::NaiveDate;
    use std::rc::Rc;
    use tempfile::tempdir;

    #[test]
    fn test_file_stem_encodes_separators() {
        assert_eq!(file_stem("bob"), "bob");
        assert_eq!(file_stem("a/b c"), "a%2Fb%20c");
        assert_eq!(file_stem("../x"), "%2E%2E%2Fx");
    }

    #[test]
    fn test_missing_records_are_not_found() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        assert!(store.load_library().unwrap_err().is_not_found());
        assert!(store.load_user("bob").unwrap_err().is_not_found());
        store.delete_user("bob").unwrap();
    }

    #[test]
    fn test_user_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();

        let mut user = User::new("bob smith");
        let a = user.create_album("Summer").unwrap();
        let b = user.create_album("Favourites").unwrap();
        let when = NaiveDate::from_ymd_opt(2019, 7, 4)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap();
        let mut photo = Photo::new("/pics/fireworks.jpg", when);
        photo.add_tag(Tag::new("location", "Boston")).unwrap();
        let photo = photo.into_ref();
        user.album_mut(a).unwrap().add_photo(Rc::clone(&photo));
        user.album_mut(b).unwrap().add_photo(photo);
        store.save_user(&user).unwrap();

        assert!(dir.path().join("users/bob%20smith.json").exists());
        let loaded = store.load_user("bob smith").unwrap();
        assert_eq!(UserRecord::from(&loaded), UserRecord::from(&user));
        assert!(Rc::ptr_eq(
            loaded.album(0).unwrap().photo(0).unwrap(),
            loaded.album(1).unwrap().photo(0).unwrap()
        ));

        store.delete_user("bob smith").unwrap();
        assert!(store.load_user("bob smith").unwrap_err().is_not_found());
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        fs::write(dir.path().join(LIBRARY_FILE), "{ not json").unwrap();
        assert!(matches!(store.load_library(), Err(Error::Serialization(_))));
    }
}
