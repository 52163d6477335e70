//! Persistence gateway for the library and per-user records.
//!
//! Two backends sit behind [`LibraryStore`]: a SQLite database and a
//! directory of JSON files. [`Storage`] picks one from configuration and
//! forwards calls to it.

mod schema;
pub mod json;
pub mod record;
pub mod sqlite;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use crate::model::{Library, User};

pub use json::JsonStore;
pub use record::{AlbumRecord, PhotoRecord, UserRecord};
pub use sqlite::SqliteStore;

/// Load/save contract for durable library state.
///
/// A missing record is reported as `Error::NotFound`; callers treat that as
/// "start from an empty default".
pub trait LibraryStore {
    fn load_library(&self) -> Result<Library>;

    fn save_library(&self, library: &Library) -> Result<()>;

    fn load_user_record(&self, username: &str) -> Result<UserRecord>;

    fn save_user_record(&self, record: &UserRecord) -> Result<()>;

    /// Removing a user that was never saved is not an error.
    fn delete_user(&self, username: &str) -> Result<()>;

    fn load_user(&self, username: &str) -> Result<User> {
        self.load_user_record(username)?.into_user()
    }

    fn save_user(&self, user: &User) -> Result<()> {
        self.save_user_record(&UserRecord::from(user))
    }
}

/// Macro to dispatch a method call to the active backend variant.
macro_rules! dispatch {
    ($self:expr, $method:ident($($arg:expr),* $(,)?)) => {
        match &$self.inner {
            StorageInner::Sqlite(store) => store.$method($($arg),*),
            StorageInner::Json(store) => store.$method($($arg),*),
        }
    };
}

enum StorageInner {
    Sqlite(SqliteStore),
    Json(JsonStore),
}

/// The configured backend.
pub struct Storage {
    inner: StorageInner,
}

impl Storage {
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let inner = match config.backend {
            StorageBackend::Sqlite => {
                let path = config.sqlite_path();
                tracing::info!(path = %path.display(), "Opening SQLite library");
                StorageInner::Sqlite(SqliteStore::open(&path)?)
            }
            StorageBackend::Json => {
                tracing::info!(path = %config.path.display(), "Opening JSON library");
                StorageInner::Json(JsonStore::open(&config.path)?)
            }
        };
        Ok(Self { inner })
    }

    pub fn backend(&self) -> StorageBackend {
        match self.inner {
            StorageInner::Sqlite(_) => StorageBackend::Sqlite,
            StorageInner::Json(_) => StorageBackend::Json,
        }
    }
}

impl LibraryStore for Storage {
    fn load_library(&self) -> Result<Library> {
        dispatch!(self, load_library())
    }

    fn save_library(&self, library: &Library) -> Result<()> {
        dispatch!(self, save_library(library))
    }

    fn load_user_record(&self, username: &str) -> Result<UserRecord> {
        dispatch!(self, load_user_record(username))
    }

    fn save_user_record(&self, record: &UserRecord) -> Result<()> {
        dispatch!(self, save_user_record(record))
    }

    fn delete_user(&self, username: &str) -> Result<()> {
        dispatch!(self, delete_user(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_selects_backend() {
        let dir = tempdir().unwrap();
        for backend in [StorageBackend::Sqlite, StorageBackend::Json] {
            let config = StorageConfig {
                backend,
                path: dir.path().join(format!("{:?}", backend)),
            };
            let storage = Storage::open(&config).unwrap();
            assert_eq!(storage.backend(), backend);

            let mut library = Library::new();
            library.add_user("bob").unwrap();
            storage.save_library(&library).unwrap();
            assert_eq!(storage.load_library().unwrap(), library);
        }
        assert!(dir.path().join("Sqlite/library.db").exists());
        assert!(dir.path().join("Json/library.json").exists());
    }
}
