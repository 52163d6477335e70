//! The one live session: the loaded library plus at most one signed-in user.
//!
//! Saves happen at defined checkpoints only (user creation, login switch,
//! navigation checkpoints, logout, shutdown). Nothing here is thread-safe;
//! a session is driven by one caller at a time.

use crate::db::{LibraryStore, Storage};
use crate::error::{Error, Result};
use crate::model::{same_name, Library, User, ADMIN_USERNAME};

pub struct Session<S: LibraryStore = Storage> {
    store: S,
    library: Library,
    active: Option<User>,
}

impl<S: LibraryStore> Session<S> {
    /// Load the library, starting empty when none has been saved yet.
    pub fn open(store: S) -> Result<Self> {
        let library = match store.load_library() {
            Ok(library) => library,
            Err(e) if e.is_not_found() => {
                tracing::info!("No saved library, starting empty");
                Library::new()
            }
            Err(e) => return Err(e),
        };
        tracing::info!(users = library.users().len(), "Library loaded");

        Ok(Self {
            store,
            library,
            active: None,
        })
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn active_user(&self) -> Option<&User> {
        self.active.as_ref()
    }

    pub fn active_user_mut(&mut self) -> Option<&mut User> {
        self.active.as_mut()
    }

    /// Register a user and persist an empty record for them.
    pub fn create_user(&mut self, username: &str) -> Result<()> {
        let mut library = self.library.clone();
        let username = library.add_user(username)?;
        self.store.save_user(&User::new(username.as_str()))?;
        self.library = library;
        tracing::info!(user = %username, "User created");
        Ok(())
    }

    /// Remove a user and their stored record. Signs them out if active.
    pub fn delete_user(&mut self, username: &str) -> Result<()> {
        if self.library.find(username).is_none() {
            return Err(Error::NotFound(format!("user '{}'", username)));
        }
        self.store.delete_user(username)?;
        self.library.remove_user(username)?;

        if self.active.as_ref().is_some_and(|u| u.username() == username) {
            self.active = None;
        }
        tracing::info!(user = %username, "User deleted");
        Ok(())
    }

    /// Sign in as `username`, saving whoever was signed in before.
    ///
    /// A registered user without a stored record gets a fresh one.
    pub fn login(&mut self, username: &str) -> Result<&mut User> {
        if same_name(username.trim(), ADMIN_USERNAME) {
            return Err(Error::InvalidInput(
                "the admin account manages users and has no albums".into(),
            ));
        }
        let username = self
            .library
            .find(username)
            .ok_or_else(|| Error::NotFound(format!("user '{}'", username)))?
            .to_string();

        self.checkpoint()?;

        let user = match self.store.load_user(&username) {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                let user = User::new(username.as_str());
                self.store.save_user(&user)?;
                user
            }
            Err(e) => return Err(e),
        };
        tracing::info!(user = %username, albums = user.albums().len(), "User signed in");
        Ok(self.active.insert(user))
    }

    /// Persist the active user, if any.
    pub fn checkpoint(&self) -> Result<()> {
        if let Some(user) = &self.active {
            self.store.save_user(user)?;
            tracing::debug!(user = %user.username(), "User saved");
        }
        Ok(())
    }

    /// Save everything and sign out.
    pub fn logout(&mut self) -> Result<()> {
        self.checkpoint()?;
        self.store.save_library(&self.library)?;
        if let Some(user) = self.active.take() {
            tracing::info!(user = %user.username(), "User signed out");
        }
        Ok(())
    }

    pub fn shutdown(self) -> Result<()> {
        self.store.save_library(&self.library)?;
        self.checkpoint()?;
        tracing::info!("Session closed");
        Ok(())
    }
}
