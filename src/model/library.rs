//! Registry of every username known to the installation.

use serde::{Deserialize, Serialize};

use super::same_name;
use crate::error::{Error, NameKind, Result};

/// Reserved for the administrator login; never a regular user.
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    users: Vec<String>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored usernames without re-validating them.
    pub(crate) fn from_users(users: Vec<String>) -> Self {
        Self { users }
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Register a username. Uniqueness ignores case.
    pub fn add_user(&mut self, username: &str) -> Result<String> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::InvalidInput("username is required".into()));
        }
        if same_name(username, ADMIN_USERNAME) || self.users.iter().any(|u| same_name(u, username)) {
            return Err(Error::duplicate(NameKind::User, username));
        }
        self.users.push(username.to_string());
        Ok(username.to_string())
    }

    /// Exact, case-sensitive lookup as used at login.
    pub fn find(&self, username: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.as_str() == username)
            .map(String::as_str)
    }

    pub fn remove_user(&mut self, username: &str) -> Result<String> {
        let index = self
            .users
            .iter()
            .position(|u| u == username)
            .ok_or_else(|| Error::NotFound(format!("user '{}'", username)))?;
        Ok(self.users.remove(index))
    }
}
