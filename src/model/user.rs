//! A user's albums and known tag types.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::album::Album;
use super::photo::PhotoRef;
use super::same_name;
use crate::error::{Error, NameKind, Result};
use crate::scanner::PhotoImporter;

/// Tag types every new user starts with.
pub const DEFAULT_TAG_TYPES: [&str; 2] = ["person", "location"];

#[derive(Debug, Clone)]
pub struct User {
    username: String,
    albums: Vec<Album>,
    tag_types: Vec<String>,
}

/// Outcome of importing a directory into an album.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            albums: Vec::new(),
            tag_types: DEFAULT_TAG_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub(crate) fn restore(username: String, albums: Vec<Album>, tag_types: Vec<String>) -> Self {
        Self {
            username,
            albums,
            tag_types,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn album(&self, index: usize) -> Result<&Album> {
        self.albums.get(index).ok_or_else(|| self.bad_album_index(index))
    }

    pub fn album_mut(&mut self, index: usize) -> Result<&mut Album> {
        if index >= self.albums.len() {
            return Err(self.bad_album_index(index));
        }
        Ok(&mut self.albums[index])
    }

    /// Index of the album called `name`, ignoring case.
    pub fn album_index(&self, name: &str) -> Option<usize> {
        self.albums.iter().position(|a| same_name(a.name(), name.trim()))
    }

    pub fn tag_types(&self) -> &[String] {
        &self.tag_types
    }

    pub fn create_album(&mut self, name: &str) -> Result<usize> {
        let name = self.check_album_name(name, None)?;
        self.albums.push(Album::new(name));
        Ok(self.albums.len() - 1)
    }

    /// Renaming an album to a different casing of its own name is allowed.
    pub fn rename_album(&mut self, index: usize, name: &str) -> Result<()> {
        self.album(index)?;
        let name = self.check_album_name(name, Some(index))?;
        self.albums[index].set_name(name);
        Ok(())
    }

    /// Drops the album and its memberships; photos shared with other
    /// albums are unaffected.
    pub fn delete_album(&mut self, index: usize) -> Result<Album> {
        self.album(index)?;
        Ok(self.albums.remove(index))
    }

    pub fn add_tag_type(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("tag type name is required".into()));
        }
        if self.tag_types.iter().any(|t| same_name(t, name)) {
            return Err(Error::duplicate(NameKind::TagType, name));
        }
        self.tag_types.push(name.to_string());
        Ok(())
    }

    /// Any photo already in one of this user's albums at exactly `location`.
    pub fn find_photo(&self, location: &Path) -> Option<PhotoRef> {
        self.albums
            .iter()
            .flat_map(|a| a.photos())
            .find(|p| p.borrow().location() == location)
            .map(Rc::clone)
    }

    /// Add the file at `location` to an album.
    ///
    /// A file already known from another album is added as the same photo,
    /// so its caption and tags carry over.
    pub fn add_photo_from_path(
        &mut self,
        album_index: usize,
        location: &Path,
        importer: &PhotoImporter,
    ) -> Result<PhotoRef> {
        if self.album(album_index)?.position_of(location).is_some() {
            return Err(Error::duplicate(
                NameKind::Photo,
                location.display().to_string(),
            ));
        }

        let photo = match self.find_photo(location) {
            Some(existing) => existing,
            None => importer.load(location)?.into_ref(),
        };
        self.albums[album_index].add_photo(Rc::clone(&photo));
        tracing::debug!(
            user = %self.username,
            album = %self.albums[album_index].name(),
            path = %location.display(),
            "Photo added"
        );
        Ok(photo)
    }

    /// Add every image under `dir` to an album, skipping files it already holds.
    pub fn import_directory(
        &mut self,
        album_index: usize,
        dir: &Path,
        importer: &PhotoImporter,
    ) -> Result<ImportSummary> {
        self.album(album_index)?;
        let paths = importer.discover(dir)?;
        self.import_files(album_index, paths, importer)
    }

    /// Add each file to an album. Files the album already holds are skipped
    /// and unreadable ones are reported in [`ImportSummary::failed`].
    pub fn import_files<I>(
        &mut self,
        album_index: usize,
        paths: I,
        importer: &PhotoImporter,
    ) -> Result<ImportSummary>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.album(album_index)?;
        let mut summary = ImportSummary::default();

        for path in paths {
            match self.add_photo_from_path(album_index, &path, importer) {
                Ok(_) => summary.added += 1,
                Err(Error::DuplicateName { .. }) => summary.skipped += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to import photo");
                    summary.failed.push((path, e.to_string()));
                }
            }
        }

        tracing::info!(
            user = %self.username,
            added = summary.added,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            "Import finished"
        );
        Ok(summary)
    }

    /// Move a photo reference from one album to another.
    pub fn move_photo(&mut self, from: usize, photo_index: usize, to: usize) -> Result<()> {
        let photo = self.photo_for_transfer(from, photo_index, to)?;
        self.albums[from].remove_photo(photo_index)?;
        self.albums[to].add_photo(photo);
        Ok(())
    }

    /// Add a second reference to a photo in another album.
    pub fn copy_photo(&mut self, from: usize, photo_index: usize, to: usize) -> Result<()> {
        let photo = self.photo_for_transfer(from, photo_index, to)?;
        self.albums[to].add_photo(photo);
        Ok(())
    }

    fn photo_for_transfer(&self, from: usize, photo_index: usize, to: usize) -> Result<PhotoRef> {
        let source = self.album(from)?;
        let target = self.album(to)?;
        let photo = source.photo(photo_index).ok_or_else(|| {
            Error::InvalidInput(format!(
                "photo index {} out of range (album '{}' has {} photos)",
                photo_index,
                source.name(),
                source.photo_count()
            ))
        })?;
        if target.contains(photo) {
            return Err(Error::duplicate(
                NameKind::Photo,
                photo.borrow().location().display().to_string(),
            ));
        }
        Ok(Rc::clone(photo))
    }

    fn check_album_name(&self, name: &str, except: Option<usize>) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("album name is required".into()));
        }
        let taken = self
            .albums
            .iter()
            .enumerate()
            .any(|(i, a)| Some(i) != except && same_name(a.name(), name));
        if taken {
            return Err(Error::duplicate(NameKind::Album, name));
        }
        Ok(name.to_string())
    }

    fn bad_album_index(&self, index: usize) -> Error {
        Error::InvalidInput(format!(
            "album index {} out of range ({} has {} albums)",
            index,
            self.username,
            self.albums.len()
        ))
    }
}
