//! Turning image files on disk into photos.

pub mod discovery;
pub mod metadata;

use std::path::{Path, PathBuf};

use crate::config::ScannerConfig;
use crate::error::{Error, Result};
use crate::model::Photo;

pub use discovery::discover_images;
pub use metadata::{capture_time, CaptureSource};

/// Builds photos from files according to the scanner configuration.
#[derive(Debug, Clone)]
pub struct PhotoImporter {
    config: ScannerConfig,
}

impl PhotoImporter {
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Image files under `dir`, sorted by path.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(Error::InvalidInput(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(discover_images(dir, &self.config.image_extensions))
    }

    /// A new photo for the file at `path`, dated from its metadata.
    pub fn load(&self, path: &Path) -> Result<Photo> {
        let (captured_at, source) = capture_time(path, self.config.prefer_exif_date)?;
        tracing::debug!(path = %path.display(), ?source, %captured_at, "Read capture time");
        Ok(Photo::new(path, captured_at))
    }
}
