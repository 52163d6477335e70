use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively list image files under `directory` whose extension is in
/// `extensions` (compared case-insensitively), sorted by path.
pub fn discover_images(directory: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension() {
                let ext_lower = ext.to_string_lossy().to_lowercase();
                if extensions.iter().any(|e| e.to_lowercase() == ext_lower) {
                    images.push(path.to_path_buf());
                }
            }
        }
    }

    // Sort by path for consistent ordering
    images.sort();

    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn test_discover_images() {
        let dir = tempdir().unwrap();

        File::create(dir.path().join("b.jpg")).unwrap();
        File::create(dir.path().join("a.PNG")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        fs::create_dir(dir.path().join("trip")).unwrap();
        File::create(dir.path().join("trip/c.gif")).unwrap();

        let extensions = vec!["jpg".to_string(), "png".to_string(), "gif".to_string()];
        let images = discover_images(dir.path(), &extensions);

        let names: Vec<_> = images
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.PNG"),
                PathBuf::from("b.jpg"),
                PathBuf::from("trip/c.gif"),
            ]
        );
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let images = discover_images(&dir.path().join("missing"), &["jpg".to_string()]);
        assert!(images.is_empty());
    }
}
