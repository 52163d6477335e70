use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;

/// Where a photo's capture time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    Exif,
    Modified,
}

/// Capture time of the file at `path`, in local wall-clock time.
///
/// EXIF `DateTimeOriginal` wins when `prefer_exif` is set and the tag is
/// readable; otherwise the file's modification time is used. Fails only when
/// the file itself cannot be inspected.
pub fn capture_time(path: &Path, prefer_exif: bool) -> Result<(NaiveDateTime, CaptureSource)> {
    let modified = std::fs::metadata(path)?.modified()?;

    if prefer_exif {
        if let Some(taken) = exif_date_time_original(path) {
            return Ok((taken, CaptureSource::Exif));
        }
    }

    let local: DateTime<Local> = modified.into();
    Ok((local.naive_local(), CaptureSource::Modified))
}

fn exif_date_time_original(path: &Path) -> Option<NaiveDateTime> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut bufreader).ok()?;

    let field = exif.get_field(exif::Tag::DateTimeOriginal, exif::In::PRIMARY)?;
    let exif::Value::Ascii(ref parts) = field.value else {
        return None;
    };
    let raw = parts.first()?;
    let dt = exif::DateTime::from_ascii(raw).ok()?;

    NaiveDate::from_ymd_opt(dt.year as i32, dt.month as u32, dt.day as u32)?.and_hms_opt(
        dt.hour as u32,
        dt.minute as u32,
        dt.second as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_falls_back_to_modified_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        File::create(&path).unwrap().write_all(b"not really a jpeg").unwrap();

        let (taken, source) = capture_time(&path, true).unwrap();
        assert_eq!(source, CaptureSource::Modified);

        let now = Local::now().naive_local();
        assert!((now - taken).num_minutes().abs() < 5);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(capture_time(&dir.path().join("gone.jpg"), false).is_err());
    }
}
