//! Write-back with a timestamped backup
//!
//! The edited tree replaces the source file, and the previous contents are
//! kept next to it as `<path>.<yyyyMMddHHmmss>`.
//!
//! The sequence is:
//!
//! 1. serialize the tree into a temporary file in the destination directory
//! 2. rename the source file to the backup name
//! 3. move the temporary file to the source path
//!
//! A failure in step 1 leaves the source untouched. Steps 2 and 3 are two
//! separate renames: if step 3 fails the original data survives only under
//! the backup name and nothing exists at the source path.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::documents::Document;
use crate::error::{Error, Result};

/// `chrono` format of the backup suffix
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Backup name for `path` at time `at`: the full path plus `.yyyyMMddHHmmss`
pub fn backup_path<Tz>(path: &Path, at: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(at.format(BACKUP_TIMESTAMP_FORMAT).to_string());
    PathBuf::from(name)
}

/// Replace `path` with the serialized `document`, keeping the old file as a backup.
///
/// Refuses to run if the backup name is already taken. Returns the backup path.
pub fn write_with_backup<Tz>(path: &Path, document: &Document, at: DateTime<Tz>) -> Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let backup = backup_path(path, &at);
    if backup.exists() {
        return Err(Error::BackupExists(backup));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(staged.as_file_mut());
        document.write_to(&mut out)?;
        out.flush()?;
    }
    let permissions = fs::metadata(path)?.permissions();
    staged.as_file().set_permissions(permissions)?;
    debug!(staged = %staged.path().display(), "serialized tree to temporary file");

    fs::rename(path, &backup)?;
    staged.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone, Utc};

    #[test]
    fn test_backup_path_suffix() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 15, 4, 5).unwrap();
        let backup = backup_path(Path::new("/data/export.xml"), &at);
        assert_eq!(backup, PathBuf::from("/data/export.xml.20240307150405"));
    }

    #[test]
    fn test_write_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xml");
        let original = "<root><a>1</a></root>";
        fs::write(&path, original).unwrap();

        let doc = Document::from_string("<root><b>2</b></root>").unwrap();
        let at = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let backup = write_with_backup(&path, &doc, at).unwrap();

        assert_eq!(backup, dir.path().join("export.xml.20240102030405"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), original);
        assert!(fs::read_to_string(&path).unwrap().contains("<root><b>2</b></root>"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_existing_backup_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xml");
        fs::write(&path, "<root/>").unwrap();

        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let taken = backup_path(&path, &at);
        fs::write(&taken, "older backup").unwrap();

        let doc = Document::from_string("<other/>").unwrap();
        let err = write_with_backup(&path, &doc, at).unwrap_err();

        assert!(matches!(err, Error::BackupExists(_)));
        assert_eq!(fs::read_to_string(&taken).unwrap(), "older backup");
        assert_eq!(fs::read_to_string(&path).unwrap(), "<root/>");
    }

    #[test]
    fn test_missing_source_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.xml");

        let doc = Document::from_string("<root/>").unwrap();
        let result = write_with_backup(&path, &doc, Utc::now());

        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
