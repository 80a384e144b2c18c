//! Atomic file writes with locking

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a failed write never leaves a truncated
/// config behind. The temp file is created next to the target to stay on the
/// same filesystem and is removed on every failure path.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::config(path, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let outcome = write_locked(&temp_path, content).and_then(|()| fs::rename(&temp_path, path));
    if let Err(e) = outcome {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::config(path, e));
    }
    Ok(())
}

/// Fill the temp file under an exclusive lock and flush it to disk.
fn write_locked(temp_path: &Path, content: &[u8]) -> io::Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)?;

    temp_file.lock_exclusive()?;
    temp_file.write_all(content)?;
    temp_file.sync_all()?;
    temp_file.unlock()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("indexes.json");

        write_atomic(&path, b"[]").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("indexes.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_write_removes_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("indexes.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        assert!(matches!(write_atomic(&path, b"[]"), Err(Error::Config { .. })));

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("indexes.json")]);
    }
}
