//! Persisted record of the last applied avatar
//!
//! The record is a single decimal integer in a plain text file. A missing or
//! empty file means no avatar has been applied yet.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::AvatarId;
use crate::error::{Result, RotateError};

/// Read-then-conditional-write storage for the last applied id
pub trait StateStore {
    /// Last successfully applied id, `None` if nothing was recorded
    fn read(&self) -> Result<Option<AvatarId>>;

    /// Create an empty record if none exists
    fn initialize(&self) -> Result<()>;

    /// Overwrite the record
    fn write(&self, id: AvatarId) -> Result<()>;

    /// Forget the record entirely
    fn clear(&self) -> Result<()>;
}

pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, source: io::Error) -> RotateError {
        RotateError::persistence(&self.path, source)
    }
}

impl StateStore for FileStateStore {
    fn read(&self) -> Result<Option<AvatarId>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("State file {} does not exist yet", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(self.error(e)),
        };

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        trimmed.parse::<AvatarId>().map(Some).map_err(|e| {
            self.error(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected an avatar id, found {:?}: {}", trimmed, e),
            ))
        })
    }

    fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }

        match fs::OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(_) => {
                log::info!("Created empty state file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(self.error(e)),
        }
    }

    fn write(&self, id: AvatarId) -> Result<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| self.error(e))?;
                parent.to_path_buf()
            }
            None => PathBuf::from("."),
        };

        // Write beside the target then rename, so a crash never leaves a torn record
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.error(e))?;
        tmp.write_all(id.to_string().as_bytes()).map_err(|e| self.error(e))?;
        tmp.persist(&self.path).map_err(|e| self.error(e.error))?;

        log::info!("Recorded avatar {} in {}", id, self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.error(e)),
        }
    }
}

/// In-memory store for exercising the rotation flow
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStateStore {
    pub value: std::cell::Cell<Option<AvatarId>>,
    pub initialized: std::cell::Cell<bool>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

#[cfg(test)]
impl MemoryStateStore {
    pub fn with(value: Option<AvatarId>) -> Self {
        Self {
            value: std::cell::Cell::new(value),
            initialized: std::cell::Cell::new(value.is_some()),
            fail_reads: false,
            fail_writes: false,
        }
    }
}

#[cfg(test)]
impl StateStore for MemoryStateStore {
    fn read(&self) -> Result<Option<AvatarId>> {
        if self.fail_reads {
            return Err(RotateError::persistence("memory", io::Error::other("read refused")));
        }
        Ok(self.value.get())
    }

    fn initialize(&self) -> Result<()> {
        self.initialized.set(true);
        Ok(())
    }

    fn write(&self, id: AvatarId) -> Result<()> {
        if self.fail_writes {
            return Err(RotateError::persistence("memory", io::Error::other("write refused")));
        }
        self.value.set(Some(id));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.value.set(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_absent() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path().join("last"));
        assert_eq!(store.read().unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_initialize_creates_empty_record_once() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path().join("nested").join("last"));

        store.initialize().unwrap();
        assert!(store.path().exists());
        assert_eq!(store.read().unwrap(), None);

        // Existing contents are left alone
        fs::write(store.path(), "42").unwrap();
        store.initialize().unwrap();
        assert_eq!(store.read().unwrap(), Some(42));
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path().join("last"));

        store.write(20).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "20");
        assert_eq!(store.read().unwrap(), Some(20));

        store.write(30).unwrap();
        assert_eq!(store.read().unwrap(), Some(30));
    }

    #[test]
    fn test_trailing_newline_is_tolerated() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path().join("last"));
        fs::write(store.path(), "10\n").unwrap();
        assert_eq!(store.read().unwrap(), Some(10));
    }

    #[test]
    fn test_zero_is_a_real_id() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path().join("last"));
        store.write(0).unwrap();
        assert_eq!(store.read().unwrap(), Some(0));
    }

    #[test]
    fn test_garbage_contents_are_a_persistence_error() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path().join("last"));
        fs::write(store.path(), "not-a-number").unwrap();

        let err = store.read().unwrap_err();
        assert!(matches!(err, RotateError::Persistence { .. }));
    }

    #[test]
    fn test_directory_in_place_of_file_is_a_persistence_error() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path());
        assert!(matches!(store.read(), Err(RotateError::Persistence { .. })));
    }

    #[test]
    fn test_clear_removes_record() {
        let temp = TempDir::new().unwrap();
        let store = FileStateStore::new(temp.path().join("last"));
        store.write(5).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        // Clearing twice is fine
        store.clear().unwrap();
    }
}
