//! Crash-safe replacement of small text files.

use edu_core::error::{EduError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A text file that is only ever replaced as a whole.
///
/// A save writes a sibling temp file, fsyncs it and renames it over the
/// target, so readers see either the old or the new content. Writers are
/// serialized through an exclusive lock on a sibling `.lock` file.
pub struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the content; a missing or blank file yields `None`.
    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, content: &str) -> Result<()> {
        let dir = self.parent_dir()?;
        fs::create_dir_all(dir)?;
        let _lock = WriteLock::acquire(&self.sibling("lock")?)?;

        let staging = self.sibling("tmp")?;
        let mut file = File::create(&staging)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    /// Deletes the file. A missing file is not an error.
    pub fn remove(&self) -> Result<()> {
        if !self.parent_dir()?.exists() {
            return Ok(());
        }
        let _lock = WriteLock::acquire(&self.sibling("lock")?)?;

        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn parent_dir(&self) -> Result<&Path> {
        self.path
            .parent()
            .ok_or_else(|| EduError::io(format!("{} has no parent directory", self.path.display())))
    }

    /// `<dir>/.<file name>.<suffix>`
    fn sibling(&self, suffix: &str) -> Result<PathBuf> {
        let name = self
            .path
            .file_name()
            .ok_or_else(|| EduError::io(format!("{} has no file name", self.path.display())))?;
        Ok(self
            .parent_dir()?
            .join(format!(".{}.{}", name.to_string_lossy(), suffix)))
    }
}

/// Exclusive advisory lock, released and cleaned up on drop.
struct WriteLock {
    file: File,
    path: PathBuf,
}

impl WriteLock {
    fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.lock_exclusive()
            .map_err(|e| EduError::storage(format!("Failed to lock {}: {}", path.display(), e)))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = fs::remove_file(&self.path);
    }
}
