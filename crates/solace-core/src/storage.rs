//! Storage seam for the save file.
//!
//! Persistence always rewrites the whole document, so the seam is four
//! whole-document operations. [`FileStorage`] is the production backend;
//! [`MemoryStorage`] is an in-memory double whose failure toggle lets
//! tests exercise the save-failure paths without touching a filesystem.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Errors surfaced by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// An underlying I/O operation failed.
    #[error("storage I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The backend was asked to fail (test double only).
    #[error("storage backend unavailable")]
    Unavailable,
}

/// Whole-document storage for the save file.
pub trait Storage {
    /// Whether a saved document exists.
    fn exists(&self) -> bool;

    /// Read the entire saved document.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the document cannot be read.
    fn read_all(&self) -> Result<String, StorageError>;

    /// Replace the saved document wholesale.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the document cannot be written.
    fn write_all(&self, contents: &str) -> Result<(), StorageError>;

    /// Delete the saved document. Deleting a missing document succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if deletion fails for any other reason.
    fn delete(&self) -> Result<(), StorageError>;
}

/// Single-file storage on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read_all(&self) -> Result<String, StorageError> {
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn write_all(&self, contents: &str) -> Result<(), StorageError> {
        Ok(std::fs::write(&self.path, contents)?)
    }

    fn delete(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory storage double for tests.
///
/// Interior mutability keeps the [`Storage`] methods `&self`, matching
/// the filesystem backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: RefCell<Option<String>>,
    failing: RefCell<bool>,
}

impl MemoryStorage {
    /// Empty storage with no saved document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a document.
    pub fn with_document(contents: &str) -> Self {
        Self {
            document: RefCell::new(Some(contents.to_owned())),
            failing: RefCell::new(false),
        }
    }

    /// Make every subsequent operation fail (or stop failing).
    pub fn set_failing(&self, failing: bool) {
        *self.failing.borrow_mut() = failing;
    }

    /// The stored document, if any.
    pub fn document(&self) -> Option<String> {
        self.document.borrow().clone()
    }

    fn check(&self) -> Result<(), StorageError> {
        if *self.failing.borrow() {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl Storage for MemoryStorage {
    fn exists(&self) -> bool {
        self.document.borrow().is_some()
    }

    fn read_all(&self) -> Result<String, StorageError> {
        self.check()?;
        self.document
            .borrow()
            .clone()
            .ok_or_else(|| StorageError::Io {
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no saved document"),
            })
    }

    fn write_all(&self, contents: &str) -> Result<(), StorageError> {
        self.check()?;
        *self.document.borrow_mut() = Some(contents.to_owned());
        Ok(())
    }

    fn delete(&self) -> Result<(), StorageError> {
        self.check()?;
        *self.document.borrow_mut() = None;
        Ok(())
    }
}
