use rand::distr::Alphanumeric;
use rand::Rng;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Error type for blob storage operations
#[derive(Debug)]
pub enum BlobError {
    NotFound(String),
    InvalidKey(String),
    IoError(std::io::Error),
}

impl std::fmt::Display for BlobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobError::NotFound(key) => write!(f, "Blob not found: {}", key),
            BlobError::InvalidKey(key) => write!(f, "Invalid blob key: {}", key),
            BlobError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for BlobError {}

impl From<std::io::Error> for BlobError {
    fn from(err: std::io::Error) -> Self {
        BlobError::IoError(err)
    }
}

/// Durable key/value storage for image blobs.
///
/// Keys are relative, `/`-separated paths such as
/// `gallery_images/thumbnails/thumb_photo.jpg`.
pub trait BlobStorage {
    /// Stores `bytes` under `key`, or under an available variant of it when
    /// `key` is taken. Returns the key actually used.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<String, BlobError>;

    fn read(&self, key: &str) -> Result<Vec<u8>, BlobError>;

    fn exists(&self, key: &str) -> Result<bool, BlobError>;

    /// Removes the blob. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), BlobError>;
}

/// Appends a random 7-character suffix to the file stem:
/// `dir/photo.jpg` becomes `dir/photo_a1B2c3D.jpg`.
fn alternative_key(key: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();

    let (dir, file) = match key.rfind('/') {
        Some(idx) => (&key[..=idx], &key[idx + 1..]),
        None => ("", key),
    };
    match file.rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}_{}{}", dir, &file[..dot], suffix, &file[dot..]),
        _ => format!("{}{}_{}", dir, file, suffix),
    }
}

fn available_key(
    key: &str,
    mut taken: impl FnMut(&str) -> Result<bool, BlobError>,
) -> Result<String, BlobError> {
    let mut candidate = key.to_string();
    while taken(&candidate)? {
        candidate = alternative_key(key);
    }
    Ok(candidate)
}

/// Blob storage rooted at a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsBlobStorage {
    root: PathBuf,
}

impl FsBlobStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a key below the root, rejecting absolute paths and `..`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStorage for FsBlobStorage {
    fn save(&self, key: &str, bytes: &[u8]) -> Result<String, BlobError> {
        let key = available_key(key, |candidate| self.exists(candidate))?;
        let path = self.path_for(&key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        log::debug!("Stored blob {} ({} bytes)", key, bytes.len());
        Ok(key)
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.path_for(key)?;
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BlobError::NotFound(key.to_string()),
            _ => BlobError::IoError(e),
        })
    }

    fn exists(&self, key: &str) -> Result<bool, BlobError> {
        Ok(self.path_for(key)?.is_file())
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Deleted blob {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobError::IoError(e)),
        }
    }
}

/// In-process blob storage, also counting writes and deletes
#[derive(Debug, Default)]
pub struct MemoryBlobStorage {
    blobs: RefCell<HashMap<String, Vec<u8>>>,
    writes: Cell<usize>,
    deletes: Cell<usize>,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Number of `delete` calls that removed a blob
    pub fn deletes(&self) -> usize {
        self.deletes.get()
    }

    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}

impl BlobStorage for MemoryBlobStorage {
    fn save(&self, key: &str, bytes: &[u8]) -> Result<String, BlobError> {
        if key.is_empty() {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        let key = available_key(key, |candidate| self.exists(candidate))?;
        self.blobs.borrow_mut().insert(key.clone(), bytes.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(key)
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        self.blobs
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    fn exists(&self, key: &str) -> Result<bool, BlobError> {
        Ok(self.blobs.borrow().contains_key(key))
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        if self.blobs.borrow_mut().remove(key).is_some() {
            self.deletes.set(self.deletes.get() + 1);
        }
        Ok(())
    }
}
