use crate::config::CmsConfig;
use gallery_thumbnails::{BlobError, BlobStorage, FsBlobStorage};
use std::path::Path;

/// Directory (key prefix) for program and course images
pub const PROGRAMS_IMAGE_DIR: &str = "programs_images";

/// Blob storage rooted at the configured media directory
pub fn media_storage(config: &CmsConfig) -> Result<FsBlobStorage, BlobError> {
    std::fs::create_dir_all(&config.media_root)?;
    Ok(FsBlobStorage::new(&config.media_root))
}

/// Upload key for a program image: a fresh UUID keeping the original extension,
/// e.g. `programs_images/3f0c...e1.png`
pub fn unique_upload_path(filename: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!("{}/{}{}", PROGRAMS_IMAGE_DIR, uuid::Uuid::new_v4(), ext)
}

/// Stores a program image under a unique key and returns the key
pub fn store_program_image(
    blobs: &impl BlobStorage,
    filename: &str,
    bytes: &[u8],
) -> Result<String, BlobError> {
    blobs.save(&unique_upload_path(filename), bytes)
}
