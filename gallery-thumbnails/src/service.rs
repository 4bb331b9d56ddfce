use crate::models::{BackfillReport, GalleryConfig, GalleryImage, SaveOutcome};
use crate::storage::{BlobError, BlobStorage};
use crate::store::{GalleryImageStore, GalleryStoreError};
use crate::thumbnail::{should_regenerate, ThumbnailDeriver, ThumbnailError};

/// Error type for gallery operations
#[derive(Debug)]
pub enum GalleryError {
    StoreError(GalleryStoreError),
    BlobError(BlobError),
    ThumbnailError(ThumbnailError),
    InvalidUpload(String),
}

impl std::fmt::Display for GalleryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GalleryError::StoreError(e) => write!(f, "Store error: {}", e),
            GalleryError::BlobError(e) => write!(f, "Blob storage error: {}", e),
            GalleryError::ThumbnailError(e) => write!(f, "Thumbnail error: {}", e),
            GalleryError::InvalidUpload(msg) => write!(f, "Invalid upload: {}", msg),
        }
    }
}

impl std::error::Error for GalleryError {}

impl From<GalleryStoreError> for GalleryError {
    fn from(err: GalleryStoreError) -> Self {
        GalleryError::StoreError(err)
    }
}

impl From<BlobError> for GalleryError {
    fn from(err: BlobError) -> Self {
        GalleryError::BlobError(err)
    }
}

impl From<ThumbnailError> for GalleryError {
    fn from(err: ThumbnailError) -> Self {
        GalleryError::ThumbnailError(err)
    }
}

/// Gallery service: record persistence plus save-time thumbnail derivation
pub struct GalleryService<S, B> {
    store: S,
    blobs: B,
    config: GalleryConfig,
    deriver: ThumbnailDeriver,
}

impl<S: GalleryImageStore, B: BlobStorage> GalleryService<S, B> {
    pub fn new(store: S, blobs: B, config: GalleryConfig) -> Self {
        let deriver = ThumbnailDeriver::new(
            config.thumbnail_max_width,
            config.thumbnail_max_height,
            config.jpeg_quality,
        );
        Self {
            store,
            blobs,
            config,
            deriver,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Stores an uploaded source image below the upload directory and points
    /// `image.image` at it. Nothing is persisted to the record store.
    pub fn attach_upload(
        &self,
        image: &mut GalleryImage,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, GalleryError> {
        let base_name = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        if base_name.is_empty() || base_name == "." || base_name == ".." {
            return Err(GalleryError::InvalidUpload(format!(
                "unusable file name {:?}",
                filename
            )));
        }

        let key = self.blobs.save(
            &format!("{}/{}", self.config.upload_dir.trim_end_matches('/'), base_name),
            bytes,
        )?;
        log::debug!("Upload {} stored as {}", filename, key);
        image.image = Some(key.clone());
        Ok(key)
    }

    /// Persists `image` and keeps its thumbnail in step with its source.
    ///
    /// The prior state is read back before anything is written. When the
    /// source changed, the old thumbnail blob is deleted first; the thumbnail
    /// is then derived at most once. Failures are not retried and earlier
    /// writes are not rolled back.
    pub fn save_with_thumbnail(
        &self,
        image: &mut GalleryImage,
    ) -> Result<SaveOutcome, GalleryError> {
        let is_new = image.is_new();
        let (source_changed, prior) = match image.id {
            None => (true, None),
            Some(id) => self.compare_with_stored(id, image.image.as_deref())?,
        };

        let mut stale_thumbnail_deleted = None;
        if !is_new && source_changed {
            let in_memory = image.thumbnail.take();
            let stale = prior
                .as_ref()
                .and_then(|p| p.thumbnail.clone())
                .or(in_memory);
            if let Some(stale) = stale {
                let deleted = self.delete_blob_if_exists(&stale)?;
                if let (Some(id), Some(_)) = (image.id, prior.as_ref()) {
                    self.store.set_thumbnail(id, None)?;
                }
                if deleted {
                    log::info!("Removed stale thumbnail {}", stale);
                    stale_thumbnail_deleted = Some(stale);
                }
            }
        } else if let Some(prior) = prior.as_ref() {
            // The stored thumbnail is authoritative; callers rebuilding a
            // record from form data do not carry it.
            image.thumbnail = prior.thumbnail.clone();
        }

        let id = self.store.put(image)?;

        let mut thumbnail_written = None;
        if image.image.is_some()
            && should_regenerate(is_new, image.thumbnail.is_some(), source_changed)
        {
            thumbnail_written = Some(self.regenerate_thumbnail(id, image)?);
        }

        log::info!(
            "Saved gallery image {} (new: {}, source changed: {}, thumbnail written: {})",
            id,
            is_new,
            source_changed,
            thumbnail_written.is_some()
        );

        Ok(SaveOutcome {
            id,
            stale_thumbnail_deleted,
            thumbnail_written,
        })
    }

    /// Deletes the record, then its thumbnail blob. The source blob is kept.
    pub fn delete_with_thumbnail(&self, id: i64) -> Result<(), GalleryError> {
        let image = self.store.get(id)?;
        self.store.delete(id)?;
        if let Some(thumbnail) = image.thumbnail.as_deref() {
            self.delete_blob_if_exists(thumbnail)?;
        }
        Ok(())
    }

    /// Derives thumbnails for stored images that have a source but no usable
    /// thumbnail. Per-image failures are logged and counted.
    pub fn backfill_thumbnails(&self) -> Result<BackfillReport, GalleryError> {
        let mut report = BackfillReport::default();

        for mut image in self.store.list()? {
            let Some(id) = image.id else { continue };
            if image.image.is_none() {
                continue;
            }
            report.examined += 1;

            let healthy = match image.thumbnail.as_deref() {
                Some(thumbnail) => self.blobs.exists(thumbnail)?,
                None => false,
            };
            if healthy {
                continue;
            }

            match self.regenerate_thumbnail(id, &mut image) {
                Ok(key) => {
                    log::info!("Backfilled thumbnail {} for gallery image {}", key, id);
                    report.regenerated += 1;
                }
                Err(e) => {
                    log::warn!("Could not backfill thumbnail for gallery image {}: {}", id, e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Reads the persisted record to decide whether the source changed.
    /// A missing record counts as changed.
    fn compare_with_stored(
        &self,
        id: i64,
        current_source: Option<&str>,
    ) -> Result<(bool, Option<GalleryImage>), GalleryError> {
        match self.store.get(id) {
            Ok(prior) => Ok((prior.image.as_deref() != current_source, Some(prior))),
            Err(GalleryStoreError::NotFound(_)) => {
                log::warn!("Gallery image {} has no stored state, treating source as changed", id);
                Ok((true, None))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn regenerate_thumbnail(
        &self,
        id: i64,
        image: &mut GalleryImage,
    ) -> Result<String, GalleryError> {
        let source_key = image
            .image
            .clone()
            .ok_or_else(|| GalleryError::InvalidUpload(format!("gallery image {} has no source", id)))?;

        let source = self.blobs.read(&source_key)?;
        let derived = self.deriver.derive(&source_key, &source)?;

        let key = self.blobs.save(
            &format!(
                "{}/{}",
                self.config.thumbnail_dir.trim_end_matches('/'),
                derived.name
            ),
            &derived.bytes,
        )?;
        self.store.set_thumbnail(id, Some(&key))?;
        image.thumbnail = Some(key.clone());
        Ok(key)
    }

    /// Returns whether a blob was actually removed
    fn delete_blob_if_exists(&self, key: &str) -> Result<bool, GalleryError> {
        if !self.blobs.exists(key)? {
            return Ok(false);
        }
        self.blobs.delete(key)?;
        Ok(true)
    }
}
