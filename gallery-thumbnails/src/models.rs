use serde::{Deserialize, Serialize};

/// A gallery image attached to a page, with its derived thumbnail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GalleryImage {
    /// Assigned by the store on first save
    pub id: Option<i64>,
    pub page_id: i64,
    /// Blob key of the uploaded source image
    pub image: Option<String>,
    /// Blob key of the derived thumbnail, never set by callers
    pub thumbnail: Option<String>,
    pub title: String,
    pub is_featured: bool,
    pub marked_for_deletion: bool,
}

impl GalleryImage {
    pub fn new(page_id: i64) -> Self {
        Self {
            id: None,
            page_id,
            image: None,
            thumbnail: None,
            title: String::new(),
            is_featured: false,
            marked_for_deletion: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Title, or a fallback naming the owning page
    pub fn display_name(&self, page_title: &str) -> String {
        if self.title.is_empty() {
            format!("Image for {}", page_title)
        } else {
            self.title.clone()
        }
    }
}

/// What a call to `save_with_thumbnail` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: i64,
    /// Key of the stale thumbnail removed before the write, if any
    pub stale_thumbnail_deleted: Option<String>,
    /// Key of the freshly written thumbnail, if derivation ran
    pub thumbnail_written: Option<String>,
}

/// Counters returned by a thumbnail backfill run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub examined: usize,
    pub regenerated: usize,
    pub failed: usize,
}

/// Configuration for the gallery service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GalleryConfig {
    /// Key prefix for uploaded source images
    pub upload_dir: String,
    /// Key prefix for derived thumbnails
    pub thumbnail_dir: String,
    pub thumbnail_max_width: u32,
    pub thumbnail_max_height: u32,
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            upload_dir: "gallery_images".to_string(),
            thumbnail_dir: "gallery_images/thumbnails".to_string(),
            thumbnail_max_width: 400,
            thumbnail_max_height: 400,
            jpeg_quality: 100,
        }
    }
}
