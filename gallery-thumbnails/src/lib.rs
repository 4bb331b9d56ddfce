//! # Gallery Thumbnails
//!
//! Gallery image records whose thumbnails are derived when the record is saved.
//!
//! This crate provides:
//! - Thumbnail derivation (EXIF orientation correction, bounded Lanczos resize, JPEG)
//! - Blob storage for source images and thumbnails (filesystem or in-memory)
//! - SQLite persistence of gallery image records
//! - The save orchestration that keeps a record's thumbnail in step with its source
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use gallery_thumbnails::{FsBlobStorage, GalleryConfig, GalleryImage, GalleryService, SqliteGalleryStore};
//!
//! let service = GalleryService::new(
//!     SqliteGalleryStore::new(&conn),
//!     FsBlobStorage::new("/srv/media"),
//!     GalleryConfig::default(),
//! );
//!
//! let mut image = GalleryImage::new(page_id);
//! service.attach_upload(&mut image, "photo.jpg", &bytes)?;
//! service.save_with_thumbnail(&mut image)?;
//! ```

pub mod models;
pub mod schema;
pub mod service;
pub mod storage;
pub mod store;
pub mod thumbnail;

pub use models::{BackfillReport, GalleryConfig, GalleryImage, SaveOutcome};
pub use schema::init_gallery_schema;
pub use service::{GalleryError, GalleryService};
pub use storage::{BlobError, BlobStorage, FsBlobStorage, MemoryBlobStorage};
pub use store::{GalleryImageStore, GalleryStoreError, SqliteGalleryStore};
pub use thumbnail::{should_regenerate, thumbnail_name, DerivedThumbnail, ThumbnailDeriver, ThumbnailError};
