use crate::config::CmsConfig;
use crate::error::AppError;
use crate::filesystem::media_storage;
use crate::services::page_service::get_page;
use gallery_thumbnails::{
    BlobStorage, FsBlobStorage, GalleryError, GalleryImage, GalleryImageStore, GalleryService,
    SaveOutcome, SqliteGalleryStore,
};
use rusqlite::Connection;

pub type CmsGallery<'c> = GalleryService<SqliteGalleryStore<'c>, FsBlobStorage>;

/// Gallery service over the CMS database and the configured media directory
pub fn open_gallery<'c>(conn: &'c Connection, config: &CmsConfig) -> Result<CmsGallery<'c>, AppError> {
    let blobs = media_storage(config).map_err(GalleryError::from)?;
    Ok(GalleryService::new(
        SqliteGalleryStore::new(conn),
        blobs,
        config.gallery.clone(),
    ))
}

/// Uploads an image to a page's gallery and derives its thumbnail
pub fn add_gallery_image<S: GalleryImageStore, B: BlobStorage>(
    conn: &Connection,
    gallery: &GalleryService<S, B>,
    page_id: i64,
    title: &str,
    filename: &str,
    bytes: &[u8],
) -> Result<GalleryImage, AppError> {
    // Fail early with a readable error instead of a foreign-key violation
    get_page(conn, page_id)?;

    let mut image = GalleryImage::new(page_id);
    image.title = title.to_string();
    gallery.attach_upload(&mut image, filename, bytes)?;
    gallery.save_with_thumbnail(&mut image)?;
    Ok(image)
}

/// Replaces the source image of an existing gallery entry
pub fn replace_gallery_image<S: GalleryImageStore, B: BlobStorage>(
    gallery: &GalleryService<S, B>,
    image_id: i64,
    filename: &str,
    bytes: &[u8],
) -> Result<SaveOutcome, AppError> {
    let mut image = gallery.store().get(image_id).map_err(GalleryError::from)?;
    gallery.attach_upload(&mut image, filename, bytes)?;
    Ok(gallery.save_with_thumbnail(&mut image)?)
}

/// Gallery of a page, featured images first
pub fn page_gallery<S: GalleryImageStore, B: BlobStorage>(
    gallery: &GalleryService<S, B>,
    page_id: i64,
) -> Result<Vec<GalleryImage>, AppError> {
    Ok(gallery
        .store()
        .list_for_page(page_id)
        .map_err(GalleryError::from)?)
}
