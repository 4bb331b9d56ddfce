use crate::models::GalleryImage;
use rusqlite::{params, Connection, Row};

/// Error type for gallery record storage
#[derive(Debug)]
pub enum GalleryStoreError {
    DatabaseError(rusqlite::Error),
    NotFound(i64),
}

impl std::fmt::Display for GalleryStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GalleryStoreError::DatabaseError(e) => write!(f, "Database error: {}", e),
            GalleryStoreError::NotFound(id) => write!(f, "Gallery image {} not found", id),
        }
    }
}

impl std::error::Error for GalleryStoreError {}

impl From<rusqlite::Error> for GalleryStoreError {
    fn from(err: rusqlite::Error) -> Self {
        GalleryStoreError::DatabaseError(err)
    }
}

/// Persistence for gallery image records
pub trait GalleryImageStore {
    fn get(&self, id: i64) -> Result<GalleryImage, GalleryStoreError>;

    /// Inserts a new record (assigning its id) or updates the non-derived
    /// fields of an existing one. The thumbnail column is left alone on update.
    /// A record carrying an id the store does not know is inserted under it.
    fn put(&self, image: &mut GalleryImage) -> Result<i64, GalleryStoreError>;

    /// Writes only the thumbnail column
    fn set_thumbnail(&self, id: i64, thumbnail: Option<&str>) -> Result<(), GalleryStoreError>;

    fn list(&self) -> Result<Vec<GalleryImage>, GalleryStoreError>;

    fn list_for_page(&self, page_id: i64) -> Result<Vec<GalleryImage>, GalleryStoreError>;

    fn delete(&self, id: i64) -> Result<(), GalleryStoreError>;
}

const SELECT_COLUMNS: &str =
    "SELECT id, page_id, image, thumbnail, title, is_featured, marked_for_deletion FROM gallery_images";

impl TryFrom<&Row<'_>> for GalleryImage {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(GalleryImage {
            id: Some(row.get(0)?),
            page_id: row.get(1)?,
            image: row.get(2)?,
            thumbnail: row.get(3)?,
            title: row.get(4)?,
            is_featured: row.get(5)?,
            marked_for_deletion: row.get(6)?,
        })
    }
}

/// SQLite-backed gallery store borrowing an open connection
pub struct SqliteGalleryStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteGalleryStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn query(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<GalleryImage>, GalleryStoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let images = stmt
            .query_map(params, |row| GalleryImage::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(images)
    }
}

impl GalleryImageStore for SqliteGalleryStore<'_> {
    fn get(&self, id: i64) -> Result<GalleryImage, GalleryStoreError> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                [id],
                |row| GalleryImage::try_from(row),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => GalleryStoreError::NotFound(id),
                _ => GalleryStoreError::DatabaseError(e),
            })
    }

    fn put(&self, image: &mut GalleryImage) -> Result<i64, GalleryStoreError> {
        match image.id {
            None => {
                self.conn.execute(
                    "INSERT INTO gallery_images (page_id, image, thumbnail, title, is_featured, marked_for_deletion)
                     VALUES (?1, ?2, NULL, ?3, ?4, ?5)",
                    params![
                        image.page_id,
                        image.image,
                        image.title,
                        image.is_featured,
                        image.marked_for_deletion,
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                image.id = Some(id);
                image.thumbnail = None;
                Ok(id)
            }
            Some(id) => {
                let rows = self.conn.execute(
                    "UPDATE gallery_images
                     SET page_id = ?1, image = ?2, title = ?3, is_featured = ?4, marked_for_deletion = ?5
                     WHERE id = ?6",
                    params![
                        image.page_id,
                        image.image,
                        image.title,
                        image.is_featured,
                        image.marked_for_deletion,
                        id,
                    ],
                )?;
                if rows == 0 {
                    // Unknown id: store the record under it
                    self.conn.execute(
                        "INSERT INTO gallery_images (id, page_id, image, thumbnail, title, is_featured, marked_for_deletion)
                         VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6)",
                        params![
                            id,
                            image.page_id,
                            image.image,
                            image.title,
                            image.is_featured,
                            image.marked_for_deletion,
                        ],
                    )?;
                    image.thumbnail = None;
                }
                Ok(id)
            }
        }
    }

    fn set_thumbnail(&self, id: i64, thumbnail: Option<&str>) -> Result<(), GalleryStoreError> {
        let rows = self.conn.execute(
            "UPDATE gallery_images SET thumbnail = ?1 WHERE id = ?2",
            params![thumbnail, id],
        )?;
        if rows == 0 {
            return Err(GalleryStoreError::NotFound(id));
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<GalleryImage>, GalleryStoreError> {
        self.query(&format!("{} ORDER BY id", SELECT_COLUMNS), [])
    }

    fn list_for_page(&self, page_id: i64) -> Result<Vec<GalleryImage>, GalleryStoreError> {
        self.query(
            &format!("{} WHERE page_id = ?1 ORDER BY is_featured DESC, id", SELECT_COLUMNS),
            [page_id],
        )
    }

    fn delete(&self, id: i64) -> Result<(), GalleryStoreError> {
        let rows = self
            .conn
            .execute("DELETE FROM gallery_images WHERE id = ?1", [id])?;
        if rows == 0 {
            return Err(GalleryStoreError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tests::setup_test_db;

    #[test]
    fn test_put_and_get() {
        let conn = setup_test_db();
        let store = SqliteGalleryStore::new(&conn);

        let mut image = GalleryImage::new(1);
        image.image = Some("gallery_images/a.jpg".to_string());
        image.title = "Tree planting".to_string();

        let id = store.put(&mut image).unwrap();
        assert_eq!(image.id, Some(id));

        let loaded = store.get(id).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_update_leaves_thumbnail_alone() {
        let conn = setup_test_db();
        let store = SqliteGalleryStore::new(&conn);

        let mut image = GalleryImage::new(1);
        let id = store.put(&mut image).unwrap();
        store.set_thumbnail(id, Some("thumbs/t.jpg")).unwrap();

        image.title = "Renamed".to_string();
        image.thumbnail = Some("bogus".to_string());
        store.put(&mut image).unwrap();

        let loaded = store.get(id).unwrap();
        assert_eq!(loaded.title, "Renamed");
        assert_eq!(loaded.thumbnail.as_deref(), Some("thumbs/t.jpg"));
    }

    #[test]
    fn test_missing_record() {
        let conn = setup_test_db();
        let store = SqliteGalleryStore::new(&conn);

        assert!(matches!(store.get(42), Err(GalleryStoreError::NotFound(42))));
        assert!(matches!(store.delete(42), Err(GalleryStoreError::NotFound(42))));

        assert!(matches!(
            store.set_thumbnail(42, None),
            Err(GalleryStoreError::NotFound(42))
        ));
    }

    #[test]
    fn test_put_with_unknown_id_inserts() {
        let conn = setup_test_db();
        let store = SqliteGalleryStore::new(&conn);

        let mut image = GalleryImage::new(1);
        image.id = Some(42);
        image.thumbnail = Some("thumbs/stale.jpg".to_string());

        assert_eq!(store.put(&mut image).unwrap(), 42);
        assert_eq!(image.thumbnail, None);
        assert_eq!(store.get(42).unwrap().thumbnail, None);
    }

    #[test]
    fn test_list_for_page_puts_featured_first() {
        let conn = setup_test_db();
        let store = SqliteGalleryStore::new(&conn);

        let mut plain = GalleryImage::new(1);
        store.put(&mut plain).unwrap();
        let mut featured = GalleryImage::new(1);
        featured.is_featured = true;
        store.put(&mut featured).unwrap();

        let listed = store.list_for_page(1).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, featured.id);
        assert_eq!(store.list().unwrap()[0].id, plain.id);
    }
}
