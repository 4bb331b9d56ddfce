use rusqlite::{Connection, Result};

/// Initialize the gallery image schema.
///
/// Expects the host application's `pages` table (integer `id` primary key) to
/// exist already; gallery images cascade with their page.
pub fn init_gallery_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS gallery_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT version FROM gallery_schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        create_gallery_schema_v1(conn)?;
        conn.execute("INSERT INTO gallery_schema_version (version) VALUES (1)", [])?;
    }

    Ok(())
}

fn create_gallery_schema_v1(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS gallery_images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            page_id INTEGER NOT NULL,
            image TEXT,
            thumbnail TEXT,
            title TEXT NOT NULL DEFAULT '' CHECK(length(title) <= 255),
            is_featured INTEGER NOT NULL DEFAULT 0 CHECK(is_featured IN (0,1)),
            marked_for_deletion INTEGER NOT NULL DEFAULT 0 CHECK(marked_for_deletion IN (0,1)),
            FOREIGN KEY (page_id) REFERENCES pages(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_gallery_images_page ON gallery_images(page_id)",
        [],
    )?;

    Ok(())
}
