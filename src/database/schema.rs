use rusqlite::{Connection, Result};

/// Initialize the complete CMS schema, including the gallery tables
pub fn init_schema(conn: &Connection) -> Result<()> {
    // Enable foreign keys
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    // Schema version table for future migrations
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        create_schema(conn)?;
        conn.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
    }

    // Gallery images reference pages, so they come last
    gallery_thumbnails::init_gallery_schema(conn)?;

    Ok(())
}

/// Create the complete schema (version 1)
fn create_schema(conn: &Connection) -> Result<()> {
    // Table: pages (SDG goal pages and other informational pages)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS pages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id INTEGER,
            title TEXT NOT NULL CHECK(length(title) <= 255),
            slug TEXT NOT NULL UNIQUE CHECK(length(slug) <= 255),
            post_description TEXT,
            created_at TEXT,
            updated_at TEXT
        )",
        [],
    )?;

    // Table: categories (SDG goal assigned to a page)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            page_id INTEGER NOT NULL,
            goal_number INTEGER CHECK(goal_number BETWEEN 1 AND 17),
            category_name TEXT,
            FOREIGN KEY (page_id) REFERENCES pages(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_categories_page ON categories(page_id)",
        [],
    )?;

    // Table: content_sections (ordered body blocks of a page)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS content_sections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            page_id INTEGER NOT NULL,
            content TEXT,
            sort_order INTEGER DEFAULT 0 CHECK(sort_order IS NULL OR sort_order >= 0),
            image_ids TEXT NOT NULL DEFAULT '[]',
            FOREIGN KEY (page_id) REFERENCES pages(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_content_sections_page ON content_sections(page_id, sort_order)",
        [],
    )?;

    // Programs: departments, courses, SHS tracks and strands
    conn.execute(
        "CREATE TABLE IF NOT EXISTS college_departments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            department_name TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS college_courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_short_name TEXT,
            course_image TEXT,
            course_name TEXT,
            department_id INTEGER,
            FOREIGN KEY (department_id) REFERENCES college_departments(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS shs_tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            track_name TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS shs_strands (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            strand_name TEXT,
            track_id INTEGER,
            strand_image TEXT,
            FOREIGN KEY (track_id) REFERENCES shs_tracks(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS programs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            college_course_id INTEGER,
            shs_strand_id INTEGER,
            kind TEXT,
            status TEXT NOT NULL DEFAULT 'Pending',
            FOREIGN KEY (college_course_id) REFERENCES college_courses(id) ON DELETE CASCADE,
            FOREIGN KEY (shs_strand_id) REFERENCES shs_strands(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS programs_page_contents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT,
            description_img TEXT,
            skills TEXT NOT NULL DEFAULT '[]',
            skills_img TEXT,
            career_opportunities TEXT NOT NULL DEFAULT '[]',
            related_articles TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS programs_pages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT NOT NULL UNIQUE CHECK(length(slug) <= 255),
            program_id INTEGER,
            content_id INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (program_id) REFERENCES programs(id) ON DELETE CASCADE,
            FOREIGN KEY (content_id) REFERENCES programs_page_contents(id) ON DELETE CASCADE
        )",
        [],
    )?;

    Ok(())
}
