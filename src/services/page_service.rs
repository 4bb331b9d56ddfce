use crate::error::AppError;
use crate::models::Page;
use crate::slug::ensure_unique_slug;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

const SELECT_PAGE: &str =
    "SELECT id, author_id, title, slug, post_description, created_at, updated_at FROM pages";

fn slug_taken(conn: &Connection, slug: &str) -> Result<bool, AppError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM pages WHERE slug = ?1)",
        [slug],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Fills an empty slug from the title. A title without usable characters
/// is rejected.
fn assign_slug(conn: &Connection, page: &mut Page) -> Result<(), AppError> {
    if page.slug.trim().is_empty() {
        page.slug = ensure_unique_slug(&page.title, |s| slug_taken(conn, s))?;
        if page.slug.is_empty() {
            return Err(AppError::Validation(
                "Title must contain at least one letter or digit".to_string(),
            ));
        }
    }
    Ok(())
}

/// Creates a page. An empty slug is generated from the title and made unique.
pub fn create_page(conn: &Connection, page: &mut Page) -> Result<i64, AppError> {
    page.validate()?;
    assign_slug(conn, page)?;

    let now = Utc::now();
    page.created_at = page.created_at.or(Some(now));
    page.updated_at = page.updated_at.or(Some(now));

    conn.execute(
        "INSERT INTO pages (author_id, title, slug, post_description, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            page.author_id,
            page.title,
            page.slug,
            page.post_description,
            page.created_at,
            page.updated_at,
        ],
    )?;

    let id = conn.last_insert_rowid();
    page.id = Some(id);
    log::info!("Created page {} at {}", id, page.absolute_url());
    Ok(id)
}

/// Loads a page by id
pub fn get_page(conn: &Connection, id: i64) -> Result<Page, AppError> {
    conn.query_row(&format!("{} WHERE id = ?1", SELECT_PAGE), [id], |row| {
        Page::try_from(row)
    })
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound("Page".to_string()),
        _ => AppError::Database(e),
    })
}

/// Loads a page by slug, `None` if no page uses it
pub fn find_page_by_slug(conn: &Connection, slug: &str) -> Result<Option<Page>, AppError> {
    let page = conn
        .query_row(&format!("{} WHERE slug = ?1", SELECT_PAGE), [slug], |row| {
            Page::try_from(row)
        })
        .optional()?;
    Ok(page)
}

/// Updates title, slug, author and description; stamps `updated_at`
pub fn update_page(conn: &Connection, page: &mut Page) -> Result<(), AppError> {
    page.validate()?;

    let id = page
        .id
        .ok_or_else(|| AppError::Validation("Page must have an ID".to_string()))?;

    assign_slug(conn, page)?;
    page.updated_at = Some(Utc::now());

    let rows_affected = conn.execute(
        "UPDATE pages
         SET author_id = ?1, title = ?2, slug = ?3, post_description = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            page.author_id,
            page.title,
            page.slug,
            page.post_description,
            page.updated_at,
            id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(AppError::NotFound("Page".to_string()));
    }

    Ok(())
}

/// Deletes a page; categories, sections and gallery rows cascade
pub fn delete_page(conn: &Connection, id: i64) -> Result<(), AppError> {
    let rows_affected = conn.execute("DELETE FROM pages WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(AppError::NotFound("Page".to_string()));
    }

    Ok(())
}

pub fn list_pages(conn: &Connection) -> Result<Vec<Page>, AppError> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY title", SELECT_PAGE))?;

    let pages = stmt
        .query_map([], |row| Page::try_from(row))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(pages)
}
