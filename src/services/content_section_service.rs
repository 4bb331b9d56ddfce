use crate::error::AppError;
use crate::models::ContentSection;
use rusqlite::{params, Connection};

/// Inserts or updates a content section
pub fn save_section(conn: &Connection, section: &mut ContentSection) -> Result<i64, AppError> {
    let image_ids = serde_json::to_string(&section.image_ids)?;

    match section.id {
        None => {
            conn.execute(
                "INSERT INTO content_sections (page_id, content, sort_order, image_ids)
                 VALUES (?1, ?2, ?3, ?4)",
                params![section.page_id, section.content, section.order, image_ids],
            )?;
            let id = conn.last_insert_rowid();
            section.id = Some(id);
            Ok(id)
        }
        Some(id) => {
            let rows_affected = conn.execute(
                "UPDATE content_sections
                 SET page_id = ?1, content = ?2, sort_order = ?3, image_ids = ?4
                 WHERE id = ?5",
                params![section.page_id, section.content, section.order, image_ids, id],
            )?;
            if rows_affected == 0 {
                return Err(AppError::NotFound("Content section".to_string()));
            }
            Ok(id)
        }
    }
}

/// Sections of a page in display order
pub fn list_sections(conn: &Connection, page_id: i64) -> Result<Vec<ContentSection>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, page_id, content, sort_order, image_ids
         FROM content_sections WHERE page_id = ?1
         ORDER BY sort_order, id",
    )?;

    let sections = stmt
        .query_map([page_id], |row| ContentSection::try_from(row))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(sections)
}

pub fn delete_section(conn: &Connection, id: i64) -> Result<(), AppError> {
    let rows_affected = conn.execute("DELETE FROM content_sections WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(AppError::NotFound("Content section".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::init_in_memory;
    use crate::models::Page;
    use crate::services::page_service::create_page;

    #[test]
    fn test_sections_listed_in_order() {
        let conn = init_in_memory().unwrap();
        let page_id = create_page(&conn, &mut Page::new("Health".to_string())).unwrap();

        let mut second = ContentSection::new(page_id, Some("Second".to_string()));
        second.order = Some(2);
        second.image_ids = vec![4, 7];
        save_section(&conn, &mut second).unwrap();

        let mut first = ContentSection::new(page_id, Some("First".to_string()));
        first.order = Some(1);
        save_section(&conn, &mut first).unwrap();

        let sections = list_sections(&conn, page_id).unwrap();
        let contents: Vec<_> = sections.iter().map(|s| s.content.as_deref()).collect();
        assert_eq!(contents, [Some("First"), Some("Second")]);
        assert_eq!(sections[1].image_ids, vec![4, 7]);
        assert!(sections[0].image_ids.is_empty());
    }

    #[test]
    fn test_update_and_delete_section() {
        let conn = init_in_memory().unwrap();
        let page_id = create_page(&conn, &mut Page::new("Water".to_string())).unwrap();

        let mut section = ContentSection::new(page_id, None);
        let id = save_section(&conn, &mut section).unwrap();
        section.content = Some("Updated".to_string());
        save_section(&conn, &mut section).unwrap();

        assert_eq!(
            list_sections(&conn, page_id).unwrap()[0].content.as_deref(),
            Some("Updated")
        );

        delete_section(&conn, id).unwrap();
        assert!(list_sections(&conn, page_id).unwrap().is_empty());
    }
}
