use crate::error::AppError;
use crate::models::Category;
use rusqlite::{params, Connection};

/// Inserts or updates a category. `category_name` is derived from the goal first.
pub fn save_category(conn: &Connection, category: &mut Category) -> Result<i64, AppError> {
    category.derive_name();
    let goal_number = category.goal.map(|g| g.number());

    match category.id {
        None => {
            conn.execute(
                "INSERT INTO categories (page_id, goal_number, category_name) VALUES (?1, ?2, ?3)",
                params![category.page_id, goal_number, category.category_name],
            )?;
            let id = conn.last_insert_rowid();
            category.id = Some(id);
            Ok(id)
        }
        Some(id) => {
            let rows_affected = conn.execute(
                "UPDATE categories SET page_id = ?1, goal_number = ?2, category_name = ?3 WHERE id = ?4",
                params![category.page_id, goal_number, category.category_name, id],
            )?;
            if rows_affected == 0 {
                return Err(AppError::NotFound("Category".to_string()));
            }
            Ok(id)
        }
    }
}

/// Categories of a page, by goal number
pub fn list_categories_for_page(
    conn: &Connection,
    page_id: i64,
) -> Result<Vec<Category>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, page_id, goal_number, category_name
         FROM categories WHERE page_id = ?1
         ORDER BY goal_number, id",
    )?;

    let categories = stmt
        .query_map([page_id], |row| Category::try_from(row))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(categories)
}

pub fn delete_category(conn: &Connection, id: i64) -> Result<(), AppError> {
    let rows_affected = conn.execute("DELETE FROM categories WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(AppError::NotFound("Category".to_string()));
    }

    Ok(())
}
