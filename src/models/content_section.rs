use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// A block of page content, optionally referencing gallery images
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentSection {
    pub id: Option<i64>,
    pub page_id: i64,
    pub content: Option<String>,
    /// Sections are listed in ascending order
    pub order: Option<u32>,
    /// Ids of gallery images shown with the section
    pub image_ids: Vec<i64>,
}

impl ContentSection {
    pub fn new(page_id: i64, content: Option<String>) -> Self {
        Self {
            id: None,
            page_id,
            content,
            order: Some(0),
            image_ids: Vec::new(),
        }
    }
}

impl<'r> TryFrom<&Row<'r>> for ContentSection {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'r>) -> Result<Self, Self::Error> {
        let image_ids_json: String = row.get(4)?;
        let image_ids = serde_json::from_str(&image_ids_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(ContentSection {
            id: Some(row.get(0)?),
            page_id: row.get(1)?,
            content: row.get(2)?,
            order: row.get(3)?,
            image_ids,
        })
    }
}
