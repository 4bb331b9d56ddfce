use crate::error::AppError;
use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// An informational page (SDG goal page, news item, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub id: Option<i64>,
    pub author_id: Option<i64>,
    pub title: String,
    /// Empty until assigned on first save
    pub slug: String,
    pub post_description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Page {
    pub fn new(title: String) -> Self {
        Self {
            id: None,
            author_id: None,
            title,
            slug: String::new(),
            post_description: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn absolute_url(&self) -> String {
        format!("/{}/", self.slug)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }
        if self.title.chars().count() > 255 {
            return Err(AppError::Validation(
                "Title must not exceed 255 characters".to_string(),
            ));
        }
        if self.slug.chars().count() > 255 {
            return Err(AppError::Validation(
                "Slug must not exceed 255 characters".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl<'r> TryFrom<&Row<'r>> for Page {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'r>) -> Result<Self, Self::Error> {
        Ok(Page {
            id: Some(row.get(0)?),
            author_id: row.get(1)?,
            title: row.get(2)?,
            slug: row.get(3)?,
            post_description: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}
