use std::fmt;

use gallery_thumbnails::GalleryError;

/// Central error types for the CMS backend
#[derive(Debug)]
pub enum AppError {
    /// Database error (rusqlite)
    Database(rusqlite::Error),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Gallery or thumbnail error
    Gallery(GalleryError),
    /// Configuration file could not be parsed
    Config(String),
    /// Validation error (e.g. invalid inputs)
    Validation(String),
    /// Resource not found
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Gallery(e) => write!(f, "Gallery error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

impl From<GalleryError> for AppError {
    fn from(e: GalleryError) -> Self {
        AppError::Gallery(e)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Validation(format!("Invalid JSON value: {}", e))
    }
}

/// Messages safe to show to site editors
impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => "A database error occurred. Please try again.".to_string(),
            AppError::Filesystem(_) => {
                "Error accessing files. Please check the media directory permissions.".to_string()
            }
            AppError::Gallery(GalleryError::ThumbnailError(_)) => {
                "The image could not be processed. Please upload a different file.".to_string()
            }
            AppError::Gallery(_) => "Error storing the image.".to_string(),
            AppError::Config(_) => "The server is misconfigured.".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => format!("{} was not found.", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_thumbnails::ThumbnailError;

    #[test]
    fn test_user_message_hides_internals() {
        let err = AppError::Gallery(GalleryError::ThumbnailError(ThumbnailError::ImageDecode(
            "bad huffman table".to_string(),
        )));
        assert!(!err.user_message().contains("huffman"));
        assert!(err.to_string().contains("huffman"));

        let err = AppError::NotFound("Page".to_string());
        assert_eq!(err.user_message(), "Page was not found.");
    }
}
