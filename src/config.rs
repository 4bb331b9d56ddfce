use crate::error::AppError;
use gallery_thumbnails::GalleryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "CAMPUS_CMS_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "./campus-cms.toml";

/// Backend configuration, read from TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CmsConfig {
    pub database_path: PathBuf,
    /// Root directory of the media blob store
    pub media_root: PathBuf,
    pub gallery: GalleryConfig,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./data/campus-cms.db"),
            media_root: PathBuf::from("./data/media"),
            gallery: GalleryConfig::default(),
        }
    }
}

impl CmsConfig {
    pub fn from_toml(s: &str) -> Result<Self, AppError> {
        let config: CmsConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(AppError::Filesystem(e)),
        }
    }

    /// Loads the file named by `CAMPUS_CMS_CONFIG`, or `./campus-cms.toml`
    pub fn from_env() -> Result<Self, AppError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load(&path)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let gallery = &self.gallery;
        if gallery.thumbnail_max_width == 0 || gallery.thumbnail_max_height == 0 {
            return Err(AppError::Config(
                "thumbnail bounds must be at least 1px".to_string(),
            ));
        }
        if !(1..=100).contains(&gallery.jpeg_quality) {
            return Err(AppError::Config(
                "jpeg_quality must be between 1 and 100".to_string(),
            ));
        }
        if gallery.upload_dir.trim().is_empty() || gallery.thumbnail_dir.trim().is_empty() {
            return Err(AppError::Config(
                "upload_dir and thumbnail_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
