//! # Campus CMS
//!
//! Content backend for an institutional website: informational pages, SDG goal
//! categories, ordered content sections, programs, and page image galleries
//! whose thumbnails are derived on save (see the `gallery-thumbnails` crate).

pub mod config;
pub mod database;
pub mod error;
pub mod filesystem;
pub mod models;
pub mod services;
pub mod slug;

pub use config::CmsConfig;
pub use error::AppError;
