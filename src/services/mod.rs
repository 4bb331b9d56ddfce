pub mod category_service;
pub mod content_section_service;
pub mod gallery_service;
pub mod page_service;
pub mod program_service;

pub use category_service::*;
pub use content_section_service::*;
pub use gallery_service::*;
pub use page_service::*;
