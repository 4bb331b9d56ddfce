pub mod category;
pub mod content_section;
pub mod page;
pub mod program;

pub use category::{Category, SdgGoal};
pub use content_section::ContentSection;
pub use page::Page;
pub use program::{
    CollegeCourse, CollegeDepartment, Program, ProgramsPage, ProgramsPageContent, ShsStrand,
    ShsTrack,
};
