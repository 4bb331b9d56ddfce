use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollegeDepartment {
    pub id: Option<i64>,
    pub department_name: Option<String>,
}

impl std::fmt::Display for CollegeDepartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.department_name.as_deref().unwrap_or("Unnamed Department"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollegeCourse {
    pub id: Option<i64>,
    pub course_short_name: Option<String>,
    /// Blob key below `programs_images/`
    pub course_image: Option<String>,
    pub course_name: Option<String>,
    pub department_id: Option<i64>,
}

impl std::fmt::Display for CollegeCourse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self
            .course_short_name
            .as_deref()
            .or(self.course_name.as_deref())
            .unwrap_or("Unnamed Course");
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShsTrack {
    pub id: Option<i64>,
    pub track_name: Option<String>,
}

impl std::fmt::Display for ShsTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.track_name.as_deref().unwrap_or("Unnamed Track"))
    }
}

/// Senior-high strand within a track
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShsStrand {
    pub id: Option<i64>,
    pub strand_name: Option<String>,
    pub track_id: Option<i64>,
    pub strand_image: Option<String>,
}

impl std::fmt::Display for ShsStrand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.strand_name.as_deref().unwrap_or("Unnamed Strand"))
    }
}

/// An offered program: either a college course or an SHS strand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Program {
    pub id: Option<i64>,
    pub college_course_id: Option<i64>,
    pub shs_strand_id: Option<i64>,
    /// Free-form program type, e.g. "college" or "shs"
    pub kind: Option<String>,
    pub status: String,
}

impl Program {
    pub fn new(kind: Option<String>) -> Self {
        Self {
            id: None,
            college_course_id: None,
            shs_strand_id: None,
            kind,
            status: "Pending".to_string(),
        }
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind.as_deref().filter(|k| !k.is_empty()) {
            Some(kind) => write!(f, "{} Program", capitalize(kind)),
            None => f.write_str("Unnamed Program"),
        }
    }
}

/// First character upper-cased, the rest lower-cased
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgramsPageContent {
    pub id: Option<i64>,
    pub description: Option<String>,
    pub description_img: Option<String>,
    pub skills: Vec<String>,
    pub skills_img: Option<String>,
    pub career_opportunities: Vec<String>,
    pub related_articles: Option<Vec<String>>,
}

impl std::fmt::Display for ProgramsPageContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "Content ID {}", id),
            None => f.write_str("Content ID None"),
        }
    }
}

/// Landing page of a program, addressed by slug
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgramsPage {
    pub id: Option<i64>,
    pub slug: String,
    pub program_id: Option<i64>,
    pub content_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgramsPage {
    pub fn new(slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            slug,
            program_id: None,
            content_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn absolute_url(&self) -> String {
        format!("/{}/", self.slug)
    }
}

impl<'r> TryFrom<&Row<'r>> for ProgramsPage {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'r>) -> Result<Self, Self::Error> {
        Ok(ProgramsPage {
            id: Some(row.get(0)?),
            slug: row.get(1)?,
            program_id: row.get(2)?,
            content_id: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}
