use crate::error::AppError;
use crate::filesystem::store_program_image;
use crate::models::{
    CollegeCourse, CollegeDepartment, Program, ProgramsPage, ProgramsPageContent, ShsStrand,
    ShsTrack,
};
use crate::slug::ensure_unique_slug;
use chrono::Utc;
use gallery_thumbnails::{BlobStorage, GalleryError};
use rusqlite::{params, Connection, OptionalExtension};

pub fn create_department(
    conn: &Connection,
    department: &mut CollegeDepartment,
) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO college_departments (department_name) VALUES (?1)",
        [&department.department_name],
    )?;
    let id = conn.last_insert_rowid();
    department.id = Some(id);
    Ok(id)
}

pub fn create_course(conn: &Connection, course: &mut CollegeCourse) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO college_courses (course_short_name, course_image, course_name, department_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            course.course_short_name,
            course.course_image,
            course.course_name,
            course.department_id,
        ],
    )?;
    let id = conn.last_insert_rowid();
    course.id = Some(id);
    Ok(id)
}

pub fn list_courses_for_department(
    conn: &Connection,
    department_id: i64,
) -> Result<Vec<CollegeCourse>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, course_short_name, course_image, course_name, department_id
         FROM college_courses WHERE department_id = ?1 ORDER BY id",
    )?;
    let courses = stmt
        .query_map([department_id], |row| {
            Ok(CollegeCourse {
                id: Some(row.get(0)?),
                course_short_name: row.get(1)?,
                course_image: row.get(2)?,
                course_name: row.get(3)?,
                department_id: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(courses)
}

/// Stores a course image under a fresh `programs_images/` key and records it
pub fn upload_course_image(
    conn: &Connection,
    blobs: &impl BlobStorage,
    course: &mut CollegeCourse,
    filename: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let id = course
        .id
        .ok_or_else(|| AppError::Validation("Course must be saved first".to_string()))?;
    let key = store_program_image(blobs, filename, bytes).map_err(GalleryError::from)?;
    conn.execute(
        "UPDATE college_courses SET course_image = ?1 WHERE id = ?2",
        params![key, id],
    )?;
    course.course_image = Some(key.clone());
    Ok(key)
}

pub fn create_track(conn: &Connection, track: &mut ShsTrack) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO shs_tracks (track_name) VALUES (?1)",
        [&track.track_name],
    )?;
    let id = conn.last_insert_rowid();
    track.id = Some(id);
    Ok(id)
}

pub fn create_strand(conn: &Connection, strand: &mut ShsStrand) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO shs_strands (strand_name, track_id, strand_image) VALUES (?1, ?2, ?3)",
        params![strand.strand_name, strand.track_id, strand.strand_image],
    )?;
    let id = conn.last_insert_rowid();
    strand.id = Some(id);
    Ok(id)
}

/// Stores a strand image under a fresh `programs_images/` key and records it
pub fn upload_strand_image(
    conn: &Connection,
    blobs: &impl BlobStorage,
    strand: &mut ShsStrand,
    filename: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let id = strand
        .id
        .ok_or_else(|| AppError::Validation("Strand must be saved first".to_string()))?;
    let key = store_program_image(blobs, filename, bytes).map_err(GalleryError::from)?;
    conn.execute(
        "UPDATE shs_strands SET strand_image = ?1 WHERE id = ?2",
        params![key, id],
    )?;
    strand.strand_image = Some(key.clone());
    Ok(key)
}

pub fn create_program(conn: &Connection, program: &mut Program) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO programs (college_course_id, shs_strand_id, kind, status) VALUES (?1, ?2, ?3, ?4)",
        params![
            program.college_course_id,
            program.shs_strand_id,
            program.kind,
            program.status,
        ],
    )?;
    let id = conn.last_insert_rowid();
    program.id = Some(id);
    Ok(id)
}

pub fn get_program(conn: &Connection, id: i64) -> Result<Program, AppError> {
    conn.query_row(
        "SELECT id, college_course_id, shs_strand_id, kind, status FROM programs WHERE id = ?1",
        [id],
        |row| {
            Ok(Program {
                id: Some(row.get(0)?),
                college_course_id: row.get(1)?,
                shs_strand_id: row.get(2)?,
                kind: row.get(3)?,
                status: row.get(4)?,
            })
        },
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound("Program".to_string()),
        _ => AppError::Database(e),
    })
}

pub fn create_page_content(
    conn: &Connection,
    content: &mut ProgramsPageContent,
) -> Result<i64, AppError> {
    let related_articles = content
        .related_articles
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO programs_page_contents
            (description, description_img, skills, skills_img, career_opportunities, related_articles)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            content.description,
            content.description_img,
            serde_json::to_string(&content.skills)?,
            content.skills_img,
            serde_json::to_string(&content.career_opportunities)?,
            related_articles,
        ],
    )?;
    let id = conn.last_insert_rowid();
    content.id = Some(id);
    Ok(id)
}

/// Image slots of a program page's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentImage {
    Description,
    Skills,
}

/// Stores a content image under a fresh `programs_images/` key and records it
pub fn upload_page_content_image(
    conn: &Connection,
    blobs: &impl BlobStorage,
    content: &mut ProgramsPageContent,
    slot: ContentImage,
    filename: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let id = content
        .id
        .ok_or_else(|| AppError::Validation("Page content must be saved first".to_string()))?;
    let key = store_program_image(blobs, filename, bytes).map_err(GalleryError::from)?;
    let (sql, field) = match slot {
        ContentImage::Description => (
            "UPDATE programs_page_contents SET description_img = ?1 WHERE id = ?2",
            &mut content.description_img,
        ),
        ContentImage::Skills => (
            "UPDATE programs_page_contents SET skills_img = ?1 WHERE id = ?2",
            &mut content.skills_img,
        ),
    };
    conn.execute(sql, params![key, id])?;
    *field = Some(key.clone());
    Ok(key)
}

pub fn get_page_content(conn: &Connection, id: i64) -> Result<ProgramsPageContent, AppError> {
    let row = conn
        .query_row(
            "SELECT id, description, description_img, skills, skills_img, career_opportunities, related_articles
             FROM programs_page_contents WHERE id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                ))
            },
        )
        .optional()?;

    let (id, description, description_img, skills, skills_img, careers, related) =
        row.ok_or_else(|| AppError::NotFound("Program page content".to_string()))?;

    Ok(ProgramsPageContent {
        id: Some(id),
        description,
        description_img,
        skills: serde_json::from_str(&skills)?,
        skills_img,
        career_opportunities: serde_json::from_str(&careers)?,
        related_articles: related.as_deref().map(serde_json::from_str).transpose()?,
    })
}

/// Creates a program page. An empty slug is derived from `title` and made unique.
pub fn create_programs_page(
    conn: &Connection,
    page: &mut ProgramsPage,
    title: &str,
) -> Result<i64, AppError> {
    if page.slug.trim().is_empty() {
        page.slug = ensure_unique_slug(title, |s| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM programs_pages WHERE slug = ?1)",
                [s],
                |row| row.get::<_, bool>(0),
            )
        })?;
    }
    if page.slug.is_empty() {
        return Err(AppError::Validation("Program page needs a slug".to_string()));
    }

    let now = Utc::now();
    page.updated_at = now;

    conn.execute(
        "INSERT INTO programs_pages (slug, program_id, content_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            page.slug,
            page.program_id,
            page.content_id,
            page.created_at,
            page.updated_at,
        ],
    )?;
    let id = conn.last_insert_rowid();
    page.id = Some(id);
    log::info!("Created program page {} at {}", id, page.absolute_url());
    Ok(id)
}

/// Looks up a program page by slug
pub fn find_programs_page_by_slug(
    conn: &Connection,
    slug: &str,
) -> Result<Option<ProgramsPage>, AppError> {
    let page = conn
        .query_row(
            "SELECT id, slug, program_id, content_id, created_at, updated_at
             FROM programs_pages WHERE slug = ?1",
            [slug],
            |row| ProgramsPage::try_from(row),
        )
        .optional()?;
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::init_in_memory;
    use gallery_thumbnails::MemoryBlobStorage;

    fn nursing_program(conn: &Connection) -> i64 {
        let mut department = CollegeDepartment {
            id: None,
            department_name: Some("College of Health Sciences".to_string()),
        };
        let department_id = create_department(conn, &mut department).unwrap();

        let mut course = CollegeCourse {
            id: None,
            course_short_name: Some("BSN".to_string()),
            course_image: None,
            course_name: Some("Bachelor of Science in Nursing".to_string()),
            department_id: Some(department_id),
        };
        let course_id = create_course(conn, &mut course).unwrap();

        let mut program = Program::new(Some("college".to_string()));
        program.college_course_id = Some(course_id);
        create_program(conn, &mut program).unwrap()
    }

    #[test]
    fn test_program_roundtrip() {
        let conn = init_in_memory().unwrap();
        let id = nursing_program(&conn);

        let program = get_program(&conn, id).unwrap();
        assert_eq!(program.status, "Pending");
        assert_eq!(program.to_string(), "College Program");
        assert!(matches!(get_program(&conn, 99), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_course_image_upload() {
        let conn = init_in_memory().unwrap();
        let blobs = MemoryBlobStorage::new();
        let mut course = CollegeCourse {
            id: None,
            course_short_name: Some("BSA".to_string()),
            course_image: None,
            course_name: None,
            department_id: None,
        };
        let id = create_course(&conn, &mut course).unwrap();

        let key = upload_course_image(&conn, &blobs, &mut course, "cover.JPG", b"jpeg").unwrap();

        assert!(key.starts_with("programs_images/"));
        assert!(key.ends_with(".JPG"));
        assert_eq!(course.course_image.as_deref(), Some(key.as_str()));
        assert_eq!(blobs.read(&key).unwrap(), b"jpeg");
        let stored: Option<String> = conn
            .query_row(
                "SELECT course_image FROM college_courses WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, Some(key));
    }

    #[test]
    fn test_strand_image_upload_needs_saved_strand() {
        let conn = init_in_memory().unwrap();
        let blobs = MemoryBlobStorage::new();
        let mut strand = ShsStrand {
            id: None,
            strand_name: Some("ABM".to_string()),
            track_id: None,
            strand_image: None,
        };
        assert!(matches!(
            upload_strand_image(&conn, &blobs, &mut strand, "abm.png", b"png"),
            Err(AppError::Validation(_))
        ));
        assert!(blobs.is_empty());

        create_strand(&conn, &mut strand).unwrap();
        let key = upload_strand_image(&conn, &blobs, &mut strand, "abm.png", b"png").unwrap();
        assert_eq!(strand.strand_image, Some(key));
    }

    #[test]
    fn test_page_content_json_fields() {
        let conn = init_in_memory().unwrap();
        let mut content = ProgramsPageContent {
            description: Some("Care for communities".to_string()),
            skills: vec!["Patient assessment".to_string(), "Pharmacology".to_string()],
            career_opportunities: vec!["Staff nurse".to_string()],
            ..ProgramsPageContent::default()
        };
        let id = create_page_content(&conn, &mut content).unwrap();

        let loaded = get_page_content(&conn, id).unwrap();
        assert_eq!(loaded, content);
        assert_eq!(loaded.related_articles, None);
    }

    #[test]
    fn test_page_content_images() {
        let conn = init_in_memory().unwrap();
        let blobs = MemoryBlobStorage::new();
        let mut content = ProgramsPageContent::default();
        create_page_content(&conn, &mut content).unwrap();

        let skills = upload_page_content_image(
            &conn,
            &blobs,
            &mut content,
            ContentImage::Skills,
            "lab.webp",
            b"webp",
        )
        .unwrap();

        assert!(skills.starts_with("programs_images/") && skills.ends_with(".webp"));
        assert_eq!(content.description_img, None);
        let loaded = get_page_content(&conn, content.id.unwrap()).unwrap();
        assert_eq!(loaded.skills_img, Some(skills));
    }

    #[test]
    fn test_programs_page_slug() {
        let conn = init_in_memory().unwrap();
        let program_id = nursing_program(&conn);

        let mut page = ProgramsPage::new(String::new());
        page.program_id = Some(program_id);
        create_programs_page(&conn, &mut page, "BS Nursing").unwrap();

        let mut again = ProgramsPage::new(String::new());
        create_programs_page(&conn, &mut again, "BS Nursing").unwrap();

        assert_eq!(page.slug, "bs-nursing");
        assert_eq!(again.slug, "bs-nursing-1");

        let found = find_programs_page_by_slug(&conn, "bs-nursing").unwrap().unwrap();
        assert_eq!(found.program_id, Some(program_id));
        assert!(find_programs_page_by_slug(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_strand_in_track() {
        let conn = init_in_memory().unwrap();
        let mut track = ShsTrack {
            id: None,
            track_name: Some("Academic".to_string()),
        };
        let track_id = create_track(&conn, &mut track).unwrap();
        let mut strand = ShsStrand {
            id: None,
            strand_name: Some("STEM".to_string()),
            track_id: Some(track_id),
            strand_image: None,
        };
        create_strand(&conn, &mut strand).unwrap();

        let mut program = Program::new(Some("shs".to_string()));
        program.shs_strand_id = strand.id;
        let id = create_program(&conn, &mut program).unwrap();
        assert_eq!(get_program(&conn, id).unwrap().shs_strand_id, strand.id);
    }
}
