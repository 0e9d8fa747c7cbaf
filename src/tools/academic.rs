//! Academic MCP Tools
//!
//! Subjects, attendance tracking and syllabus chapters.

use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{
    AttendanceLog, AttendanceStatus, Chapter, ChapterCreate, ChapterStatus, Subject,
    SubjectCreate, SubjectUpdate, SubjectWithStats,
};

/// Subject with its attendance history and chapters
#[derive(Debug, Serialize)]
pub struct SubjectDetail {
    #[serde(flatten)]
    pub stats: SubjectWithStats,
    pub attendance: Vec<AttendanceLog>,
    pub chapters: Vec<Chapter>,
}

/// An attendance change and the subject's updated rollup
#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub log: AttendanceLog,
    pub subject: SubjectWithStats,
}

/// A chapter change and the subject's updated study progress
#[derive(Debug, Serialize)]
pub struct ChapterResponse {
    pub chapter: Chapter,
    pub study_progress: u32,
    pub mastered_chapters: usize,
    pub total_chapters: usize,
}

fn subject_stats(conn: &Connection, subject_id: i64) -> Result<SubjectWithStats, String> {
    Subject::get_with_stats(conn, subject_id)
        .map_err(|e| format!("Failed to get subject: {}", e))?
        .ok_or_else(|| format!("Subject not found: {}", subject_id))
}

fn chapter_response(conn: &Connection, chapter: Chapter) -> Result<ChapterResponse, String> {
    let stats = subject_stats(conn, chapter.subject_id)?;
    Ok(ChapterResponse {
        chapter,
        study_progress: stats.study_progress,
        mastered_chapters: stats.mastered_chapters,
        total_chapters: stats.total_chapters,
    })
}

fn parse_attendance(status: &str) -> Result<AttendanceStatus, String> {
    AttendanceStatus::from_str(status)
        .ok_or_else(|| format!("Invalid attendance status: {}. Use present or absent", status))
}

// ============================================================================
// Subject Tools
// ============================================================================

pub fn add_subject(db: &Database, data: &SubjectCreate) -> Result<SubjectWithStats, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let subject = Subject::create(&conn, data)
        .map_err(|e| format!("Failed to create subject: {}", e))?;

    info!(id = subject.id, name = %subject.name, "subject added");
    subject_stats(&conn, subject.id)
}

/// Subjects with attendance and study rollups
pub fn list_subjects(db: &Database, category: Option<&str>) -> Result<Vec<SubjectWithStats>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Subject::list_with_stats(&conn, category)
        .map_err(|e| format!("Failed to list subjects: {}", e))
}

pub fn get_subject(db: &Database, id: i64) -> Result<Option<SubjectDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let stats = match Subject::get_with_stats(&conn, id)
        .map_err(|e| format!("Failed to get subject: {}", e))?
    {
        Some(s) => s,
        None => return Ok(None),
    };

    let attendance = AttendanceLog::list_for_subject(&conn, id)
        .map_err(|e| format!("Failed to get attendance: {}", e))?;
    let chapters = Chapter::list_for_subject(&conn, id)
        .map_err(|e| format!("Failed to get chapters: {}", e))?;

    Ok(Some(SubjectDetail {
        stats,
        attendance,
        chapters,
    }))
}

pub fn update_subject(
    db: &Database,
    id: i64,
    data: &SubjectUpdate,
) -> Result<Option<SubjectWithStats>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = Subject::update(&conn, id, data)
        .map_err(|e| format!("Failed to update subject: {}", e))?;

    match updated {
        Some(subject) => subject_stats(&conn, subject.id).map(Some),
        None => Ok(None),
    }
}

/// Delete a subject with its attendance and chapters
pub fn delete_subject(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Subject::delete(&conn, id)
        .map_err(|e| format!("Failed to delete subject: {}", e))?;
    if deleted {
        info!(id, "subject deleted");
    }
    Ok(deleted)
}

// ============================================================================
// Attendance Tools
// ============================================================================

pub fn mark_attendance(
    db: &Database,
    subject_id: i64,
    status: &str,
) -> Result<AttendanceResponse, String> {
    let status = parse_attendance(status)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let log = AttendanceLog::mark(&conn, subject_id, status)
        .map_err(|e| format!("Failed to mark attendance: {}", e))?;
    let subject = subject_stats(&conn, subject_id)?;

    Ok(AttendanceResponse { log, subject })
}

/// Set a recorded class to `status`, or flip it when no status is given
pub fn update_attendance(
    db: &Database,
    log_id: i64,
    status: Option<&str>,
) -> Result<Option<AttendanceResponse>, String> {
    let status = status.map(parse_attendance).transpose()?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let log = match status {
        Some(s) => AttendanceLog::set_status(&conn, log_id, s),
        None => AttendanceLog::toggle(&conn, log_id),
    }
    .map_err(|e| format!("Failed to update attendance: {}", e))?;

    match log {
        Some(log) => {
            let subject = subject_stats(&conn, log.subject_id)?;
            Ok(Some(AttendanceResponse { log, subject }))
        }
        None => Ok(None),
    }
}

pub fn delete_attendance(db: &Database, log_id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    AttendanceLog::delete(&conn, log_id)
        .map_err(|e| format!("Failed to delete attendance: {}", e))
}

// ============================================================================
// Chapter Tools
// ============================================================================

pub fn add_chapter(db: &Database, subject_id: i64, title: &str) -> Result<ChapterResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let chapter = Chapter::create(&conn, &ChapterCreate {
        subject_id,
        title: title.to_string(),
    })
    .map_err(|e| format!("Failed to add chapter: {}", e))?;

    chapter_response(&conn, chapter)
}

/// Set a chapter's stage, or advance it one stage when no status is given
pub fn update_chapter(
    db: &Database,
    chapter_id: i64,
    status: Option<&str>,
) -> Result<Option<ChapterResponse>, String> {
    let status = status
        .map(|s| {
            ChapterStatus::from_str(s).ok_or_else(|| {
                format!("Invalid chapter status: {}. Use not_started, learning, reviewing or mastered", s)
            })
        })
        .transpose()?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let chapter = match status {
        Some(s) => Chapter::set_status(&conn, chapter_id, s),
        None => Chapter::advance(&conn, chapter_id),
    }
    .map_err(|e| format!("Failed to update chapter: {}", e))?;

    match chapter {
        Some(chapter) => chapter_response(&conn, chapter).map(Some),
        None => Ok(None),
    }
}

pub fn delete_chapter(db: &Database, chapter_id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Chapter::delete(&conn, chapter_id).map_err(|e| format!("Failed to delete chapter: {}", e))
}
