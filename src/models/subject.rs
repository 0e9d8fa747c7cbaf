//! Subject model
//!
//! Courses with attendance and syllabus rollups.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::metrics::{attendance_percentage, is_below_target, study_progress, AttendanceBand};

pub const DEFAULT_CREDITS: i64 = 3;
pub const DEFAULT_TARGET_ATTENDANCE: i64 = 75;
pub const DEFAULT_CATEGORY: &str = "academic";

/// A course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub professor_name: Option<String>,
    pub credits: i64,
    pub target_attendance: i64, // percent
    pub category: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a subject
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectCreate {
    pub name: String,
    pub professor_name: Option<String>,
    pub credits: Option<i64>,
    pub target_attendance: Option<i64>,
    pub category: Option<String>,
}

/// Data for updating a subject
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectUpdate {
    pub name: Option<String>,
    pub professor_name: Option<String>,
    pub credits: Option<i64>,
    pub target_attendance: Option<i64>,
    pub category: Option<String>,
}

/// Subject with attendance and study rollups
#[derive(Debug, Clone, Serialize)]
pub struct SubjectWithStats {
    #[serde(flatten)]
    pub subject: Subject,
    pub total_classes: usize,
    pub present_classes: usize,
    pub attendance_percentage: u32,
    pub attendance_band: AttendanceBand,
    pub below_target: bool,
    pub total_chapters: usize,
    pub mastered_chapters: usize,
    pub study_progress: u32,
}

impl SubjectWithStats {
    fn from_counts(
        subject: Subject,
        total_classes: usize,
        present_classes: usize,
        total_chapters: usize,
        mastered_chapters: usize,
    ) -> Self {
        let attendance = attendance_percentage(present_classes, total_classes);
        let target = u32::try_from(subject.target_attendance).unwrap_or(0);

        Self {
            total_classes,
            present_classes,
            attendance_percentage: attendance,
            attendance_band: AttendanceBand::for_percentage(attendance),
            below_target: is_below_target(attendance, target),
            total_chapters,
            mastered_chapters,
            study_progress: study_progress(mastered_chapters, total_chapters),
            subject,
        }
    }
}

fn check_target(target: Option<i64>) -> DbResult<()> {
    if matches!(target, Some(t) if !(0..=100).contains(&t)) {
        return Err(DbError::invalid("target_attendance must be between 0 and 100"));
    }
    Ok(())
}

const STATS_SELECT: &str = r#"
    SELECT s.*,
        (SELECT COUNT(*) FROM attendance_logs a WHERE a.subject_id = s.id) AS total_classes,
        (SELECT COUNT(*) FROM attendance_logs a
            WHERE a.subject_id = s.id AND a.status = 'present') AS present_classes,
        (SELECT COUNT(*) FROM chapters c WHERE c.subject_id = s.id) AS total_chapters,
        (SELECT COUNT(*) FROM chapters c
            WHERE c.subject_id = s.id AND c.status = 'mastered') AS mastered_chapters
    FROM subjects s
"#;

impl Subject {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            professor_name: row.get("professor_name")?,
            credits: row.get("credits")?,
            target_attendance: row.get("target_attendance")?,
            category: row.get("category")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn stats_from_row(row: &Row) -> rusqlite::Result<SubjectWithStats> {
        let count = |name: &str| -> rusqlite::Result<usize> {
            let n: i64 = row.get(name)?;
            Ok(n.max(0) as usize)
        };

        Ok(SubjectWithStats::from_counts(
            Self::from_row(row)?,
            count("total_classes")?,
            count("present_classes")?,
            count("total_chapters")?,
            count("mastered_chapters")?,
        ))
    }

    /// Create a new subject
    pub fn create(conn: &Connection, data: &SubjectCreate) -> DbResult<Self> {
        if data.name.trim().is_empty() {
            return Err(DbError::invalid("subject name cannot be empty"));
        }
        check_target(data.target_attendance)?;

        conn.execute(
            r#"
            INSERT INTO subjects (name, professor_name, credits, target_attendance, category)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.name.trim(),
                data.professor_name,
                data.credits.unwrap_or(DEFAULT_CREDITS),
                data.target_attendance.unwrap_or(DEFAULT_TARGET_ATTENDANCE),
                data.category.as_deref().unwrap_or(DEFAULT_CATEGORY),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a subject by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM subjects WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(subject) => Ok(Some(subject)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a subject with its rollups
    pub fn get_with_stats(conn: &Connection, id: i64) -> DbResult<Option<SubjectWithStats>> {
        let sql = format!("{} WHERE s.id = ?1", STATS_SELECT);
        let mut stmt = conn.prepare(&sql)?;

        let result = stmt.query_row([id], Self::stats_from_row);
        match result {
            Ok(subject) => Ok(Some(subject)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All subjects with rollups, optionally filtered by category
    pub fn list_with_stats(conn: &Connection, category: Option<&str>) -> DbResult<Vec<SubjectWithStats>> {
        let mut sql = String::from(STATS_SELECT);
        if category.is_some() {
            sql.push_str(" WHERE s.category = ?1");
        }
        sql.push_str(" ORDER BY s.name COLLATE NOCASE");

        let mut stmt = conn.prepare(&sql)?;
        let subjects = match category {
            Some(c) => stmt.query_map([c], Self::stats_from_row)?.collect::<Result<Vec<_>, _>>()?,
            None => stmt.query_map([], Self::stats_from_row)?.collect::<Result<Vec<_>, _>>()?,
        };

        Ok(subjects)
    }

    /// Update a subject
    pub fn update(conn: &Connection, id: i64, data: &SubjectUpdate) -> DbResult<Option<Self>> {
        check_target(data.target_attendance)?;
        if matches!(data.name, Some(ref n) if n.trim().is_empty()) {
            return Err(DbError::invalid("subject name cannot be empty"));
        }

        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref v) = data.name {
            updates.push("name = ?");
            values.push(Box::new(v.trim().to_string()));
        }
        if let Some(ref v) = data.professor_name {
            updates.push("professor_name = ?");
            values.push(Box::new(v.clone()));
        }
        if let Some(v) = data.credits {
            updates.push("credits = ?");
            values.push(Box::new(v));
        }
        if let Some(v) = data.target_attendance {
            updates.push("target_attendance = ?");
            values.push(Box::new(v));
        }
        if let Some(ref v) = data.category {
            updates.push("category = ?");
            values.push(Box::new(v.clone()));
        }

        if !updates.is_empty() {
            updates.push("updated_at = datetime('now')");
            let sql = format!("UPDATE subjects SET {} WHERE id = ?", updates.join(", "));
            values.push(Box::new(id));
            let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
            conn.execute(&sql, params.as_slice())?;
        }

        Self::get_by_id(conn, id)
    }

    /// Delete a subject along with its attendance and chapters
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM subjects WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;
    use crate::models::{AttendanceLog, AttendanceStatus, Chapter, ChapterCreate, ChapterStatus};

    fn subject(conn: &Connection, name: &str) -> Subject {
        Subject::create(conn, &SubjectCreate {
            name: name.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_create_applies_defaults() {
        let conn = test_conn();
        let s = subject(&conn, "Operating Systems");
        assert_eq!(s.credits, 3);
        assert_eq!(s.target_attendance, 75);
        assert_eq!(s.category, "academic");
    }

    #[test]
    fn test_fresh_subject_stats() {
        let conn = test_conn();
        let s = subject(&conn, "Compilers");

        let stats = Subject::get_with_stats(&conn, s.id).unwrap().unwrap();
        assert_eq!(stats.attendance_percentage, 100);
        assert_eq!(stats.study_progress, 0);
        assert!(!stats.below_target);
    }

    #[test]
    fn test_list_with_stats_rollups() {
        let conn = test_conn();
        let s = subject(&conn, "Databases");
        for status in [
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Present,
        ] {
            AttendanceLog::mark(&conn, s.id, status).unwrap();
        }
        for (title, status) in [("ER modelling", ChapterStatus::Mastered), ("Indexes", ChapterStatus::Learning)] {
            let ch = Chapter::create(&conn, &ChapterCreate {
                subject_id: s.id,
                title: title.to_string(),
            })
            .unwrap();
            Chapter::set_status(&conn, ch.id, status).unwrap();
        }

        let all = Subject::list_with_stats(&conn, None).unwrap();
        assert_eq!(all.len(), 1);
        let stats = &all[0];
        assert_eq!((stats.present_classes, stats.total_classes), (2, 3));
        assert_eq!(stats.attendance_percentage, 67);
        assert_eq!(stats.attendance_band, AttendanceBand::Warning);
        assert!(stats.below_target);
        assert_eq!(stats.study_progress, 50);
    }

    #[test]
    fn test_list_filters_by_category() {
        let conn = test_conn();
        subject(&conn, "Maths");
        Subject::create(&conn, &SubjectCreate {
            name: "Guitar".to_string(),
            category: Some("hobby".to_string()),
            ..Default::default()
        })
        .unwrap();

        let hobbies = Subject::list_with_stats(&conn, Some("hobby")).unwrap();
        assert_eq!(hobbies.len(), 1);
        assert_eq!(hobbies[0].subject.name, "Guitar");
    }

    #[test]
    fn test_update_and_cascade_delete() {
        let conn = test_conn();
        let s = subject(&conn, "Networks");
        AttendanceLog::mark(&conn, s.id, AttendanceStatus::Present).unwrap();

        let updated = Subject::update(&conn, s.id, &SubjectUpdate {
            target_attendance: Some(80),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        assert_eq!(updated.target_attendance, 80);
        assert!(Subject::update(&conn, s.id, &SubjectUpdate {
            target_attendance: Some(120),
            ..Default::default()
        })
        .is_err());

        assert!(Subject::delete(&conn, s.id).unwrap());
        assert!(AttendanceLog::list_for_subject(&conn, s.id).unwrap().is_empty());
    }
}
