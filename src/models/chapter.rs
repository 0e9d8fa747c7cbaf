//! Syllabus chapter model

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Study stage of a chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterStatus {
    NotStarted,
    Learning,
    Reviewing,
    Mastered,
}

impl ChapterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterStatus::NotStarted => "not_started",
            ChapterStatus::Learning => "learning",
            ChapterStatus::Reviewing => "reviewing",
            ChapterStatus::Mastered => "mastered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "not_started" | "todo" => Some(ChapterStatus::NotStarted),
            "learning" => Some(ChapterStatus::Learning),
            "reviewing" | "review" => Some(ChapterStatus::Reviewing),
            "mastered" | "done" => Some(ChapterStatus::Mastered),
            _ => None,
        }
    }

    /// Next stage; mastered wraps back to not started
    pub fn next(&self) -> Self {
        match self {
            ChapterStatus::NotStarted => ChapterStatus::Learning,
            ChapterStatus::Learning => ChapterStatus::Reviewing,
            ChapterStatus::Reviewing => ChapterStatus::Mastered,
            ChapterStatus::Mastered => ChapterStatus::NotStarted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    pub subject_id: i64,
    pub title: String,
    pub status: ChapterStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterCreate {
    pub subject_id: i64,
    pub title: String,
}

impl Chapter {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status_str: String = row.get("status")?;

        Ok(Self {
            id: row.get("id")?,
            subject_id: row.get("subject_id")?,
            title: row.get("title")?,
            status: ChapterStatus::from_str(&status_str).unwrap_or(ChapterStatus::NotStarted),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &ChapterCreate) -> DbResult<Self> {
        if data.title.trim().is_empty() {
            return Err(DbError::invalid("chapter title cannot be empty"));
        }
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM subjects WHERE id = ?1)",
            [data.subject_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::not_found("Subject", data.subject_id));
        }

        conn.execute(
            "INSERT INTO chapters (subject_id, title) VALUES (?1, ?2)",
            params![data.subject_id, data.title.trim()],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM chapters WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(chapter) => Ok(Some(chapter)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Chapters of a subject in the order they were added
    pub fn list_for_subject(conn: &Connection, subject_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM chapters WHERE subject_id = ?1 ORDER BY created_at, id"
        )?;
        let chapters = stmt
            .query_map([subject_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(chapters)
    }

    pub fn set_status(conn: &Connection, id: i64, status: ChapterStatus) -> DbResult<Option<Self>> {
        conn.execute(
            "UPDATE chapters SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Self::get_by_id(conn, id)
    }

    /// Move a chapter to its next study stage
    pub fn advance(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        match Self::get_by_id(conn, id)? {
            Some(chapter) => Self::set_status(conn, id, chapter.status.next()),
            None => Ok(None),
        }
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM chapters WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;
    use crate::models::{Subject, SubjectCreate};

    #[test]
    fn test_status_cycle() {
        let mut status = ChapterStatus::NotStarted;
        let mut seen = Vec::new();
        for _ in 0..4 {
            status = status.next();
            seen.push(status);
        }
        assert_eq!(
            seen,
            vec![
                ChapterStatus::Learning,
                ChapterStatus::Reviewing,
                ChapterStatus::Mastered,
                ChapterStatus::NotStarted,
            ]
        );
    }

    #[test]
    fn test_advance() {
        let conn = test_conn();
        let subject = Subject::create(&conn, &SubjectCreate {
            name: "Chemistry".to_string(),
            ..Default::default()
        })
        .unwrap();
        let chapter = Chapter::create(&conn, &ChapterCreate {
            subject_id: subject.id,
            title: "Thermodynamics".to_string(),
        })
        .unwrap();
        assert_eq!(chapter.status, ChapterStatus::NotStarted);

        let advanced = Chapter::advance(&conn, chapter.id).unwrap().unwrap();
        assert_eq!(advanced.status, ChapterStatus::Learning);
        assert_eq!(Chapter::list_for_subject(&conn, subject.id).unwrap().len(), 1);
    }

    #[test]
    fn test_create_for_missing_subject() {
        let conn = test_conn();
        let result = Chapter::create(&conn, &ChapterCreate {
            subject_id: 7,
            title: "Orphan".to_string(),
        });
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }
}
