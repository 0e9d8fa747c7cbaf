//! Attendance log model

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Whether a class was attended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "present" | "p" => Some(AttendanceStatus::Present),
            "absent" | "a" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            AttendanceStatus::Present => AttendanceStatus::Absent,
            AttendanceStatus::Absent => AttendanceStatus::Present,
        }
    }
}

/// One class marked present or absent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceLog {
    pub id: i64,
    pub subject_id: i64,
    pub status: AttendanceStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl AttendanceLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status_str: String = row.get("status")?;

        Ok(Self {
            id: row.get("id")?,
            subject_id: row.get("subject_id")?,
            status: AttendanceStatus::from_str(&status_str).unwrap_or(AttendanceStatus::Absent),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Record attendance for a class
    pub fn mark(conn: &Connection, subject_id: i64, status: AttendanceStatus) -> DbResult<Self> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM subjects WHERE id = ?1)",
            [subject_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::not_found("Subject", subject_id));
        }

        conn.execute(
            "INSERT INTO attendance_logs (subject_id, status) VALUES (?1, ?2)",
            params![subject_id, status.as_str()],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM attendance_logs WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Attendance history for a subject, newest first
    pub fn list_for_subject(conn: &Connection, subject_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM attendance_logs WHERE subject_id = ?1 ORDER BY created_at DESC, id DESC"
        )?;
        let logs = stmt
            .query_map([subject_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// Change the status of a recorded class
    pub fn set_status(conn: &Connection, id: i64, status: AttendanceStatus) -> DbResult<Option<Self>> {
        conn.execute(
            "UPDATE attendance_logs SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Self::get_by_id(conn, id)
    }

    /// Flip present/absent
    pub fn toggle(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        match Self::get_by_id(conn, id)? {
            Some(log) => Self::set_status(conn, id, log.status.toggled()),
            None => Ok(None),
        }
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM attendance_logs WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;
    use crate::models::{Subject, SubjectCreate};

    fn subject_id(conn: &Connection) -> i64 {
        Subject::create(conn, &SubjectCreate {
            name: "Physics".to_string(),
            ..Default::default()
        })
        .unwrap()
        .id
    }

    #[test]
    fn test_mark_unknown_subject() {
        let conn = test_conn();
        let result = AttendanceLog::mark(&conn, 42, AttendanceStatus::Present);
        assert!(matches!(result, Err(DbError::NotFound { id: 42, .. })));
    }

    #[test]
    fn test_toggle() {
        let conn = test_conn();
        let sid = subject_id(&conn);
        let log = AttendanceLog::mark(&conn, sid, AttendanceStatus::Present).unwrap();

        let toggled = AttendanceLog::toggle(&conn, log.id).unwrap().unwrap();
        assert_eq!(toggled.status, AttendanceStatus::Absent);
        assert!(AttendanceLog::toggle(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_list_and_delete() {
        let conn = test_conn();
        let sid = subject_id(&conn);
        let first = AttendanceLog::mark(&conn, sid, AttendanceStatus::Present).unwrap();
        let second = AttendanceLog::mark(&conn, sid, AttendanceStatus::Absent).unwrap();

        let logs = AttendanceLog::list_for_subject(&conn, sid).unwrap();
        assert_eq!(logs[0].id, second.id);

        assert!(AttendanceLog::delete(&conn, first.id).unwrap());
        assert_eq!(AttendanceLog::list_for_subject(&conn, sid).unwrap().len(), 1);
    }
}
