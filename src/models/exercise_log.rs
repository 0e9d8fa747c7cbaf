//! Exercise log model
//!
//! Workouts on a date. Cardio entries carry a duration; gym entries also carry
//! sets, reps and load, and their duration is estimated from the set count.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

use super::parse_date;

/// A logged workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub id: i64,
    pub date: String,
    pub exercise_type: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight_lifted: Option<f64>, // kg
    pub created_at: String,
    pub updated_at: String,
}

/// Data for logging a workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLogCreate {
    pub date: String,
    pub exercise_type: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight_lifted: Option<f64>,
}

impl ExerciseLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            exercise_type: row.get("exercise_type")?,
            duration_minutes: row.get("duration_minutes")?,
            calories_burned: row.get("calories_burned")?,
            sets: row.get("sets")?,
            reps: row.get("reps")?,
            weight_lifted: row.get("weight_lifted")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Log a workout
    pub fn create(conn: &Connection, data: &ExerciseLogCreate) -> DbResult<Self> {
        parse_date(&data.date)?;
        if data.exercise_type.trim().is_empty() {
            return Err(DbError::invalid("exercise_type cannot be empty"));
        }
        if !(data.duration_minutes > 0.0) {
            return Err(DbError::invalid("duration_minutes must be positive"));
        }
        if data.calories_burned < 0.0 {
            return Err(DbError::invalid("calories_burned cannot be negative"));
        }

        conn.execute(
            r#"
            INSERT INTO exercise_logs
                (date, exercise_type, duration_minutes, calories_burned, sets, reps, weight_lifted)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                data.date,
                data.exercise_type.trim(),
                data.duration_minutes,
                data.calories_burned,
                data.sets,
                data.reps,
                data.weight_lifted,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a workout by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM exercise_logs WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Workouts for a date
    pub fn list_for_date(conn: &Connection, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM exercise_logs WHERE date = ?1 ORDER BY created_at, id"
        )?;
        let logs = stmt
            .query_map([date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// Workouts between two dates, newest first
    pub fn list_by_date_range(
        conn: &Connection,
        start_date: &str,
        end_date: &str,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM exercise_logs
            WHERE date >= ?1 AND date <= ?2
            ORDER BY date DESC, id DESC
            "#
        )?;
        let logs = stmt
            .query_map(params![start_date, end_date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// Overwrite the stored calorie estimate
    pub fn set_calories_burned(conn: &Connection, id: i64, calories: f64) -> DbResult<()> {
        conn.execute(
            "UPDATE exercise_logs SET calories_burned = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![calories, id],
        )?;
        Ok(())
    }

    /// Distinct dates that have workouts
    pub fn logged_dates(conn: &Connection) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare("SELECT DISTINCT date FROM exercise_logs ORDER BY date")?;
        let dates = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(dates)
    }

    /// Delete a workout
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM exercise_logs WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
