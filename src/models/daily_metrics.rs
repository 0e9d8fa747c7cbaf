//! Daily metrics model
//!
//! One row per calendar date holding the day's aggregated totals. Rows are
//! written through [`DailyMetrics::upsert`], so a date never has two rows.
//! Food and exercise totals are recomputed from their logs by the sync
//! functions; water, sleep and mood are set directly.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::{DbError, DbResult};
use crate::metrics::{sum_field, sum_macros, MetricKind};

use super::{parse_date, ExerciseLog, FoodLog, Macros};

/// Mood shown for a day nobody has rated yet
pub const DEFAULT_MOOD: i64 = 5;

/// Aggregated totals for one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    /// None for a default snapshot that was never stored
    pub id: Option<i64>,
    pub date: String, // ISO date: "2025-01-09"
    pub calories_consumed: f64,
    pub protein_consumed: f64,
    pub carbs_consumed: f64,
    pub fats_consumed: f64,
    pub calories_burned: f64,
    pub water_intake: f64, // ml
    pub sleep_hours: f64,
    pub mood_rating: Option<i64>, // 1-5
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Fields to write on a day's row; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyMetricsPatch {
    pub calories_consumed: Option<f64>,
    pub protein_consumed: Option<f64>,
    pub carbs_consumed: Option<f64>,
    pub fats_consumed: Option<f64>,
    pub calories_burned: Option<f64>,
    pub water_intake: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub mood_rating: Option<i64>,
}

impl DailyMetricsPatch {
    /// Patch writing the four consumed totals
    pub fn consumed(totals: Macros) -> Self {
        Self {
            calories_consumed: Some(totals.calories),
            protein_consumed: Some(totals.protein),
            carbs_consumed: Some(totals.carbs),
            fats_consumed: Some(totals.fats),
            ..Default::default()
        }
    }

    /// Patch writing a single goal-tracked metric
    pub fn metric(kind: MetricKind, value: f64) -> Self {
        let mut patch = Self::default();
        match kind {
            MetricKind::Calories => patch.calories_consumed = Some(value),
            MetricKind::Hydration => patch.water_intake = Some(value),
            MetricKind::Sleep => patch.sleep_hours = Some(value),
        }
        patch
    }

    fn validate(&self) -> DbResult<()> {
        let amounts = [
            ("calories_consumed", self.calories_consumed),
            ("protein_consumed", self.protein_consumed),
            ("carbs_consumed", self.carbs_consumed),
            ("fats_consumed", self.fats_consumed),
            ("calories_burned", self.calories_burned),
            ("water_intake", self.water_intake),
            ("sleep_hours", self.sleep_hours),
        ];
        for (name, value) in amounts {
            if matches!(value, Some(v) if v < 0.0 || v.is_nan()) {
                return Err(DbError::invalid(format!("{} cannot be negative", name)));
            }
        }
        if matches!(self.sleep_hours, Some(h) if h > 24.0) {
            return Err(DbError::invalid("sleep_hours cannot exceed 24"));
        }
        if matches!(self.mood_rating, Some(m) if !(1..=5).contains(&m)) {
            return Err(DbError::invalid("mood_rating must be between 1 and 5"));
        }
        Ok(())
    }
}

/// Result of incrementing a goal-tracked metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricAdjustment {
    pub metric: MetricKind,
    pub previous: f64,
    pub current: f64,
}

impl DailyMetrics {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            calories_consumed: row.get("calories_consumed")?,
            protein_consumed: row.get("protein_consumed")?,
            carbs_consumed: row.get("carbs_consumed")?,
            fats_consumed: row.get("fats_consumed")?,
            calories_burned: row.get("calories_burned")?,
            water_intake: row.get("water_intake")?,
            sleep_hours: row.get("sleep_hours")?,
            mood_rating: row.get("mood_rating")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Snapshot for a day with nothing recorded
    pub fn empty(date: &str) -> Self {
        Self {
            id: None,
            date: date.to_string(),
            calories_consumed: 0.0,
            protein_consumed: 0.0,
            carbs_consumed: 0.0,
            fats_consumed: 0.0,
            calories_burned: 0.0,
            water_intake: 0.0,
            sleep_hours: 0.0,
            mood_rating: Some(DEFAULT_MOOD),
            created_at: None,
            updated_at: None,
        }
    }

    /// Get the stored row for a date
    pub fn get_by_date(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM daily_metrics WHERE date = ?1")?;

        let result = stmt.query_row([date], Self::from_row);
        match result {
            Ok(metrics) => Ok(Some(metrics)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stored row for a date, or an empty snapshot that is not persisted
    pub fn get_for_date(conn: &Connection, date: &str) -> DbResult<Self> {
        parse_date(date)?;
        Ok(Self::get_by_date(conn, date)?.unwrap_or_else(|| Self::empty(date)))
    }

    /// List stored days, newest first, with an optional date range
    pub fn list(
        conn: &Connection,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: i64,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM daily_metrics WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = start_date {
            params_vec.push(Box::new(start.to_string()));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }
        if let Some(end) = end_date {
            params_vec.push(Box::new(end.to_string()));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY date DESC");
        params_vec.push(Box::new(limit));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let days = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(days)
    }

    /// Create the row for `date` if missing, then write the patched fields
    pub fn upsert(conn: &Connection, date: &str, patch: &DailyMetricsPatch) -> DbResult<Self> {
        parse_date(date)?;
        patch.validate()?;

        conn.execute(
            "INSERT OR IGNORE INTO daily_metrics (date) VALUES (?1)",
            [date],
        )?;

        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        let columns = [
            ("calories_consumed", patch.calories_consumed),
            ("protein_consumed", patch.protein_consumed),
            ("carbs_consumed", patch.carbs_consumed),
            ("fats_consumed", patch.fats_consumed),
            ("calories_burned", patch.calories_burned),
            ("water_intake", patch.water_intake),
            ("sleep_hours", patch.sleep_hours),
        ];
        for (column, value) in columns {
            if let Some(v) = value {
                updates.push(format!("{} = ?", column));
                values.push(Box::new(v));
            }
        }
        if let Some(mood) = patch.mood_rating {
            updates.push("mood_rating = ?".to_string());
            values.push(Box::new(mood));
        }

        if !updates.is_empty() {
            updates.push("updated_at = datetime('now')".to_string());
            let sql = format!(
                "UPDATE daily_metrics SET {} WHERE date = ?",
                updates.join(", ")
            );
            values.push(Box::new(date.to_string()));
            let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
            conn.execute(&sql, params.as_slice())?;
        }

        debug!(date, fields = values.len().saturating_sub(1), "upserted daily metrics");

        Self::get_by_date(conn, date)?
            .ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Recompute the consumed totals for `date` from its food logs
    pub fn sync_food_totals(conn: &Connection, date: &str) -> DbResult<Self> {
        let logs = FoodLog::list_for_date(conn, date)?;
        let totals = sum_macros(logs.iter().map(FoodLog::macros));

        info!(
            date,
            logs = logs.len(),
            calories = totals.calories,
            "synced food totals"
        );
        Self::upsert(conn, date, &DailyMetricsPatch::consumed(totals))
    }

    /// Recompute calories burned for `date` from its exercise logs
    pub fn sync_exercise_totals(conn: &Connection, date: &str) -> DbResult<Self> {
        let logs = ExerciseLog::list_for_date(conn, date)?;
        let burned = sum_field(&logs, |l| l.calories_burned);

        info!(date, logs = logs.len(), burned, "synced exercise totals");
        Self::upsert(conn, date, &DailyMetricsPatch {
            calories_burned: Some(burned),
            ..Default::default()
        })
    }

    /// Add `delta` to a goal-tracked metric, never going below zero
    pub fn adjust_metric(
        conn: &Connection,
        date: &str,
        metric: MetricKind,
        delta: f64,
    ) -> DbResult<MetricAdjustment> {
        if delta.is_nan() {
            return Err(DbError::invalid("delta must be a number"));
        }

        let previous = Self::get_for_date(conn, date)?.value_of(metric);
        let mut current = (previous + delta).max(0.0);
        if metric == MetricKind::Sleep {
            current = current.min(24.0);
        }

        Self::upsert(conn, date, &DailyMetricsPatch::metric(metric, current))?;

        Ok(MetricAdjustment {
            metric,
            previous,
            current,
        })
    }

    /// Record the day's mood (1-5)
    pub fn set_mood(conn: &Connection, date: &str, mood: i64) -> DbResult<Self> {
        Self::upsert(conn, date, &DailyMetricsPatch {
            mood_rating: Some(mood),
            ..Default::default()
        })
    }

    /// Current value of a goal-tracked metric
    pub fn value_of(&self, metric: MetricKind) -> f64 {
        match metric {
            MetricKind::Calories => self.calories_consumed,
            MetricKind::Hydration => self.water_intake,
            MetricKind::Sleep => self.sleep_hours,
        }
    }

    /// Stored consumed totals
    pub fn consumed(&self) -> Macros {
        Macros::new(
            self.calories_consumed,
            self.protein_consumed,
            self.carbs_consumed,
            self.fats_consumed,
        )
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Remove a day's snapshot; its logs are kept
    pub fn delete(conn: &Connection, date: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM daily_metrics WHERE date = ?1", params![date])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;
    use crate::models::{ExerciseLogCreate, FoodLogCreate};

    const DAY: &str = "2025-03-14";

    #[test]
    fn test_get_for_date_default_is_not_persisted() {
        let conn = test_conn();
        let day = DailyMetrics::get_for_date(&conn, DAY).unwrap();

        assert!(!day.is_persisted());
        assert_eq!(day.mood_rating, Some(5));
        assert_eq!(day.water_intake, 0.0);
        assert!(DailyMetrics::get_by_date(&conn, DAY).unwrap().is_none());
    }

    #[test]
    fn test_upsert_creates_then_patches() {
        let conn = test_conn();
        let first = DailyMetrics::upsert(&conn, DAY, &DailyMetricsPatch {
            water_intake: Some(500.0),
            ..Default::default()
        })
        .unwrap();
        assert!(first.is_persisted());
        assert_eq!(first.water_intake, 500.0);
        assert_eq!(first.mood_rating, None);

        let second = DailyMetrics::upsert(&conn, DAY, &DailyMetricsPatch {
            sleep_hours: Some(7.5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.water_intake, 500.0);
        assert_eq!(second.sleep_hours, 7.5);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM daily_metrics", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_upsert_validates() {
        let conn = test_conn();
        let bad_mood = DailyMetricsPatch {
            mood_rating: Some(6),
            ..Default::default()
        };
        assert!(matches!(
            DailyMetrics::upsert(&conn, DAY, &bad_mood),
            Err(DbError::InvalidInput(_))
        ));
        assert!(DailyMetrics::upsert(&conn, "14-03-2025", &DailyMetricsPatch::default()).is_err());
    }

    #[test]
    fn test_sync_food_totals() {
        let conn = test_conn();
        FoodLog::create(&conn, &FoodLogCreate {
            date: DAY.to_string(),
            food_name: "Idli".to_string(),
            macros: Macros::new(116.0, 4.0, 24.0, 0.0),
        })
        .unwrap();
        FoodLog::create(&conn, &FoodLogCreate {
            date: DAY.to_string(),
            food_name: "Dal (Toor, Cooked)".to_string(),
            macros: Macros::new(150.0, 8.0, 20.0, 4.0),
        })
        .unwrap();

        let day = DailyMetrics::sync_food_totals(&conn, DAY).unwrap();
        assert_eq!(day.consumed(), Macros::new(266.0, 12.0, 44.0, 4.0));
    }

    #[test]
    fn test_sync_food_totals_zeroes_when_logs_removed() {
        let conn = test_conn();
        let log = FoodLog::create(&conn, &FoodLogCreate {
            date: DAY.to_string(),
            food_name: "Samosa".to_string(),
            macros: Macros::new(260.0, 4.0, 24.0, 17.0),
        })
        .unwrap();
        DailyMetrics::sync_food_totals(&conn, DAY).unwrap();

        FoodLog::delete(&conn, log.id).unwrap();
        let day = DailyMetrics::sync_food_totals(&conn, DAY).unwrap();
        assert_eq!(day.consumed(), Macros::zero());
    }

    #[test]
    fn test_sync_exercise_totals_keeps_other_fields() {
        let conn = test_conn();
        DailyMetrics::upsert(&conn, DAY, &DailyMetricsPatch {
            water_intake: Some(1000.0),
            ..Default::default()
        })
        .unwrap();
        ExerciseLog::create(&conn, &ExerciseLogCreate {
            date: DAY.to_string(),
            exercise_type: "Running (Jog)".to_string(),
            duration_minutes: 30.0,
            calories_burned: 343.0,
            sets: None,
            reps: None,
            weight_lifted: None,
        })
        .unwrap();

        let day = DailyMetrics::sync_exercise_totals(&conn, DAY).unwrap();
        assert_eq!(day.calories_burned, 343.0);
        assert_eq!(day.water_intake, 1000.0);
    }

    #[test]
    fn test_adjust_metric_reports_previous_and_clamps() {
        let conn = test_conn();
        let up = DailyMetrics::adjust_metric(&conn, DAY, MetricKind::Hydration, 250.0).unwrap();
        assert_eq!((up.previous, up.current), (0.0, 250.0));

        let up = DailyMetrics::adjust_metric(&conn, DAY, MetricKind::Hydration, 250.0).unwrap();
        assert_eq!((up.previous, up.current), (250.0, 500.0));

        let down = DailyMetrics::adjust_metric(&conn, DAY, MetricKind::Hydration, -1000.0).unwrap();
        assert_eq!(down.current, 0.0);
    }

    #[test]
    fn test_adjust_sleep_caps_at_full_day() {
        let conn = test_conn();
        let adj = DailyMetrics::adjust_metric(&conn, DAY, MetricKind::Sleep, 30.0).unwrap();
        assert_eq!(adj.current, 24.0);
    }

    #[test]
    fn test_set_mood_and_list() {
        let conn = test_conn();
        DailyMetrics::set_mood(&conn, "2025-03-13", 3).unwrap();
        DailyMetrics::set_mood(&conn, DAY, 4).unwrap();

        let days = DailyMetrics::list(&conn, Some("2025-03-01"), None, 10).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, DAY);
        assert_eq!(days[0].mood_rating, Some(4));
    }
}
