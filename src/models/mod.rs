//! Data models
//!
//! Rust structs representing database entities.

mod attendance;
mod chapter;
mod daily_metrics;
mod diet_plan;
mod exercise_log;
mod food_log;
mod macros;
mod profile;
mod project;
mod subject;
mod task;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::db::{DbError, DbResult};

pub use attendance::{AttendanceLog, AttendanceStatus};
pub use chapter::{Chapter, ChapterCreate, ChapterStatus};
pub use daily_metrics::{DailyMetrics, DailyMetricsPatch, MetricAdjustment, DEFAULT_MOOD};
pub use diet_plan::{DayOfWeek, DietPlan, DietPlanCreate, PlanMealType};
pub use exercise_log::{ExerciseLog, ExerciseLogCreate};
pub use food_log::{FoodLog, FoodLogCreate, FoodLogUpdate};
pub use macros::Macros;
pub use profile::{Profile, ProfileUpdate};
pub use project::{
    Milestone, MilestoneCreate, MilestoneStatus, Project, ProjectCreate, ProjectUpdate,
    ProjectWithProgress,
};
pub use subject::{Subject, SubjectCreate, SubjectUpdate, SubjectWithStats};
pub use task::{Priority, Task, TaskCreate, TaskFilter, TaskStatus, TaskUpdate};

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse an ISO calendar date ("2025-01-09")
pub fn parse_date(date: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| DbError::invalid(format!("expected a YYYY-MM-DD date, got '{}'", date)))
}

/// Normalize a due timestamp to UTC RFC 3339.
///
/// Accepts RFC 3339 with any offset, a local `YYYY-MM-DDTHH:MM` (taken as
/// UTC) or a bare date (midnight UTC).
pub fn normalize_timestamp(value: &str) -> DbResult<String> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(naive.and_utc().format(TIMESTAMP_FORMAT).to_string());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().format(TIMESTAMP_FORMAT).to_string());
        }
    }

    Err(DbError::invalid(format!(
        "expected an RFC 3339 timestamp or YYYY-MM-DD date, got '{}'",
        value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-02-28").is_ok());
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(
            normalize_timestamp("2025-01-09T20:00:00-05:00").unwrap(),
            "2025-01-10T01:00:00Z"
        );
        assert_eq!(normalize_timestamp("2025-01-09T14:30").unwrap(), "2025-01-09T14:30:00Z");
        assert_eq!(normalize_timestamp("2025-01-09").unwrap(), "2025-01-09T00:00:00Z");
        assert!(normalize_timestamp("tomorrow").is_err());
    }
}
