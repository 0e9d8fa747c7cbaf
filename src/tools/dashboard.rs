//! Dashboard MCP Tool
//!
//! One-call overview across academics, productivity and vitality.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Database;
use crate::metrics::task_completion;
use crate::models::{DailyMetrics, Priority, Profile, Subject, SubjectWithStats, Task, TaskFilter};

use super::productivity::UPCOMING_DAYS;
use super::vitality::{summarize, DailySummary};

#[derive(Debug, Serialize)]
pub struct AcademicOverview {
    pub subject_count: usize,
    /// Subjects whose attendance is under their own target
    pub low_attendance: Vec<SubjectWithStats>,
}

#[derive(Debug, Serialize)]
pub struct TaskOverview {
    pub total: usize,
    pub pending: usize,
    pub completion_percentage: u32,
    pub high_priority: Vec<Task>,
    /// Unfinished tasks due within the notification window
    pub due_soon: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    pub date: String,
    pub academics: AcademicOverview,
    pub tasks: TaskOverview,
    pub vitality: DailySummary,
}

/// Overview for `date`; `now` anchors the due-soon window
pub fn get_dashboard(
    db: &Database,
    date: &str,
    now: DateTime<Utc>,
) -> Result<DashboardOverview, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let subjects = Subject::list_with_stats(&conn, None)
        .map_err(|e| format!("Failed to list subjects: {}", e))?;
    let subject_count = subjects.len();
    let low_attendance = subjects.into_iter().filter(|s| s.below_target).collect();

    let tasks = Task::list(&conn, &TaskFilter::default())
        .map_err(|e| format!("Failed to list tasks: {}", e))?;
    let pending: Vec<Task> = tasks.iter().filter(|t| t.status.is_pending()).cloned().collect();
    let high_priority = pending
        .iter()
        .filter(|t| t.priority == Priority::High)
        .cloned()
        .collect();
    let due_soon = Task::upcoming(&conn, now, UPCOMING_DAYS)
        .map_err(|e| format!("Failed to get upcoming tasks: {}", e))?;

    let profile = Profile::get_or_default(&conn)
        .map_err(|e| format!("Failed to get profile: {}", e))?;
    let metrics = DailyMetrics::get_for_date(&conn, date)
        .map_err(|e| format!("Failed to get daily metrics: {}", e))?;

    Ok(DashboardOverview {
        date: date.to_string(),
        academics: AcademicOverview {
            subject_count,
            low_attendance,
        },
        tasks: TaskOverview {
            total: tasks.len(),
            pending: pending.len(),
            completion_percentage: task_completion(pending.len(), tasks.len()),
            high_priority,
            due_soon,
        },
        vitality: summarize(&profile, metrics),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::models::{AttendanceLog, AttendanceStatus, SubjectCreate, TaskCreate, TaskStatus};
    use chrono::TimeZone;

    #[test]
    fn test_empty_dashboard() {
        let db = test_db();
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let overview = get_dashboard(&db, "2025-06-02", now).unwrap();

        assert_eq!(overview.academics.subject_count, 0);
        assert_eq!(overview.tasks.completion_percentage, 0);
        assert_eq!(overview.vitality.metrics.mood_rating, Some(5));
        assert!(!overview.vitality.logged);
    }

    #[test]
    fn test_dashboard_rollups() {
        let db = test_db();
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();

        db.with_conn(|conn| {
            let low = Subject::create(conn, &SubjectCreate {
                name: "Economics".to_string(),
                ..Default::default()
            })?;
            AttendanceLog::mark(conn, low.id, AttendanceStatus::Absent)?;
            Subject::create(conn, &SubjectCreate {
                name: "History".to_string(),
                ..Default::default()
            })?;

            Task::create(conn, &TaskCreate {
                title: "Exam prep".to_string(),
                priority: Some(Priority::High),
                due_date: Some("2025-06-03T09:00:00Z".to_string()),
                ..Default::default()
            })?;
            let done = Task::create(conn, &TaskCreate {
                title: "Submit form".to_string(),
                priority: Some(Priority::High),
                ..Default::default()
            })?;
            Task::set_status(conn, done.id, TaskStatus::Done)?;
            Task::create(conn, &TaskCreate {
                title: "Read chapter".to_string(),
                status: Some(TaskStatus::Review),
                ..Default::default()
            })?;
            Ok(())
        })
        .unwrap();

        let overview = get_dashboard(&db, "2025-06-02", now).unwrap();
        assert_eq!(overview.academics.subject_count, 2);
        assert_eq!(overview.academics.low_attendance.len(), 1);
        assert_eq!(overview.academics.low_attendance[0].subject.name, "Economics");

        assert_eq!(overview.tasks.total, 3);
        assert_eq!(overview.tasks.pending, 1);
        assert_eq!(overview.tasks.completion_percentage, 67);
        assert_eq!(overview.tasks.high_priority.len(), 1);
        assert_eq!(overview.tasks.due_soon.len(), 1);
    }
}
