//! Task model
//!
//! Kanban tasks with priority and an optional due timestamp. Due dates are
//! stored normalized to UTC (`2025-01-09T14:00:00Z`) so text comparison in
//! SQL orders them chronologically.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

use super::{normalize_timestamp, TIMESTAMP_FORMAT};

pub const DEFAULT_DURATION_MINUTES: i64 = 15;

/// Kanban column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "todo" | "to_do" => Some(TaskStatus::Todo),
            "in_progress" | "doing" => Some(TaskStatus::InProgress),
            "review" => Some(TaskStatus::Review),
            "done" | "completed" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    /// Counted as pending on the dashboard
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Todo | TaskStatus::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" | "med" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<String>, // RFC 3339, UTC
    pub duration_minutes: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub duration_minutes: Option<i64>,
}

/// Data for updating a task. An empty `due_date` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub duration_minutes: Option<i64>,
}

/// Filters for listing tasks
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub pending_only: bool,
}

fn check_duration(minutes: Option<i64>) -> DbResult<()> {
    if matches!(minutes, Some(m) if m <= 0) {
        return Err(DbError::invalid("duration_minutes must be positive"));
    }
    Ok(())
}

impl Task {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status_str: String = row.get("status")?;
        let priority_str: String = row.get("priority")?;

        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            status: TaskStatus::from_str(&status_str).unwrap_or(TaskStatus::Todo),
            priority: Priority::from_str(&priority_str).unwrap_or(Priority::Medium),
            due_date: row.get("due_date")?,
            duration_minutes: row.get("duration_minutes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Parsed due timestamp
    pub fn due(&self) -> Option<DateTime<Utc>> {
        self.due_date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc))
    }

    /// Not done and due before `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Done && matches!(self.due(), Some(due) if due < now)
    }

    pub fn create(conn: &Connection, data: &TaskCreate) -> DbResult<Self> {
        if data.title.trim().is_empty() {
            return Err(DbError::invalid("task title cannot be empty"));
        }
        check_duration(data.duration_minutes)?;
        let due_date = data
            .due_date
            .as_deref()
            .map(normalize_timestamp)
            .transpose()?;

        conn.execute(
            r#"
            INSERT INTO tasks (title, description, status, priority, due_date, duration_minutes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.title.trim(),
                data.description,
                data.status.unwrap_or(TaskStatus::Todo).as_str(),
                data.priority.unwrap_or(Priority::Medium).as_str(),
                due_date,
                data.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List tasks, soonest due first (undated last)
    pub fn list(conn: &Connection, filter: &TaskFilter) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM tasks WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            params_vec.push(Box::new(status.as_str()));
            sql.push_str(&format!(" AND status = ?{}", params_vec.len()));
        }
        if let Some(priority) = filter.priority {
            params_vec.push(Box::new(priority.as_str()));
            sql.push_str(&format!(" AND priority = ?{}", params_vec.len()));
        }
        if filter.pending_only {
            sql.push_str(" AND status IN ('todo', 'in_progress')");
        }

        sql.push_str(" ORDER BY due_date IS NULL, due_date, id");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let tasks = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    /// Tasks due on a calendar day in the server's local time zone
    pub fn list_for_day(conn: &Connection, day: NaiveDate) -> DbResult<Vec<Self>> {
        Self::list_for_day_in(conn, day, &Local)
    }

    /// Tasks due between local midnight of `day` in `tz` and the next
    /// midnight, compared against the stored UTC timestamps
    pub fn list_for_day_in<Tz: TimeZone>(
        conn: &Connection,
        day: NaiveDate,
        tz: &Tz,
    ) -> DbResult<Vec<Self>> {
        let next_day = day
            .succ_opt()
            .ok_or_else(|| DbError::invalid(format!("no day after {}", day)))?;
        let start = local_midnight_utc(day, tz)?;
        let end = local_midnight_utc(next_day, tz)?;

        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM tasks
            WHERE due_date >= ?1 AND due_date < ?2
            ORDER BY due_date, id
            "#
        )?;
        let tasks = stmt
            .query_map([start, end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    /// Unfinished tasks due within `days` of `now`, overdue ones included,
    /// soonest first
    pub fn upcoming(conn: &Connection, now: DateTime<Utc>, days: i64) -> DbResult<Vec<Self>> {
        let horizon = (now + Duration::days(days))
            .format(TIMESTAMP_FORMAT)
            .to_string();

        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM tasks
            WHERE status != 'done' AND due_date IS NOT NULL AND due_date <= ?1
            ORDER BY due_date, id
            "#
        )?;
        let tasks = stmt
            .query_map([horizon], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub fn update(conn: &Connection, id: i64, data: &TaskUpdate) -> DbResult<Option<Self>> {
        check_duration(data.duration_minutes)?;
        if matches!(data.title, Some(ref t) if t.trim().is_empty()) {
            return Err(DbError::invalid("task title cannot be empty"));
        }

        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref v) = data.title {
            updates.push("title = ?");
            values.push(Box::new(v.trim().to_string()));
        }
        if let Some(ref v) = data.description {
            updates.push("description = ?");
            values.push(Box::new(v.clone()));
        }
        if let Some(v) = data.status {
            updates.push("status = ?");
            values.push(Box::new(v.as_str()));
        }
        if let Some(v) = data.priority {
            updates.push("priority = ?");
            values.push(Box::new(v.as_str()));
        }
        if let Some(ref v) = data.due_date {
            updates.push("due_date = ?");
            if v.trim().is_empty() {
                values.push(Box::new(Option::<String>::None));
            } else {
                values.push(Box::new(normalize_timestamp(v)?));
            }
        }
        if let Some(v) = data.duration_minutes {
            updates.push("duration_minutes = ?");
            values.push(Box::new(v));
        }

        if !updates.is_empty() {
            updates.push("updated_at = datetime('now')");
            let sql = format!("UPDATE tasks SET {} WHERE id = ?", updates.join(", "));
            values.push(Box::new(id));
            let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
            conn.execute(&sql, params.as_slice())?;
        }

        Self::get_by_id(conn, id)
    }

    /// Move a task to another kanban column
    pub fn set_status(conn: &Connection, id: i64, status: TaskStatus) -> DbResult<Option<Self>> {
        Self::update(conn, id, &TaskUpdate {
            status: Some(status),
            ..Default::default()
        })
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

/// UTC timestamp of the first instant of `day` in `tz`. A midnight skipped
/// by a DST change falls back to the first hour that exists.
fn local_midnight_utc<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DbResult<String> {
    let midnight = day.and_time(NaiveTime::MIN);
    let start = tz
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .ok_or_else(|| DbError::invalid(format!("no local midnight on {}", day)))?;

    Ok(start.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;
    use chrono::FixedOffset;

    fn task(conn: &Connection, title: &str, due: Option<&str>, priority: Priority) -> Task {
        Task::create(conn, &TaskCreate {
            title: title.to_string(),
            due_date: due.map(str::to_string),
            priority: Some(priority),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_create_defaults_and_normalizes_due() {
        let conn = test_conn();
        let t = task(&conn, "Lab report", Some("2025-04-10T09:30:00+05:30"), Priority::Medium);

        assert_eq!(t.status, TaskStatus::Todo);
        assert_eq!(t.duration_minutes, 15);
        assert_eq!(t.due_date.as_deref(), Some("2025-04-10T04:00:00Z"));
    }

    #[test]
    fn test_create_rejects_bad_due_date() {
        let conn = test_conn();
        let result = Task::create(&conn, &TaskCreate {
            title: "Bad".to_string(),
            due_date: Some("next tuesday".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(DbError::InvalidInput(_))));
    }

    #[test]
    fn test_list_for_day() {
        let conn = test_conn();
        task(&conn, "Morning", Some("2025-04-10T06:00:00Z"), Priority::Low);
        task(&conn, "Evening", Some("2025-04-10T18:00:00Z"), Priority::Low);
        task(&conn, "Tomorrow", Some("2025-04-11T06:00:00Z"), Priority::Low);
        task(&conn, "Someday", None, Priority::Low);

        let day = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let titles: Vec<String> = Task::list_for_day_in(&conn, day, &Utc)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Morning", "Evening"]);
    }

    #[test]
    fn test_list_for_day_uses_local_calendar_day() {
        let conn = test_conn();
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        task(&conn, "Early call", Some("2025-06-03T02:00:00+05:30"), Priority::Medium);
        task(&conn, "Late night", Some("2025-06-02T23:30:00+05:30"), Priority::Low);

        let titles = |day: NaiveDate| -> Vec<String> {
            Task::list_for_day_in(&conn, day, &ist)
                .unwrap()
                .into_iter()
                .map(|t| t.title)
                .collect()
        };
        assert_eq!(titles(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()), vec!["Early call"]);
        assert_eq!(titles(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()), vec!["Late night"]);
    }

    #[test]
    fn test_upcoming_window() {
        let conn = test_conn();
        let now = Utc.with_ymd_and_hms(2025, 4, 10, 12, 0, 0).unwrap();

        task(&conn, "Overdue", Some("2025-04-08T12:00:00Z"), Priority::High);
        task(&conn, "Soon", Some("2025-04-12T12:00:00Z"), Priority::Medium);
        task(&conn, "Edge", Some("2025-04-13T12:00:00Z"), Priority::Low);
        task(&conn, "Later", Some("2025-04-20T12:00:00Z"), Priority::Low);
        let done = task(&conn, "Finished", Some("2025-04-11T12:00:00Z"), Priority::Low);
        Task::set_status(&conn, done.id, TaskStatus::Done).unwrap();

        let upcoming = Task::upcoming(&conn, now, 3).unwrap();
        let titles: Vec<&str> = upcoming.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Overdue", "Soon", "Edge"]);
        assert!(upcoming[0].is_overdue(now));
        assert!(!upcoming[1].is_overdue(now));
    }

    #[test]
    fn test_list_filters() {
        let conn = test_conn();
        let a = task(&conn, "A", None, Priority::High);
        task(&conn, "B", None, Priority::Low);
        let c = task(&conn, "C", None, Priority::High);
        Task::set_status(&conn, c.id, TaskStatus::Review).unwrap();

        let high = Task::list(&conn, &TaskFilter {
            priority: Some(Priority::High),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(high.len(), 2);

        let pending_high = Task::list(&conn, &TaskFilter {
            priority: Some(Priority::High),
            pending_only: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(pending_high.len(), 1);
        assert_eq!(pending_high[0].id, a.id);
    }

    #[test]
    fn test_update_clears_due_date() {
        let conn = test_conn();
        let t = task(&conn, "Read", Some("2025-04-10"), Priority::Low);
        assert_eq!(t.due_date.as_deref(), Some("2025-04-10T00:00:00Z"));

        let cleared = Task::update(&conn, t.id, &TaskUpdate {
            due_date: Some(String::new()),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        assert!(cleared.due_date.is_none());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(TaskStatus::from_str("In Progress"), Some(TaskStatus::InProgress));
        assert!(TaskStatus::InProgress.is_pending());
        assert!(!TaskStatus::Review.is_pending());
    }
}
