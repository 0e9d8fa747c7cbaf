//! Productivity MCP Tools
//!
//! Kanban tasks, the day planner, upcoming deadlines and projects with
//! milestones.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{
    Milestone, MilestoneCreate, Priority, Project, ProjectCreate, ProjectUpdate,
    ProjectWithProgress, Task, TaskCreate, TaskFilter, TaskStatus, TaskUpdate,
};

/// Window for upcoming deadline notifications
pub const UPCOMING_DAYS: i64 = 3;

// ============================================================================
// Response Structs
// ============================================================================

/// Tasks grouped by kanban column
#[derive(Debug, Default, Serialize)]
pub struct TaskBoard {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub review: Vec<Task>,
    pub done: Vec<Task>,
}

/// Tasks scheduled on a calendar day
#[derive(Debug, Serialize)]
pub struct DayPlan {
    pub date: String,
    pub tasks: Vec<Task>,
    pub total_minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct UpcomingTask {
    #[serde(flatten)]
    pub task: Task,
    pub overdue: bool,
    /// Negative when overdue
    pub hours_until_due: i64,
}

#[derive(Debug, Serialize)]
pub struct UpcomingTasksResponse {
    pub window_days: i64,
    pub overdue_count: usize,
    pub tasks: Vec<UpcomingTask>,
}

/// A milestone change and its project's updated progress
#[derive(Debug, Serialize)]
pub struct MilestoneResponse {
    pub milestone: Milestone,
    pub project_progress: u32,
}

fn parse_status(status: &str) -> Result<TaskStatus, String> {
    TaskStatus::from_str(status).ok_or_else(|| {
        format!("Invalid task status: {}. Use todo, in_progress, review or done", status)
    })
}

fn parse_priority(priority: &str) -> Result<Priority, String> {
    Priority::from_str(priority)
        .ok_or_else(|| format!("Invalid priority: {}. Use low, medium or high", priority))
}

// ============================================================================
// Task Tools
// ============================================================================

pub fn create_task(db: &Database, data: &TaskCreate) -> Result<Task, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let task = Task::create(&conn, data).map_err(|e| format!("Failed to create task: {}", e))?;

    info!(id = task.id, priority = task.priority.as_str(), "task created");
    Ok(task)
}

pub fn get_task(db: &Database, id: i64) -> Result<Option<Task>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Task::get_by_id(&conn, id).map_err(|e| format!("Failed to get task: {}", e))
}

/// List tasks with optional status/priority filters
pub fn list_tasks(
    db: &Database,
    status: Option<&str>,
    priority: Option<&str>,
    pending_only: bool,
) -> Result<Vec<Task>, String> {
    let filter = TaskFilter {
        status: status.map(parse_status).transpose()?,
        priority: priority.map(parse_priority).transpose()?,
        pending_only,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Task::list(&conn, &filter).map_err(|e| format!("Failed to list tasks: {}", e))
}

/// All tasks grouped into kanban columns
pub fn get_task_board(db: &Database) -> Result<TaskBoard, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let tasks = Task::list(&conn, &TaskFilter::default())
        .map_err(|e| format!("Failed to list tasks: {}", e))?;

    let mut board = TaskBoard::default();
    for task in tasks {
        match task.status {
            TaskStatus::Todo => board.todo.push(task),
            TaskStatus::InProgress => board.in_progress.push(task),
            TaskStatus::Review => board.review.push(task),
            TaskStatus::Done => board.done.push(task),
        }
    }
    Ok(board)
}

pub fn update_task(db: &Database, id: i64, data: &TaskUpdate) -> Result<Option<Task>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Task::update(&conn, id, data).map_err(|e| format!("Failed to update task: {}", e))
}

/// Move a task to another kanban column
pub fn move_task(db: &Database, id: i64, status: &str) -> Result<Option<Task>, String> {
    let status = parse_status(status)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Task::set_status(&conn, id, status).map_err(|e| format!("Failed to move task: {}", e))
}

pub fn delete_task(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Task::delete(&conn, id).map_err(|e| format!("Failed to delete task: {}", e))
}

/// Tasks due on a day with their total planned time
pub fn get_day_plan(db: &Database, date: &str) -> Result<DayPlan, String> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date: {}. Use YYYY-MM-DD", date))?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let tasks = Task::list_for_day(&conn, day)
        .map_err(|e| format!("Failed to get day plan: {}", e))?;

    Ok(DayPlan {
        date: date.to_string(),
        total_minutes: tasks.iter().map(|t| t.duration_minutes).sum(),
        tasks,
    })
}

/// Unfinished tasks due within `days` (default 3), overdue ones first
pub fn get_upcoming_tasks(
    db: &Database,
    now: DateTime<Utc>,
    days: Option<i64>,
) -> Result<UpcomingTasksResponse, String> {
    let days = days.unwrap_or(UPCOMING_DAYS).max(0);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let tasks = Task::upcoming(&conn, now, days)
        .map_err(|e| format!("Failed to get upcoming tasks: {}", e))?;

    let tasks: Vec<UpcomingTask> = tasks
        .into_iter()
        .map(|task| {
            let hours = task
                .due()
                .map(|due| (due - now).num_hours())
                .unwrap_or_default();
            UpcomingTask {
                overdue: task.is_overdue(now),
                hours_until_due: hours,
                task,
            }
        })
        .collect();

    Ok(UpcomingTasksResponse {
        window_days: days,
        overdue_count: tasks.iter().filter(|t| t.overdue).count(),
        tasks,
    })
}

// ============================================================================
// Project Tools
// ============================================================================

pub fn create_project(db: &Database, data: &ProjectCreate) -> Result<ProjectWithProgress, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let project = Project::create(&conn, data)
        .map_err(|e| format!("Failed to create project: {}", e))?;

    info!(id = project.id, "project created");
    Ok(ProjectWithProgress::new(project, Vec::new()))
}

pub fn list_projects(db: &Database) -> Result<Vec<ProjectWithProgress>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Project::list_with_progress(&conn).map_err(|e| format!("Failed to list projects: {}", e))
}

pub fn get_project(db: &Database, id: i64) -> Result<Option<ProjectWithProgress>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Project::get_with_progress(&conn, id).map_err(|e| format!("Failed to get project: {}", e))
}

pub fn update_project(
    db: &Database,
    id: i64,
    data: &ProjectUpdate,
) -> Result<Option<ProjectWithProgress>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Project::update(&conn, id, data).map_err(|e| format!("Failed to update project: {}", e))?;
    Project::get_with_progress(&conn, id).map_err(|e| format!("Failed to get project: {}", e))
}

/// Delete a project and its milestones
pub fn delete_project(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Project::delete(&conn, id).map_err(|e| format!("Failed to delete project: {}", e))
}

// ============================================================================
// Milestone Tools
// ============================================================================

fn milestone_response(
    conn: &rusqlite::Connection,
    milestone: Milestone,
) -> Result<MilestoneResponse, String> {
    let project = Project::get_with_progress(conn, milestone.project_id)
        .map_err(|e| format!("Failed to get project: {}", e))?
        .ok_or_else(|| format!("Project not found: {}", milestone.project_id))?;

    Ok(MilestoneResponse {
        milestone,
        project_progress: project.progress,
    })
}

pub fn add_milestone(
    db: &Database,
    project_id: i64,
    title: &str,
    due_date: Option<&str>,
) -> Result<MilestoneResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let milestone = Milestone::create(&conn, &MilestoneCreate {
        project_id,
        title: title.to_string(),
        due_date: due_date.map(str::to_string),
    })
    .map_err(|e| format!("Failed to add milestone: {}", e))?;

    milestone_response(&conn, milestone)
}

/// Flip a milestone between pending and completed
pub fn toggle_milestone(db: &Database, id: i64) -> Result<Option<MilestoneResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let milestone = Milestone::toggle(&conn, id)
        .map_err(|e| format!("Failed to toggle milestone: {}", e))?;

    match milestone {
        Some(m) => milestone_response(&conn, m).map(Some),
        None => Ok(None),
    }
}

pub fn delete_milestone(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Milestone::delete(&conn, id).map_err(|e| format!("Failed to delete milestone: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use chrono::{Local, TimeZone};

    fn task(db: &Database, title: &str, due: Option<&str>, duration: Option<i64>) -> Task {
        create_task(db, &TaskCreate {
            title: title.to_string(),
            due_date: due.map(str::to_string),
            duration_minutes: duration,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_task_board_and_move() {
        let db = test_db();
        let a = task(&db, "Write essay", None, None);
        task(&db, "Email TA", None, None);

        move_task(&db, a.id, "in progress").unwrap().unwrap();
        let board = get_task_board(&db).unwrap();
        assert_eq!(board.todo.len(), 1);
        assert_eq!(board.in_progress.len(), 1);
        assert!(move_task(&db, a.id, "blocked").is_err());
        assert!(move_task(&db, 999, "done").unwrap().is_none());
    }

    #[test]
    fn test_day_plan_totals() {
        let db = test_db();
        let local = |day: u32, hour: u32| {
            Local
                .with_ymd_and_hms(2025, 6, day, hour, 0, 0)
                .unwrap()
                .to_rfc3339()
        };
        task(&db, "Gym", Some(local(2, 7).as_str()), Some(60));
        task(&db, "Standup", Some(local(2, 23).as_str()), None);
        task(&db, "Other day", Some(local(3, 1).as_str()), Some(30));

        let plan = get_day_plan(&db, "2025-06-02").unwrap();
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.total_minutes, 75);
        assert!(get_day_plan(&db, "June 2").is_err());
    }

    #[test]
    fn test_upcoming_tasks() {
        let db = test_db();
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        task(&db, "Late", Some("2025-06-01T12:00:00Z"), None);
        task(&db, "Tomorrow", Some("2025-06-03T12:00:00Z"), None);
        task(&db, "Next week", Some("2025-06-09T12:00:00Z"), None);

        let upcoming = get_upcoming_tasks(&db, now, None).unwrap();
        assert_eq!(upcoming.window_days, 3);
        assert_eq!(upcoming.tasks.len(), 2);
        assert_eq!(upcoming.overdue_count, 1);
        assert_eq!(upcoming.tasks[0].hours_until_due, -24);
        assert_eq!(upcoming.tasks[1].hours_until_due, 24);
    }

    #[test]
    fn test_list_tasks_filters() {
        let db = test_db();
        create_task(&db, &TaskCreate {
            title: "Urgent".to_string(),
            priority: Some(Priority::High),
            ..Default::default()
        })
        .unwrap();
        task(&db, "Normal", None, None);

        assert_eq!(list_tasks(&db, None, Some("high"), true).unwrap().len(), 1);
        assert_eq!(list_tasks(&db, Some("todo"), None, false).unwrap().len(), 2);
        assert!(list_tasks(&db, None, Some("urgent"), false).is_err());
    }

    #[test]
    fn test_project_milestones() {
        let db = test_db();
        let project = create_project(&db, &ProjectCreate {
            title: "Capstone".to_string(),
            deadline: Some("2025-12-01".to_string()),
            ..Default::default()
        })
        .unwrap();
        let pid = project.project.id;

        let m1 = add_milestone(&db, pid, "Proposal", Some("2025-07-01")).unwrap();
        add_milestone(&db, pid, "Prototype", None).unwrap();
        assert_eq!(m1.project_progress, 0);

        let toggled = toggle_milestone(&db, m1.milestone.id).unwrap().unwrap();
        assert_eq!(toggled.project_progress, 50);

        let listed = list_projects(&db).unwrap();
        assert_eq!(listed[0].completed_milestones, 1);

        assert!(delete_project(&db, pid).unwrap());
        assert!(get_project(&db, pid).unwrap().is_none());
    }
}
