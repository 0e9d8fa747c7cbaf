//! Project and milestone models

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::metrics::milestone_progress;

use super::parse_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneStatus {
    Pending,
    Completed,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(MilestoneStatus::Pending),
            "completed" | "done" => Some(MilestoneStatus::Completed),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            MilestoneStatus::Pending => MilestoneStatus::Completed,
            MilestoneStatus::Completed => MilestoneStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<String>, // ISO date
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectCreate {
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub status: MilestoneStatus,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneCreate {
    pub project_id: i64,
    pub title: String,
    pub due_date: Option<String>,
}

/// Project with its milestones and completion rollup
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithProgress {
    #[serde(flatten)]
    pub project: Project,
    pub milestones: Vec<Milestone>,
    pub completed_milestones: usize,
    pub total_milestones: usize,
    pub progress: u32,
}

impl ProjectWithProgress {
    pub fn new(project: Project, milestones: Vec<Milestone>) -> Self {
        let total = milestones.len();
        let completed = milestones
            .iter()
            .filter(|m| m.status == MilestoneStatus::Completed)
            .count();

        Self {
            project,
            milestones,
            completed_milestones: completed,
            total_milestones: total,
            progress: milestone_progress(completed, total),
        }
    }
}

fn check_optional_date(value: Option<&str>) -> DbResult<()> {
    match value {
        Some(d) if !d.is_empty() => parse_date(d).map(|_| ()),
        _ => Ok(()),
    }
}

impl Project {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            deadline: row.get("deadline")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &ProjectCreate) -> DbResult<Self> {
        if data.title.trim().is_empty() {
            return Err(DbError::invalid("project title cannot be empty"));
        }
        check_optional_date(data.deadline.as_deref())?;

        conn.execute(
            "INSERT INTO projects (title, description, deadline) VALUES (?1, ?2, ?3)",
            params![data.title.trim(), data.description, data.deadline],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM projects WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Project with its milestones
    pub fn get_with_progress(conn: &Connection, id: i64) -> DbResult<Option<ProjectWithProgress>> {
        match Self::get_by_id(conn, id)? {
            Some(project) => {
                let milestones = Milestone::list_for_project(conn, project.id)?;
                Ok(Some(ProjectWithProgress::new(project, milestones)))
            }
            None => Ok(None),
        }
    }

    /// All projects, nearest deadline first
    pub fn list_with_progress(conn: &Connection) -> DbResult<Vec<ProjectWithProgress>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM projects ORDER BY deadline IS NULL, deadline, id"
        )?;
        let projects = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        projects
            .into_iter()
            .map(|p| {
                let milestones = Milestone::list_for_project(conn, p.id)?;
                Ok(ProjectWithProgress::new(p, milestones))
            })
            .collect()
    }

    pub fn update(conn: &Connection, id: i64, data: &ProjectUpdate) -> DbResult<Option<Self>> {
        check_optional_date(data.deadline.as_deref())?;

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
        if let Some(ref v) = data.deadline {
            updates.push("deadline = ?");
            values.push(Box::new((!v.is_empty()).then(|| v.clone())));
        }

        if !updates.is_empty() {
            updates.push("updated_at = datetime('now')");
            let sql = format!("UPDATE projects SET {} WHERE id = ?", updates.join(", "));
            values.push(Box::new(id));
            let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
            conn.execute(&sql, params.as_slice())?;
        }

        Self::get_by_id(conn, id)
    }

    /// Delete a project and its milestones
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

impl Milestone {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status_str: String = row.get("status")?;

        Ok(Self {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            title: row.get("title")?,
            status: MilestoneStatus::from_str(&status_str).unwrap_or(MilestoneStatus::Pending),
            due_date: row.get("due_date")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &MilestoneCreate) -> DbResult<Self> {
        if data.title.trim().is_empty() {
            return Err(DbError::invalid("milestone title cannot be empty"));
        }
        check_optional_date(data.due_date.as_deref())?;
        if Project::get_by_id(conn, data.project_id)?.is_none() {
            return Err(DbError::not_found("Project", data.project_id));
        }

        conn.execute(
            "INSERT INTO project_milestones (project_id, title, due_date) VALUES (?1, ?2, ?3)",
            params![data.project_id, data.title.trim(), data.due_date],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM project_milestones WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(milestone) => Ok(Some(milestone)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_for_project(conn: &Connection, project_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM project_milestones
            WHERE project_id = ?1
            ORDER BY due_date IS NULL, due_date, id
            "#
        )?;
        let milestones = stmt
            .query_map([project_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(milestones)
    }

    /// Flip pending/completed
    pub fn toggle(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let Some(milestone) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        conn.execute(
            "UPDATE project_milestones SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![milestone.status.toggled().as_str(), id],
        )?;
        Self::get_by_id(conn, id)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM project_milestones WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;

    fn project(conn: &Connection, title: &str, deadline: Option<&str>) -> Project {
        Project::create(conn, &ProjectCreate {
            title: title.to_string(),
            deadline: deadline.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    fn milestone(conn: &Connection, project_id: i64, title: &str) -> Milestone {
        Milestone::create(conn, &MilestoneCreate {
            project_id,
            title: title.to_string(),
            due_date: None,
        })
        .unwrap()
    }

    #[test]
    fn test_progress_without_milestones() {
        let conn = test_conn();
        let p = project(&conn, "Portfolio site", None);
        let with = Project::get_with_progress(&conn, p.id).unwrap().unwrap();
        assert_eq!(with.progress, 0);
        assert_eq!(with.total_milestones, 0);
    }

    #[test]
    fn test_toggle_updates_progress() {
        let conn = test_conn();
        let p = project(&conn, "Thesis", Some("2025-06-30"));
        let m1 = milestone(&conn, p.id, "Outline");
        milestone(&conn, p.id, "Draft");
        milestone(&conn, p.id, "Submit");

        let toggled = Milestone::toggle(&conn, m1.id).unwrap().unwrap();
        assert_eq!(toggled.status, MilestoneStatus::Completed);

        let with = Project::get_with_progress(&conn, p.id).unwrap().unwrap();
        assert_eq!(with.completed_milestones, 1);
        assert_eq!(with.progress, 33);

        Milestone::toggle(&conn, m1.id).unwrap();
        let with = Project::get_with_progress(&conn, p.id).unwrap().unwrap();
        assert_eq!(with.progress, 0);
    }

    #[test]
    fn test_list_orders_by_deadline() {
        let conn = test_conn();
        project(&conn, "Undated", None);
        project(&conn, "Later", Some("2025-09-01"));
        project(&conn, "Sooner", Some("2025-05-01"));

        let titles: Vec<String> = Project::list_with_progress(&conn)
            .unwrap()
            .into_iter()
            .map(|p| p.project.title)
            .collect();
        assert_eq!(titles, vec!["Sooner", "Later", "Undated"]);
    }

    #[test]
    fn test_milestone_requires_project() {
        let conn = test_conn();
        let result = Milestone::create(&conn, &MilestoneCreate {
            project_id: 99,
            title: "Nowhere".to_string(),
            due_date: None,
        });
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[test]
    fn test_delete_cascades() {
        let conn = test_conn();
        let p = project(&conn, "Hackathon", None);
        let m = milestone(&conn, p.id, "Demo");
        assert!(Project::delete(&conn, p.id).unwrap());
        assert!(Milestone::get_by_id(&conn, m.id).unwrap().is_none());
    }

    #[test]
    fn test_update_rejects_bad_deadline() {
        let conn = test_conn();
        let p = project(&conn, "App", None);
        assert!(Project::update(&conn, p.id, &ProjectUpdate {
            deadline: Some("soon".to_string()),
            ..Default::default()
        })
        .is_err());
    }
}
