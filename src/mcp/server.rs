//! LifeDash MCP Server Implementation
//!
//! Registers the vitality, academic, productivity and dashboard tools.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::{migrations, Database};
use crate::metrics::{ActivityLevel, Gender, MetricKind};
use crate::models::{
    DailyMetricsPatch, FoodLogUpdate, Macros, Priority, ProfileUpdate, ProjectCreate, ProjectUpdate,
    SubjectCreate, SubjectUpdate, TaskCreate, TaskStatus, TaskUpdate,
};
use crate::tools::status::StatusTracker;
use crate::tools::vitality::ExerciseInput;
use crate::tools::{academic, dashboard, productivity, vitality};

/// LifeDash MCP Service
#[derive(Clone)]
pub struct LifeDashService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<LifeDashService>,
}

impl LifeDashService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Requested date, or the local calendar date
fn date_or_today(date: Option<String>) -> String {
    date.unwrap_or_else(|| today().format("%Y-%m-%d").to_string())
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn found_or_error<T: Serialize>(
    value: Option<T>,
    entity: &str,
    id: i64,
) -> Result<CallToolResult, McpError> {
    match value {
        Some(v) => json_result(&v),
        None => Ok(CallToolResult::success(vec![Content::text(format!(
            r#"{{"error": "{} not found", "id": {}}}"#,
            entity, id
        ))])),
    }
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    id: i64,
    deleted: bool,
}

fn parse_gender(s: &str) -> Result<Gender, McpError> {
    Gender::from_str(s).ok_or_else(|| {
        McpError::invalid_params(format!("Invalid gender: {}. Use male or female", s), None)
    })
}

fn parse_activity(s: &str) -> Result<ActivityLevel, McpError> {
    ActivityLevel::from_str(s).ok_or_else(|| {
        McpError::invalid_params(
            format!("Invalid activity level: {}. Use sedentary, light, moderate or active", s),
            None,
        )
    })
}

fn parse_task_status(s: &str) -> Result<TaskStatus, McpError> {
    TaskStatus::from_str(s).ok_or_else(|| {
        McpError::invalid_params(
            format!("Invalid task status: {}. Use todo, in_progress, review or done", s),
            None,
        )
    })
}

fn parse_priority(s: &str) -> Result<Priority, McpError> {
    Priority::from_str(s).ok_or_else(|| {
        McpError::invalid_params(format!("Invalid priority: {}. Use low, medium or high", s), None)
    })
}

// ============================================================================
// Shared Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    /// Date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
}

// ============================================================================
// Vitality Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    pub full_name: Option<String>,
    pub username: Option<String>,
    /// male or female
    pub gender: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    pub date_of_birth: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    /// sedentary, light, moderate or active
    pub activity_level: Option<String>,
    /// Daily calorie target (kcal)
    pub caloric_target: Option<f64>,
    /// Daily water target (ml)
    pub hydration_target: Option<f64>,
    /// Nightly sleep target (hours)
    pub sleep_target: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDailyMetricsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default = "default_days_limit")]
    pub limit: i64,
}

fn default_days_limit() -> i64 { 30 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateDailyMetricsParams {
    /// Date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
    pub calories_consumed: Option<f64>,
    pub protein_consumed: Option<f64>,
    pub carbs_consumed: Option<f64>,
    pub fats_consumed: Option<f64>,
    pub calories_burned: Option<f64>,
    /// Water intake (ml)
    pub water_intake: Option<f64>,
    pub sleep_hours: Option<f64>,
    /// Mood from 1 to 5
    pub mood_rating: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AdjustMetricParams {
    /// Date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
    /// calories, hydration or sleep
    pub metric: String,
    /// Amount to add (negative to subtract). Defaults to 50 kcal, 250 ml or 0.5 h
    pub delta: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetMoodParams {
    /// Date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
    /// Mood from 1 (awful) to 5 (great)
    pub mood: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodParams {
    /// Date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
    pub food_name: String,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogCatalogFoodParams {
    /// Date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
    /// Exact catalog name, as returned by search_food_catalog
    pub food_name: String,
    /// Portion in the food's unit, defaults to its standard serving
    pub portion: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFoodLogParams {
    /// Food log ID
    pub id: i64,
    pub food_name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchCatalogParams {
    pub query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogExerciseParams {
    /// Date (YYYY-MM-DD), defaults to today
    pub date: Option<String>,
    /// Activity name from list_exercise_types
    pub exercise_type: String,
    pub duration_minutes: Option<f64>,
    /// Overrides the MET estimate
    pub calories_burned: Option<f64>,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    /// Weight lifted (kg)
    pub weight_lifted: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddPlannedMealParams {
    /// monday through sunday
    pub day_of_week: String,
    /// breakfast, lunch, dinner or snack
    pub meal_type: String,
    pub meal_name: String,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fats: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDietPlanParams {
    /// Single day (monday..sunday); all days when omitted
    pub day_of_week: Option<String>,
}

// ============================================================================
// Academic Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddSubjectParams {
    pub name: String,
    pub professor_name: Option<String>,
    /// Defaults to 3
    pub credits: Option<i64>,
    /// Target attendance percentage, defaults to 75
    pub target_attendance: Option<i64>,
    /// Defaults to "academic"
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListSubjectsParams {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateSubjectParams {
    pub id: i64,
    pub name: Option<String>,
    pub professor_name: Option<String>,
    pub credits: Option<i64>,
    pub target_attendance: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MarkAttendanceParams {
    pub subject_id: i64,
    /// present or absent
    pub status: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateAttendanceParams {
    /// Attendance log ID
    pub id: i64,
    /// present or absent; flips the current status when omitted
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddChapterParams {
    pub subject_id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateChapterParams {
    /// Chapter ID
    pub id: i64,
    /// not_started, learning, reviewing or mastered; advances one stage when omitted
    pub status: Option<String>,
}

// ============================================================================
// Productivity Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateTaskParams {
    pub title: String,
    pub description: Option<String>,
    /// todo, in_progress, review or done (default todo)
    pub status: Option<String>,
    /// low, medium or high (default medium)
    pub priority: Option<String>,
    /// RFC 3339 timestamp, YYYY-MM-DDTHH:MM or YYYY-MM-DD
    pub due_date: Option<String>,
    /// Estimated minutes, defaults to 15
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListTasksParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Only tasks not yet done
    #[serde(default)]
    pub pending_only: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateTaskParams {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// New due date; empty string clears it
    pub due_date: Option<String>,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MoveTaskParams {
    pub id: i64,
    /// todo, in_progress, review or done
    pub status: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpcomingTasksParams {
    /// Window in days, defaults to 3
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateProjectParams {
    pub title: String,
    pub description: Option<String>,
    /// Deadline (YYYY-MM-DD)
    pub deadline: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProjectParams {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddMilestoneParams {
    pub project_id: i64,
    pub title: String,
    /// Due date (YYYY-MM-DD)
    pub due_date: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl LifeDashService {
    // --- Status ---

    #[tool(description = "Get the current status of the LifeDash service including build info, database status, and process information")]
    async fn lifedash_status(&self) -> Result<CallToolResult, McpError> {
        let schema_version = self.database.with_conn(migrations::get_schema_version).ok();
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status(schema_version))
    }

    #[tool(description = "Get instructions for profile, daily metrics, food, exercise and diet plan tools. Call this when starting a health tracking session.")]
    fn vitality_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::VITALITY_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(VITALITY_INSTRUCTIONS)]))
    }

    #[tool(description = "Get instructions for subject, attendance and chapter tools.")]
    fn academic_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ACADEMIC_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(ACADEMIC_INSTRUCTIONS)]))
    }

    #[tool(description = "Get instructions for task, project and dashboard tools.")]
    fn productivity_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::PRODUCTIVITY_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(PRODUCTIVITY_INSTRUCTIONS)]))
    }

    // --- Dashboard ---

    #[tool(description = "Overview of the day: low-attendance subjects, pending and high-priority tasks, tasks due soon, and daily metrics against targets")]
    fn get_dashboard(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let date = date_or_today(p.date);
        let result = dashboard::get_dashboard(&self.database, &date, Utc::now())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Profile ---

    #[tool(description = "Get the profile with BMR and TDEE derived from body stats")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let result = vitality::get_profile(&self.database, today())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update profile fields (body stats, activity level, daily targets). Only provided fields change.")]
    fn update_profile(&self, Parameters(p): Parameters<UpdateProfileParams>) -> Result<CallToolResult, McpError> {
        let data = ProfileUpdate {
            full_name: p.full_name,
            username: p.username,
            gender: p.gender.as_deref().map(parse_gender).transpose()?,
            date_of_birth: p.date_of_birth,
            weight_kg: p.weight_kg,
            height_cm: p.height_cm,
            activity_level: p.activity_level.as_deref().map(parse_activity).transpose()?,
            caloric_target: p.caloric_target,
            hydration_target: p.hydration_target,
            sleep_target: p.sleep_target,
        };
        let result = vitality::update_profile(&self.database, &data, today())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get BMR, TDEE and the calorie balance (target, consumed, burned, net, remaining) for a date")]
    fn get_energy_summary(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let date = date_or_today(p.date);
        let result = vitality::get_energy_summary(&self.database, &date, today())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Daily Metrics ---

    #[tool(description = "Get daily metrics for a date with progress toward calorie, hydration and sleep goals. Returns an unsaved empty day if nothing was logged.")]
    fn get_daily_metrics(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let date = date_or_today(p.date);
        let result = vitality::get_daily_metrics(&self.database, &date)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List stored days, newest first, with an optional date range")]
    fn list_daily_metrics(&self, Parameters(p): Parameters<ListDailyMetricsParams>) -> Result<CallToolResult, McpError> {
        let result = vitality::list_daily_metrics(
            &self.database,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            p.limit,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Set daily metric fields for a date. Only provided fields change. Reports goals newly reached.")]
    fn update_daily_metrics(&self, Parameters(p): Parameters<UpdateDailyMetricsParams>) -> Result<CallToolResult, McpError> {
        let date = date_or_today(p.date);
        let patch = DailyMetricsPatch {
            calories_consumed: p.calories_consumed,
            protein_consumed: p.protein_consumed,
            carbs_consumed: p.carbs_consumed,
            fats_consumed: p.fats_consumed,
            calories_burned: p.calories_burned,
            water_intake: p.water_intake,
            sleep_hours: p.sleep_hours,
            mood_rating: p.mood_rating,
        };
        let result = vitality::update_daily_metrics(&self.database, &date, &patch)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Add to (or subtract from) calories, hydration or sleep for a date. goal_reached is true only when this change crossed the target.")]
    fn adjust_metric(&self, Parameters(p): Parameters<AdjustMetricParams>) -> Result<CallToolResult, McpError> {
        let metric = MetricKind::from_str(&p.metric).ok_or_else(|| {
            McpError::invalid_params(
                format!("Invalid metric: {}. Use calories, hydration or sleep", p.metric),
                None,
            )
        })?;
        let date = date_or_today(p.date);
        let result = vitality::adjust_metric(&self.database, &date, metric, p.delta)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Set the mood rating (1-5) for a date")]
    fn set_mood(&self, Parameters(p): Parameters<SetMoodParams>) -> Result<CallToolResult, McpError> {
        let date = date_or_today(p.date);
        let result = vitality::set_mood(&self.database, &date, p.mood)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Food Logs ---

    #[tool(description = "Search the built-in food catalog by name")]
    fn search_food_catalog(&self, Parameters(p): Parameters<SearchCatalogParams>) -> Result<CallToolResult, McpError> {
        json_result(&vitality::search_food_catalog(&p.query))
    }

    #[tool(description = "Log a food with explicit macros. Daily consumed totals are recomputed.")]
    fn log_food(&self, Parameters(p): Parameters<LogFoodParams>) -> Result<CallToolResult, McpError> {
        let date = date_or_today(p.date);
        let macros = Macros::new(p.calories, p.protein, p.carbs, p.fats);
        let result = vitality::log_food(&self.database, &date, &p.food_name, macros)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Log a catalog food, scaling its macros to the portion. Daily consumed totals are recomputed.")]
    fn log_catalog_food(&self, Parameters(p): Parameters<LogCatalogFoodParams>) -> Result<CallToolResult, McpError> {
        let date = date_or_today(p.date);
        let result = vitality::log_catalog_food(&self.database, &date, &p.food_name, p.portion)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(r) => serde_json::to_string_pretty(&r),
            None => Ok(format!(r#"{{"error": "Catalog food not found", "food_name": {:?}}}"#, p.food_name)),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List food logs for a date with their totals")]
    fn list_food_logs(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let date = date_or_today(p.date);
        let result = vitality::list_food_logs(&self.database, &date)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Correct a food log's name or macros. Daily consumed totals are recomputed.")]
    fn update_food_log(&self, Parameters(p): Parameters<UpdateFoodLogParams>) -> Result<CallToolResult, McpError> {
        let data = FoodLogUpdate {
            food_name: p.food_name,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fats: p.fats,
        };
        let result = vitality::update_food_log(&self.database, p.id, &data)
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Food log", p.id)
    }

    #[tool(description = "Delete a food log. Daily consumed totals are recomputed.")]
    fn delete_food_log(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = vitality::delete_food_log(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Food log", p.id)
    }

    // --- Exercise Logs ---

    #[tool(description = "List known exercise types with MET values")]
    fn list_exercise_types(&self) -> Result<CallToolResult, McpError> {
        json_result(&vitality::list_exercise_types())
    }

    #[tool(description = "Log an exercise. Calories are estimated from MET and profile weight unless given. Daily calories burned are recomputed.")]
    fn log_exercise(&self, Parameters(p): Parameters<LogExerciseParams>) -> Result<CallToolResult, McpError> {
        let input = ExerciseInput {
            date: date_or_today(p.date),
            exercise_type: p.exercise_type,
            duration_minutes: p.duration_minutes,
            calories_burned: p.calories_burned,
            sets: p.sets,
            reps: p.reps,
            weight_lifted: p.weight_lifted,
        };
        let result = vitality::log_exercise(&self.database, &input)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List exercise logs for a date")]
    fn list_exercise_logs(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let date = date_or_today(p.date);
        let result = vitality::list_exercise_logs(&self.database, &date)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete an exercise log. Daily calories burned are recomputed.")]
    fn delete_exercise_log(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = vitality::delete_exercise_log(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Exercise log", p.id)
    }

    // --- Diet Plan ---

    #[tool(description = "Add a meal to the weekly diet plan")]
    fn add_planned_meal(&self, Parameters(p): Parameters<AddPlannedMealParams>) -> Result<CallToolResult, McpError> {
        let macros = Macros::new(p.calories, p.protein, p.carbs, p.fats);
        let result = vitality::add_planned_meal(&self.database, &p.day_of_week, &p.meal_type, &p.meal_name, macros)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the weekly diet plan, or a single day, with summed macros per day")]
    fn get_diet_plan(&self, Parameters(p): Parameters<GetDietPlanParams>) -> Result<CallToolResult, McpError> {
        let result = vitality::get_diet_plan(&self.database, p.day_of_week.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Remove a meal from the diet plan")]
    fn delete_planned_meal(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let deleted = vitality::delete_planned_meal(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&DeleteResponse { id: p.id, deleted })
    }

    // --- Subjects ---

    #[tool(description = "Add a subject to track attendance and syllabus progress")]
    fn add_subject(&self, Parameters(p): Parameters<AddSubjectParams>) -> Result<CallToolResult, McpError> {
        let data = SubjectCreate {
            name: p.name,
            professor_name: p.professor_name,
            credits: p.credits,
            target_attendance: p.target_attendance,
            category: p.category,
        };
        let result = academic::add_subject(&self.database, &data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List subjects with attendance percentage, attendance band and study progress")]
    fn list_subjects(&self, Parameters(p): Parameters<ListSubjectsParams>) -> Result<CallToolResult, McpError> {
        let result = academic::list_subjects(&self.database, p.category.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a subject with its attendance history and chapters")]
    fn get_subject(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = academic::get_subject(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Subject", p.id)
    }

    #[tool(description = "Update a subject. Only provided fields change.")]
    fn update_subject(&self, Parameters(p): Parameters<UpdateSubjectParams>) -> Result<CallToolResult, McpError> {
        let data = SubjectUpdate {
            name: p.name,
            professor_name: p.professor_name,
            credits: p.credits,
            target_attendance: p.target_attendance,
            category: p.category,
        };
        let result = academic::update_subject(&self.database, p.id, &data)
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Subject", p.id)
    }

    #[tool(description = "Delete a subject with its attendance and chapters")]
    fn delete_subject(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let deleted = academic::delete_subject(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&DeleteResponse { id: p.id, deleted })
    }

    // --- Attendance ---

    #[tool(description = "Record one class as present or absent")]
    fn mark_attendance(&self, Parameters(p): Parameters<MarkAttendanceParams>) -> Result<CallToolResult, McpError> {
        let result = academic::mark_attendance(&self.database, p.subject_id, &p.status)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Change a recorded class's status, or flip it when no status is given")]
    fn update_attendance(&self, Parameters(p): Parameters<UpdateAttendanceParams>) -> Result<CallToolResult, McpError> {
        let result = academic::update_attendance(&self.database, p.id, p.status.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Attendance log", p.id)
    }

    #[tool(description = "Delete a recorded class")]
    fn delete_attendance(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let deleted = academic::delete_attendance(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&DeleteResponse { id: p.id, deleted })
    }

    // --- Chapters ---

    #[tool(description = "Add a syllabus chapter to a subject")]
    fn add_chapter(&self, Parameters(p): Parameters<AddChapterParams>) -> Result<CallToolResult, McpError> {
        let result = academic::add_chapter(&self.database, p.subject_id, &p.title)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Set a chapter's stage, or advance it one stage (not_started, learning, reviewing, mastered) when no status is given")]
    fn update_chapter(&self, Parameters(p): Parameters<UpdateChapterParams>) -> Result<CallToolResult, McpError> {
        let result = academic::update_chapter(&self.database, p.id, p.status.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Chapter", p.id)
    }

    #[tool(description = "Delete a chapter")]
    fn delete_chapter(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let deleted = academic::delete_chapter(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&DeleteResponse { id: p.id, deleted })
    }

    // --- Tasks ---

    #[tool(description = "Create a task")]
    fn create_task(&self, Parameters(p): Parameters<CreateTaskParams>) -> Result<CallToolResult, McpError> {
        let data = TaskCreate {
            title: p.title,
            description: p.description,
            status: p.status.as_deref().map(parse_task_status).transpose()?,
            priority: p.priority.as_deref().map(parse_priority).transpose()?,
            due_date: p.due_date,
            duration_minutes: p.duration_minutes,
        };
        let result = productivity::create_task(&self.database, &data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a task")]
    fn get_task(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = productivity::get_task(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Task", p.id)
    }

    #[tool(description = "List tasks with optional status and priority filters")]
    fn list_tasks(&self, Parameters(p): Parameters<ListTasksParams>) -> Result<CallToolResult, McpError> {
        let result = productivity::list_tasks(
            &self.database,
            p.status.as_deref(),
            p.priority.as_deref(),
            p.pending_only,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get tasks grouped into kanban columns (todo, in_progress, review, done)")]
    fn get_task_board(&self) -> Result<CallToolResult, McpError> {
        let result = productivity::get_task_board(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update a task. Only provided fields change; an empty due_date clears it.")]
    fn update_task(&self, Parameters(p): Parameters<UpdateTaskParams>) -> Result<CallToolResult, McpError> {
        let data = TaskUpdate {
            title: p.title,
            description: p.description,
            status: p.status.as_deref().map(parse_task_status).transpose()?,
            priority: p.priority.as_deref().map(parse_priority).transpose()?,
            due_date: p.due_date,
            duration_minutes: p.duration_minutes,
        };
        let result = productivity::update_task(&self.database, p.id, &data)
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Task", p.id)
    }

    #[tool(description = "Move a task to another kanban column")]
    fn move_task(&self, Parameters(p): Parameters<MoveTaskParams>) -> Result<CallToolResult, McpError> {
        let result = productivity::move_task(&self.database, p.id, &p.status)
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Task", p.id)
    }

    #[tool(description = "Delete a task")]
    fn delete_task(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let deleted = productivity::delete_task(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&DeleteResponse { id: p.id, deleted })
    }

    #[tool(description = "List tasks due on a calendar day with their total duration")]
    fn get_day_plan(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let date = date_or_today(p.date);
        let result = productivity::get_day_plan(&self.database, &date)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List unfinished tasks due within the next few days (default 3), overdue included, soonest first")]
    fn get_upcoming_tasks(&self, Parameters(p): Parameters<UpcomingTasksParams>) -> Result<CallToolResult, McpError> {
        let result = productivity::get_upcoming_tasks(&self.database, Utc::now(), p.days)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Projects ---

    #[tool(description = "Create a project")]
    fn create_project(&self, Parameters(p): Parameters<CreateProjectParams>) -> Result<CallToolResult, McpError> {
        let data = ProjectCreate {
            title: p.title,
            description: p.description,
            deadline: p.deadline,
        };
        let result = productivity::create_project(&self.database, &data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List projects with milestone progress, nearest deadline first")]
    fn list_projects(&self) -> Result<CallToolResult, McpError> {
        let result = productivity::list_projects(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a project with its milestones and progress")]
    fn get_project(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = productivity::get_project(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Project", p.id)
    }

    #[tool(description = "Update a project. Only provided fields change.")]
    fn update_project(&self, Parameters(p): Parameters<UpdateProjectParams>) -> Result<CallToolResult, McpError> {
        let data = ProjectUpdate {
            title: p.title,
            description: p.description,
            deadline: p.deadline,
        };
        let result = productivity::update_project(&self.database, p.id, &data)
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Project", p.id)
    }

    #[tool(description = "Delete a project and its milestones")]
    fn delete_project(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let deleted = productivity::delete_project(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&DeleteResponse { id: p.id, deleted })
    }

    #[tool(description = "Add a milestone to a project")]
    fn add_milestone(&self, Parameters(p): Parameters<AddMilestoneParams>) -> Result<CallToolResult, McpError> {
        let result = productivity::add_milestone(&self.database, p.project_id, &p.title, p.due_date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Flip a milestone between pending and completed")]
    fn toggle_milestone(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = productivity::toggle_milestone(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        found_or_error(result, "Milestone", p.id)
    }

    #[tool(description = "Delete a milestone")]
    fn delete_milestone(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let deleted = productivity::delete_milestone(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&DeleteResponse { id: p.id, deleted })
    }
}

#[tool_handler]
impl ServerHandler for LifeDashService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "lifedash".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("LifeDash".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "LifeDash - academics, productivity and vitality tracking. \
                 Start with get_dashboard for an overview. \
                 Call vitality_instructions, academic_instructions or productivity_instructions before using a tool group. \
                 Vitality: get/update_profile, get_energy_summary, get/list/update_daily_metrics, adjust_metric, set_mood, \
                 search_food_catalog, log_food, log_catalog_food, list_food_logs, update/delete_food_log, \
                 list_exercise_types, log_exercise, list/delete_exercise_log(s), add/delete_planned_meal, get_diet_plan. \
                 Academic: add/list/get/update/delete_subject, mark/update/delete_attendance, add/update/delete_chapter. \
                 Productivity: create/get/list/update/delete_task, get_task_board, move_task, get_day_plan, get_upcoming_tasks, \
                 create/list/get/update/delete_project, add/toggle/delete_milestone. \
                 Dates are YYYY-MM-DD and default to today."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> LifeDashService {
        LifeDashService::new(PathBuf::from(":memory:"), crate::db::test_db())
    }

    fn text(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect()
    }

    #[test]
    fn test_date_or_today() {
        assert_eq!(date_or_today(Some("2025-06-02".to_string())), "2025-06-02");
        assert_eq!(date_or_today(None), today().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_not_found_is_json() {
        let svc = service();
        let result = svc.get_task(Parameters(IdParams { id: 42 })).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text(&result)).unwrap();
        assert_eq!(value["error"], "Task not found");
        assert_eq!(value["id"], 42);
    }

    #[test]
    fn test_invalid_metric_rejected() {
        let svc = service();
        let result = svc.adjust_metric(Parameters(AdjustMetricParams {
            date: Some("2025-06-02".to_string()),
            metric: "steps".to_string(),
            delta: None,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_adjust_metric_round_trip() {
        let svc = service();
        let result = svc
            .adjust_metric(Parameters(AdjustMetricParams {
                date: Some("2025-06-02".to_string()),
                metric: "hydration".to_string(),
                delta: Some(2500.0),
            }))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text(&result)).unwrap();
        assert_eq!(value["goal_reached"], true);
        assert_eq!(value["current"], 2500.0);
    }

    #[test]
    fn test_server_info() {
        let info = service().get_info();
        assert_eq!(info.server_info.name, "lifedash");
        assert!(info.capabilities.tools.is_some());
    }
}
