//! LifeDash Status Tool
//!
//! Runtime status of the service plus the usage guides served to assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Daily metrics, food and exercise logging guide
pub const VITALITY_INSTRUCTIONS: &str = r#"
# LifeDash Vitality Instructions

## Dates

All daily tools take `date` as `YYYY-MM-DD`. Resolve "today" or "yesterday"
on the client side before calling; the server does not guess dates.

## Profile

`get_profile` returns the stored profile together with BMR and TDEE.
BMR uses Mifflin-St Jeor and needs weight_kg, height_cm, date_of_birth and
gender. If any of them is missing, BMR and TDEE are reported as 0 and
`body_stats_complete` is false. Ask the user for the missing fields and
store them with `update_profile`.

Activity levels: sedentary (1.2), light (1.375), moderate (1.55),
active (1.725).

Targets live on the profile:

| Metric    | Field            | Default |
|-----------|------------------|---------|
| calories  | caloric_target   | 2000    |
| hydration | hydration_target | 2500 ml |
| sleep     | sleep_target     | 8 h     |

## Daily metrics

- `get_daily_metrics` returns the stored day or an empty day (zeros,
  mood 5). Reading never creates a row.
- `update_daily_metrics` writes only the fields you pass.
- `adjust_metric` adds a delta to calories, hydration or sleep.
  Use it for "+250 ml water" style requests. Values never drop below 0
  and sleep is capped at 24 h.
- `goal_reached` is true only when the change moved the value from below
  the target to at or above it. Congratulate the user once, not on every
  later increment.
- Summaries carry `mood_label` and a `mood_quote` for the day's mood rating.
  The quote stays the same for a given day and rating.

## Food

- `search_food_catalog` looks up ~50 built-in foods.
- `log_catalog_food` logs a catalog food; `portion` is in the food's unit
  and defaults to its standard serving.
- `log_food` logs anything else with explicit macros.

Consumed totals on the day are recomputed from the food logs after every
insert and delete. Do not also adjust calories by hand.

## Exercise

`list_exercise_types` lists the known activities with their MET values.
Calories are estimated as MET x weight_kg x hours. This needs a weight on
the profile; without it the estimate is 0 unless `calories_burned` is given.

Gym lifts (squats, bench press, deadlift and so on) accept `sets`, `reps`
and `weight_lifted`. When only sets are known the duration is taken as
2.5 minutes per set.

Burned totals on the day are recomputed after every insert and delete.

## Diet planner

Weekly plan keyed by day of week (monday..sunday) and meal type
(breakfast, lunch, dinner, snack). `get_diet_plan` returns each day's meals
with their summed macros.
"#;

/// Subjects, attendance and syllabus guide
pub const ACADEMIC_INSTRUCTIONS: &str = r#"
# LifeDash Academic Instructions

## Subjects

Each subject has credits (default 3), target_attendance (default 75) and
a category (default "academic"). `list_subjects` returns every subject with:

- `attendance_percentage`: present / total classes, 100 with no classes
- `attendance_band`: good (>= 75), warning (60-74), critical (< 60)
- `below_target`: attendance under the subject's own target
- `study_progress`: mastered / total chapters, 0 with no chapters

## Attendance

- `mark_attendance` records one class as present or absent.
- `update_attendance` sets a recorded class to a status, or flips it when
  no status is given. Use it to fix a wrongly marked class.
- `delete_attendance` removes a class entirely.

## Chapters

Chapter stages cycle: not_started -> learning -> reviewing -> mastered ->
not_started. `update_chapter` without a status advances one stage.

Deleting a subject also deletes its attendance and chapters.
"#;

/// Tasks and projects guide
pub const PRODUCTIVITY_INSTRUCTIONS: &str = r#"
# LifeDash Productivity Instructions

## Tasks

Status columns: todo, in_progress, review, done.
Priorities: low, medium (default), high.

`due_date` accepts RFC 3339 (`2025-06-03T17:00:00+05:30`), a
`YYYY-MM-DDTHH:MM` timestamp or a bare date. Values without an offset are
read as UTC, so send the offset for local times. It is stored in UTC.
Pass an empty string to `update_task` to clear it.

- `get_task_board` groups tasks by status column.
- `move_task` changes only the status.
- `get_day_plan` lists tasks due on a date (server local time) with their
  total duration.
- `get_upcoming_tasks` lists unfinished tasks due within the next 3 days,
  overdue ones included, soonest first.

## Projects

Projects have an optional deadline and a list of milestones.
`progress` is completed milestones / total milestones (0 with none).
`toggle_milestone` flips a milestone between pending and completed.

## Dashboard

`get_dashboard` combines low-attendance subjects, pending and high-priority
tasks, tasks due soon and the day's metrics against their targets. Call it
first when the user asks how they are doing.
"#;

/// Runtime status of the LifeDash service
#[derive(Debug, Clone, Serialize)]
pub struct LifeDashStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: Option<i32>,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Collects runtime information for the status tool
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Snapshot of build, database and process state
    pub fn get_status(&self, schema_version: Option<i32>) -> LifeDashStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        LifeDashStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
