//! Vitality MCP Tools
//!
//! Profile, energy expenditure, daily metrics, food and exercise logs, the
//! weekly diet planner and the food catalog.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::info;

use crate::catalog::{self, CatalogFood};
use crate::db::Database;
use crate::metrics::{
    calculate_exercise_calories, crossed_goal, effective_totals, energy::EXERCISE_METS,
    gym_set_duration, is_gym_exercise, met_for, portion_macros, sum_field, sum_macros,
    CalorieBalance, EnergyProfile, MetricGoal, MetricKind,
};
use crate::models::{
    parse_date, DailyMetrics, DailyMetricsPatch, DayOfWeek, DietPlan, DietPlanCreate, ExerciseLog,
    ExerciseLogCreate, FoodLog, FoodLogCreate, FoodLogUpdate, Macros, PlanMealType, Profile,
    ProfileUpdate,
};

// ============================================================================
// Response Structs
// ============================================================================

/// Profile with derived BMR/TDEE
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub energy: EnergyProfile,
    /// Weight, height, gender and birth date are all set
    pub body_stats_complete: bool,
}

/// Energy balance for a day
#[derive(Debug, Serialize)]
pub struct EnergySummary {
    pub date: String,
    pub weight_kg: Option<f64>,
    pub energy: EnergyProfile,
    pub balance: CalorieBalance,
}

/// A day's metrics measured against the profile targets
#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub metrics: DailyMetrics,
    pub goals: Vec<MetricGoal>,
    pub balance: CalorieBalance,
    /// Net intake is above the calorie target
    pub over_calorie_target: bool,
    pub mood_label: Option<&'static str>,
    pub mood_quote: &'static str,
    /// False for a day with nothing recorded yet
    pub logged: bool,
}

/// Response for update_daily_metrics
#[derive(Debug, Serialize)]
pub struct DailyMetricsUpdateResponse {
    #[serde(flatten)]
    pub summary: DailySummary,
    /// Metrics whose target was reached by this update
    pub goals_reached: Vec<MetricKind>,
}

/// Response for adjust_metric
#[derive(Debug, Serialize)]
pub struct MetricAdjustmentResponse {
    pub date: String,
    pub metric: MetricKind,
    pub previous: f64,
    pub current: f64,
    pub goal: MetricGoal,
    /// True only for the update that crossed the target
    pub goal_reached: bool,
}

/// Response for logging a food
#[derive(Debug, Serialize)]
pub struct FoodLogResponse {
    pub log: FoodLog,
    pub daily_totals: Macros,
    pub calorie_goal_reached: bool,
}

/// Food logs for a day
#[derive(Debug, Serialize)]
pub struct FoodLogsResponse {
    pub date: String,
    pub logs: Vec<FoodLog>,
    pub totals: Macros,
}

/// Response for logging a workout
#[derive(Debug, Serialize)]
pub struct ExerciseLogResponse {
    pub log: ExerciseLog,
    pub met: f64,
    pub daily_calories_burned: f64,
}

/// Workouts for a day
#[derive(Debug, Serialize)]
pub struct ExerciseLogsResponse {
    pub date: String,
    pub logs: Vec<ExerciseLog>,
    pub total_duration_minutes: f64,
    pub total_calories_burned: f64,
}

/// Response for deleting a food or exercise log
#[derive(Debug, Serialize)]
pub struct DeleteLogResponse {
    pub id: i64,
    pub date: String,
    pub deleted: bool,
    pub metrics: DailyMetrics,
}

/// Planned meals for a weekday
#[derive(Debug, Serialize)]
pub struct DietPlanDay {
    pub day_of_week: DayOfWeek,
    pub meals: Vec<DietPlan>,
    pub totals: Macros,
}

#[derive(Debug, Serialize)]
pub struct CatalogSearchResponse {
    pub term: String,
    pub results: Vec<&'static CatalogFood>,
}

#[derive(Debug, Serialize)]
pub struct ExerciseType {
    pub name: &'static str,
    pub met: f64,
    pub gym: bool,
}

// ============================================================================
// Helpers
// ============================================================================

/// Label for a 1-5 mood rating
pub fn mood_label(rating: i64) -> Option<&'static str> {
    match rating {
        1 => Some("Rough Day"),
        2 => Some("Not Great"),
        3 => Some("Okay"),
        4 => Some("Good"),
        5 => Some("Amazing"),
        _ => None,
    }
}

/// Encouragement shown for a mood rating
const MOOD_QUOTES: [&[&str]; 5] = [
    &[
        "This too shall pass. Hang in there.",
        "Stars can't shine without darkness.",
        "It's okay not to be okay sometimes.",
        "Take a deep breath. You've got this.",
        "Tomorrow is a fresh start.",
        "You are stronger than you know.",
        "Storms don't last forever.",
        "Be gentle with yourself today.",
        "One step at a time.",
        "Sending you a virtual hug.",
        "Your feelings are valid.",
        "Rest if you must, but don't you quit.",
        "Every day may not be good, but there's something good in every day.",
        "You have survived 100% of your bad days.",
        "Treat yourself with kindness today.",
    ],
    &[
        "Keep going, you're doing better than you think.",
        "Small steps are still progress.",
        "Don't let a bad moment ruin a good day.",
        "Focus on the good.",
        "You are capable of amazing things.",
        "Head up, heart open.",
        "Believe in yourself.",
        "Today is just one chapter, not the whole story.",
        "Be patient with your growth.",
        "You are enough just as you are.",
        "Inhale courage, exhale fear.",
        "Progress, not perfection.",
    ],
    &[
        "Peace is a priority.",
        "Balance is key.",
        "Keep moving forward.",
        "Stay focused on your goals.",
        "A calm mind is a powerful weapon.",
        "Serenity comes from within.",
        "You are doing just fine.",
        "Consistency is the key to success.",
        "Stay grounded.",
        "Embrace the ordinary moments.",
    ],
    &[
        "Keep that smile!",
        "You're on the right track.",
        "Spread the positivity.",
        "Great job today!",
        "Your energy is contagious.",
        "Keep up the good work.",
        "Happiness looks good on you.",
        "Enjoy this moment.",
        "You are glowing!",
        "Positive vibes only.",
    ],
    &[
        "You are unstoppable!",
        "Radiate that energy!",
        "The world is your oyster!",
        "Keep shining!",
        "You are on fire!",
        "Nothing can stop you now.",
        "Celebrate your wins!",
        "You are a superstar!",
        "Keep crushing it!",
        "Your potential is endless!",
    ],
];

/// Shown when the day has no usable mood rating
pub const MOOD_PROMPT: &str = "How are you feeling today?";

/// Quote for a mood rating, stable for a given day
pub fn mood_quote(rating: Option<i64>, day: NaiveDate) -> &'static str {
    let quotes = rating
        .and_then(|r| usize::try_from(r).ok())
        .and_then(|r| r.checked_sub(1))
        .and_then(|i| MOOD_QUOTES.get(i));

    match quotes {
        Some(quotes) => {
            let seed = day.num_days_from_ce().unsigned_abs() as usize;
            quotes[seed % quotes.len()]
        }
        None => MOOD_PROMPT,
    }
}

pub(crate) fn summarize(profile: &Profile, metrics: DailyMetrics) -> DailySummary {
    let goals = MetricKind::ALL
        .iter()
        .map(|k| MetricGoal::new(*k, metrics.value_of(*k), profile.target_for(*k)))
        .collect();

    let balance = CalorieBalance::new(
        profile.caloric_target,
        metrics.calories_consumed,
        metrics.calories_burned,
    );

    DailySummary {
        date: metrics.date.clone(),
        goals,
        over_calorie_target: balance.is_surplus(),
        balance,
        mood_label: metrics.mood_rating.and_then(mood_label),
        mood_quote: parse_date(&metrics.date)
            .map(|day| mood_quote(metrics.mood_rating, day))
            .unwrap_or(MOOD_PROMPT),
        logged: metrics.is_persisted(),
        metrics,
    }
}

fn reached_goals(
    profile: &Profile,
    before: &DailyMetrics,
    after: &DailyMetrics,
) -> Vec<MetricKind> {
    MetricKind::ALL
        .iter()
        .copied()
        .filter(|k| crossed_goal(before.value_of(*k), after.value_of(*k), profile.target_for(*k)))
        .collect()
}

// ============================================================================
// Profile Tools
// ============================================================================

fn profile_response(profile: Profile, today: NaiveDate) -> ProfileResponse {
    let stats = profile.body_stats();
    let complete = stats.weight_kg.is_some()
        && stats.height_cm.is_some()
        && stats.gender.is_some()
        && stats.date_of_birth.is_some();

    ProfileResponse {
        energy: EnergyProfile::compute(&stats, today),
        body_stats_complete: complete,
        profile,
    }
}

/// Get the profile (default targets if never saved) with BMR/TDEE
pub fn get_profile(db: &Database, today: NaiveDate) -> Result<ProfileResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = Profile::get_or_default(&conn)
        .map_err(|e| format!("Failed to get profile: {}", e))?;

    Ok(profile_response(profile, today))
}

/// Update profile fields
pub fn update_profile(
    db: &Database,
    data: &ProfileUpdate,
    today: NaiveDate,
) -> Result<ProfileResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = Profile::upsert(&conn, data)
        .map_err(|e| format!("Failed to update profile: {}", e))?;

    info!("profile updated");
    Ok(profile_response(profile, today))
}

/// BMR, TDEE and calorie balance for a date
pub fn get_energy_summary(
    db: &Database,
    date: &str,
    today: NaiveDate,
) -> Result<EnergySummary, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = Profile::get_or_default(&conn)
        .map_err(|e| format!("Failed to get profile: {}", e))?;
    let metrics = DailyMetrics::get_for_date(&conn, date)
        .map_err(|e| format!("Failed to get daily metrics: {}", e))?;

    Ok(EnergySummary {
        date: metrics.date.clone(),
        weight_kg: profile.weight_kg,
        energy: EnergyProfile::compute(&profile.body_stats(), today),
        balance: CalorieBalance::new(
            profile.caloric_target,
            metrics.calories_consumed,
            metrics.calories_burned,
        ),
    })
}

// ============================================================================
// Daily Metrics Tools
// ============================================================================

/// A day's metrics against targets; days with nothing recorded show defaults
pub fn get_daily_metrics(db: &Database, date: &str) -> Result<DailySummary, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = Profile::get_or_default(&conn)
        .map_err(|e| format!("Failed to get profile: {}", e))?;
    let metrics = DailyMetrics::get_for_date(&conn, date)
        .map_err(|e| format!("Failed to get daily metrics: {}", e))?;

    Ok(summarize(&profile, metrics))
}

/// Stored days, newest first
pub fn list_daily_metrics(
    db: &Database,
    start_date: Option<&str>,
    end_date: Option<&str>,
    limit: i64,
) -> Result<Vec<DailySummary>, String> {
    let limit = limit.clamp(1, 366);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = Profile::get_or_default(&conn)
        .map_err(|e| format!("Failed to get profile: {}", e))?;
    let days = DailyMetrics::list(&conn, start_date, end_date, limit)
        .map_err(|e| format!("Failed to list daily metrics: {}", e))?;

    Ok(days.into_iter().map(|d| summarize(&profile, d)).collect())
}

/// Write fields of a day's metrics, reporting any targets reached
pub fn update_daily_metrics(
    db: &Database,
    date: &str,
    patch: &DailyMetricsPatch,
) -> Result<DailyMetricsUpdateResponse, String> {
    let (profile, before, after) = db
        .with_transaction(|tx| {
            let profile = Profile::get_or_default(tx)?;
            let before = DailyMetrics::get_for_date(tx, date)?;
            let after = DailyMetrics::upsert(tx, date, patch)?;
            Ok((profile, before, after))
        })
        .map_err(|e| format!("Failed to update daily metrics: {}", e))?;

    let goals_reached = reached_goals(&profile, &before, &after);
    for metric in &goals_reached {
        info!(date, metric = metric.as_str(), "daily goal reached");
    }

    Ok(DailyMetricsUpdateResponse {
        summary: summarize(&profile, after),
        goals_reached,
    })
}

/// Increment water, sleep or calories by `delta` (or the metric's usual step)
pub fn adjust_metric(
    db: &Database,
    date: &str,
    metric: MetricKind,
    delta: Option<f64>,
) -> Result<MetricAdjustmentResponse, String> {
    let delta = delta.unwrap_or_else(|| metric.default_step());

    let (profile, adjustment) = db
        .with_transaction(|tx| {
            let profile = Profile::get_or_default(tx)?;
            let adjustment = DailyMetrics::adjust_metric(tx, date, metric, delta)?;
            Ok((profile, adjustment))
        })
        .map_err(|e| format!("Failed to adjust {}: {}", metric.as_str(), e))?;

    let target = profile.target_for(metric);
    let goal_reached = crossed_goal(adjustment.previous, adjustment.current, target);
    if goal_reached {
        info!(date, metric = metric.as_str(), target, "daily goal reached");
    }

    Ok(MetricAdjustmentResponse {
        date: date.to_string(),
        metric,
        previous: adjustment.previous,
        current: adjustment.current,
        goal: MetricGoal::new(metric, adjustment.current, target),
        goal_reached,
    })
}

/// Record the day's mood (1-5)
pub fn set_mood(db: &Database, date: &str, mood: i64) -> Result<DailySummary, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = Profile::get_or_default(&conn)
        .map_err(|e| format!("Failed to get profile: {}", e))?;
    let metrics = DailyMetrics::set_mood(&conn, date, mood)
        .map_err(|e| format!("Failed to set mood: {}", e))?;

    Ok(summarize(&profile, metrics))
}

// ============================================================================
// Food Log Tools
// ============================================================================

/// Log a food with explicit macros and resync the day's totals
pub fn log_food(
    db: &Database,
    date: &str,
    food_name: &str,
    macros: Macros,
) -> Result<FoodLogResponse, String> {
    let (log, before, after, target) = db
        .with_transaction(|tx| {
            let target = Profile::get_or_default(tx)?.caloric_target;
            let before = DailyMetrics::get_for_date(tx, date)?;
            let log = FoodLog::create(tx, &FoodLogCreate {
                date: date.to_string(),
                food_name: food_name.to_string(),
                macros,
            })?;
            let after = DailyMetrics::sync_food_totals(tx, date)?;
            Ok((log, before, after, target))
        })
        .map_err(|e| format!("Failed to log food: {}", e))?;

    Ok(FoodLogResponse {
        log,
        daily_totals: after.consumed(),
        calorie_goal_reached: crossed_goal(
            before.calories_consumed,
            after.calories_consumed,
            target,
        ),
    })
}

/// Log a catalog food scaled to a portion (defaults to one serving)
pub fn log_catalog_food(
    db: &Database,
    date: &str,
    food_name: &str,
    portion: Option<f64>,
) -> Result<Option<FoodLogResponse>, String> {
    let Some(food) = catalog::find(food_name) else {
        return Ok(None);
    };

    let portion = portion.unwrap_or(food.default_size);
    if !(portion > 0.0) {
        return Err(format!("Portion must be positive, got {}", portion));
    }

    log_food(db, date, food.name, portion_macros(food, portion)).map(Some)
}

/// Food logs for a day with totals; falls back to the stored snapshot when
/// the day has no individual logs
pub fn list_food_logs(db: &Database, date: &str) -> Result<FoodLogsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let logs = FoodLog::list_for_date(&conn, date)
        .map_err(|e| format!("Failed to list food logs: {}", e))?;
    let stored = DailyMetrics::get_by_date(&conn, date)
        .map_err(|e| format!("Failed to get daily metrics: {}", e))?
        .map(|m| m.consumed());

    let log_macros: Vec<Macros> = logs.iter().map(FoodLog::macros).collect();

    Ok(FoodLogsResponse {
        date: date.to_string(),
        totals: effective_totals(&log_macros, stored),
        logs,
    })
}

/// Correct a food log and resync its day
pub fn update_food_log(
    db: &Database,
    id: i64,
    data: &FoodLogUpdate,
) -> Result<Option<FoodLogResponse>, String> {
    db.with_transaction(|tx| {
        let Some(existing) = FoodLog::get_by_id(tx, id)? else {
            return Ok(None);
        };
        let target = Profile::get_or_default(tx)?.caloric_target;
        let before = DailyMetrics::get_for_date(tx, &existing.date)?;

        let Some(log) = FoodLog::update(tx, id, data)? else {
            return Ok(None);
        };
        let after = DailyMetrics::sync_food_totals(tx, &log.date)?;

        Ok(Some(FoodLogResponse {
            log,
            daily_totals: after.consumed(),
            calorie_goal_reached: crossed_goal(
                before.calories_consumed,
                after.calories_consumed,
                target,
            ),
        }))
    })
    .map_err(|e| format!("Failed to update food log: {}", e))
}

/// Delete a food log and resync its day
pub fn delete_food_log(db: &Database, id: i64) -> Result<Option<DeleteLogResponse>, String> {
    db.with_transaction(|tx| {
        let Some(log) = FoodLog::get_by_id(tx, id)? else {
            return Ok(None);
        };
        let deleted = FoodLog::delete(tx, id)?;
        let metrics = DailyMetrics::sync_food_totals(tx, &log.date)?;
        Ok(Some(DeleteLogResponse {
            id,
            date: log.date,
            deleted,
            metrics,
        }))
    })
    .map_err(|e| format!("Failed to delete food log: {}", e))
}

// ============================================================================
// Exercise Tools
// ============================================================================

/// Input for log_exercise
#[derive(Debug, Clone, Default)]
pub struct ExerciseInput {
    pub date: String,
    pub exercise_type: String,
    pub duration_minutes: Option<f64>,
    pub calories_burned: Option<f64>,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight_lifted: Option<f64>,
}

/// Log a workout and resync the day's calories burned.
///
/// Gym lifts logged with sets but no duration get 2.5 minutes per set.
/// Calories are estimated from MET and profile weight unless given.
pub fn log_exercise(db: &Database, input: &ExerciseInput) -> Result<ExerciseLogResponse, String> {
    let exercise = input.exercise_type.as_str();
    let is_gym = is_gym_exercise(exercise);

    let duration = match (input.duration_minutes, input.sets) {
        (Some(d), _) if d > 0.0 => d,
        (_, Some(sets)) if sets > 0 => {
            let sets = u32::try_from(sets).map_err(|_| format!("sets out of range: {}", sets))?;
            gym_set_duration(sets)
        }
        _ => {
            return Err("Provide duration_minutes, or sets for a gym lift".to_string());
        }
    };

    let (log, metrics) = db
        .with_transaction(|tx| {
            let calories = match input.calories_burned {
                Some(c) => c,
                None => {
                    let profile = Profile::get_or_default(tx)?;
                    profile
                        .weight_kg
                        .map(|w| calculate_exercise_calories(w, exercise, duration))
                        .map_or(0.0, f64::from)
                }
            };

            let log = ExerciseLog::create(tx, &ExerciseLogCreate {
                date: input.date.clone(),
                exercise_type: input.exercise_type.clone(),
                duration_minutes: duration.round(),
                calories_burned: calories,
                sets: if is_gym { input.sets } else { None },
                reps: if is_gym { input.reps } else { None },
                weight_lifted: if is_gym { input.weight_lifted } else { None },
            })?;
            let metrics = DailyMetrics::sync_exercise_totals(tx, &input.date)?;
            Ok((log, metrics))
        })
        .map_err(|e| format!("Failed to log exercise: {}", e))?;

    Ok(ExerciseLogResponse {
        met: met_for(&log.exercise_type),
        daily_calories_burned: metrics.calories_burned,
        log,
    })
}

/// Workouts for a day with totals
pub fn list_exercise_logs(db: &Database, date: &str) -> Result<ExerciseLogsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let logs = ExerciseLog::list_for_date(&conn, date)
        .map_err(|e| format!("Failed to list exercise logs: {}", e))?;

    Ok(ExerciseLogsResponse {
        date: date.to_string(),
        total_duration_minutes: sum_field(&logs, |l| l.duration_minutes),
        total_calories_burned: sum_field(&logs, |l| l.calories_burned),
        logs,
    })
}

/// Delete a workout and resync its day
pub fn delete_exercise_log(db: &Database, id: i64) -> Result<Option<DeleteLogResponse>, String> {
    db.with_transaction(|tx| {
        let Some(log) = ExerciseLog::get_by_id(tx, id)? else {
            return Ok(None);
        };
        let deleted = ExerciseLog::delete(tx, id)?;
        let metrics = DailyMetrics::sync_exercise_totals(tx, &log.date)?;
        Ok(Some(DeleteLogResponse {
            id,
            date: log.date,
            deleted,
            metrics,
        }))
    })
    .map_err(|e| format!("Failed to delete exercise log: {}", e))
}

/// Known activities with their MET values
pub fn list_exercise_types() -> Vec<ExerciseType> {
    EXERCISE_METS
        .iter()
        .map(|&(name, met)| ExerciseType {
            name,
            met,
            gym: is_gym_exercise(name),
        })
        .collect()
}

// ============================================================================
// Diet Planner Tools
// ============================================================================

/// Add a meal to the weekly plan
pub fn add_planned_meal(
    db: &Database,
    day_of_week: &str,
    meal_type: &str,
    meal_name: &str,
    macros: Macros,
) -> Result<DietPlan, String> {
    let day = DayOfWeek::from_str(day_of_week)
        .ok_or_else(|| format!("Invalid day_of_week: {}", day_of_week))?;
    let meal = PlanMealType::from_str(meal_type).ok_or_else(|| {
        format!("Invalid meal_type: {}. Use breakfast, lunch, dinner or snack", meal_type)
    })?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    DietPlan::create(&conn, &DietPlanCreate {
        day_of_week: day,
        meal_type: meal,
        meal_name: meal_name.to_string(),
        macros,
    })
    .map_err(|e| format!("Failed to add planned meal: {}", e))
}

/// The plan for one weekday, or the whole week when `day_of_week` is None
pub fn get_diet_plan(db: &Database, day_of_week: Option<&str>) -> Result<Vec<DietPlanDay>, String> {
    let days = match day_of_week {
        Some(d) => {
            let day = DayOfWeek::from_str(d)
                .ok_or_else(|| format!("Invalid day_of_week: {}", d))?;
            vec![day]
        }
        None => DayOfWeek::ALL.to_vec(),
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    days.into_iter()
        .map(|day| {
            let meals = DietPlan::list_for_day(&conn, day)
                .map_err(|e| format!("Failed to get diet plan: {}", e))?;
            Ok(DietPlanDay {
                day_of_week: day,
                totals: sum_macros(meals.iter().map(DietPlan::macros)),
                meals,
            })
        })
        .collect()
}

/// Remove a planned meal
pub fn delete_planned_meal(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    DietPlan::delete(&conn, id).map_err(|e| format!("Failed to delete planned meal: {}", e))
}

// ============================================================================
// Catalog Tools
// ============================================================================

pub fn search_food_catalog(term: &str) -> CatalogSearchResponse {
    CatalogSearchResponse {
        term: term.to_string(),
        results: catalog::search(term),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::metrics::{ActivityLevel, Gender};

    const DAY: &str = "2025-05-20";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn seed_profile(db: &Database) {
        update_profile(db, &ProfileUpdate {
            gender: Some(Gender::Female),
            date_of_birth: Some("1995-05-20".to_string()),
            weight_kg: Some(60.0),
            height_cm: Some(165.0),
            activity_level: Some(ActivityLevel::Light),
            hydration_target: Some(2000.0),
            ..Default::default()
        }, today())
        .unwrap();
    }

    #[test]
    fn test_profile_energy() {
        let db = test_db();
        let empty = get_profile(&db, today()).unwrap();
        assert!(!empty.body_stats_complete);
        assert_eq!(empty.energy.bmr, 0);

        seed_profile(&db);
        let profile = get_profile(&db, today()).unwrap();
        // 600 + 1031.25 - 150 - 161 = 1320.25
        assert!(profile.body_stats_complete);
        assert_eq!(profile.energy.bmr, 1320);
        assert_eq!(profile.energy.tdee, 1815);
    }

    #[test]
    fn test_adjust_metric_fires_once() {
        let db = test_db();
        seed_profile(&db);

        let mut fired = Vec::new();
        for _ in 0..10 {
            let r = adjust_metric(&db, DAY, MetricKind::Hydration, None).unwrap();
            fired.push(r.goal_reached);
        }
        // 250 ml steps against a 2000 ml target: the 8th step crosses
        let crossings: Vec<usize> = fired
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.then_some(i))
            .collect();
        assert_eq!(crossings, vec![7]);

        let down = adjust_metric(&db, DAY, MetricKind::Hydration, Some(-1000.0)).unwrap();
        assert_eq!(down.current, 1500.0);
        let again = adjust_metric(&db, DAY, MetricKind::Hydration, Some(500.0)).unwrap();
        assert!(again.goal_reached);
    }

    #[test]
    fn test_update_daily_metrics_reports_goals() {
        let db = test_db();
        let r = update_daily_metrics(&db, DAY, &DailyMetricsPatch {
            sleep_hours: Some(8.0),
            water_intake: Some(1000.0),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(r.goals_reached, vec![MetricKind::Sleep]);
        assert!(r.summary.logged);
        assert!(!r.summary.over_calorie_target);
        let sleep = r.summary.goals.iter().find(|g| g.metric == MetricKind::Sleep).unwrap();
        assert!(sleep.completed);
    }

    #[test]
    fn test_food_logging_syncs_totals() {
        let db = test_db();
        let first = log_catalog_food(&db, DAY, "Roti (Whole Wheat)", Some(2.0)).unwrap().unwrap();
        assert_eq!(first.log.calories, 208.0);
        assert_eq!(first.daily_totals.calories, 208.0);

        let khichdi = Macros::new(350.0, 12.0, 55.0, 8.0);
        let second = log_food(&db, DAY, "Homemade khichdi", khichdi).unwrap();
        assert_eq!(second.daily_totals.calories, 558.0);

        let listed = list_food_logs(&db, DAY).unwrap();
        assert_eq!(listed.logs.len(), 2);
        assert_eq!(listed.totals.protein, 18.0);

        let deleted = delete_food_log(&db, first.log.id).unwrap().unwrap();
        assert!(deleted.deleted);
        assert_eq!(deleted.metrics.calories_consumed, 350.0);
        assert!(delete_food_log(&db, first.log.id).unwrap().is_none());
    }

    #[test]
    fn test_update_food_log_resyncs() {
        let db = test_db();
        let logged = log_food(&db, DAY, "Dal", Macros::new(180.0, 9.0, 20.0, 6.0)).unwrap();

        let fixed = update_food_log(&db, logged.log.id, &FoodLogUpdate {
            calories: Some(240.0),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        assert_eq!(fixed.log.calories, 240.0);
        assert_eq!(fixed.daily_totals.calories, 240.0);
        assert_eq!(fixed.daily_totals.protein, 9.0);

        assert!(update_food_log(&db, 999, &FoodLogUpdate::default()).unwrap().is_none());
    }

    #[test]
    fn test_food_totals_fall_back_to_snapshot() {
        let db = test_db();
        update_daily_metrics(&db, DAY, &DailyMetricsPatch {
            calories_consumed: Some(1800.0),
            ..Default::default()
        })
        .unwrap();

        let listed = list_food_logs(&db, DAY).unwrap();
        assert!(listed.logs.is_empty());
        assert_eq!(listed.totals.calories, 1800.0);
    }

    #[test]
    fn test_unknown_catalog_food() {
        let db = test_db();
        assert!(log_catalog_food(&db, DAY, "Pizza", None).unwrap().is_none());
    }

    #[test]
    fn test_log_exercise_estimates_calories() {
        let db = test_db();
        seed_profile(&db);

        let run = log_exercise(&db, &ExerciseInput {
            date: DAY.to_string(),
            exercise_type: "Running (Jog)".to_string(),
            duration_minutes: Some(30.0),
            ..Default::default()
        })
        .unwrap();
        // 7.0 × 60 × 0.5
        assert_eq!(run.log.calories_burned, 210.0);
        assert_eq!(run.met, 7.0);

        let squat = log_exercise(&db, &ExerciseInput {
            date: DAY.to_string(),
            exercise_type: "Squats".to_string(),
            sets: Some(4),
            reps: Some(8),
            weight_lifted: Some(40.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(squat.log.duration_minutes, 10.0);
        assert_eq!(squat.log.sets, Some(4));

        let day = list_exercise_logs(&db, DAY).unwrap();
        assert_eq!(day.total_duration_minutes, 40.0);
        assert_eq!(squat.daily_calories_burned, day.total_calories_burned);
    }

    #[test]
    fn test_log_exercise_requires_duration_or_sets() {
        let db = test_db();
        let result = log_exercise(&db, &ExerciseInput {
            date: DAY.to_string(),
            exercise_type: "Yoga".to_string(),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_log_exercise_zero_duration_uses_sets() {
        let db = test_db();
        let squat = log_exercise(&db, &ExerciseInput {
            date: DAY.to_string(),
            exercise_type: "Squats".to_string(),
            duration_minutes: Some(0.0),
            sets: Some(4),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(squat.log.duration_minutes, 10.0);
        assert_eq!(squat.log.sets, Some(4));
    }

    #[test]
    fn test_log_exercise_rejects_oversized_sets() {
        let db = test_db();
        let result = log_exercise(&db, &ExerciseInput {
            date: DAY.to_string(),
            exercise_type: "Bench Press".to_string(),
            sets: Some(4_294_967_297),
            ..Default::default()
        });
        assert!(result.is_err());
        assert!(list_exercise_logs(&db, DAY).unwrap().logs.is_empty());
    }

    #[test]
    fn test_diet_plan_week() {
        let db = test_db();
        let oats = Macros::new(300.0, 10.0, 50.0, 6.0);
        let dal_rice = Macros::new(500.0, 18.0, 80.0, 10.0);
        add_planned_meal(&db, "monday", "breakfast", "Oats", oats).unwrap();
        add_planned_meal(&db, "monday", "lunch", "Dal rice", dal_rice).unwrap();
        assert!(add_planned_meal(&db, "someday", "lunch", "x", Macros::zero()).is_err());

        let monday = get_diet_plan(&db, Some("Monday")).unwrap();
        assert_eq!(monday.len(), 1);
        assert_eq!(monday[0].totals.calories, 800.0);

        let week = get_diet_plan(&db, None).unwrap();
        assert_eq!(week.len(), 7);
        assert!(week[6].meals.is_empty());
    }

    #[test]
    fn test_mood_label() {
        assert_eq!(mood_label(5), Some("Amazing"));
        assert_eq!(mood_label(0), None);
    }

    #[test]
    fn test_mood_quote_stable_per_day() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        let next = day.succ_opt().unwrap();

        assert_eq!(mood_quote(Some(2), day), "Progress, not perfection.");
        assert_eq!(mood_quote(Some(2), day), mood_quote(Some(2), day));
        assert_eq!(
            mood_quote(Some(2), next),
            "Keep going, you're doing better than you think."
        );
        assert_eq!(mood_quote(None, day), MOOD_PROMPT);
        assert_eq!(mood_quote(Some(9), day), MOOD_PROMPT);
        assert_eq!(mood_quote(Some(0), day), MOOD_PROMPT);
    }

    #[test]
    fn test_daily_summary_carries_mood_quote() {
        let db = test_db();
        let empty = get_daily_metrics(&db, DAY).unwrap();
        assert_eq!(empty.mood_label, Some("Amazing"));
        assert!(MOOD_QUOTES[4].contains(&empty.mood_quote));

        let r = update_daily_metrics(&db, DAY, &DailyMetricsPatch {
            mood_rating: Some(1),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(r.summary.mood_label, Some("Rough Day"));
        assert!(MOOD_QUOTES[0].contains(&r.summary.mood_quote));
    }
}
