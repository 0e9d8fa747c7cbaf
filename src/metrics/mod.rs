//! Derived health and progress calculations
//!
//! Stateless functions over query results: energy formulas, goal tracking,
//! percentage rollups and daily aggregation.

pub mod aggregate;
pub mod energy;
pub mod goals;
pub mod progress;

pub use aggregate::{effective_totals, portion_macros, sum_field, sum_macros};
pub use energy::{
    age_on, calculate_bmr, calculate_exercise_calories, calculate_tdee, gym_set_duration,
    is_gym_exercise, met_for, mifflin_st_jeor, ActivityLevel, BodyStats, CalorieBalance,
    EnergyProfile, Gender,
};
pub use goals::{
    crossed_goal, goal_crossings, is_goal_met, percent_of_target, GoalTracker, MetricGoal,
    MetricKind,
};
pub use progress::{
    attendance_percentage, is_below_target, milestone_progress, study_progress, task_completion,
    AttendanceBand,
};
