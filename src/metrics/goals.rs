//! Daily targets and goal-threshold crossing

use serde::{Deserialize, Serialize};

/// Daily metrics that have a target on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Calories,
    Hydration,
    Sleep,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Calories, MetricKind::Hydration, MetricKind::Sleep];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Calories => "calories",
            MetricKind::Hydration => "hydration",
            MetricKind::Sleep => "sleep",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "calories" | "calories_consumed" | "kcal" => Some(MetricKind::Calories),
            "hydration" | "water" | "water_intake" => Some(MetricKind::Hydration),
            "sleep" | "sleep_hours" => Some(MetricKind::Sleep),
            _ => None,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Calories => "kcal",
            MetricKind::Hydration => "ml",
            MetricKind::Sleep => "hrs",
        }
    }

    /// Increment applied by a single "+" on the dashboard
    pub fn default_step(&self) -> f64 {
        match self {
            MetricKind::Calories => 50.0,
            MetricKind::Hydration => 250.0,
            MetricKind::Sleep => 0.5,
        }
    }
}

/// Share of the target reached, capped at 100. A non-positive target gives 0.
pub fn percent_of_target(value: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    ((value / target) * 100.0).min(100.0)
}

pub fn is_goal_met(value: f64, target: f64) -> bool {
    target > 0.0 && value >= target
}

/// True only for the sample that moves from below the target to at or above it
pub fn crossed_goal(previous: f64, current: f64, target: f64) -> bool {
    target > 0.0 && previous < target && current >= target
}

/// Indices of the samples that cross the target, the first sample being
/// compared against `baseline`
pub fn goal_crossings(baseline: f64, samples: &[f64], target: f64) -> Vec<usize> {
    let mut tracker = GoalTracker::new(target, baseline);
    samples
        .iter()
        .enumerate()
        .filter_map(|(i, v)| tracker.observe(*v).then_some(i))
        .collect()
}

/// Stateful crossing detector over a stream of samples
#[derive(Debug, Clone)]
pub struct GoalTracker {
    target: f64,
    last: f64,
}

impl GoalTracker {
    pub fn new(target: f64, baseline: f64) -> Self {
        Self {
            target,
            last: baseline,
        }
    }

    /// Record a sample and report whether it crossed the target
    pub fn observe(&mut self, value: f64) -> bool {
        let fired = crossed_goal(self.last, value, self.target);
        self.last = value;
        fired
    }

    pub fn last(&self) -> f64 {
        self.last
    }
}

/// A metric measured against its target
#[derive(Debug, Clone, Serialize)]
pub struct MetricGoal {
    pub metric: MetricKind,
    pub value: f64,
    pub target: f64,
    pub unit: &'static str,
    pub percentage: f64,
    pub completed: bool,
}

impl MetricGoal {
    pub fn new(metric: MetricKind, value: f64, target: f64) -> Self {
        Self {
            metric,
            value,
            target,
            unit: metric.unit(),
            percentage: percent_of_target(value, target),
            completed: is_goal_met(value, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_of_target() {
        assert_eq!(percent_of_target(1250.0, 2500.0), 50.0);
        assert_eq!(percent_of_target(4000.0, 2500.0), 100.0);
        assert_eq!(percent_of_target(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_is_goal_met() {
        assert!(is_goal_met(8.0, 8.0));
        assert!(!is_goal_met(7.5, 8.0));
        assert!(!is_goal_met(5.0, 0.0));
    }

    #[test]
    fn test_crossed_goal_only_on_transition() {
        assert!(crossed_goal(2250.0, 2500.0, 2500.0));
        assert!(crossed_goal(2250.0, 2750.0, 2500.0));
        assert!(!crossed_goal(2500.0, 2750.0, 2500.0));
        assert!(!crossed_goal(2000.0, 2250.0, 2500.0));
        assert!(!crossed_goal(2750.0, 2250.0, 2500.0));
    }

    #[test]
    fn test_crossed_goal_ignores_missing_target() {
        assert!(!crossed_goal(0.0, 100.0, 0.0));
    }

    #[test]
    fn test_goal_crossings_series() {
        let samples = [1.0, 4.0, 8.0, 8.5, 7.0, 9.0];
        assert_eq!(goal_crossings(0.0, &samples, 8.0), vec![2, 5]);
    }

    #[test]
    fn test_goal_crossings_baseline_already_met() {
        assert!(goal_crossings(10.0, &[10.0, 11.0], 8.0).is_empty());
    }

    #[test]
    fn test_tracker_remembers_last_value() {
        let mut tracker = GoalTracker::new(3000.0, 0.0);
        assert!(!tracker.observe(2750.0));
        assert!(tracker.observe(3000.0));
        assert_eq!(tracker.last(), 3000.0);
    }

    #[test]
    fn test_metric_goal() {
        let goal = MetricGoal::new(MetricKind::Hydration, 3000.0, 2500.0);
        assert_eq!(goal.percentage, 100.0);
        assert!(goal.completed);
        assert_eq!(goal.unit, "ml");
    }

    #[test]
    fn test_metric_kind_aliases() {
        assert_eq!(MetricKind::from_str("water"), Some(MetricKind::Hydration));
        assert_eq!(MetricKind::from_str("sleep_hours"), Some(MetricKind::Sleep));
        assert_eq!(MetricKind::from_str("mood"), None);
    }
}
