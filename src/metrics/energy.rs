//! Energy expenditure calculations
//!
//! BMR via Mifflin-St Jeor, TDEE via activity multipliers, and exercise
//! calories via MET values.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default MET for activities missing from the table (moderate effort)
pub const DEFAULT_MET: f64 = 4.0;

/// Estimated minutes per gym set, lifting plus rest
pub const MINUTES_PER_GYM_SET: f64 = 2.5;

/// Gender used by the BMR formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }

    /// Constant term of the Mifflin-St Jeor equation
    fn msj_constant(&self) -> f64 {
        match self {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
        }
    }
}

/// Activity level for TDEE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            _ => None,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
        }
    }
}

/// MET values per named activity
pub const EXERCISE_METS: &[(&str, f64)] = &[
    ("Walking (Slow)", 2.5),
    ("Walking (Brisk)", 3.5),
    ("Running (Jog)", 7.0),
    ("Running (Fast)", 10.0),
    ("Cycling (Light)", 4.0),
    ("Cycling (Vigorous)", 8.0),
    ("Gym / Weight Training", 5.0),
    ("Swimming", 6.0),
    ("Yoga", 2.5),
    ("HIIT", 8.0),
    ("Bench Press", 6.0),
    ("Squats", 6.0),
    ("Deadlifts", 6.0),
    ("Overhead Press", 5.0),
    ("Pull Ups", 8.0),
    ("Dumbbell Rows", 5.0),
    ("Bicep Curls", 4.0),
    ("Tricep Extensions", 4.0),
    ("Leg Press", 5.5),
    ("Lat Pulldowns", 5.0),
    ("Lunges", 5.5),
    ("Calf Raises", 4.0),
    ("Chest Fly", 5.0),
    ("Tricep Dips", 6.0),
    ("Skipping / Jump Rope", 10.0),
    ("Elliptical", 5.0),
];

/// Exercises logged as sets rather than minutes
pub const GYM_EXERCISES: &[&str] = &[
    "Bench Press",
    "Squats",
    "Deadlifts",
    "Overhead Press",
    "Pull Ups",
    "Dumbbell Rows",
    "Bicep Curls",
    "Tricep Extensions",
    "Leg Press",
    "Lat Pulldowns",
    "Lunges",
    "Calf Raises",
    "Chest Fly",
    "Tricep Dips",
];

/// Mifflin-St Jeor equation, unrounded
///
/// `10·weight + 6.25·height − 5·age + 5` for men, `− 161` for women.
pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> f64 {
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years) + gender.msj_constant()
}

/// Basal Metabolic Rate in kcal/day, rounded and never negative.
/// Missing body data (non-positive weight or height) yields 0.
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> u32 {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return 0;
    }
    round_non_negative(mifflin_st_jeor(weight_kg, height_cm, age_years, gender))
}

/// Total Daily Energy Expenditure. An unknown activity level uses the
/// sedentary multiplier.
pub fn calculate_tdee(bmr: u32, activity_level: Option<ActivityLevel>) -> u32 {
    let multiplier = activity_level
        .unwrap_or(ActivityLevel::Sedentary)
        .multiplier();
    round_non_negative(f64::from(bmr) * multiplier)
}

/// MET for a named activity (case-insensitive), falling back to [`DEFAULT_MET`]
pub fn met_for(exercise: &str) -> f64 {
    let needle = exercise.trim();
    EXERCISE_METS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(needle))
        .map(|(_, met)| *met)
        .unwrap_or(DEFAULT_MET)
}

pub fn is_gym_exercise(exercise: &str) -> bool {
    let needle = exercise.trim();
    GYM_EXERCISES.iter().any(|name| name.eq_ignore_ascii_case(needle))
}

/// Calories = MET × weight(kg) × duration(h), rounded
pub fn calculate_exercise_calories(weight_kg: f64, exercise: &str, duration_minutes: f64) -> u32 {
    if weight_kg <= 0.0 || duration_minutes <= 0.0 {
        return 0;
    }
    round_non_negative(met_for(exercise) * weight_kg * (duration_minutes / 60.0))
}

/// Estimated duration of a gym session from its set count
pub fn gym_set_duration(sets: u32) -> f64 {
    f64::from(sets) * MINUTES_PER_GYM_SET
}

/// Whole years between `date_of_birth` and `today`
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    if today <= date_of_birth {
        return 0;
    }
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

fn round_non_negative(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.round() as u32
    }
}

/// Calories in versus out against a daily target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieBalance {
    pub target: f64,
    pub consumed: f64,
    pub burned: f64,
    /// consumed − burned
    pub net: f64,
    /// target − net; negative means over target
    pub remaining: f64,
}

impl CalorieBalance {
    pub fn new(target: f64, consumed: f64, burned: f64) -> Self {
        let net = consumed - burned;
        Self {
            target,
            consumed,
            burned,
            net,
            remaining: target - net,
        }
    }

    pub fn is_surplus(&self) -> bool {
        self.remaining < 0.0
    }
}

/// Body inputs for the energy formulas; any of them may be unknown
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyStats {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub activity_level: Option<ActivityLevel>,
}

/// Derived BMR/TDEE for a person on a given day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyProfile {
    pub age_years: Option<u32>,
    pub bmr: u32,
    pub tdee: u32,
    pub activity_multiplier: f64,
}

impl EnergyProfile {
    /// BMR is 0 (and so is TDEE) until weight, height, gender and date of
    /// birth are all known
    pub fn compute(stats: &BodyStats, today: NaiveDate) -> Self {
        let age_years = stats.date_of_birth.map(|dob| age_on(dob, today));

        let bmr = match (stats.weight_kg, stats.height_cm, stats.gender, age_years) {
            (Some(w), Some(h), Some(g), Some(age)) => calculate_bmr(w, h, age, g),
            _ => 0,
        };

        Self {
            age_years,
            bmr,
            tdee: calculate_tdee(bmr, stats.activity_level),
            activity_multiplier: stats
                .activity_level
                .unwrap_or(ActivityLevel::Sedentary)
                .multiplier(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mifflin_st_jeor_male_identity() {
        let bmr = mifflin_st_jeor(80.0, 180.0, 30, Gender::Male);
        assert!((bmr - (10.0 * 80.0 + 6.25 * 180.0 - 5.0 * 30.0 + 5.0)).abs() < 1e-9);
        assert!((bmr - 1780.0).abs() < 1e-9);
    }

    #[test]
    fn test_mifflin_st_jeor_female() {
        let bmr = mifflin_st_jeor(60.0, 165.0, 25, Gender::Female);
        // 600 + 1031.25 - 125 - 161
        assert!((bmr - 1345.25).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_bmr_rounds() {
        assert_eq!(calculate_bmr(60.0, 165.0, 25, Gender::Female), 1345);
        assert_eq!(calculate_bmr(60.5, 165.0, 25, Gender::Female), 1350);
    }

    #[test]
    fn test_calculate_bmr_missing_inputs() {
        assert_eq!(calculate_bmr(0.0, 180.0, 30, Gender::Male), 0);
        assert_eq!(calculate_bmr(80.0, 0.0, 30, Gender::Male), 0);
    }

    #[test]
    fn test_calculate_bmr_never_negative() {
        assert_eq!(calculate_bmr(1.0, 1.0, 120, Gender::Female), 0);
    }

    #[test]
    fn test_calculate_tdee() {
        assert_eq!(calculate_tdee(1780, Some(ActivityLevel::Sedentary)), 2136);
        assert_eq!(calculate_tdee(1780, Some(ActivityLevel::Light)), 2448);
        assert_eq!(calculate_tdee(1780, Some(ActivityLevel::Moderate)), 2759);
        assert_eq!(calculate_tdee(1780, Some(ActivityLevel::Active)), 3071);
    }

    #[test]
    fn test_calculate_tdee_unknown_level_is_sedentary() {
        let level = ActivityLevel::from_str("couch");
        assert_eq!(level, None);
        assert_eq!(calculate_tdee(1000, level), 1200);
    }

    #[test]
    fn test_met_lookup() {
        assert_eq!(met_for("HIIT"), 8.0);
        assert_eq!(met_for("running (jog)"), 7.0);
        assert_eq!(met_for("Underwater Basket Weaving"), DEFAULT_MET);
    }

    #[test]
    fn test_exercise_calories() {
        // 7.0 × 70 × 0.5
        assert_eq!(calculate_exercise_calories(70.0, "Running (Jog)", 30.0), 245);
        // default MET: 4.0 × 50 × 1
        assert_eq!(calculate_exercise_calories(50.0, "Unknown", 60.0), 200);
        assert_eq!(calculate_exercise_calories(0.0, "HIIT", 30.0), 0);
        assert_eq!(calculate_exercise_calories(70.0, "HIIT", 0.0), 0);
    }

    #[test]
    fn test_gym_sets() {
        assert!(is_gym_exercise("bench press"));
        assert!(!is_gym_exercise("Swimming"));
        assert_eq!(gym_set_duration(4), 10.0);
    }

    #[test]
    fn test_age_on() {
        assert_eq!(age_on(date(2000, 6, 15), date(2026, 6, 14)), 25);
        assert_eq!(age_on(date(2000, 6, 15), date(2026, 6, 15)), 26);
        assert_eq!(age_on(date(2030, 1, 1), date(2026, 1, 1)), 0);
    }

    #[test]
    fn test_calorie_balance() {
        let balance = CalorieBalance::new(2000.0, 1800.0, 300.0);
        assert_eq!(balance.net, 1500.0);
        assert_eq!(balance.remaining, 500.0);
        assert!(!balance.is_surplus());

        let over = CalorieBalance::new(2000.0, 2600.0, 100.0);
        assert!(over.is_surplus());
    }

    #[test]
    fn test_energy_profile_complete() {
        let stats = BodyStats {
            weight_kg: Some(80.0),
            height_cm: Some(180.0),
            gender: Some(Gender::Male),
            date_of_birth: Some(date(1996, 1, 1)),
            activity_level: Some(ActivityLevel::Moderate),
        };
        let profile = EnergyProfile::compute(&stats, date(2026, 1, 1));
        assert_eq!(profile.age_years, Some(30));
        assert_eq!(profile.bmr, 1780);
        assert_eq!(profile.tdee, 2759);
    }

    #[test]
    fn test_energy_profile_missing_data() {
        let stats = BodyStats {
            weight_kg: Some(80.0),
            ..Default::default()
        };
        let profile = EnergyProfile::compute(&stats, date(2026, 1, 1));
        assert_eq!(profile.bmr, 0);
        assert_eq!(profile.tdee, 0);
        assert_eq!(profile.activity_multiplier, 1.2);
    }
}
