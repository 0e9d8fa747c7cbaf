//! Weekly diet planner model

use chrono::Weekday;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

use super::Macros;

/// Day of the week a planned meal belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "mon" => Some(DayOfWeek::Monday),
            "tuesday" | "tue" => Some(DayOfWeek::Tuesday),
            "wednesday" | "wed" => Some(DayOfWeek::Wednesday),
            "thursday" | "thu" => Some(DayOfWeek::Thursday),
            "friday" | "fri" => Some(DayOfWeek::Friday),
            "saturday" | "sat" => Some(DayOfWeek::Saturday),
            "sunday" | "sun" => Some(DayOfWeek::Sunday),
            _ => None,
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// Meal slot in the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanMealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl PlanMealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanMealType::Breakfast => "breakfast",
            PlanMealType::Lunch => "lunch",
            PlanMealType::Dinner => "dinner",
            PlanMealType::Snack => "snack",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(PlanMealType::Breakfast),
            "lunch" => Some(PlanMealType::Lunch),
            "dinner" => Some(PlanMealType::Dinner),
            "snack" | "snacks" => Some(PlanMealType::Snack),
            _ => None,
        }
    }
}

/// A planned meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietPlan {
    pub id: i64,
    pub day_of_week: DayOfWeek,
    pub meal_type: PlanMealType,
    pub meal_name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for adding a planned meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietPlanCreate {
    pub day_of_week: DayOfWeek,
    pub meal_type: PlanMealType,
    pub meal_name: String,
    pub macros: Macros,
}

impl DietPlan {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let day_str: String = row.get("day_of_week")?;
        let meal_str: String = row.get("meal_type")?;

        Ok(Self {
            id: row.get("id")?,
            day_of_week: DayOfWeek::from_str(&day_str).unwrap_or(DayOfWeek::Monday),
            meal_type: PlanMealType::from_str(&meal_str).unwrap_or(PlanMealType::Snack),
            meal_name: row.get("meal_name")?,
            calories: row.get("calories")?,
            protein: row.get("protein")?,
            carbs: row.get("carbs")?,
            fats: row.get("fats")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn macros(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fats)
    }

    /// Add a meal to the plan
    pub fn create(conn: &Connection, data: &DietPlanCreate) -> DbResult<Self> {
        if data.meal_name.trim().is_empty() {
            return Err(DbError::invalid("meal_name cannot be empty"));
        }
        let m = data.macros;
        if [m.calories, m.protein, m.carbs, m.fats].iter().any(|v| *v < 0.0) {
            return Err(DbError::invalid("meal macros cannot be negative"));
        }

        conn.execute(
            r#"
            INSERT INTO diet_plans (day_of_week, meal_type, meal_name, calories, protein, carbs, fats)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                data.day_of_week.as_str(),
                data.meal_type.as_str(),
                data.meal_name.trim(),
                m.calories,
                m.protein,
                m.carbs,
                m.fats,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM diet_plans WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(plan) => Ok(Some(plan)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Planned meals for a weekday, breakfast first
    pub fn list_for_day(conn: &Connection, day: DayOfWeek) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM diet_plans
            WHERE day_of_week = ?1
            ORDER BY CASE meal_type
                WHEN 'breakfast' THEN 1
                WHEN 'lunch' THEN 2
                WHEN 'dinner' THEN 3
                ELSE 4
            END, id
            "#
        )?;
        let plans = stmt
            .query_map([day.as_str()], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(plans)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM diet_plans WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;
    use crate::metrics::sum_macros;

    fn plan(day: DayOfWeek, meal: PlanMealType, name: &str, calories: f64) -> DietPlanCreate {
        DietPlanCreate {
            day_of_week: day,
            meal_type: meal,
            meal_name: name.to_string(),
            macros: Macros::new(calories, 10.0, 20.0, 5.0),
        }
    }

    #[test]
    fn test_list_for_day_orders_meals() {
        let conn = test_conn();
        DietPlan::create(&conn, &plan(DayOfWeek::Monday, PlanMealType::Dinner, "Dal rice", 450.0)).unwrap();
        DietPlan::create(&conn, &plan(DayOfWeek::Monday, PlanMealType::Breakfast, "Poha", 250.0)).unwrap();
        DietPlan::create(&conn, &plan(DayOfWeek::Tuesday, PlanMealType::Lunch, "Rajma", 500.0)).unwrap();

        let monday = DietPlan::list_for_day(&conn, DayOfWeek::Monday).unwrap();
        let names: Vec<&str> = monday.iter().map(|p| p.meal_name.as_str()).collect();
        assert_eq!(names, vec!["Poha", "Dal rice"]);

        let totals = sum_macros(monday.iter().map(DietPlan::macros));
        assert_eq!(totals.calories, 700.0);
    }

    #[test]
    fn test_weekday_conversion() {
        assert_eq!(DayOfWeek::from(Weekday::Sun), DayOfWeek::Sunday);
        assert_eq!(DayOfWeek::from_str("Wed"), Some(DayOfWeek::Wednesday));
        assert_eq!(PlanMealType::from_str("Snacks"), Some(PlanMealType::Snack));
    }

    #[test]
    fn test_delete() {
        let conn = test_conn();
        let p = DietPlan::create(&conn, &plan(DayOfWeek::Friday, PlanMealType::Snack, "Fruit", 120.0)).unwrap();
        assert!(DietPlan::delete(&conn, p.id).unwrap());
        assert!(DietPlan::get_by_id(&conn, p.id).unwrap().is_none());
    }
}
