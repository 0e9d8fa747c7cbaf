//! Food log model
//!
//! Individual foods eaten on a date. Daily consumed totals are derived from
//! these rows.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

use super::{parse_date, Macros};

/// A logged food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLog {
    pub id: i64,
    pub date: String,
    pub food_name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for logging a food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLogCreate {
    pub date: String,
    pub food_name: String,
    pub macros: Macros,
}

/// Data for updating a food log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodLogUpdate {
    pub food_name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

fn check_amounts(macros: &[(&str, Option<f64>)]) -> DbResult<()> {
    for (name, value) in macros {
        if matches!(value, Some(v) if *v < 0.0 || v.is_nan()) {
            return Err(DbError::invalid(format!("{} cannot be negative", name)));
        }
    }
    Ok(())
}

impl FoodLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            food_name: row.get("food_name")?,
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

    /// Log a food
    pub fn create(conn: &Connection, data: &FoodLogCreate) -> DbResult<Self> {
        parse_date(&data.date)?;
        if data.food_name.trim().is_empty() {
            return Err(DbError::invalid("food_name cannot be empty"));
        }
        let m = data.macros;
        check_amounts(&[
            ("calories", Some(m.calories)),
            ("protein", Some(m.protein)),
            ("carbs", Some(m.carbs)),
            ("fats", Some(m.fats)),
        ])?;

        conn.execute(
            r#"
            INSERT INTO food_logs (date, food_name, calories, protein, carbs, fats)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![data.date, data.food_name.trim(), m.calories, m.protein, m.carbs, m.fats],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a food log by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_logs WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Food logs for a date in the order they were entered
    pub fn list_for_date(conn: &Connection, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM food_logs WHERE date = ?1 ORDER BY created_at, id"
        )?;
        let logs = stmt
            .query_map([date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// Distinct dates that have food logs
    pub fn logged_dates(conn: &Connection) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare("SELECT DISTINCT date FROM food_logs ORDER BY date")?;
        let dates = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(dates)
    }

    /// Update a food log
    pub fn update(conn: &Connection, id: i64, data: &FoodLogUpdate) -> DbResult<Option<Self>> {
        check_amounts(&[
            ("calories", data.calories),
            ("protein", data.protein),
            ("carbs", data.carbs),
            ("fats", data.fats),
        ])?;

        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref v) = data.food_name {
            updates.push("food_name = ?");
            values.push(Box::new(v.trim().to_string()));
        }
        if let Some(v) = data.calories {
            updates.push("calories = ?");
            values.push(Box::new(v));
        }
        if let Some(v) = data.protein {
            updates.push("protein = ?");
            values.push(Box::new(v));
        }
        if let Some(v) = data.carbs {
            updates.push("carbs = ?");
            values.push(Box::new(v));
        }
        if let Some(v) = data.fats {
            updates.push("fats = ?");
            values.push(Box::new(v));
        }

        if !updates.is_empty() {
            updates.push("updated_at = datetime('now')");
            let sql = format!("UPDATE food_logs SET {} WHERE id = ?", updates.join(", "));
            values.push(Box::new(id));
            let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
            conn.execute(&sql, params.as_slice())?;
        }

        Self::get_by_id(conn, id)
    }

    /// Delete a food log
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM food_logs WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;

    fn log(conn: &Connection, date: &str, name: &str, calories: f64) -> FoodLog {
        FoodLog::create(conn, &FoodLogCreate {
            date: date.to_string(),
            food_name: name.to_string(),
            macros: Macros::new(calories, 1.0, 1.0, 1.0),
        })
        .unwrap()
    }

    #[test]
    fn test_create_and_list_by_date() {
        let conn = test_conn();
        log(&conn, "2025-02-01", "Banana", 105.0);
        log(&conn, "2025-02-01", "Tea (with milk/sugar)", 60.0);
        log(&conn, "2025-02-02", "Apple", 95.0);

        let logs = FoodLog::list_for_date(&conn, "2025-02-01").unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].food_name, "Banana");
        assert_eq!(FoodLog::logged_dates(&conn).unwrap(), vec!["2025-02-01", "2025-02-02"]);
    }

    #[test]
    fn test_create_rejects_negative_and_blank() {
        let conn = test_conn();
        let negative = FoodLog::create(&conn, &FoodLogCreate {
            date: "2025-02-01".to_string(),
            food_name: "Apple".to_string(),
            macros: Macros::new(-5.0, 0.0, 0.0, 0.0),
        });
        assert!(negative.is_err());

        let blank = FoodLog::create(&conn, &FoodLogCreate {
            date: "2025-02-01".to_string(),
            food_name: "  ".to_string(),
            macros: Macros::zero(),
        });
        assert!(blank.is_err());
    }

    #[test]
    fn test_update_partial() {
        let conn = test_conn();
        let entry = log(&conn, "2025-02-01", "Rice", 130.0);

        let updated = FoodLog::update(&conn, entry.id, &FoodLogUpdate {
            calories: Some(195.0),
            ..Default::default()
        })
        .unwrap()
        .unwrap();
        assert_eq!(updated.calories, 195.0);
        assert_eq!(updated.food_name, "Rice");
    }

    #[test]
    fn test_delete() {
        let conn = test_conn();
        let entry = log(&conn, "2025-02-01", "Maggi / Noodles", 310.0);
        assert!(FoodLog::delete(&conn, entry.id).unwrap());
        assert!(!FoodLog::delete(&conn, entry.id).unwrap());
    }
}
