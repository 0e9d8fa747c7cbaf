//! Profile model
//!
//! Single-row table holding body stats and daily targets.

use chrono::NaiveDate;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::metrics::{ActivityLevel, BodyStats, Gender, MetricKind};

pub const DEFAULT_CALORIC_TARGET: f64 = 2000.0;
pub const DEFAULT_HYDRATION_TARGET: f64 = 2500.0;
pub const DEFAULT_SLEEP_TARGET: f64 = 8.0;

/// The user's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<String>, // ISO date: "1999-04-12"
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub caloric_target: f64,
    pub hydration_target: f64, // ml
    pub sleep_target: f64,     // hours
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            full_name: None,
            username: None,
            gender: None,
            date_of_birth: None,
            weight_kg: None,
            height_cm: None,
            activity_level: None,
            caloric_target: DEFAULT_CALORIC_TARGET,
            hydration_target: DEFAULT_HYDRATION_TARGET,
            sleep_target: DEFAULT_SLEEP_TARGET,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Fields to change on the profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub caloric_target: Option<f64>,
    pub hydration_target: Option<f64>,
    pub sleep_target: Option<f64>,
}

impl Profile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let gender: Option<String> = row.get("gender")?;
        let activity_level: Option<String> = row.get("activity_level")?;

        Ok(Self {
            full_name: row.get("full_name")?,
            username: row.get("username")?,
            gender: gender.as_deref().and_then(Gender::from_str),
            date_of_birth: row.get("date_of_birth")?,
            weight_kg: row.get("weight_kg")?,
            height_cm: row.get("height_cm")?,
            activity_level: activity_level.as_deref().and_then(ActivityLevel::from_str),
            caloric_target: row.get("caloric_target")?,
            hydration_target: row.get("hydration_target")?,
            sleep_target: row.get("sleep_target")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the stored profile, if one was ever saved
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profile WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stored profile, or one with default targets when none exists
    pub fn get_or_default(conn: &Connection) -> DbResult<Self> {
        Ok(Self::get(conn)?.unwrap_or_default())
    }

    /// Create the profile row if missing, then apply the given fields
    pub fn upsert(conn: &Connection, data: &ProfileUpdate) -> DbResult<Self> {
        if let Some(ref dob) = data.date_of_birth {
            NaiveDate::parse_from_str(dob, "%Y-%m-%d")
                .map_err(|_| DbError::invalid(format!("date_of_birth must be YYYY-MM-DD, got '{}'", dob)))?;
        }
        for (name, value) in [
            ("weight_kg", data.weight_kg),
            ("height_cm", data.height_cm),
            ("caloric_target", data.caloric_target),
            ("hydration_target", data.hydration_target),
            ("sleep_target", data.sleep_target),
        ] {
            if matches!(value, Some(v) if v < 0.0) {
                return Err(DbError::invalid(format!("{} cannot be negative", name)));
            }
        }

        conn.execute("INSERT OR IGNORE INTO profile (id) VALUES (1)", [])?;

        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref v) = data.full_name {
            updates.push("full_name = ?");
            values.push(Box::new(v.clone()));
        }
        if let Some(ref v) = data.username {
            updates.push("username = ?");
            values.push(Box::new(v.clone()));
        }
        if let Some(v) = data.gender {
            updates.push("gender = ?");
            values.push(Box::new(v.as_str()));
        }
        if let Some(ref v) = data.date_of_birth {
            updates.push("date_of_birth = ?");
            values.push(Box::new(v.clone()));
        }
        if let Some(v) = data.weight_kg {
            updates.push("weight_kg = ?");
            values.push(Box::new(v));
        }
        if let Some(v) = data.height_cm {
            updates.push("height_cm = ?");
            values.push(Box::new(v));
        }
        if let Some(v) = data.activity_level {
            updates.push("activity_level = ?");
            values.push(Box::new(v.as_str()));
        }
        if let Some(v) = data.caloric_target {
            updates.push("caloric_target = ?");
            values.push(Box::new(v));
        }
        if let Some(v) = data.hydration_target {
            updates.push("hydration_target = ?");
            values.push(Box::new(v));
        }
        if let Some(v) = data.sleep_target {
            updates.push("sleep_target = ?");
            values.push(Box::new(v));
        }

        if !updates.is_empty() {
            updates.push("updated_at = datetime('now')");
            let sql = format!("UPDATE profile SET {} WHERE id = 1", updates.join(", "));
            let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
            conn.execute(&sql, params.as_slice())?;
        }

        Self::get(conn)?.ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Inputs for the BMR/TDEE formulas. An unparseable birth date counts as unknown.
    pub fn body_stats(&self) -> BodyStats {
        BodyStats {
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            gender: self.gender,
            date_of_birth: self
                .date_of_birth
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            activity_level: self.activity_level,
        }
    }

    /// Daily target for a tracked metric
    pub fn target_for(&self, metric: MetricKind) -> f64 {
        match metric {
            MetricKind::Calories => self.caloric_target,
            MetricKind::Hydration => self.hydration_target,
            MetricKind::Sleep => self.sleep_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;
    use crate::metrics::EnergyProfile;

    #[test]
    fn test_missing_profile_uses_default_targets() {
        let conn = test_conn();
        assert!(Profile::get(&conn).unwrap().is_none());

        let profile = Profile::get_or_default(&conn).unwrap();
        assert_eq!(profile.caloric_target, 2000.0);
        assert_eq!(profile.target_for(MetricKind::Hydration), 2500.0);
        assert_eq!(profile.target_for(MetricKind::Sleep), 8.0);
    }

    #[test]
    fn test_upsert_is_partial() {
        let conn = test_conn();
        Profile::upsert(&conn, &ProfileUpdate {
            full_name: Some("Asha Rao".to_string()),
            weight_kg: Some(70.0),
            ..Default::default()
        })
        .unwrap();

        let profile = Profile::upsert(&conn, &ProfileUpdate {
            height_cm: Some(175.0),
            gender: Some(Gender::Male),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(profile.full_name.as_deref(), Some("Asha Rao"));
        assert_eq!(profile.weight_kg, Some(70.0));
        assert_eq!(profile.height_cm, Some(175.0));
        assert_eq!(profile.gender, Some(Gender::Male));
        assert_eq!(profile.caloric_target, 2000.0);
    }

    #[test]
    fn test_upsert_rejects_bad_date() {
        let conn = test_conn();
        let result = Profile::upsert(&conn, &ProfileUpdate {
            date_of_birth: Some("12/04/1999".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(DbError::InvalidInput(_))));
    }

    #[test]
    fn test_body_stats_feed_energy_profile() {
        let conn = test_conn();
        let profile = Profile::upsert(&conn, &ProfileUpdate {
            gender: Some(Gender::Male),
            date_of_birth: Some("2000-01-01".to_string()),
            weight_kg: Some(70.0),
            height_cm: Some(175.0),
            activity_level: Some(ActivityLevel::Moderate),
            ..Default::default()
        })
        .unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let energy = EnergyProfile::compute(&profile.body_stats(), today);
        // 700 + 1093.75 - 125 + 5 = 1673.75
        assert_eq!(energy.age_years, Some(25));
        assert_eq!(energy.bmr, 1674);
        assert_eq!(energy.tdee, 2595);
    }
}
