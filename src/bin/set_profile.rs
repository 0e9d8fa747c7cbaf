//! Utility to seed the profile row
//! Usage: cargo run --bin set_profile -- weight_kg=68 height_cm=172 gender=male dob=1999-04-12 activity=moderate

use chrono::Local;

use lifedash::config::Config;
use lifedash::db::{migrations, Database};
use lifedash::metrics::{ActivityLevel, EnergyProfile, Gender};
use lifedash::models::{Profile, ProfileUpdate};

fn parse_number(key: &str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|_| format!("{} must be a number, got {}", key, value))
}

fn parse_args(args: &[String]) -> Result<ProfileUpdate, String> {
    let mut update = ProfileUpdate::default();

    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got {}", arg))?;

        match key {
            "name" | "full_name" => update.full_name = Some(value.to_string()),
            "username" => update.username = Some(value.to_string()),
            "gender" => {
                update.gender = Some(
                    Gender::from_str(value).ok_or_else(|| format!("Unknown gender: {}", value))?,
                )
            }
            "dob" | "date_of_birth" => update.date_of_birth = Some(value.to_string()),
            "weight" | "weight_kg" => update.weight_kg = Some(parse_number(key, value)?),
            "height" | "height_cm" => update.height_cm = Some(parse_number(key, value)?),
            "activity" | "activity_level" => {
                update.activity_level = Some(
                    ActivityLevel::from_str(value)
                        .ok_or_else(|| format!("Unknown activity level: {}", value))?,
                )
            }
            "calories" | "caloric_target" => update.caloric_target = Some(parse_number(key, value)?),
            "water" | "hydration_target" => update.hydration_target = Some(parse_number(key, value)?),
            "sleep" | "sleep_target" => update.sleep_target = Some(parse_number(key, value)?),
            _ => return Err(format!("Unknown field: {}", key)),
        }
    }

    Ok(update)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let update = parse_args(&args)?;

    let config = Config::from_env();
    println!("Database path: {}", config.database_path.display());
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path, 1)?;
    database.with_conn(migrations::run_migrations)?;

    let profile = database.with_conn(|conn| Profile::upsert(conn, &update))?;
    let energy = EnergyProfile::compute(&profile.body_stats(), Local::now().date_naive());

    println!("Profile set:");
    println!("  Name: {}", profile.full_name.as_deref().unwrap_or("-"));
    println!("  Gender: {}", profile.gender.map(|g| g.as_str()).unwrap_or("-"));
    println!("  DOB: {}", profile.date_of_birth.as_deref().unwrap_or("-"));
    println!("  Weight: {:?} kg | Height: {:?} cm", profile.weight_kg, profile.height_cm);
    println!("  Targets: {} kcal, {} ml, {} h",
        profile.caloric_target, profile.hydration_target, profile.sleep_target);
    println!("  BMR: {} | TDEE: {}", energy.bmr, energy.tdee);

    Ok(())
}
