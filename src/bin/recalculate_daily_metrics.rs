//! Utility to rebuild daily totals from food and exercise logs
//! Usage: cargo run --bin recalculate_daily_metrics -- [DATE | START END] [--reestimate]
//!
//! --reestimate recomputes each workout's calories from its MET value and the
//! current profile weight before the totals are synced.

use std::collections::BTreeSet;

use lifedash::config::Config;
use lifedash::db::{migrations, Database};
use lifedash::metrics::calculate_exercise_calories;
use lifedash::models::{DailyMetrics, ExerciseLog, FoodLog, Profile};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let reestimate = args.iter().any(|a| a == "--reestimate");
    let positional: Vec<&str> = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .collect();

    let (start, end) = match positional.as_slice() {
        [] => ("0000-01-01", "9999-12-31"),
        [date] => (*date, *date),
        [start, end] => (*start, *end),
        _ => return Err("Usage: recalculate_daily_metrics [DATE | START END] [--reestimate]".into()),
    };

    let config = Config::from_env();
    println!("Database: {}", config.database_path.display());

    let database = Database::new(&config.database_path, 1)?;
    database.with_conn(migrations::run_migrations)?;

    database.with_transaction(|tx| {
        if reestimate {
            match Profile::get_or_default(tx)?.weight_kg {
                Some(weight) => {
                    for log in ExerciseLog::list_by_date_range(tx, start, end)? {
                        let calories = f64::from(calculate_exercise_calories(
                            weight,
                            &log.exercise_type,
                            log.duration_minutes,
                        ));
                        if calories != log.calories_burned {
                            println!("  {} #{} {}: {:.0} -> {:.0} kcal",
                                log.date, log.id, log.exercise_type, log.calories_burned, calories);
                            ExerciseLog::set_calories_burned(tx, log.id, calories)?;
                        }
                    }
                }
                None => println!("No weight on the profile, keeping stored exercise calories"),
            }
        }

        let dates: BTreeSet<String> = FoodLog::logged_dates(tx)?
            .into_iter()
            .chain(ExerciseLog::logged_dates(tx)?)
            .filter(|d| d.as_str() >= start && d.as_str() <= end)
            .collect();

        if dates.is_empty() {
            println!("No logs found between {} and {}", start, end);
            return Ok(());
        }

        for date in &dates {
            let before = DailyMetrics::get_for_date(tx, date)?;
            DailyMetrics::sync_food_totals(tx, date)?;
            let after = DailyMetrics::sync_exercise_totals(tx, date)?;

            println!("{}: consumed {:.0} -> {:.0} kcal, burned {:.0} -> {:.0} kcal",
                date,
                before.calories_consumed, after.calories_consumed,
                before.calories_burned, after.calories_burned);
        }
        println!("Recalculated {} day(s)", dates.len());

        Ok(())
    })?;

    Ok(())
}
