//! Aggregation reducers over logged entries

use crate::catalog::CatalogFood;
use crate::models::Macros;

/// Sum the macros of any sequence of entries
pub fn sum_macros<I>(entries: I) -> Macros
where
    I: IntoIterator<Item = Macros>,
{
    entries.into_iter().sum()
}

/// Macros for a portion of a catalog food, each value rounded to a whole number.
/// A non-positive portion gives zeros.
pub fn portion_macros(food: &CatalogFood, portion: f64) -> Macros {
    if portion <= 0.0 || food.default_size <= 0.0 {
        return Macros::zero();
    }
    food.macros().scale(portion / food.default_size).rounded()
}

/// Totals to display for a day: the sum of the individual logs when there are
/// any, otherwise the stored snapshot (logs may have been archived)
pub fn effective_totals(logs: &[Macros], stored: Option<Macros>) -> Macros {
    if logs.is_empty() {
        stored.unwrap_or_default()
    } else {
        logs.iter().sum()
    }
}

/// Total of a scalar field, e.g. calories burned across exercise logs
pub fn sum_field<T, F>(entries: &[T], field: F) -> f64
where
    F: Fn(&T) -> f64,
{
    entries.iter().map(field).sum()
}
