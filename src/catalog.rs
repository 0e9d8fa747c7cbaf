//! Built-in food catalog
//!
//! Common foods with nutrition per default serving. Logging from the catalog
//! scales these values to the entered portion (see
//! [`portion_macros`](crate::metrics::portion_macros)).

use serde::Serialize;

use crate::models::Macros;

/// A catalog food: nutrition values are per `default_size` of `unit`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogFood {
    pub name: &'static str,
    pub unit: &'static str,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub default_size: f64,
}

impl CatalogFood {
    pub fn macros(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fats)
    }
}

const fn food(
    name: &'static str,
    unit: &'static str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fats: f64,
    default_size: f64,
) -> CatalogFood {
    CatalogFood {
        name,
        unit,
        calories,
        protein,
        carbs,
        fats,
        default_size,
    }
}

pub static FOOD_DATABASE: &[CatalogFood] = &[
    food("Roti (Whole Wheat)", "piece", 104.0, 3.0, 22.0, 0.5, 1.0),
    food("Chapati (Medium)", "piece", 120.0, 3.5, 25.0, 1.0, 1.0),
    food("Paratha (Plain)", "piece", 180.0, 4.0, 28.0, 6.0, 1.0),
    food("Paratha (Aloo)", "piece", 210.0, 5.0, 35.0, 7.0, 1.0),
    food("Rice (White, Cooked)", "grams", 130.0, 2.7, 28.0, 0.3, 100.0),
    food("Rice (Brown, Cooked)", "grams", 111.0, 2.6, 23.0, 0.9, 100.0),
    food("Bread (White)", "slice", 79.0, 2.7, 15.0, 1.0, 1.0),
    food("Bread (Whole Wheat)", "slice", 92.0, 3.6, 17.0, 1.0, 1.0),
    food("Oats (Cooked)", "grams", 71.0, 2.5, 12.0, 1.5, 100.0),
    food("Poha (Cooked)", "grams", 180.0, 3.0, 35.0, 4.0, 100.0),
    food("Upma", "grams", 190.0, 4.0, 30.0, 6.0, 100.0),
    food("Idli", "piece", 58.0, 2.0, 12.0, 0.2, 1.0),
    food("Dosa (Plain)", "piece", 133.0, 3.0, 22.0, 3.0, 1.0),
    food("Masala Dosa", "piece", 350.0, 6.0, 45.0, 15.0, 1.0),
    food("Dal (Toor, Cooked)", "bowl", 150.0, 8.0, 20.0, 4.0, 1.0),
    food("Dal (Moong, Cooked)", "bowl", 140.0, 9.0, 18.0, 3.0, 1.0),
    food("Chana Masala", "bowl", 200.0, 10.0, 25.0, 7.0, 1.0),
    food("Rajma Curry", "bowl", 240.0, 12.0, 30.0, 8.0, 1.0),
    food("Chickpeas (Boiled)", "grams", 164.0, 9.0, 27.0, 2.6, 100.0),
    food("Milk (Whole)", "ml", 62.0, 3.2, 4.8, 3.3, 100.0),
    food("Milk (Skimmed)", "ml", 35.0, 3.4, 5.0, 0.1, 100.0),
    food("Curd / Yogurt", "grams", 60.0, 3.5, 4.7, 3.3, 100.0),
    food("Paneer (Raw)", "grams", 265.0, 18.0, 1.2, 20.0, 100.0),
    food("Egg (Boiled)", "piece", 78.0, 6.0, 0.6, 5.0, 1.0),
    food("Egg Omelette (1 Egg)", "piece", 120.0, 7.0, 1.0, 9.0, 1.0),
    food("Butter", "tsp", 36.0, 0.0, 0.0, 4.0, 1.0),
    food("Ghee", "tsp", 45.0, 0.0, 0.0, 5.0, 1.0),
    food("Apple", "piece", 95.0, 0.5, 25.0, 0.3, 1.0),
    food("Banana", "piece", 105.0, 1.3, 27.0, 0.4, 1.0),
    food("Orange", "piece", 62.0, 1.2, 15.0, 0.2, 1.0),
    food("Mango", "piece", 200.0, 2.8, 50.0, 1.2, 1.0),
    food("Grapes", "grams", 69.0, 0.7, 18.0, 0.2, 100.0),
    food("Watermelon", "grams", 30.0, 0.6, 8.0, 0.2, 100.0),
    food("Papaya", "grams", 43.0, 0.5, 11.0, 0.3, 100.0),
    food("Mixed Vegetable Sabzi", "bowl", 150.0, 3.0, 12.0, 9.0, 1.0),
    food("Aloo Gobi", "bowl", 180.0, 4.0, 20.0, 10.0, 1.0),
    food("Bhindi Masala", "bowl", 160.0, 3.0, 15.0, 9.0, 1.0),
    food("Palak Paneer", "bowl", 280.0, 12.0, 10.0, 22.0, 1.0),
    food("Potato (Boiled)", "grams", 87.0, 1.9, 20.0, 0.1, 100.0),
    food("Cucumber", "grams", 15.0, 0.7, 3.6, 0.1, 100.0),
    food("Chicken Breast (Grilled)", "grams", 165.0, 31.0, 0.0, 3.6, 100.0),
    food("Chicken Curry", "bowl", 300.0, 25.0, 10.0, 18.0, 1.0),
    food("Fish Fry", "piece", 250.0, 20.0, 5.0, 15.0, 1.0),
    food("Mutton Curry", "bowl", 400.0, 25.0, 12.0, 28.0, 1.0),
    food("Samosa", "piece", 260.0, 4.0, 24.0, 17.0, 1.0),
    food("Tea (with milk/sugar)", "cup", 60.0, 2.0, 8.0, 2.0, 1.0),
    food("Coffee (with milk/sugar)", "cup", 70.0, 2.0, 9.0, 3.0, 1.0),
    food("Biscuits (Digestive)", "piece", 70.0, 1.0, 10.0, 3.0, 1.0),
    food("Maggi / Noodles", "pack", 310.0, 6.0, 40.0, 14.0, 1.0),
];

/// Case-insensitive substring search over food names. An empty term matches nothing.
pub fn search(term: &str) -> Vec<&'static CatalogFood> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    FOOD_DATABASE
        .iter()
        .filter(|f| f.name.to_lowercase().contains(&needle))
        .collect()
}

/// Exact lookup by name
pub fn find(name: &str) -> Option<&'static CatalogFood> {
    FOOD_DATABASE.iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_is_case_insensitive() {
        let results = search("PANEER");
        let names: Vec<&str> = results.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Paneer (Raw)", "Palak Paneer"]);
    }

    #[test]
    fn test_search_empty_term() {
        assert!(search("").is_empty());
        assert!(search("   ").is_empty());
    }

    #[test]
    fn test_search_no_match() {
        assert!(search("pizza").is_empty());
    }

    #[test]
    fn test_find_exact() {
        let egg = find("Egg (Boiled)").unwrap();
        assert_eq!(egg.unit, "piece");
        assert_eq!(egg.macros(), Macros::new(78.0, 6.0, 0.6, 5.0));
        assert!(find("egg").is_none());
    }

    #[test]
    fn test_catalog_sizes_are_positive() {
        assert!(FOOD_DATABASE.len() >= 45);
        assert!(FOOD_DATABASE.iter().all(|f| f.default_size > 0.0));
    }
}
