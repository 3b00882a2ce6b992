use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A leaf food with a fixed calorie count per serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicFood {
    pub id: String,
    pub keywords: Vec<String>,
    pub calories_per_serving: f64,
}

impl BasicFood {
    pub fn new(id: impl Into<String>, keywords: Vec<String>, calories_per_serving: f64) -> Self {
        Self {
            id: id.into(),
            keywords,
            calories_per_serving,
        }
    }

    pub fn calculate_calories(&self, servings: u32) -> f64 {
        self.calories_per_serving * f64::from(servings)
    }
}

/// A food composed of other foods.
///
/// Components are identifier-keyed references into the owning
/// [`FoodStore`](crate::db::FoodStore); the store is the sole owner of all
/// foods. `calories_per_serving` is a cached sum over the components,
/// recomputed by the store after every component mutation. The sorted map
/// keeps iteration (and therefore the cached sum, the dynamic walk, and the
/// persisted file) deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeFood {
    pub id: String,
    pub keywords: Vec<String>,
    pub calories_per_serving: f64,
    /// Component food identifier -> servings of that component.
    pub components: BTreeMap<String, u32>,
}

impl CompositeFood {
    /// Creates an empty composite: no components, zero calories.
    pub fn new(id: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            id: id.into(),
            keywords,
            calories_per_serving: 0.0,
            components: BTreeMap::new(),
        }
    }

    pub fn calculate_calories(&self, servings: u32) -> f64 {
        self.calories_per_serving * f64::from(servings)
    }
}

/// Borrowed view over either food variant, giving the shared capability set.
#[derive(Debug, Clone, Copy)]
pub enum FoodRef<'a> {
    Basic(&'a BasicFood),
    Composite(&'a CompositeFood),
}

impl<'a> FoodRef<'a> {
    pub fn id(self) -> &'a str {
        match self {
            FoodRef::Basic(f) => &f.id,
            FoodRef::Composite(f) => &f.id,
        }
    }

    pub fn keywords(self) -> &'a [String] {
        match self {
            FoodRef::Basic(f) => &f.keywords,
            FoodRef::Composite(f) => &f.keywords,
        }
    }

    pub fn calories_per_serving(self) -> f64 {
        match self {
            FoodRef::Basic(f) => f.calories_per_serving,
            FoodRef::Composite(f) => f.calories_per_serving,
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(self, FoodRef::Composite(_))
    }

    pub fn calculate_calories(self, servings: u32) -> f64 {
        self.calories_per_serving() * f64::from(servings)
    }

    /// Tests this food's keywords against a query, case-insensitively.
    ///
    /// With `match_all`, every query keyword must have a match among this
    /// food's keywords; otherwise one match suffices. An empty query is
    /// vacuously true under `match_all` and matches nothing otherwise.
    pub fn matches_keywords(self, query: &[String], match_all: bool) -> bool {
        let mut matches = match_all;
        for keyword in query {
            let found = self
                .keywords()
                .iter()
                .any(|k| k.to_lowercase() == keyword.to_lowercase());
            if match_all && !found {
                matches = false;
                break;
            } else if !match_all && found {
                matches = true;
                break;
            }
        }
        matches
    }
}

impl fmt::Display for BasicFood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Basic Food: {}", self.id)?;
        writeln!(f, "Keywords: {}", self.keywords.join(", "))?;
        write!(f, "Calories per serving: {}", self.calories_per_serving)
    }
}

impl fmt::Display for CompositeFood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Composite Food: {}", self.id)?;
        writeln!(f, "Keywords: {}", self.keywords.join(", "))?;
        writeln!(f, "Components:")?;
        for (id, servings) in &self.components {
            writeln!(f, "  - {} ({} servings)", id, servings)?;
        }
        write!(f, "Total calories per serving: {}", self.calories_per_serving)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(id: &str, keywords: &[&str], calories: f64) -> BasicFood {
        BasicFood::new(id, keywords.iter().map(|s| s.to_string()).collect(), calories)
    }

    fn query(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_basic_food_calories() {
        let apple = basic("apple", &["fruit", "sweet"], 52.0);
        assert_eq!(apple.calculate_calories(2), 104.0);
        assert_eq!(apple.calculate_calories(0), 0.0);
    }

    #[test]
    fn test_new_composite_is_empty() {
        let salad = CompositeFood::new("fruit_salad", vec!["fruit".to_string()]);
        assert!(salad.components.is_empty());
        assert_eq!(salad.calories_per_serving, 0.0);
        assert_eq!(salad.calculate_calories(5), 0.0);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let apple = basic("apple", &["Fruit"], 52.0);
        let food = FoodRef::Basic(&apple);

        assert!(food.matches_keywords(&query(&["fruit"]), true));
        assert!(food.matches_keywords(&query(&["FRUIT"]), true));
        assert!(food.matches_keywords(&query(&["fruit"]), false));
    }

    #[test]
    fn test_match_all_requires_every_keyword() {
        let apple = basic("apple", &["fruit", "sweet"], 52.0);
        let food = FoodRef::Basic(&apple);

        assert!(food.matches_keywords(&query(&["fruit", "sweet"]), true));
        assert!(!food.matches_keywords(&query(&["fruit", "sour"]), true));
        assert!(food.matches_keywords(&query(&["fruit", "sour"]), false));
        assert!(!food.matches_keywords(&query(&["bitter", "sour"]), false));
    }

    #[test]
    fn test_empty_query_semantics() {
        let apple = basic("apple", &["fruit"], 52.0);
        let food = FoodRef::Basic(&apple);

        // Vacuously true under match-all, no match under match-any.
        assert!(food.matches_keywords(&[], true));
        assert!(!food.matches_keywords(&[], false));
    }

    #[test]
    fn test_food_ref_capabilities() {
        let apple = basic("apple", &["fruit"], 52.0);
        let salad = CompositeFood::new("fruit_salad", vec!["fruit".to_string()]);

        let b = FoodRef::Basic(&apple);
        let c = FoodRef::Composite(&salad);

        assert_eq!(b.id(), "apple");
        assert!(!b.is_composite());
        assert_eq!(b.calories_per_serving(), 52.0);
        assert_eq!(c.id(), "fruit_salad");
        assert!(c.is_composite());
    }
}
