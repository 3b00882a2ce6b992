//! Flat-text store of basic and composite foods.
//!
//! Two resources back the store: one line per basic food, and blocks
//! terminated by `---` for composite foods (header line, then one component
//! line each). Both namespaces are kept in sorted maps so iteration, search
//! order and the persisted files are deterministic.
//!
//! The store is the sole owner of all foods; composite components reference
//! their foods by identifier. A missing resource loads as an empty store.
//! Malformed records are reported and skipped. Component references are
//! resolved at parse time against foods already known to the store, so a
//! composite referencing a composite defined later in the same file silently
//! loses that component (known limitation, kept for file compatibility).

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::codec;
use crate::models::{BasicFood, CompositeFood, FoodRef};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error for {0}: {1}")]
    Io(PathBuf, #[source] io::Error),
    #[error("food not found: {0}")]
    FoodNotFound(String),
}

pub struct FoodStore {
    basic_path: PathBuf,
    composite_path: PathBuf,
    basic: BTreeMap<String, BasicFood>,
    composite: BTreeMap<String, CompositeFood>,
}

impl FoodStore {
    /// Opens the store, loading both resources.
    ///
    /// A resource that does not exist yet is treated as empty.
    pub fn open(
        basic_path: impl Into<PathBuf>,
        composite_path: impl Into<PathBuf>,
    ) -> Result<Self, StoreError> {
        let mut store = Self {
            basic_path: basic_path.into(),
            composite_path: composite_path.into(),
            basic: BTreeMap::new(),
            composite: BTreeMap::new(),
        };
        store.load_basic()?;
        store.load_composite()?;
        Ok(store)
    }

    fn read_lines(path: &Path) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(path.to_path_buf(), e)),
        }
    }

    fn load_basic(&mut self) -> Result<(), StoreError> {
        let Some(contents) = Self::read_lines(&self.basic_path)? else {
            tracing::debug!("no basic foods file at {}", self.basic_path.display());
            return Ok(());
        };

        for (i, line) in contents.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            match codec::decode_basic(line, i + 1) {
                Ok(food) => {
                    self.basic.insert(food.id.clone(), food);
                }
                Err(e) => {
                    tracing::warn!(
                        "{}: skipping malformed basic food record: {}",
                        self.basic_path.display(),
                        e
                    );
                }
            }
        }
        tracing::debug!("loaded {} basic food(s)", self.basic.len());
        Ok(())
    }

    fn load_composite(&mut self) -> Result<(), StoreError> {
        let Some(contents) = Self::read_lines(&self.composite_path)? else {
            tracing::debug!("no composite foods file at {}", self.composite_path.display());
            return Ok(());
        };

        let mut current: Option<CompositeFood> = None;
        // Set after a malformed header; the rest of that block is discarded
        // rather than reinterpreted as fresh headers.
        let mut skipping = false;
        for (i, line) in contents.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            if line == "---" {
                skipping = false;
                if let Some(food) = current.take() {
                    self.finish_composite(food);
                }
                continue;
            }
            if skipping {
                continue;
            }

            match current.take() {
                None => match codec::decode_composite_header(line, i + 1) {
                    Ok((id, keywords)) => current = Some(CompositeFood::new(id, keywords)),
                    Err(e) => {
                        tracing::warn!(
                            "{}: skipping malformed composite block: {}",
                            self.composite_path.display(),
                            e
                        );
                        skipping = true;
                    }
                },
                Some(mut food) => {
                    match codec::decode_component(line, i + 1) {
                        Ok((component_id, servings)) => {
                            // Resolvable only against foods parsed before this
                            // point; forward references are dropped.
                            if self.basic.contains_key(&component_id)
                                || self.composite.contains_key(&component_id)
                            {
                                food.components.insert(component_id, servings);
                            } else {
                                tracing::warn!(
                                    "{}: dropping unresolvable component '{}' of '{}'",
                                    self.composite_path.display(),
                                    component_id,
                                    food.id
                                );
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                "{}: skipping malformed component record: {}",
                                self.composite_path.display(),
                                e
                            );
                        }
                    }
                    current = Some(food);
                }
            }
        }
        // A block missing its terminator still counts.
        if let Some(food) = current.take() {
            self.finish_composite(food);
        }
        tracing::debug!("loaded {} composite food(s)", self.composite.len());
        Ok(())
    }

    fn finish_composite(&mut self, mut food: CompositeFood) {
        food.calories_per_serving = self.sum_component_calories(&food);
        self.composite.insert(food.id.clone(), food);
    }

    /// Sum of `component_calories_per_serving * servings` over the component
    /// set, using each component's already-correct cached value (bottom-up
    /// evaluation order).
    fn sum_component_calories(&self, food: &CompositeFood) -> f64 {
        food.components
            .iter()
            .map(|(id, servings)| {
                self.get_food(id)
                    .map(|f| f.calories_per_serving() * f64::from(*servings))
                    .unwrap_or(0.0)
            })
            .sum()
    }

    /// Creates or overwrites a basic food. No check against the composite
    /// namespace; lookups resolve basic-first.
    pub fn add_basic_food(&mut self, id: impl Into<String>, keywords: Vec<String>, calories: f64) {
        let food = BasicFood::new(id, keywords, calories);
        self.basic.insert(food.id.clone(), food);
    }

    /// Creates or overwrites a composite food with no components.
    pub fn add_composite_food(&mut self, id: impl Into<String>, keywords: Vec<String>) {
        let food = CompositeFood::new(id, keywords);
        self.composite.insert(food.id.clone(), food);
    }

    pub fn get_basic(&self, id: &str) -> Option<&BasicFood> {
        self.basic.get(id)
    }

    pub fn get_composite(&self, id: &str) -> Option<&CompositeFood> {
        self.composite.get(id)
    }

    /// Basic-first lookup across both namespaces.
    pub fn get_food(&self, id: &str) -> Option<FoodRef<'_>> {
        self.basic
            .get(id)
            .map(FoodRef::Basic)
            .or_else(|| self.composite.get(id).map(FoodRef::Composite))
    }

    /// Inserts or overwrites a component of a composite food, then recomputes
    /// the composite's cached calories. Both the composite and the component
    /// must exist.
    pub fn add_component(
        &mut self,
        composite_id: &str,
        component_id: &str,
        servings: u32,
    ) -> Result<(), StoreError> {
        if self.get_food(component_id).is_none() {
            return Err(StoreError::FoodNotFound(component_id.to_string()));
        }
        let food = self
            .composite
            .get_mut(composite_id)
            .ok_or_else(|| StoreError::FoodNotFound(composite_id.to_string()))?;
        food.components.insert(component_id.to_string(), servings);
        self.recompute_calories(composite_id);
        Ok(())
    }

    /// Removes a component if present (no-op otherwise), then recomputes the
    /// composite's cached calories.
    pub fn remove_component(&mut self, composite_id: &str, component_id: &str) {
        if let Some(food) = self.composite.get_mut(composite_id) {
            food.components.remove(component_id);
            self.recompute_calories(composite_id);
        }
    }

    fn recompute_calories(&mut self, composite_id: &str) {
        let total = match self.composite.get(composite_id) {
            Some(food) => self.sum_component_calories(food),
            None => return,
        };
        if let Some(food) = self.composite.get_mut(composite_id) {
            food.calories_per_serving = total;
        }
    }

    /// Calories for `servings` of the identified food, walking the full
    /// component graph on every call rather than trusting caches.
    pub fn calculate_calories(&self, id: &str, servings: u32) -> Option<f64> {
        match self.get_food(id)? {
            FoodRef::Basic(food) => Some(food.calculate_calories(servings)),
            FoodRef::Composite(food) => {
                let per_serving: f64 = food
                    .components
                    .iter()
                    .map(|(component_id, count)| {
                        self.calculate_calories(component_id, *count).unwrap_or(0.0)
                    })
                    .sum();
                Some(per_serving * f64::from(servings))
            }
        }
    }

    /// Case-insensitive keyword search over both namespaces, basic foods
    /// first, in store iteration order. No ranking.
    pub fn search_foods(&self, query: &[String], match_all: bool) -> Vec<FoodRef<'_>> {
        self.basic
            .values()
            .map(FoodRef::Basic)
            .chain(self.composite.values().map(FoodRef::Composite))
            .filter(|food| food.matches_keywords(query, match_all))
            .collect()
    }

    /// Writes both resources, sorted by identifier.
    pub fn save(&self) -> Result<(), StoreError> {
        let mut basic = String::new();
        for food in self.basic.values() {
            let _ = writeln!(basic, "{}", codec::encode_basic(food));
        }
        Self::write_file(&self.basic_path, &basic)?;

        let mut composite = String::new();
        for food in self.composite.values() {
            let _ = writeln!(
                composite,
                "{}",
                codec::encode_composite_header(&food.id, &food.keywords)
            );
            for (component_id, servings) in &food.components {
                let _ = writeln!(composite, "{}", codec::encode_component(component_id, *servings));
            }
            composite.push_str("---\n");
        }
        Self::write_file(&self.composite_path, &composite)
    }

    fn write_file(path: &Path, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io(parent.to_path_buf(), e))?;
        }
        fs::write(path, contents).map_err(|e| StoreError::Io(path.to_path_buf(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    fn empty_store(dir: &Path) -> FoodStore {
        FoodStore::open(dir.join("basic_foods.txt"), dir.join("composite_foods.txt")).unwrap()
    }

    #[test]
    fn test_open_missing_files_yields_empty_store() {
        let dir = tempdir().unwrap();
        let store = empty_store(dir.path());
        assert!(store.search_foods(&[], true).is_empty());
    }

    #[test]
    fn test_get_food_resolves_basic_first() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store.add_basic_food("salad", keywords(&["green"]), 30.0);
        store.add_composite_food("salad", keywords(&["mixed"]));

        let food = store.get_food("salad").unwrap();
        assert!(!food.is_composite());
        assert_eq!(food.calories_per_serving(), 30.0);
        assert!(store.get_composite("salad").is_some());
    }

    #[test]
    fn test_add_component_recomputes_cached_calories() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store.add_basic_food("apple", keywords(&["fruit"]), 52.0);
        store.add_basic_food("banana", keywords(&["fruit"]), 89.0);
        store.add_composite_food("fruit_salad", keywords(&["fruit"]));

        store.add_component("fruit_salad", "apple", 2).unwrap();
        assert_eq!(store.get_composite("fruit_salad").unwrap().calories_per_serving, 104.0);

        store.add_component("fruit_salad", "banana", 1).unwrap();
        assert_eq!(store.get_composite("fruit_salad").unwrap().calories_per_serving, 193.0);

        store.remove_component("fruit_salad", "apple");
        assert_eq!(store.get_composite("fruit_salad").unwrap().calories_per_serving, 89.0);
    }

    #[test]
    fn test_add_component_requires_both_foods() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store.add_composite_food("salad", vec![]);

        assert!(matches!(
            store.add_component("salad", "ghost", 1),
            Err(StoreError::FoodNotFound(_))
        ));
        assert!(matches!(
            store.add_component("ghost", "salad", 1),
            Err(StoreError::FoodNotFound(_))
        ));
    }

    #[test]
    fn test_remove_component_is_noop_when_absent() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store.add_composite_food("salad", vec![]);
        store.remove_component("salad", "ghost");
        store.remove_component("ghost", "ghost");
        assert_eq!(store.get_composite("salad").unwrap().calories_per_serving, 0.0);
    }

    #[test]
    fn test_nested_composite_calories_depth_three() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store.add_basic_food("apple", keywords(&["fruit"]), 52.0);
        store.add_composite_food("fruit_salad", keywords(&["fruit"]));
        store.add_component("fruit_salad", "apple", 2).unwrap();
        store.add_composite_food("fruit_bowl", keywords(&["fruit"]));
        store.add_component("fruit_bowl", "fruit_salad", 3).unwrap();
        store.add_composite_food("party_platter", keywords(&["party"]));
        store.add_component("party_platter", "fruit_bowl", 2).unwrap();

        // 52*2 = 104, *3 = 312, *2 = 624
        assert_eq!(store.calculate_calories("party_platter", 1), Some(624.0));
        assert_eq!(store.calculate_calories("party_platter", 5), Some(3120.0));

        // Dynamic walk agrees with the cached value.
        let cached = store.get_composite("party_platter").unwrap().calories_per_serving;
        assert_eq!(store.calculate_calories("party_platter", 1), Some(cached));
    }

    #[test]
    fn test_calculate_calories_unknown_food() {
        let dir = tempdir().unwrap();
        let store = empty_store(dir.path());
        assert_eq!(store.calculate_calories("ghost", 1), None);
    }

    #[test]
    fn test_search_matches_case_insensitively() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store.add_basic_food("apple", keywords(&["Fruit", "sweet"]), 52.0);

        assert_eq!(store.search_foods(&keywords(&["fruit"]), true).len(), 1);
        assert_eq!(store.search_foods(&keywords(&["FRUIT"]), true).len(), 1);
        assert_eq!(store.search_foods(&keywords(&["savory"]), true).len(), 0);
    }

    #[test]
    fn test_search_empty_query_edge_cases() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store.add_basic_food("apple", keywords(&["fruit"]), 52.0);
        store.add_composite_food("fruit_salad", keywords(&["fruit"]));

        // match_all with no keywords is vacuously true for every food.
        assert_eq!(store.search_foods(&[], true).len(), 2);
        // match-any with no keywords matches nothing.
        assert_eq!(store.search_foods(&[], false).len(), 0);
    }

    #[test]
    fn test_search_returns_basic_before_composite_in_sorted_order() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store.add_basic_food("banana", keywords(&["fruit"]), 89.0);
        store.add_basic_food("apple", keywords(&["fruit"]), 52.0);
        store.add_composite_food("ambrosia", keywords(&["fruit"]));

        let ids: Vec<&str> = store
            .search_foods(&keywords(&["fruit"]), true)
            .iter()
            .map(|f| f.id())
            .collect();
        assert_eq!(ids, vec!["apple", "banana", "ambrosia"]);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store.add_basic_food("apple", keywords(&["Fruit", "sweet"]), 52.0);
        store.add_basic_food("banana", keywords(&["fruit"]), 89.0);
        store.add_composite_food("fruit_salad", keywords(&["fruit", "salad"]));
        store.add_component("fruit_salad", "apple", 2).unwrap();
        store.add_component("fruit_salad", "banana", 1).unwrap();
        store.save().unwrap();

        let reloaded = empty_store(dir.path());
        let apple = reloaded.get_basic("apple").unwrap();
        assert_eq!(apple.keywords, keywords(&["Fruit", "sweet"]));
        assert_eq!(apple.calories_per_serving, 52.0);

        let salad = reloaded.get_composite("fruit_salad").unwrap();
        assert_eq!(salad.keywords, keywords(&["fruit", "salad"]));
        assert_eq!(salad.components.get("apple"), Some(&2));
        assert_eq!(salad.components.get("banana"), Some(&1));
        assert_eq!(salad.calories_per_serving, 193.0);
    }

    #[test]
    fn test_save_is_sorted_by_identifier() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store.add_basic_food("carrot", vec![], 41.0);
        store.add_basic_food("apple", vec![], 52.0);
        store.add_basic_food("banana", vec![], 89.0);
        store.save().unwrap();

        let contents = fs::read_to_string(dir.path().join("basic_foods.txt")).unwrap();
        let ids: Vec<&str> = contents
            .lines()
            .map(|l| l.split('|').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["apple", "banana", "carrot"]);
    }

    #[test]
    fn test_load_drops_forward_composite_reference() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("basic_foods.txt"), "apple|52|fruit\n").unwrap();
        // "brunch" refers to "dessert", which is defined later in the file.
        fs::write(
            dir.path().join("composite_foods.txt"),
            "brunch|meal\napple|1\ndessert|1\n---\ndessert|sweet\napple|3\n---\n",
        )
        .unwrap();

        let store = empty_store(dir.path());
        let brunch = store.get_composite("brunch").unwrap();
        assert!(brunch.components.contains_key("apple"));
        assert!(!brunch.components.contains_key("dessert"));
        assert_eq!(brunch.calories_per_serving, 52.0);

        // The later composite itself loads fine.
        assert_eq!(store.get_composite("dessert").unwrap().calories_per_serving, 156.0);
    }

    #[test]
    fn test_load_skips_malformed_lines_and_continues() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("basic_foods.txt"),
            "apple|52|fruit\nnot a record\nbanana|eighty-nine|fruit\ncarrot|41|veg\n",
        )
        .unwrap();

        let store = empty_store(dir.path());
        assert!(store.get_basic("apple").is_some());
        assert!(store.get_basic("banana").is_none());
        assert!(store.get_basic("carrot").is_some());
    }

    #[test]
    fn test_load_discards_whole_block_after_malformed_header() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("basic_foods.txt"), "apple|52|fruit\n").unwrap();
        // The component lines of the bad block must not be read as headers;
        // the block after the terminator loads normally.
        fs::write(
            dir.path().join("composite_foods.txt"),
            "junk|too|many|fields\napple|1\n---\nsnack|quick\napple|2\n---\n",
        )
        .unwrap();

        let store = empty_store(dir.path());
        assert!(store.get_composite("apple").is_none());
        assert!(store.get_composite("junk").is_none());
        assert_eq!(store.get_composite("snack").unwrap().calories_per_serving, 104.0);
        // The basic namespace is untouched.
        assert_eq!(store.get_basic("apple").unwrap().calories_per_serving, 52.0);
    }

    #[test]
    fn test_load_block_without_terminator() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("basic_foods.txt"), "apple|52|fruit\n").unwrap();
        fs::write(dir.path().join("composite_foods.txt"), "snack|quick\napple|1\n").unwrap();

        let store = empty_store(dir.path());
        assert_eq!(store.get_composite("snack").unwrap().calories_per_serving, 52.0);
    }

    #[test]
    fn test_overwriting_basic_food_updates_entry() {
        let dir = tempdir().unwrap();
        let mut store = empty_store(dir.path());
        store.add_basic_food("apple", keywords(&["fruit"]), 52.0);
        store.add_basic_food("apple", keywords(&["fruit", "red"]), 60.0);

        let apple = store.get_basic("apple").unwrap();
        assert_eq!(apple.calories_per_serving, 60.0);
        assert_eq!(apple.keywords.len(), 2);
    }
}
