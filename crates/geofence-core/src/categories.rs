//! Category normalization, synonym expansion, and exclusion filtering.
//!
//! The synonym table is plain data: a map from a canonical category to the
//! provider types it also covers. [`CategorySynonyms::default`] carries the
//! built-in table; [`CategorySynonyms::load`] reads a replacement from YAML:
//!
//! ```yaml
//! synonyms:
//!   restaurant: [restaurant, meal_takeaway, food]
//!   salon: [beauty_salon, hair_care]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::BusinessRecord;

static DEFAULT_SYNONYMS: LazyLock<CategorySynonyms> = LazyLock::new(CategorySynonyms::default);

/// Trims and lowercases a category string. Never fails.
#[must_use]
pub fn normalize_category(value: &str) -> String {
    value.trim().to_lowercase()
}

/// [`CategorySynonyms::matches_excluded`] against the built-in table.
#[must_use]
pub fn matches_excluded<T, E>(types: &[T], excluded: &[E]) -> bool
where
    T: AsRef<str>,
    E: AsRef<str>,
{
    DEFAULT_SYNONYMS.matches_excluded(types, excluded)
}

/// [`CategorySynonyms::filter`] against the built-in table.
#[must_use]
pub fn filter_by_category<E: AsRef<str>>(
    records: Vec<BusinessRecord>,
    excluded: &[E],
) -> Vec<BusinessRecord> {
    DEFAULT_SYNONYMS.filter(records, excluded)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySynonyms {
    table: HashMap<String, HashSet<String>>,
}

#[derive(Debug, Deserialize)]
struct SynonymsFile {
    synonyms: HashMap<String, Vec<String>>,
}

impl Default for CategorySynonyms {
    fn default() -> Self {
        Self::from_pairs([
            ("restaurant", &["restaurant", "meal_takeaway", "food"][..]),
            ("salon", &["beauty_salon", "hair_care"][..]),
            ("bar", &["bar", "night_club"][..]),
        ])
    }
}

impl CategorySynonyms {
    /// Builds a table from `(canonical, aliases)` pairs, normalizing both sides.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        let table = pairs
            .into_iter()
            .map(|(key, aliases)| {
                (
                    normalize_category(key),
                    aliases.iter().map(|a| normalize_category(a)).collect(),
                )
            })
            .collect();
        Self { table }
    }

    /// Loads a synonym table from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed, or if a
    /// canonical key is blank.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SynonymsFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parses a synonym table from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on malformed YAML or a blank canonical key.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let file: SynonymsFile =
            serde_yaml::from_str(content).map_err(ConfigError::SynonymsFileParse)?;

        let mut table = HashMap::with_capacity(file.synonyms.len());
        for (key, aliases) in file.synonyms {
            let key = normalize_category(&key);
            if key.is_empty() {
                return Err(ConfigError::InvalidSynonyms(
                    "canonical category must not be blank".to_owned(),
                ));
            }
            let aliases: HashSet<String> = aliases
                .iter()
                .map(|a| normalize_category(a))
                .filter(|a| !a.is_empty())
                .collect();
            table.entry(key).or_insert_with(HashSet::new).extend(aliases);
        }
        Ok(Self { table })
    }

    /// The normalized term plus every alias registered for it.
    #[must_use]
    pub fn expand(&self, term: &str) -> HashSet<String> {
        let key = normalize_category(term);
        let mut set = self.table.get(&key).cloned().unwrap_or_default();
        set.insert(key);
        set
    }

    /// True when any of `types` falls in the synonym closure of any excluded
    /// term. Terms without a table entry match exactly.
    #[must_use]
    pub fn matches_excluded<T, E>(&self, types: &[T], excluded: &[E]) -> bool
    where
        T: AsRef<str>,
        E: AsRef<str>,
    {
        let type_set: HashSet<String> = types
            .iter()
            .map(|t| normalize_category(t.as_ref()))
            .collect();
        excluded
            .iter()
            .any(|term| !self.expand(term.as_ref()).is_disjoint(&type_set))
    }

    /// Drops excluded records, keeping the survivors in their original order.
    ///
    /// A record is dropped when its types match an excluded term or when its
    /// normalized primary category is itself excluded. An empty exclusion
    /// list returns `records` untouched.
    #[must_use]
    pub fn filter<E: AsRef<str>>(
        &self,
        records: Vec<BusinessRecord>,
        excluded: &[E],
    ) -> Vec<BusinessRecord> {
        if excluded.is_empty() {
            return records;
        }
        let normalized: Vec<String> = excluded
            .iter()
            .map(|e| normalize_category(e.as_ref()))
            .collect();
        records
            .into_iter()
            .filter(|r| {
                !self.matches_excluded(r.types.as_slice(), normalized.as_slice())
                    && !normalized.contains(&normalize_category(&r.primary_category))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;

    fn record(id: &str, types: &[&str]) -> BusinessRecord {
        BusinessRecord {
            place_id: id.to_owned(),
            name: id.to_owned(),
            address: String::new(),
            coordinates: Coordinate { lat: 0.0, lng: 0.0 },
            primary_category: types.first().map_or("unknown", |t| *t).to_owned(),
            types: types.iter().map(|t| (*t).to_owned()).collect(),
            map_url: String::new(),
            formatted_phone_number: None,
            international_phone_number: None,
            website: None,
        }
    }

    fn ids(records: &[BusinessRecord]) -> Vec<&str> {
        records.iter().map(|r| r.place_id.as_str()).collect()
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_category("  Restaurant "), "restaurant");
        assert_eq!(normalize_category(""), "");
    }

    #[test]
    fn restaurant_excludes_meal_takeaway() {
        assert!(matches_excluded(&["meal_takeaway"], &["restaurant"]));
        assert!(matches_excluded(&["FOOD"], &[" Restaurant"]));
    }

    #[test]
    fn salon_matches_key_and_aliases() {
        // The canonical key is always part of its own synonym set.
        assert!(matches_excluded(&["salon"], &["salon"]));
        assert!(matches_excluded(&["hair_care"], &["salon"]));
        assert!(!matches_excluded(&["spa"], &["salon"]));
    }

    #[test]
    fn unknown_term_degrades_to_exact_match() {
        assert!(matches_excluded(&["gas_station"], &["gas_station"]));
        assert!(!matches_excluded(&["gas_station"], &["car_wash"]));
    }

    #[test]
    fn empty_types_never_match() {
        let empty: [&str; 0] = [];
        assert!(!matches_excluded(&empty, &["restaurant"]));
    }

    #[test]
    fn filter_is_identity_for_empty_exclusions() {
        let records = vec![record("A", &["restaurant"]), record("B", &["store"])];
        let none: [&str; 0] = [];
        let out = filter_by_category(records.clone(), &none);
        assert_eq!(out, records);
    }

    #[test]
    fn filter_preserves_order_of_survivors() {
        let records = vec![
            record("A", &["store"]),
            record("B", &["bar"]),
            record("C", &["night_club"]),
            record("D", &["pharmacy"]),
        ];
        let out = filter_by_category(records, &["bar"]);
        assert_eq!(ids(&out), vec!["A", "D"]);
    }

    #[test]
    fn filter_checks_primary_category_when_types_are_empty() {
        let mut r = record("A", &[]);
        r.primary_category = "Laundry".to_owned();
        let out = filter_by_category(vec![r, record("B", &["store"])], &["laundry"]);
        assert_eq!(ids(&out), vec!["B"]);
    }

    #[test]
    fn filter_output_is_subset_of_input() {
        let records = vec![
            record("A", &["restaurant"]),
            record("B", &["food", "store"]),
            record("C", &["beauty_salon"]),
            record("D", &["bank"]),
        ];
        let out = filter_by_category(records.clone(), &["restaurant", "salon"]);
        assert!(out.iter().all(|r| records.contains(r)));
        assert_eq!(ids(&out), vec!["D"]);
    }

    #[test]
    fn from_yaml_normalizes_keys_and_aliases() {
        let synonyms = CategorySynonyms::from_yaml(
            "synonyms:\n  ' Cafe ': [Coffee_Shop, bakery]\n  gym: [fitness_center]\n",
        )
        .expect("valid yaml");
        assert!(synonyms.matches_excluded(&["coffee_shop"], &["cafe"]));
        assert!(synonyms.matches_excluded(&["fitness_center"], &["GYM"]));
        // The custom table replaces the built-in one.
        assert!(!synonyms.matches_excluded(&["meal_takeaway"], &["restaurant"]));
    }

    #[test]
    fn from_yaml_rejects_blank_keys() {
        let err = CategorySynonyms::from_yaml("synonyms:\n  '  ': [x]\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSynonyms(_)));
    }

    #[test]
    fn from_yaml_rejects_malformed_documents() {
        let err = CategorySynonyms::from_yaml("not: [valid").unwrap_err();
        assert!(matches!(err, ConfigError::SynonymsFileParse(_)));
    }

    #[test]
    fn expand_includes_key_and_aliases() {
        let set = CategorySynonyms::default().expand("Bar");
        assert!(set.contains("bar"));
        assert!(set.contains("night_club"));
        assert_eq!(set.len(), 2);
    }
}
