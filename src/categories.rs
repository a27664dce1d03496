use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::{info, warn};

/// Provider categories that say nothing useful about a food venue
pub const STOPLIST: [&str; 5] = [
    "point_of_interest",
    "establishment",
    "food",
    "restaurant",
    "store",
];

/// The categories a place needs at least one of to be kept.
/// An empty set applies no filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllowedCategories(BTreeSet<String>);

impl AllowedCategories {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            categories
                .into_iter()
                .map(Into::into)
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }

    /// Read the list stored under `tag` in a json file shaped like `{"food": ["bakery", ...]}`
    pub fn from_file(path: &Path, tag: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Couldn't read categories file {}", path.display()))?;
        let mut lists: HashMap<String, Vec<String>> = serde_json::from_str(&contents)
            .wrap_err_with(|| format!("Couldn't parse categories file {}", path.display()))?;
        let list = lists
            .remove(tag)
            .ok_or(eyre!("No '{}' categories in {}", tag, path.display()))?;
        Ok(Self::new(list))
    }

    /// Like `from_file`, but a missing or broken file degrades to no filter
    pub fn load_or_default(path: &Path, tag: &str) -> Self {
        match Self::from_file(path, tag) {
            Ok(allowed) => {
                info!(count = allowed.len(), tag, "Loaded allowed categories");
                if allowed.is_empty() {
                    warn!(
                        tag,
                        "Allowed categories list is empty, places won't be filtered by category"
                    );
                }
                allowed
            }
            Err(err) => {
                warn!("{:#}; places won't be filtered by category", err);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether a place with these categories passes the filter
    pub fn admits<S: AsRef<str>>(&self, categories: &[S]) -> bool {
        self.is_empty() || categories.iter().any(|c| self.0.contains(c.as_ref()))
    }
}

/// Provider categories turned into labels: stoplist removed, `fast_food` -> `Fast food`
pub fn display_categories<S: AsRef<str>>(categories: &[S]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    categories
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| !c.is_empty() && !STOPLIST.contains(c))
        .filter(|c| seen.insert(*c))
        .map(display_label)
        .collect()
}

fn display_label(category: &str) -> String {
    let spaced = category.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

/// Free text keyword search matching any of the categories,
/// e.g. `bakery OR cafe OR "fast food"`
pub fn keyword_expression(categories: &AllowedCategories) -> String {
    categories
        .iter()
        .map(|c| c.replace('_', " "))
        .map(|c| {
            if c.contains(' ') {
                format!("\"{}\"", c)
            } else {
                c
            }
        })
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn empty_set_admits_everything() {
        let allowed = AllowedCategories::default();
        assert!(allowed.admits(&["store", "point_of_interest"]));
        assert!(allowed.admits::<&str>(&[]));
    }

    #[test]
    fn disjoint_categories_are_rejected() {
        let allowed = AllowedCategories::new(["bakery"]);
        assert!(!allowed.admits(&["store", "point_of_interest"]));
        assert!(allowed.admits(&["store", "bakery"]));
    }

    #[test]
    fn display_drops_stoplist_and_formats() {
        let categories = [
            "meal_takeaway",
            "food",
            "restaurant",
            "cafe",
            "point_of_interest",
            "establishment",
            "store",
            "cafe",
        ];
        assert_eq!(display_categories(&categories), vec!["Meal takeaway", "Cafe"]);
    }

    #[test]
    fn keyword_expression_quotes_phrases() {
        let allowed = AllowedCategories::new(["cafe", "fast_food", "bakery"]);
        assert_eq!(keyword_expression(&allowed), r#"bakery OR cafe OR "fast food""#);
    }

    #[test]
    fn loads_tagged_list_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"food": ["bakery", " cafe ", ""], "fuel": ["gas_station"]}"#)
            .unwrap();
        file.flush().unwrap();

        let allowed = AllowedCategories::from_file(file.path(), "food").unwrap();
        assert_eq!(allowed, AllowedCategories::new(["bakery", "cafe"]));
        assert!(AllowedCategories::from_file(file.path(), "lodging").is_err());
    }

    #[test]
    fn missing_file_degrades_to_no_filter() {
        let dir = tempfile::tempdir().unwrap();
        let allowed = AllowedCategories::load_or_default(&dir.path().join("nope.json"), "food");
        assert!(allowed.is_empty());
    }
}
