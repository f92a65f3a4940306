// src/catalog/filter.rs
// =============================================================================
// This module filters the catalog on the client side.
//
// A record is visible when:
//   (query is empty OR name/path contains the query, ignoring case)
//   AND (category is empty OR record.category == category exactly)
//
// Filtering is a pure read; it can run on every keystroke.
//
// Rust concepts:
// - Lifetimes: apply() returns references into the catalog ('a), no copies
// - #[serde(tag, content)]: CategoryOption serializes as {"type", "value"}
// =============================================================================

use serde::{Deserialize, Serialize};

use super::record::ResourceRecord;
use super::store::Catalog;

// What the user asked to see
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free-text search; trimmed and compared case-insensitively
    pub query: String,
    /// Exact category name; "" means any category
    pub category: String,
}

impl FilterCriteria {
    pub fn new(query: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: category.into(),
        }
    }

    // Does one record pass both tests?
    //
    // `needle` is the query already trimmed and lowercased by apply()
    fn matches(&self, needle: &str, record: &ResourceRecord) -> bool {
        // Search: name OR full path, case-insensitive
        let matches_search = needle.is_empty()
            || record.name().to_lowercase().contains(needle)
            || record.path().to_lowercase().contains(needle);

        // Category: exact, case-sensitive
        let matches_category = self.category.is_empty() || record.category() == self.category;

        matches_search && matches_category
    }
}

// Computes the visible records
//
// Parameters:
//   catalog: the current catalog
//   criteria: query + category
//
// Returns: matching records, in catalog order (may be empty)
//
// Example:
//   apply(catalog, ("pdf", "Worksheets")) -> [Worksheets/a.pdf, Worksheets/b.pdf]
pub fn apply<'a>(catalog: &'a Catalog, criteria: &FilterCriteria) -> Vec<&'a ResourceRecord> {
    // Normalize the query once instead of per record
    let needle = criteria.query.trim().to_lowercase();

    catalog
        .records()
        .iter()
        .filter(|r| criteria.matches(&needle, r))
        .collect()
}

// Result of filtering, keeping "nothing matched" distinct from a list
#[derive(Debug, PartialEq, Eq)]
pub enum FilterOutcome<'a> {
    /// At least one record is visible
    Matches(Vec<&'a ResourceRecord>),
    /// The catalog has records but none pass the filter (or it is empty)
    NoMatches,
}

impl<'a> FilterOutcome<'a> {
    pub fn from_records(records: Vec<&'a ResourceRecord>) -> Self {
        if records.is_empty() {
            FilterOutcome::NoMatches
        } else {
            FilterOutcome::Matches(records)
        }
    }
}

// One entry of a category selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CategoryOption {
    /// No category restriction
    All,
    /// One concrete category
    Named(String),
}

impl CategoryOption {
    // Value to put in FilterCriteria::category
    pub fn value(&self) -> &str {
        match self {
            CategoryOption::All => "",
            CategoryOption::Named(name) => name,
        }
    }

    // Text to show the user
    pub fn label(&self) -> &str {
        match self {
            CategoryOption::All => "All categories",
            CategoryOption::Named(name) => name,
        }
    }
}

// Options for a category selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryList {
    /// Sorted and distinct; never contains ""
    names: Vec<String>,
}

impl CategoryList {
    pub(crate) fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    // Is `name` one of the categories (exact match)?
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    // Selector options, always starting with All
    //
    // Example:
    //   ["Slides", "Worksheets"] -> [All, Named("Slides"), Named("Worksheets")]
    pub fn options(&self) -> Vec<CategoryOption> {
        std::iter::once(CategoryOption::All)
            .chain(self.names.iter().cloned().map(CategoryOption::Named))
            .collect()
    }

    // Selection to keep after a rebuild
    //
    // Returns: `current` if that category still exists, else "" (all)
    pub fn retain_selection<'a>(&self, current: &'a str) -> &'a str {
        if self.contains(current) {
            current
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        Catalog::new(
            [
                "Slides/Algebra.pptx",
                "README.md",
                "Worksheets/fractions.pdf",
                "Worksheets/Graphs/area.PDF",
                "Audio/lecture.mp3",
            ]
            .iter()
            .map(|p| ResourceRecord::from_path(p, None).unwrap())
            .collect(),
        )
    }

    fn paths<'a>(records: &[&'a ResourceRecord]) -> Vec<&'a str> {
        records.iter().map(|r| r.path()).collect()
    }

    #[test]
    fn test_empty_criteria_returns_everything_in_order() {
        let catalog = catalog();
        let visible = apply(&catalog, &FilterCriteria::default());
        let all: Vec<&ResourceRecord> = catalog.records().iter().collect();
        assert_eq!(visible, all);
    }

    #[test]
    fn test_query_is_case_insensitive_on_name_or_path() {
        let catalog = catalog();
        let criteria = FilterCriteria::new("a", "");
        let visible = apply(&catalog, &criteria);

        let expected: Vec<&ResourceRecord> = catalog
            .records()
            .iter()
            .filter(|r| {
                r.name().to_lowercase().contains('a') || r.path().to_lowercase().contains('a')
            })
            .collect();
        assert_eq!(visible, expected);

        // Reapplying the same criteria gives the same answer
        assert_eq!(apply(&catalog, &criteria), visible);
    }

    #[test]
    fn test_query_matches_directory_part_of_path() {
        let catalog = catalog();
        let visible = apply(&catalog, &FilterCriteria::new("  GRAPHS ", ""));
        assert_eq!(paths(&visible), vec!["Worksheets/Graphs/area.PDF"]);
    }

    #[test]
    fn test_category_is_exact_match() {
        let catalog = catalog();
        let visible = apply(&catalog, &FilterCriteria::new("", "Worksheets"));
        assert_eq!(
            paths(&visible),
            vec!["Worksheets/fractions.pdf", "Worksheets/Graphs/area.PDF"]
        );

        assert!(apply(&catalog, &FilterCriteria::new("", "worksheets")).is_empty());
    }

    #[test]
    fn test_query_and_category_combine() {
        let catalog = catalog();
        let visible = apply(&catalog, &FilterCriteria::new("pdf", "Worksheets"));
        assert_eq!(visible.len(), 2);
        let none = apply(&catalog, &FilterCriteria::new("mp3", "Worksheets"));
        assert_eq!(FilterOutcome::from_records(none), FilterOutcome::NoMatches);
    }

    #[test]
    fn test_category_options() {
        let list = catalog().categories();
        let options = list.options();
        assert_eq!(options[0], CategoryOption::All);
        assert_eq!(options[0].value(), "");
        assert_eq!(options[0].label(), "All categories");

        let values: Vec<&str> = options.iter().map(|o| o.value()).collect();
        assert_eq!(values, vec!["", "Audio", "Slides", "Worksheets"]);
    }

    #[test]
    fn test_retain_selection() {
        let list = catalog().categories();
        assert_eq!(list.retain_selection("Slides"), "Slides");
        assert_eq!(list.retain_selection("Gone"), "");
        assert!(list.contains("Audio"));
        assert!(!list.contains("audio"));
    }
}
