// src/catalog/store.rs
// =============================================================================
// This module keeps the catalog for the current session.
//
// CatalogStore::replace swaps in a freshly built catalog wholesale; there is
// no merging with whatever was there before. A failed rebuild never calls
// replace, so readers keep seeing the last complete catalog.
//
// Rust concepts:
// - BTreeSet: sorted + de-duplicated in one step
// - #[serde(transparent)]: a Catalog serializes as a plain JSON array
// =============================================================================

use std::collections::BTreeSet;

use serde::Serialize;

use super::filter::CategoryList;
use super::record::ResourceRecord;

// Discovered resources, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    records: Vec<ResourceRecord>,
}

impl Catalog {
    pub fn new(records: Vec<ResourceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Categories for a selector
    //
    // Returns: the distinct non-empty categories, sorted
    //
    // Example:
    //   [Worksheets/a.pdf, README.md, Slides/b.pptx] -> ["Slides", "Worksheets"]
    pub fn categories(&self) -> CategoryList {
        // Root files have category "" and never become an option
        let names: BTreeSet<&str> = self
            .records
            .iter()
            .map(|r| r.category())
            .filter(|c| !c.is_empty())
            .collect();

        CategoryList::new(names.into_iter().map(str::to_string).collect())
    }
}

// Holder of the current catalog
#[derive(Debug, Default)]
pub struct CatalogStore {
    current: Catalog,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Replaces the whole catalog with `records`
    pub fn replace(&mut self, records: Vec<ResourceRecord>) {
        self.current = Catalog::new(records);
    }

    pub fn current(&self) -> &Catalog {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(path: &str) -> ResourceRecord {
        ResourceRecord::from_path(path, None).unwrap()
    }

    #[test]
    fn test_replace_swaps_everything() {
        let mut store = CatalogStore::new();
        assert!(store.current().is_empty());

        store.replace(vec![record("a/1.md"), record("b/2.md")]);
        assert_eq!(store.current().len(), 2);

        store.replace(vec![record("c/3.md")]);
        let paths: Vec<&str> = store.current().records().iter().map(|r| r.path()).collect();
        assert_eq!(paths, vec!["c/3.md"]);
    }

    #[test]
    fn test_categories_sorted_and_distinct() {
        let mut records = vec![
            record("Worksheets/a.pdf"),
            record("README.md"),
            record("Slides/b.pptx"),
            record("Worksheets/c.pdf"),
        ];
        let catalog = Catalog::new(records.clone());
        assert_eq!(catalog.categories().names(), &["Slides", "Worksheets"]);

        records.push(record("Audio/d.mp3"));
        let catalog = Catalog::new(records);
        assert_eq!(catalog.categories().names(), &["Audio", "Slides", "Worksheets"]);
    }
}
