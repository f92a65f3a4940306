// src/catalog/record.rs
// =============================================================================
// This module defines catalog records and builds them from raw entries.
//
// A record's `name` and `category` are always derived from its `path`, so
// the fields are private and the only constructor takes the path:
//
//   "Slides/2024/week1.pptx" -> name "week1.pptx", category "Slides"
//   "README.md"              -> name "README.md",  category ""
//
// Rust concepts:
// - Private fields + getters: the struct cannot be built inconsistently
// - Option<T>: an empty path produces no record at all
// =============================================================================

use serde::Serialize;

use crate::github::{EntryKind, RepoEntry};

// One file in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRecord {
    /// Repository-relative path; unique within a catalog
    path: String,
    /// Last path segment
    name: String,
    /// Top-level directory, or "" for files at the repository root
    category: String,
}

impl ResourceRecord {
    // Builds a record for a repository-relative path
    //
    // Parameters:
    //   path: e.g. "Slides/week1.pptx"
    //   category_hint: category the entry was listed under, if known
    //
    // Returns: Option<ResourceRecord>
    //   Some(record) for any non-empty path
    //   None for an empty path
    //
    // Example:
    //   from_path("Slides/week1.pptx", None)          -> category "Slides"
    //   from_path("Slides/week1.pptx", Some("Decks")) -> category "Decks"
    //   from_path("README.md", None)                  -> category ""
    pub fn from_path(path: &str, category_hint: Option<&str>) -> Option<Self> {
        if path.is_empty() {
            return None;
        }

        // Name: everything after the last '/'
        let name = path.rsplit('/').next().unwrap_or(path).to_string();

        // Category: a non-empty hint wins, then the first segment of a
        // nested path; root files get none
        let category = match category_hint.filter(|h| !h.is_empty()) {
            Some(hint) => hint.to_string(),
            None => match path.split_once('/') {
                Some((top, _)) => top.to_string(),
                None => String::new(),
            },
        };

        Some(Self {
            path: path.to_string(),
            name,
            category,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    // Label shown for the category; root files read "Uncategorized"
    pub fn category_label(&self) -> &str {
        if self.category.is_empty() {
            "Uncategorized"
        } else {
            &self.category
        }
    }
}

// Turns raw entries into records
//
// Only File entries survive; directories, submodules and symlinks are
// dropped. Order is preserved.
//
// Example:
//   [File "b/two.pdf", Dir "b", File "a/one.md"] -> [b/two.pdf, a/one.md]
pub fn normalize(entries: &[RepoEntry], category_hint: Option<&str>) -> Vec<ResourceRecord> {
    entries
        .iter()
        .filter(|e| e.kind == EntryKind::File)
        .filter_map(|e| ResourceRecord::from_path(&e.path, category_hint))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(path: &str) -> RepoEntry {
        RepoEntry::new(path, EntryKind::File)
    }

    #[test]
    fn test_category_from_first_segment() {
        let record = ResourceRecord::from_path("Slides/2024/week1.pptx", None).unwrap();
        assert_eq!(record.name(), "week1.pptx");
        assert_eq!(record.category(), "Slides");
    }

    #[test]
    fn test_root_file_has_empty_category() {
        let record = ResourceRecord::from_path("README.md", None).unwrap();
        assert_eq!(record.name(), "README.md");
        assert_eq!(record.category(), "");
        assert_eq!(record.category_label(), "Uncategorized");
    }

    #[test]
    fn test_hint_wins_over_path() {
        let record = ResourceRecord::from_path("Slides/week1.pptx", Some("Decks")).unwrap();
        assert_eq!(record.category(), "Decks");

        let empty_hint = ResourceRecord::from_path("Slides/week1.pptx", Some("")).unwrap();
        assert_eq!(empty_hint.category(), "Slides");
    }

    #[test]
    fn test_empty_path_is_rejected() {
        assert!(ResourceRecord::from_path("", None).is_none());
    }

    #[test]
    fn test_normalize_keeps_files_in_order() {
        let entries = vec![
            file("b/two.pdf"),
            RepoEntry::new("b", EntryKind::Dir),
            file("a/one.md"),
            RepoEntry::new("mod", EntryKind::Other),
            file(""),
        ];

        let records = normalize(&entries, None);
        let paths: Vec<&str> = records.iter().map(|r| r.path()).collect();
        assert_eq!(paths, vec!["b/two.pdf", "a/one.md"]);

        for record in &records {
            assert_eq!(record.name(), record.path().rsplit('/').next().unwrap());
            assert_eq!(record.category(), record.path().split('/').next().unwrap());
        }
    }
}
