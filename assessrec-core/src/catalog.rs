//! Read-only catalog store.
//!
//! Raw catalog records (as produced by an external acquisition step) are
//! normalized into [`CatalogItem`]s with a composed `search_text`. The
//! resulting [`Catalog`] is immutable and shared across queries.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::error::{RecommendError, Result};
use crate::types::{CatalogItem, Category};

/// Descriptions longer than this many characters are truncated.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

const UNKNOWN_NAME: &str = "Unknown Assessment";

/// A catalog record before normalization. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub url: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub test_type: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// Normalize one raw record.
///
/// Returns `None` when the record has no URL or no name, since such a record
/// has no usable identity.
pub fn normalize_record(raw: RawRecord) -> Option<CatalogItem> {
    let url = raw.url.unwrap_or_default().trim().to_string();
    let name = raw
        .name
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
        .trim()
        .to_string();
    if url.is_empty() || name.is_empty() {
        return None;
    }

    let category = match raw.test_type.as_deref() {
        None => Category::Knowledge,
        Some(code) => Category::parse_label(code).unwrap_or_else(|| {
            tracing::debug!(%url, code, "unknown test type, defaulting to K");
            Category::Knowledge
        }),
    };

    let description: String = raw
        .description
        .unwrap_or_default()
        .chars()
        .take(MAX_DESCRIPTION_CHARS)
        .collect();

    let mut item = CatalogItem {
        url,
        name,
        description,
        category,
        section: raw.category.unwrap_or_default(),
        duration: raw.duration.filter(|d| !d.trim().is_empty()),
        skills: raw.skills.unwrap_or_default(),
        search_text: String::new(),
    };
    item.search_text = compose_search_text(&item);
    Some(item)
}

/// Compose the indexed text for an item from its non-empty fields.
pub fn compose_search_text(item: &CatalogItem) -> String {
    let mut parts = Vec::with_capacity(6);
    parts.push(format!("Assessment: {}", item.name));
    if !item.description.is_empty() {
        parts.push(format!("Description: {}", item.description));
    }
    parts.push(format!("Type: {}", item.category.full_name()));
    if let Some(duration) = &item.duration {
        parts.push(format!("Duration: {duration}"));
    }
    if !item.section.is_empty() {
        parts.push(format!("Category: {}", item.section));
    }
    if !item.skills.is_empty() {
        parts.push(format!("Skills: {}", item.skills.join(", ")));
    }
    parts.join(" | ")
}

/// An ordered, read-only collection of catalog items with unique URLs.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    by_url: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from raw records, normalizing each.
    ///
    /// Records without a URL or name are dropped. When two records share a
    /// URL the first one wins.
    pub fn from_records(records: impl IntoIterator<Item = RawRecord>) -> Self {
        let mut dropped = 0usize;
        let items: Vec<CatalogItem> = records
            .into_iter()
            .filter_map(|raw| {
                let item = normalize_record(raw);
                if item.is_none() {
                    dropped += 1;
                }
                item
            })
            .collect();
        if dropped > 0 {
            tracing::debug!(dropped, "dropped catalog records without url or name");
        }
        Self::from_items(items)
    }

    /// Build a catalog from already-normalized items.
    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let mut catalog = Self::default();
        for item in items {
            if catalog.by_url.contains_key(&item.url) {
                tracing::warn!(url = %item.url, "duplicate catalog url, keeping first");
                continue;
            }
            catalog.by_url.insert(item.url.clone(), catalog.items.len());
            catalog.items.push(item);
        }
        catalog
    }

    /// Parse a JSON array of raw or processed records.
    pub fn parse_json(json: &str) -> Result<Self> {
        let records: Vec<RawRecord> =
            serde_json::from_str(json).map_err(|e| RecommendError::Catalog(e.to_string()))?;
        Ok(Self::from_records(records))
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array of records.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::parse_json(&content)?;
        tracing::info!(path = %path.display(), items = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Write the normalized catalog as pretty JSON, creating parent directories.
    pub fn save_processed(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.items)
            .map_err(|e| RecommendError::Catalog(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at corpus position `index`.
    pub fn get(&self, index: usize) -> Option<&CatalogItem> {
        self.items.get(index)
    }

    pub fn find_by_url(&self, url: &str) -> Option<&CatalogItem> {
        self.by_url.get(url).and_then(|&i| self.items.get(i))
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter()
    }

    /// Number of items per category.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.category).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: &str, name: &str) -> RawRecord {
        RawRecord {
            url: Some(url.into()),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_applies_defaults() {
        let item = normalize_record(RawRecord {
            url: Some("https://x.test/a".into()),
            ..Default::default()
        })
        .expect("record has a url");
        assert_eq!(item.name, "Unknown Assessment");
        assert_eq!(item.category, Category::Knowledge);
        assert!(item.duration.is_none());
        assert!(item.skills.is_empty());
        assert_eq!(
            item.search_text,
            "Assessment: Unknown Assessment | Type: Knowledge & Skills"
        );
    }

    #[test]
    fn normalize_composes_full_search_text() {
        let item = normalize_record(RawRecord {
            url: Some("https://x.test/java".into()),
            name: Some("Java 8".into()),
            description: Some("Core Java".into()),
            test_type: Some("K".into()),
            category: Some("Individual Test Solutions".into()),
            duration: Some("30 minutes".into()),
            skills: Some(vec!["Java".into(), "OOP".into()]),
        })
        .expect("valid record");
        assert_eq!(
            item.search_text,
            "Assessment: Java 8 | Description: Core Java | Type: Knowledge & Skills | \
             Duration: 30 minutes | Category: Individual Test Solutions | Skills: Java, OOP"
        );
    }

    #[test]
    fn normalize_truncates_description() {
        let long = "x".repeat(MAX_DESCRIPTION_CHARS + 50);
        let item = normalize_record(RawRecord {
            description: Some(long),
            ..raw("https://x.test/a", "A")
        })
        .expect("valid record");
        assert_eq!(item.description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[test]
    fn normalize_drops_missing_identity() {
        assert!(normalize_record(raw("", "Named")).is_none());
        assert!(normalize_record(raw("https://x.test/a", "")).is_none());
    }

    #[test]
    fn unknown_test_type_defaults_to_knowledge() {
        let item = normalize_record(RawRecord {
            test_type: Some("Z".into()),
            ..raw("https://x.test/a", "A")
        })
        .expect("valid record");
        assert_eq!(item.category, Category::Knowledge);
    }

    #[test]
    fn duplicate_urls_keep_first() {
        let catalog = Catalog::from_records(vec![
            raw("https://x.test/a", "First"),
            raw("https://x.test/b", "Other"),
            raw("https://x.test/a", "Second"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.find_by_url("https://x.test/a").map(|i| i.name.as_str()),
            Some("First")
        );
        assert_eq!(catalog.get(1).map(|i| i.name.as_str()), Some("Other"));
    }

    #[test]
    fn parse_json_accepts_nulls_and_missing_fields() {
        let json = r#"[
            {"url": "https://x.test/a", "name": "A", "test_type": "P", "skills": null},
            {"name": "no url"},
            {"url": "https://x.test/c", "name": "C", "duration": ""}
        ]"#;
        let catalog = Catalog::parse_json(json).expect("parse");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[0].category, Category::Personality);
        assert!(catalog.items()[1].duration.is_none());
    }

    #[test]
    fn parse_json_rejects_non_array() {
        let err = Catalog::parse_json(r#"{"url": "x"}"#).unwrap_err();
        assert!(err.to_string().starts_with("catalog error"));
    }

    #[test]
    fn processed_catalog_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("processed.json");
        let catalog = Catalog::from_records(vec![
            RawRecord {
                test_type: Some("C".into()),
                duration: Some("20 min".into()),
                ..raw("https://x.test/a", "A")
            },
            raw("https://x.test/b", "B"),
        ]);
        catalog.save_processed(&path).expect("save");

        let loaded = Catalog::load_json(&path).expect("load");
        assert_eq!(loaded.items(), catalog.items());
    }

    #[test]
    fn category_counts_tally_items() {
        let catalog = Catalog::from_records(vec![
            RawRecord {
                test_type: Some("P".into()),
                ..raw("https://x.test/a", "A")
            },
            raw("https://x.test/b", "B"),
            raw("https://x.test/c", "C"),
        ]);
        let counts = catalog.category_counts();
        assert_eq!(counts.get(&Category::Knowledge), Some(&2));
        assert_eq!(counts.get(&Category::Personality), Some(&1));
        assert_eq!(counts.get(&Category::Cognitive), None);
    }
}
