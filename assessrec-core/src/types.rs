//! Core types for catalog items, scored candidates, and recommendations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Assessment category. A closed set; serialized as its single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Knowledge & Skills.
    #[serde(rename = "K")]
    Knowledge,
    /// Personality & Behavior.
    #[serde(rename = "P")]
    Personality,
    /// Behavioral.
    #[serde(rename = "B")]
    Behavioral,
    /// Cognitive.
    #[serde(rename = "C")]
    Cognitive,
}

impl Category {
    /// Returns the single-letter code used in catalogs and API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Knowledge => "K",
            Self::Personality => "P",
            Self::Behavioral => "B",
            Self::Cognitive => "C",
        }
    }

    /// Returns the human-readable category name.
    pub fn full_name(&self) -> &'static str {
        match self {
            Self::Knowledge => "Knowledge & Skills",
            Self::Personality => "Personality & Behavior",
            Self::Behavioral => "Behavioral",
            Self::Cognitive => "Cognitive",
        }
    }

    /// Returns all category variants.
    pub fn all() -> &'static [Category] {
        &[
            Self::Knowledge,
            Self::Personality,
            Self::Behavioral,
            Self::Cognitive,
        ]
    }

    /// Parses a category from a code (`"K"`) or a name (`"knowledge"`,
    /// `"Personality & Behavior"`). Case-insensitive.
    pub fn parse_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if let Some(category) = Self::all()
            .iter()
            .find(|c| c.code().eq_ignore_ascii_case(label) || c.full_name().eq_ignore_ascii_case(label))
        {
            return Some(*category);
        }
        match label.to_ascii_lowercase().as_str() {
            "knowledge" | "skills" | "knowledge and skills" => Some(Self::Knowledge),
            "personality" | "personality and behavior" => Some(Self::Personality),
            "behavior" | "behaviour" | "behavioural" => Some(Self::Behavioral),
            "cognitive ability" | "ability" | "aptitude" => Some(Self::Cognitive),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A normalized catalog item. Identity is the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique, stable URL of the assessment.
    pub url: String,
    /// Display name.
    pub name: String,
    /// Description, truncated during normalization.
    #[serde(default)]
    pub description: String,
    /// Assessment category.
    #[serde(rename = "test_type")]
    pub category: Category,
    /// Free-text catalog section the item was listed under.
    #[serde(rename = "category", default)]
    pub section: String,
    /// Completion time, when the catalog lists one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Skills measured by the assessment.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Text indexed by the score sources.
    pub search_text: String,
}

/// Which score source produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Embedding-style similarity (bounded, comparable across queries).
    Semantic,
    /// Keyword relevance (unbounded, normalized per batch during fusion).
    Lexical,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semantic => f.write_str("semantic"),
            Self::Lexical => f.write_str("lexical"),
        }
    }
}

/// A catalog item with the raw score one source assigned it for one query.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    /// The scored item.
    pub item: &'a CatalogItem,
    /// Raw score from the source.
    pub score: f64,
    /// Which source produced the score.
    pub source: SourceKind,
}

/// A catalog item with its fused relevance score.
///
/// Also the shape of an allocator result: the allocator only selects and
/// reorders fused candidates, it never rescores them.
#[derive(Debug, Clone, Copy)]
pub struct FusedCandidate<'a> {
    /// The candidate item.
    pub item: &'a CatalogItem,
    /// Weighted combination of semantic and normalized lexical scores.
    pub score: f64,
}

impl FusedCandidate<'_> {
    /// Category of the underlying item.
    pub fn category(&self) -> Category {
        self.item.category
    }

    /// Identity of the underlying item.
    pub fn url(&self) -> &str {
        &self.item.url
    }
}

/// Ordered set of distinct categories a query needs. Order is priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Category>", into = "Vec<Category>")]
pub struct RequiredCategories(Vec<Category>);

impl RequiredCategories {
    /// Builds a set from categories, dropping repeats but keeping first-seen order.
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut unique = Vec::new();
        for category in categories {
            if !unique.contains(&category) {
                unique.push(category);
            }
        }
        Self(unique)
    }

    /// The default set used when no classification is available:
    /// the two most common categories.
    pub fn fallback() -> Self {
        Self(vec![Category::Knowledge, Category::Personality])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }
}

impl From<Vec<Category>> for RequiredCategories {
    fn from(categories: Vec<Category>) -> Self {
        Self::new(categories)
    }
}

impl From<RequiredCategories> for Vec<Category> {
    fn from(set: RequiredCategories) -> Self {
        set.0
    }
}

impl fmt::Display for RequiredCategories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.0.iter().map(Category::code).collect();
        write!(f, "[{}]", codes.join(","))
    }
}

/// Public projection of a final result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Display name of the assessment.
    pub assessment_name: String,
    /// URL of the assessment.
    pub assessment_url: String,
    /// Category code.
    pub test_type: Category,
    /// Fused relevance score.
    pub score: f64,
}

impl From<&FusedCandidate<'_>> for Recommendation {
    fn from(candidate: &FusedCandidate<'_>) -> Self {
        Self {
            assessment_name: candidate.item.name.clone(),
            assessment_url: candidate.item.url.clone(),
            test_type: candidate.item.category,
            score: candidate.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_item(url: &str, category: Category) -> CatalogItem {
        CatalogItem {
            url: url.into(),
            name: format!("Item {url}"),
            description: String::new(),
            category,
            section: String::new(),
            duration: None,
            skills: vec![],
            search_text: String::new(),
        }
    }

    #[test]
    fn category_codes_and_names() {
        assert_eq!(Category::Knowledge.code(), "K");
        assert_eq!(Category::Personality.full_name(), "Personality & Behavior");
        assert_eq!(Category::Cognitive.to_string(), "C");
        assert_eq!(Category::all().len(), 4);
    }

    #[test]
    fn parse_label_accepts_codes_and_names() {
        assert_eq!(Category::parse_label("k"), Some(Category::Knowledge));
        assert_eq!(Category::parse_label(" P "), Some(Category::Personality));
        assert_eq!(
            Category::parse_label("knowledge & skills"),
            Some(Category::Knowledge)
        );
        assert_eq!(Category::parse_label("Behaviour"), Some(Category::Behavioral));
        assert_eq!(Category::parse_label("cognitive"), Some(Category::Cognitive));
        assert_eq!(Category::parse_label("X"), None);
        assert_eq!(Category::parse_label(""), None);
    }

    #[test]
    fn category_serializes_as_code() {
        let json = serde_json::to_string(&Category::Behavioral).expect("serialize");
        assert_eq!(json, "\"B\"");
        let decoded: Category = serde_json::from_str("\"C\"").expect("deserialize");
        assert_eq!(decoded, Category::Cognitive);
    }

    #[test]
    fn required_categories_dedupe_in_order() {
        let set = RequiredCategories::new([
            Category::Personality,
            Category::Knowledge,
            Category::Personality,
        ]);
        assert_eq!(set.as_slice(), &[Category::Personality, Category::Knowledge]);
        assert_eq!(set.to_string(), "[P,K]");
    }

    #[test]
    fn fallback_is_knowledge_then_personality() {
        let set = RequiredCategories::fallback();
        assert_eq!(set.as_slice(), &[Category::Knowledge, Category::Personality]);
    }

    #[test]
    fn required_categories_deserialize_dedupes() {
        let set: RequiredCategories = serde_json::from_str(r#"["K","K","C"]"#).expect("deserialize");
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice(), &[Category::Knowledge, Category::Cognitive]);
    }

    #[test]
    fn catalog_item_uses_catalog_field_names() {
        let mut item = make_item("https://x.test/a", Category::Cognitive);
        item.section = "Pre-packaged".into();
        let value = serde_json::to_value(&item).expect("serialize");
        assert_eq!(value["test_type"], "C");
        assert_eq!(value["category"], "Pre-packaged");
        assert!(value.get("duration").is_none());
    }

    #[test]
    fn recommendation_from_fused_candidate() {
        let item = make_item("https://x.test/java", Category::Knowledge);
        let candidate = FusedCandidate {
            item: &item,
            score: 0.75,
        };
        let rec = Recommendation::from(&candidate);
        assert_eq!(rec.assessment_url, "https://x.test/java");
        assert_eq!(rec.assessment_name, "Item https://x.test/java");
        assert_eq!(rec.test_type, Category::Knowledge);
        assert!((rec.score - 0.75).abs() < f64::EPSILON);
    }
}
