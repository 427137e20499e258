//! Integration tests for the recommendation pipeline.
//!
//! These tests exercise the full score → fuse → classify → allocate path
//! over a small in-memory catalog using the built-in BM25 and TF-IDF score
//! sources. No network access is involved.

use std::sync::Arc;

use assessrec_core::eval::{evaluate, group_by_query, LabeledRow};
use assessrec_core::orchestrator::allocate::allocate;
use assessrec_core::orchestrator::fusion::fuse;
use assessrec_core::types::ScoredCandidate;
use assessrec_core::{
    build_recommender, Catalog, CatalogItem, Category, FixedClassifier, RawRecord,
    RequiredCategories, RetrievalConfig, SourceKind, UnavailableClassifier,
};

fn record(url: &str, name: &str, test_type: &str, description: &str) -> RawRecord {
    RawRecord {
        url: Some(url.to_string()),
        name: Some(name.to_string()),
        description: Some(description.to_string()),
        test_type: Some(test_type.to_string()),
        category: Some("Individual Test Solutions".to_string()),
        ..Default::default()
    }
}

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::from_records(vec![
        record(
            "https://x.test/java-8",
            "Java 8",
            "K",
            "Multi-choice test of core Java programming knowledge",
        ),
        record(
            "https://x.test/core-java-advanced",
            "Core Java Advanced",
            "K",
            "Advanced Java programming, collections and concurrency",
        ),
        record(
            "https://x.test/python",
            "Python",
            "K",
            "Python programming and scripting knowledge",
        ),
        record(
            "https://x.test/opq",
            "Occupational Personality Questionnaire",
            "P",
            "Personality questionnaire covering collaboration and teamwork",
        ),
        record(
            "https://x.test/sales-personality",
            "Sales Personality",
            "P",
            "Personality profile for sales and customer facing roles",
        ),
        record(
            "https://x.test/verify-numerical",
            "Verify Numerical Reasoning",
            "C",
            "Cognitive ability test of numerical reasoning",
        ),
        record(
            "https://x.test/situational",
            "Situational Judgement",
            "B",
            "Behavioral situational judgement for graduates",
        ),
    ]))
}

fn item(url: &str, category: Category) -> CatalogItem {
    CatalogItem {
        url: url.to_string(),
        name: url.to_uppercase(),
        description: String::new(),
        category,
        section: String::new(),
        duration: None,
        skills: vec![],
        search_text: String::new(),
    }
}

#[tokio::test]
async fn java_query_balances_knowledge_and_personality() {
    let recommender = build_recommender(
        catalog(),
        FixedClassifier::new(RequiredCategories::new([Category::Knowledge, Category::Personality])),
        RetrievalConfig::default(),
    )
    .expect("valid pipeline");

    let recs = recommender
        .recommend("Java developer who collaborates with the team", 4)
        .await;

    assert_eq!(recs.len(), 4);
    let knowledge = recs.iter().filter(|r| r.test_type == Category::Knowledge).count();
    let personality = recs.iter().filter(|r| r.test_type == Category::Personality).count();
    assert_eq!(knowledge, 2);
    assert_eq!(personality, 2);
    let mut knowledge_urls: Vec<&str> = recs
        .iter()
        .filter(|r| r.test_type == Category::Knowledge)
        .map(|r| r.assessment_url.as_str())
        .collect();
    knowledge_urls.sort_unstable();
    assert_eq!(
        knowledge_urls,
        vec!["https://x.test/core-java-advanced", "https://x.test/java-8"]
    );
    assert!(recs.iter().all(|r| r.score.is_finite() && r.score >= 0.0));
}

#[tokio::test]
async fn unavailable_classifier_falls_back_to_knowledge_and_personality() {
    let recommender = build_recommender(catalog(), UnavailableClassifier, RetrievalConfig::default())
        .expect("valid pipeline");

    let recs = recommender.recommend("numerical reasoning", 2).await;
    // Quota 1 each for K and P; the cognitive match only enters via backfill,
    // which has no slot left.
    assert_eq!(recs.len(), 2);
    assert!(recs.iter().all(|r| r.test_type != Category::Cognitive));
}

#[tokio::test]
async fn results_never_exceed_catalog_or_top_k() {
    let recommender = build_recommender(
        catalog(),
        FixedClassifier::new(RequiredCategories::new(Category::all().iter().copied())),
        RetrievalConfig::default(),
    )
    .expect("valid pipeline");

    let recs = recommender.recommend("assessment", 50).await;
    assert_eq!(recs.len(), 7);

    let mut urls: Vec<&str> = recs.iter().map(|r| r.assessment_url.as_str()).collect();
    urls.sort_unstable();
    urls.dedup();
    assert_eq!(urls.len(), 7);
}

#[tokio::test]
async fn empty_catalog_yields_no_recommendations() {
    let recommender = build_recommender(
        Arc::new(Catalog::default()),
        UnavailableClassifier,
        RetrievalConfig::default(),
    )
    .expect("valid pipeline");
    assert!(recommender.recommend("java", 10).await.is_empty());
}

#[tokio::test]
async fn evaluation_reports_mean_recall() {
    let recommender = build_recommender(
        catalog(),
        FixedClassifier::new(RequiredCategories::new([Category::Knowledge])),
        RetrievalConfig::default(),
    )
    .expect("valid pipeline");

    let labeled = group_by_query(vec![
        LabeledRow {
            query: "Java programming".into(),
            assessment_url: "https://x.test/java-8".into(),
        },
        LabeledRow {
            query: "Java programming".into(),
            assessment_url: "https://x.test/core-java-advanced".into(),
        },
        LabeledRow {
            query: "underwater basket weaving".into(),
            assessment_url: "https://x.test/missing".into(),
        },
    ]);

    let report = evaluate(&recommender, &labeled, 3).await;
    assert_eq!(report.num_queries, 2);
    assert_eq!(report.k, 3);
    assert!((report.per_query_results[0].recall - 1.0).abs() < f64::EPSILON);
    assert!(report.per_query_results[1].recall.abs() < f64::EPSILON);
    assert!((report.mean_recall_at_k - 0.5).abs() < f64::EPSILON);

    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["num_queries"], 2);
    assert!(json["per_query_results"].is_array());
}

#[test]
fn fusion_then_allocation_scenarios() {
    // Fusion: [Y, X, Z] with Y=0.70, X=0.54, Z=0.20.
    let (x, y, z) = (
        item("x", Category::Personality),
        item("y", Category::Knowledge),
        item("z", Category::Knowledge),
    );
    let semantic = vec![
        ScoredCandidate { item: &x, score: 0.9, source: SourceKind::Semantic },
        ScoredCandidate { item: &y, score: 0.5, source: SourceKind::Semantic },
    ];
    let lexical = vec![
        ScoredCandidate { item: &y, score: 4.0, source: SourceKind::Lexical },
        ScoredCandidate { item: &z, score: 2.0, source: SourceKind::Lexical },
    ];
    let fused = fuse(&semantic, &lexical, 0.6, 0.4, 30);
    let order: Vec<&str> = fused.iter().map(|c| c.url()).collect();
    assert_eq!(order, vec!["y", "x", "z"]);

    // Allocation with an empty category set passes the pool through.
    let passed = allocate(&fused, &RequiredCategories::default(), 2);
    let order: Vec<&str> = passed.iter().map(|c| c.url()).collect();
    assert_eq!(order, vec!["y", "x"]);

    // [P, K] with top_k 2: one of each, in fused order.
    let balanced = allocate(
        &fused,
        &RequiredCategories::new([Category::Personality, Category::Knowledge]),
        2,
    );
    let order: Vec<&str> = balanced.iter().map(|c| c.url()).collect();
    assert_eq!(order, vec!["y", "x"]);
}
