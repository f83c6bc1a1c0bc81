//! End-to-end checks of the extraction, alias and clustering pipeline
//! through the public library API.

mod common;

use common::fixtures::fixture_path;
use orgcluster::contacts::load_contacts;
use orgcluster::{
    build_clusters, normalize, similarity, tokenize, AliasEntry, AliasResolver, AliasTable,
    AppConfig, CompanyAnalysis, CompanyExtractor, CompanyResolver, MatchThresholds,
};
use std::collections::HashMap;

fn resolver() -> CompanyResolver {
    CompanyResolver::builtin().expect("built-in resolver")
}

fn counts(names: &[&str]) -> HashMap<String, u64> {
    names.iter().map(|n| (n.to_string(), 1)).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Single title to canonical company
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_google_brazil_title_resolves_to_google() {
    let title = "Software Engineer at Google Brazil";
    let raw = CompanyExtractor::default().extract(title);
    assert!(raw.contains("google brazil"));

    assert_eq!(normalize(&raw), "google");
    assert_eq!(tokenize(&raw).into_iter().collect::<Vec<_>>(), vec!["google"]);
    assert_eq!(resolver().extract_company(title), "google");
}

#[test]
fn test_blank_titles_excluded_everywhere() {
    let r = resolver();
    assert_eq!(r.extract_company(""), "");
    assert_eq!(r.extract_company("   "), "");

    let analysis = CompanyAnalysis::from_titles(&r, ["", "  ", "\t"]);
    assert!(analysis.is_empty());
    assert!(analysis.counts().is_empty());
    assert!(analysis.clusters().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Similarity alone versus the alias dictionary
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bcg_needs_the_dictionary() {
    let names = ["BCG", "Boston Consulting Group BCG"];
    let clusters = build_clusters(&names, &counts(&names));
    assert_eq!(clusters.len(), 2, "similarity alone must not merge BCG variants");

    let r = resolver();
    assert_eq!(r.resolve_alias("BCG"), Some("bcg"));
    assert_eq!(r.resolve_alias("Boston Consulting Group"), Some("bcg"));
}

#[test]
fn test_mercado_livre_libre_needs_the_dictionary() {
    let s = similarity("Mercado Livre", "Mercado Libre");
    assert!((s - 1.0 / 3.0).abs() < 1e-9, "got {}", s);

    let names = ["Mercado Livre", "Mercado Libre"];
    assert_eq!(build_clusters(&names, &counts(&names)).len(), 2);

    let r = resolver();
    assert_eq!(r.resolve_alias("Mercado Livre"), Some("mercadolivre"));
    assert_eq!(r.resolve_alias("Mercado Libre"), Some("mercadolivre"));
}

#[test]
fn test_disjoint_names_never_merge() {
    let names = ["apple", "tesla"];
    let loose = MatchThresholds {
        containment: 0.0,
        jaccard: 0.0,
    };
    let clusters = orgcluster::ClusterBuilder::new(loose).build(&names, &counts(&names));
    assert_eq!(clusters.len(), 2);
    assert_ne!(clusters.canonical_for("apple"), clusters.canonical_for("tesla"));
}

#[test]
fn test_alternate_dictionary_injection() {
    let table = AliasTable::new(vec![AliasEntry::new(
        "mercado",
        ["mercado livre", "mercado libre"],
    )]);
    let r = CompanyResolver::new(
        CompanyExtractor::default(),
        AliasResolver::new(table),
        MatchThresholds::default(),
    );
    assert_eq!(r.extract_company("PM at Mercado Libre"), "mercado");
    // the built-in dictionary is not consulted
    assert_eq!(
        r.extract_company("Consultant at Boston Consulting Group"),
        "boston consulting group"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Contact exports
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_linkedin_export_analysis() {
    let records = load_contacts(&[fixture_path("connections.csv")], None).unwrap();
    assert_eq!(records.len(), 10);

    let titles = records.iter().map(|r| r.title.as_deref().unwrap_or(""));
    let analysis = CompanyAnalysis::from_titles(&resolver(), titles);

    assert_eq!(analysis.total_records(), 10);
    assert_eq!(analysis.records_with_company(), 8);

    let top = analysis.most_represented().unwrap();
    assert_eq!(top.canonical_name, "google");
    assert_eq!(top.total_count, 3);
    assert_eq!(analysis.members_of("google"), vec![0, 1, 2]);

    let acme = analysis.clusters().cluster_of("acme widgets").unwrap();
    assert_eq!(acme.total_count, 2);
    assert!(acme.contains("acme widgets ltda"));
}

#[test]
fn test_merged_exports_drop_duplicate_rows() {
    let records = load_contacts(
        &[fixture_path("connections.csv"), fixture_path("more_connections.csv")],
        None,
    )
    .unwrap();
    // Diego appears in both files with columns in a different order
    assert_eq!(records.len(), 12);

    let titles = records.iter().map(|r| r.title.as_deref().unwrap_or(""));
    let analysis = CompanyAnalysis::from_titles(&resolver(), titles);

    let ranked: Vec<(&str, u64)> = analysis
        .top_companies(3)
        .into_iter()
        .map(|c| (c.canonical_name.as_str(), c.total_count))
        .collect();
    assert_eq!(ranked, vec![("google", 3), ("acme widgets ltda", 2), ("nubank", 2)]);
    assert_eq!(analysis.counts()["itau"], 1);
}

#[test]
fn test_config_driven_resolver() {
    let config = AppConfig::from_toml_str(
        r#"
[matching]
containment_threshold = 0.3
jaccard_threshold = 0.3

[extraction]
min_name_length = 2

[[extraction.rules]]
name = "chez"
pattern = '\bchez\s+([^|,]+)'
priority = 1
"#,
    )
    .unwrap();
    let r = CompanyResolver::from_config(&config).unwrap();

    assert_eq!(r.extract_company("Ingénieur chez Airbus"), "airbus");
    assert_eq!(r.extract_company("Engineer at Google"), "");
    assert!(r.is_similar("Mercado Livre", "Mercado Libre"));
}
