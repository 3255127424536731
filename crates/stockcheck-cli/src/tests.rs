use std::path::PathBuf;

use chrono::Utc;
use stockcheck_core::{
    AvailabilityReport, DecisionReason, Ingredient, MatchDecision, StoreConfig, StoreKind,
    StoreOutcome, StoreReport, StoresFile,
};

use super::*;

#[test]
fn parses_check_command_with_ingredients() {
    let cli = Cli::try_parse_from(["stockcheck", "check", "bananas", "general tso sauce"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Check {
            stores: None,
            threshold: None,
            json: false,
            ref ingredients,
        } if ingredients == &["bananas", "general tso sauce"]
    ));
}

#[test]
fn parses_check_overrides() {
    let cli = Cli::try_parse_from([
        "stockcheck",
        "check",
        "--stores",
        "config/other.yaml",
        "--threshold",
        "55",
        "--json",
        "honey",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Commands::Check {
            stores: Some(ref path),
            threshold: Some(t),
            json: true,
            ..
        } if path == &PathBuf::from("config/other.yaml") && (t - 55.0).abs() < f64::EPSILON
    ));
}

#[test]
fn check_requires_at_least_one_ingredient() {
    assert!(Cli::try_parse_from(["stockcheck", "check"]).is_err());
}

#[test]
fn check_rejects_out_of_range_threshold() {
    assert!(Cli::try_parse_from(["stockcheck", "check", "--threshold", "150", "honey"]).is_err());
    assert!(Cli::try_parse_from(["stockcheck", "check", "--threshold", "high", "honey"]).is_err());
}

#[test]
fn parses_stores_command() {
    let cli = Cli::try_parse_from(["stockcheck", "stores"]).unwrap();
    assert!(matches!(cli.command, Commands::Stores { stores: None }));
}

#[test]
fn threshold_flag_accepts_bounds_and_rejects_nan() {
    for (raw, expected) in [("0", 0.0), (" 100 ", 100.0)] {
        let cli = Cli::try_parse_from(["stockcheck", "check", "--threshold", raw, "honey"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Check { threshold: Some(t), .. } if (t - expected).abs() < f64::EPSILON
        ));
    }
    assert!(Cli::try_parse_from(["stockcheck", "check", "--threshold", "NaN", "honey"]).is_err());
    assert!(Cli::try_parse_from(["stockcheck", "check", "--threshold", "-1", "honey"]).is_err());
}

#[test]
fn parse_ingredients_rejects_blank_arguments() {
    let raw = vec!["bananas".to_string(), "   ".to_string(), "honey".to_string()];
    let err = check::parse_ingredients(&raw).unwrap_err();
    assert!(err.to_string().contains("position 2"), "got: {err}");
}

#[test]
fn parse_ingredients_keeps_order_and_duplicates() {
    let raw = vec!["Bananas".to_string(), "honey".to_string(), "bananas".to_string()];
    let ingredients = check::parse_ingredients(&raw).unwrap();
    let names: Vec<&str> = ingredients.iter().map(Ingredient::as_str).collect();
    assert_eq!(names, vec!["bananas", "honey", "bananas"]);
}

fn decision(store: &str, ingredient: &str, matched: bool, reason: DecisionReason) -> MatchDecision {
    MatchDecision {
        ingredient: Ingredient::new(ingredient),
        store: store.to_string(),
        matched,
        best_score: if matched { 100.0 } else { 0.0 },
        best_candidate: String::new(),
        reason,
    }
}

fn sample_report() -> AvailabilityReport {
    let ingredients = vec![Ingredient::new("bananas"), Ingredient::new("pringles")];
    let reports = vec![
        StoreReport {
            store: "aldi".to_string(),
            outcome: StoreOutcome::Done,
            decisions: vec![
                decision("aldi", "bananas", true, DecisionReason::Matched),
                decision("aldi", "pringles", true, DecisionReason::Matched),
            ],
        },
        StoreReport {
            store: "giant-eagle".to_string(),
            outcome: StoreOutcome::Done,
            decisions: vec![
                decision("giant-eagle", "bananas", true, DecisionReason::Matched),
                decision("giant-eagle", "pringles", false, DecisionReason::NoResults),
            ],
        },
        StoreReport::unreachable("trader-joes", &ingredients, "search input never appeared"),
    ];
    AvailabilityReport::assemble(ingredients, reports, Utc::now())
}

#[test]
fn render_table_shows_one_row_per_store() {
    let table = check::render_table(&sample_report());
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines[0], "STORE        bananas  pringles");
    assert_eq!(lines[1], "aldi         yes      yes");
    assert_eq!(lines[2], "giant-eagle  yes      no");
    assert_eq!(lines[3], "trader-joes  --       --");
}

#[test]
fn render_table_lists_failures_and_complete_stores() {
    let table = check::render_table(&sample_report());
    assert!(table.contains("unreachable stores:\n  trader-joes: search input never appeared"));
    assert!(table.contains("carries everything: aldi"));
    assert!(table.contains("resolved 2 ingredients across 3 stores"));
}

#[test]
fn render_stores_shows_default_and_override_thresholds() {
    let stores = StoresFile {
        stores: vec![
            StoreConfig {
                name: "Trader Joe's".to_string(),
                kind: StoreKind::Catalog,
                enabled: true,
                threshold: None,
                brands: vec![],
                layout: None,
                catalog_path: Some(PathBuf::from("catalogs/tj.txt")),
                notes: None,
            },
            StoreConfig {
                name: "Aldi".to_string(),
                kind: StoreKind::Catalog,
                enabled: false,
                threshold: Some(80.0),
                brands: vec![],
                layout: None,
                catalog_path: Some(PathBuf::from("catalogs/aldi.txt")),
                notes: None,
            },
        ],
    };

    let out = stores::render_stores(&stores, 70.0);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("ID"));
    assert!(lines[1].starts_with("trader-joes"));
    assert!(lines[1].contains("70 (default)"));
    assert!(lines[1].ends_with("Trader Joe's"));
    assert!(lines[2].contains("80"));
    assert!(lines[2].contains("no"));
}

#[test]
fn render_stores_handles_empty_file() {
    let stores = StoresFile { stores: vec![] };
    assert_eq!(stores::render_stores(&stores, 70.0), "no stores configured\n");
}
