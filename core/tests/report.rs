//! Executive summary rendering tests.

use chrono::NaiveDate;
use tsa_core::engine::TsaEngine;
use tsa_core::fixtures;
use tsa_core::report::render_text_report;
use tsa_core::table::{columns as col, Table, EMPLOYMENT_TABLE};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

fn sample_text() -> String {
    let params = fixtures::sample_params();
    let report = TsaEngine::with_defaults().run(&fixtures::sample_registry().unwrap(), &params);
    render_text_report(&report, &params.country_name, date())
}

#[test]
fn sample_summary_sections_and_figures() {
    let text = sample_text();

    assert!(text.starts_with("TOURISM SATELLITE ACCOUNT EXECUTIVE SUMMARY\n"));
    assert!(text.contains("Country: Demoland\n"));
    assert!(text.contains("Generated: 2024-06-30\n"));
    for heading in [
        "KEY PERFORMANCE INDICATORS",
        "ECONOMIC STRUCTURE",
        "KEY FINDINGS",
        "STRATEGIC RECOMMENDATIONS",
        "GROWTH OUTLOOK TO 2029",
    ] {
        let underline = "=".repeat(heading.len());
        assert!(text.contains(&format!("{heading}\n{underline}\n")), "missing heading {heading}");
    }

    assert!(text.contains("Tourism GDP Contribution: 6,603 million (3.3% of total GDP)"));
    assert!(text.contains("Tourism Employment: 120,000 FTE jobs (3.0% of total employment)"));
    assert!(text.contains("Tourism Consumption: 13,400 million (1,340 per capita)"));
    assert!(text.contains("Data Quality Score: 100/100 (Excellent)"));
    assert!(text.contains("Top Employment Industry: Accommodation (35.0%)"));
    assert!(text.contains("1. Growth Strategy: "));
    assert!(!text.contains("(estimated)"));
    assert!(!text.contains("ESTIMATION NOTES"));
}

#[test]
fn rendering_is_deterministic() {
    assert_eq!(sample_text(), sample_text());
}

#[test]
fn estimated_figures_are_marked() {
    let employment = Table::builder(EMPLOYMENT_TABLE, col::INDUSTRIES)
        .column(col::FTE_JOBS)
        .row("Accommodation", vec![60_000.0])
        .row("Food and beverage", vec![60_000.0])
        .build()
        .unwrap();
    let registry = fixtures::sample_registry().unwrap().with_table(employment);
    let params = fixtures::sample_params();
    let report = TsaEngine::with_defaults().run(&registry, &params);
    let text = render_text_report(&report, &params.country_name, date());

    assert!(text.contains("(estimated)"), "GDP should carry an estimate marker:\n{text}");
    assert!(text.contains("ESTIMATION NOTES"));
    assert!(text.contains("- tourism_direct_gva: "));
}

#[test]
fn undefined_shares_render_as_undefined() {
    let mut params = fixtures::sample_params();
    params.total_gdp = 0.0;
    let report = TsaEngine::with_defaults().run(&fixtures::sample_registry().unwrap(), &params);
    let text = render_text_report(&report, &params.country_name, date());

    assert!(text.contains("(undefined of total GDP)"));
    assert!(text.contains("- tourism_gdp_share: invalid parameter total_gdp"));
}
