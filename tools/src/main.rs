//! tsa-runner: headless Tourism Satellite Account runner.
//!
//! Usage:
//!   tsa-runner --demo
//!   tsa-runner --data-dir ./data --gdp 250000 --employment 4200000 --country Freedonia
//!   tsa-runner --data-dir ./data --config overrides.json --horizon 10 --json

mod loader;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::env;
use std::path::Path;
use tsa_core::{
    aggregates::MacroParams,
    config::TsaConfig,
    engine::{TsaEngine, TsaReport},
    fixtures,
    report::render_text_report,
};

#[derive(serde::Serialize)]
struct RunOutput<'a> {
    generated: NaiveDate,
    report:    &'a TsaReport,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let defaults = MacroParams::default();
    let demo = args.iter().any(|a| a == "--demo");
    let json = args.iter().any(|a| a == "--json");
    let data_dir = parse_str(&args, "--data-dir");
    let config_path = parse_str(&args, "--config");

    let mut config = match config_path {
        Some(path) => TsaConfig::load(path).with_context(|| format!("loading config {path}"))?,
        None => TsaConfig::default(),
    };
    config.scenario.horizon_years = parse_arg(&args, "--horizon", config.scenario.horizon_years);

    let (registry, base_params) = if demo {
        (fixtures::sample_registry()?, fixtures::sample_params())
    } else {
        let dir = data_dir.unwrap_or("./data");
        (loader::load_registry(Path::new(dir))?, defaults)
    };

    let params = MacroParams {
        country_name:     parse_str(&args, "--country").map_or(base_params.country_name, String::from),
        population:       parse_arg(&args, "--population", base_params.population),
        total_gdp:        parse_arg(&args, "--gdp", base_params.total_gdp),
        total_employment: parse_arg(&args, "--employment", base_params.total_employment),
    };

    let generated = match parse_str(&args, "--date") {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d").with_context(|| format!("bad --date {d}"))?,
        None => chrono::Local::now().date_naive(),
    };

    let mut engine = TsaEngine::new(config)?;
    let report = engine.run(&registry, &params);

    if json {
        let output = RunOutput { generated, report: &report };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_text_report(&report, &params.country_name, generated));
        print_validation(&report);
    }

    Ok(())
}

fn print_validation(report: &TsaReport) {
    println!();
    println!("=== TABLE STATUS ===");
    for status in &report.validation.tables {
        println!("  {:<32} {:>5} rows  {}", status.table, status.rows, status.detail);
    }
    if !report.validation.missing_workbook_tables.is_empty() {
        println!("  not provided: {}", report.validation.missing_workbook_tables.join(", "));
    }
    if !report.quality.issues.is_empty() {
        println!();
        println!("=== QUALITY ISSUES ===");
        for issue in &report.quality.issues {
            println!("  - {issue}");
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn parse_str<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
