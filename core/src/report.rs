//! Plain-text executive summary.
//!
//! Deterministic: the same report, country and date always render the
//! same text. Every number is read from the engine outputs; nothing is
//! recomputed here.

use crate::aggregates::{Figure, FigureResult};
use crate::engine::TsaReport;
use chrono::NaiveDate;
use std::fmt::{self, Write};

struct ExecutiveSummary<'a> {
    report:  &'a TsaReport,
    country: &'a str,
    date:    NaiveDate,
}

impl fmt::Display for ExecutiveSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(f, self.report, self.country, self.date)
    }
}

pub fn render_text_report(report: &TsaReport, country: &str, date: NaiveDate) -> String {
    ExecutiveSummary { report, country, date }.to_string()
}

fn write_report(out: &mut impl Write, report: &TsaReport, country: &str, date: NaiveDate) -> fmt::Result {
    let agg = &report.aggregates;

    writeln!(out, "TOURISM SATELLITE ACCOUNT EXECUTIVE SUMMARY")?;
    writeln!(out, "Country: {country}")?;
    writeln!(out, "Generated: {}", date.format("%Y-%m-%d"))?;

    heading(out, "KEY PERFORMANCE INDICATORS")?;
    writeln!(
        out,
        "Tourism GDP Contribution: {} million ({} of total GDP)",
        amount(&agg.tourism_direct_gdp),
        percent(&agg.tourism_gdp_share)
    )?;
    writeln!(
        out,
        "Tourism Employment: {} FTE jobs ({} of total employment)",
        amount(&agg.total_tourism_fte),
        percent(&agg.tourism_employment_share)
    )?;
    let per_capita = match &agg.consumption_per_capita {
        Ok(fig) => format!("{} per capita", format_thousands(fig.value(), 0)),
        Err(_) => "per capita undefined".to_string(),
    };
    writeln!(
        out,
        "Tourism Consumption: {} million ({per_capita})",
        amount(&agg.internal_tourism_consumption)
    )?;
    writeln!(
        out,
        "Average Tourism Ratio: {}",
        report
            .ratios
            .unweighted_mean
            .map_or_else(|| "undefined".to_string(), |m| format!("{m:.1}%"))
    )?;
    writeln!(
        out,
        "Data Quality Score: {:.0}/100 ({})",
        report.quality.score,
        report.quality.rating.label()
    )?;

    heading(out, "ECONOMIC STRUCTURE")?;
    writeln!(out, "Products Analyzed: {}", report.ratios.rows.len())?;
    writeln!(out, "Tourism Industries: {}", report.employment.rows.len())?;
    if let Some(top) = report.employment.largest() {
        writeln!(
            out,
            "Top Employment Industry: {} ({})",
            top.industry,
            top.share.map_or_else(|| "share undefined".to_string(), |s| format!("{s:.1}%"))
        )?;
    }
    if let Some(top) = report.ratios.top() {
        writeln!(out, "Highest Tourism Intensity: {} ({:.1}%)", top.product, top.ratio)?;
    }
    if let Some(rating) = report.employment.concentration {
        writeln!(
            out,
            "Employment Concentration: {} (HHI {:.3})",
            rating.label(),
            report.employment.hhi.unwrap_or(0.0)
        )?;
    }

    heading(out, "KEY FINDINGS")?;
    for finding in &report.insights.findings {
        writeln!(out, "- {}", finding.text())?;
    }

    heading(out, "STRATEGIC RECOMMENDATIONS")?;
    for (i, rec) in report.insights.recommendations.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, rec.text())?;
    }

    if let Some(first) = report.scenarios.growth.first() {
        let final_year = first.last().map_or(first.records.len() as i32, |r| r.year);
        heading(out, &format!("GROWTH OUTLOOK TO {final_year}"))?;
        for projection in &report.scenarios.growth {
            let s = &projection.summary;
            writeln!(
                out,
                "{}: GDP {} million ({}), employment {} FTE ({})",
                projection.name,
                format_thousands(s.final_gdp, 0),
                signed_pct(s.gdp_growth_pct),
                format_thousands(s.final_employment, 0),
                signed_pct(s.employment_growth_pct)
            )?;
        }
    }

    let flags = agg.estimation_flags();
    let undefined = agg.undefined_figures();
    if !flags.is_empty() || !undefined.is_empty() {
        heading(out, "ESTIMATION NOTES")?;
        for (name, method) in flags {
            writeln!(out, "- {name}: {}", method.describe())?;
        }
        for (name, err) in undefined {
            writeln!(out, "- {name}: {err}")?;
        }
    }

    Ok(())
}

fn heading(out: &mut impl Write, title: &str) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(title.len()))
}

fn amount(fig: &Figure) -> String {
    let text = format_thousands(fig.value(), 0);
    if fig.is_estimated() {
        format!("{text} (estimated)")
    } else {
        text
    }
}

fn percent(fig: &FigureResult) -> String {
    match fig {
        Ok(f) if f.is_estimated() => format!("{:.1}%, estimated", f.value()),
        Ok(f) => format!("{:.1}%", f.value()),
        Err(_) => "undefined".to_string(),
    }
}

fn signed_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:+.1}%"))
}

/// `1234567.8` with 0 decimals → `"1,234,568"`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
