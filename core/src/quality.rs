//! Data quality scoring.
//!
//! Deduction model: the score starts at 100 and each failed check
//! subtracts its configured points. The result is clamped to [0, 100].
//! Checks only ever subtract, so adding a defect to the input can never
//! raise the score. A check whose table is absent cannot run and takes
//! its largest deduction, so dropping a table never helps either.
//!
//! Check order (fixed, determines the order of `issues`):
//!   1. Cross-table consumption consistency (Table 4 vs Table 6)
//!   2. Tourism ratio reasonableness, judged on the supplied ratio
//!   3. Completeness of the three core measures
//!   4. Supply-demand balance (skipped when Table 6 lacks its columns)

use crate::config::{QualityBands, TsaConfig};
use crate::ratios::{resolve_ratios, RatioSource};
use crate::table::{columns as col, Table, TableRegistry, CONSUMPTION_TABLE, EMPLOYMENT_TABLE, SUPPLY_DEMAND_TABLE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityCheck {
    ConsumptionConsistency,
    RatioReasonableness,
    Completeness,
    SupplyDemandBalance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deduction {
    pub check:  QualityCheck,
    pub points: f64,
    pub issue:  String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityRating {
    NeedsImprovement,
    Acceptable,
    Good,
    VeryGood,
    Excellent,
}

impl QualityRating {
    pub fn from_score(score: f64, bands: &QualityBands) -> Self {
        if score >= bands.excellent {
            QualityRating::Excellent
        } else if score >= bands.very_good {
            QualityRating::VeryGood
        } else if score >= bands.good {
            QualityRating::Good
        } else if score >= bands.acceptable {
            QualityRating::Acceptable
        } else {
            QualityRating::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityRating::Excellent        => "Excellent",
            QualityRating::VeryGood         => "Very Good",
            QualityRating::Good             => "Good",
            QualityRating::Acceptable       => "Acceptable",
            QualityRating::NeedsImprovement => "Needs Improvement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessRow {
    pub table:   String,
    pub column:  String,
    pub missing: usize,
    pub records: usize,
    /// `None` for an empty table.
    pub completeness_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityDiagnostics {
    pub consumption_table4:  Option<f64>,
    pub consumption_table6:  Option<f64>,
    pub discrepancy_pct:     Option<f64>,
    pub reasonable_ratios:   usize,
    pub high_ratios:         usize,
    pub extreme_ratios:      usize,
    pub completeness:        Vec<CompletenessRow>,
    pub total_missing:       usize,
    /// (rows out of tolerance, rows evaluated); `None` when skipped.
    pub balance_failures:    Option<(usize, usize)>,
    /// Supplied ratios replaced by consumption / supply.
    pub recomputed_ratios:   usize,
    /// Core tables not registered.
    pub absent_tables:       Vec<String>,
    /// Checks that could not run because a table was absent. Each
    /// takes its largest deduction.
    pub unevaluated:         Vec<QualityCheck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub score:           f64,
    pub rating:          QualityRating,
    pub issues:          Vec<String>,
    pub deductions:      Vec<Deduction>,
    pub recommendations: Vec<String>,
    pub diagnostics:     QualityDiagnostics,
}

impl QualityReport {
    pub fn deduction_for(&self, check: QualityCheck) -> Option<&Deduction> {
        self.deductions.iter().find(|d| d.check == check)
    }

    pub fn total_deducted(&self) -> f64 {
        self.deductions.iter().map(|d| d.points).sum()
    }
}

/// Deductions and the audit notes that carry no points, in check order.
#[derive(Default)]
struct Ledger {
    deductions: Vec<Deduction>,
    issues:     Vec<String>,
}

impl Ledger {
    fn deduct(&mut self, check: QualityCheck, points: f64, issue: String) {
        self.issues.push(issue.clone());
        self.deductions.push(Deduction { check, points, issue });
    }

    fn note(&mut self, issue: String) {
        self.issues.push(issue);
    }
}

pub fn score_quality(registry: &TableRegistry, config: &TsaConfig) -> QualityReport {
    let q = &config.quality;
    let mut ledger = Ledger::default();
    let mut diag = QualityDiagnostics {
        absent_tables: [CONSUMPTION_TABLE, SUPPLY_DEMAND_TABLE, EMPLOYMENT_TABLE]
            .into_iter()
            .filter(|name| !registry.contains(name))
            .map(String::from)
            .collect(),
        ..QualityDiagnostics::default()
    };

    // ── 1. Consumption consistency ─────────────────────────────

    match (registry.consumption(), registry.supply_demand()) {
        (Some(t4), Some(t6)) => {
            let total4 = t4.sum(col::INTERNAL_TOURISM_CONSUMPTION).unwrap_or(0.0);
            let total6 = t6.sum(col::INTERNAL_TOURISM_CONSUMPTION).unwrap_or(0.0);
            // A non-positive Table 4 total against a non-zero Table 6 total is
            // a full discrepancy; two zero totals agree.
            let pct = if total4 > 0.0 {
                (total4 - total6).abs() / total4 * 100.0
            } else if total6 != 0.0 {
                100.0
            } else {
                0.0
            };
            diag.consumption_table4 = Some(total4);
            diag.consumption_table6 = Some(total6);
            diag.discrepancy_pct = Some(pct);

            let points = if pct >= q.consistency_severe_pct {
                q.consistency_severe_points
            } else if pct > q.consistency_minor_pct {
                q.consistency_minor_points
            } else {
                0.0
            };
            if points > 0.0 {
                ledger.deduct(
                    QualityCheck::ConsumptionConsistency,
                    points,
                    format!("Tourism consumption inconsistency between tables: {pct:.2}% difference"),
                );
            }
        }
        (t4, t6) => {
            diag.consumption_table4 = t4.and_then(|t| t.sum(col::INTERNAL_TOURISM_CONSUMPTION));
            diag.consumption_table6 = t6.and_then(|t| t.sum(col::INTERNAL_TOURISM_CONSUMPTION));
            diag.unevaluated.push(QualityCheck::ConsumptionConsistency);
            ledger.deduct(
                QualityCheck::ConsumptionConsistency,
                q.consistency_severe_points,
                format!(
                    "Tourism consumption consistency not evaluable: {} not provided",
                    absent_list(&[(t4.is_none(), CONSUMPTION_TABLE), (t6.is_none(), SUPPLY_DEMAND_TABLE)])
                ),
            );
        }
    }

    // ── 2. Ratio reasonableness ────────────────────────────────

    match registry.supply_demand() {
        Some(t6) => {
            let resolved = resolve_ratios(t6, config.ratio.tolerance_pp);
            // Judged on the supplied ratio; consumption / supply only when none is supplied.
            let ratios: Vec<f64> = resolved.iter().filter_map(|r| r.supplied.or(r.ratio)).collect();
            diag.extreme_ratios = ratios.iter().filter(|&&r| r > q.high_ratio_pct).count();
            diag.high_ratios = ratios.iter().filter(|&&r| r > 100.0 && r <= q.high_ratio_pct).count();
            diag.reasonable_ratios = ratios.iter().filter(|&&r| r <= 100.0).count();

            let above = |limit: f64| ratios.iter().filter(|&&r| r > limit).count();
            let extreme = above(q.extreme_ratio_pct);
            let high = above(q.high_ratio_pct);
            if extreme > 0 {
                ledger.deduct(
                    QualityCheck::RatioReasonableness,
                    q.extreme_ratio_points,
                    format!("{extreme} products have tourism ratios above {}%", q.extreme_ratio_pct),
                );
            } else if high > 0 {
                ledger.deduct(
                    QualityCheck::RatioReasonableness,
                    q.high_ratio_points,
                    format!("{high} products have tourism ratios above {}%", q.high_ratio_pct),
                );
            }

            let recomputed: Vec<&str> = resolved
                .iter()
                .filter(|r| r.source == Some(RatioSource::Recomputed))
                .map(|r| r.product.as_str())
                .collect();
            diag.recomputed_ratios = recomputed.len();
            if !recomputed.is_empty() {
                ledger.note(format!(
                    "Supplied tourism ratio differs from consumption / supply by more than {} pp: {}",
                    config.ratio.tolerance_pp,
                    recomputed.join(", ")
                ));
            }
        }
        None => {
            diag.unevaluated.push(QualityCheck::RatioReasonableness);
            ledger.deduct(
                QualityCheck::RatioReasonableness,
                q.extreme_ratio_points,
                format!("Tourism ratios not evaluable: {SUPPLY_DEMAND_TABLE} not provided"),
            );
        }
    }

    // ── 3. Completeness ────────────────────────────────────────

    let measures = [
        (registry.consumption(), col::INTERNAL_TOURISM_CONSUMPTION),
        (registry.supply_demand(), col::TOURISM_RATIO),
        (registry.employment(), col::FTE_JOBS),
    ];
    for (table, column) in measures {
        if let Some(table) = table {
            diag.completeness.push(completeness(table, column));
        }
    }
    diag.total_missing = diag.completeness.iter().map(|c| c.missing).sum();
    if !diag.absent_tables.is_empty() {
        // An absent table's row count is unknown; take the full deduction.
        ledger.deduct(
            QualityCheck::Completeness,
            q.max_missing_points,
            format!(
                "{} missing values in core tables; not provided: {}",
                diag.total_missing,
                diag.absent_tables.join(", ")
            ),
        );
    } else if diag.total_missing > 0 {
        let points = (q.points_per_missing_value * diag.total_missing as f64).min(q.max_missing_points);
        ledger.deduct(
            QualityCheck::Completeness,
            points,
            format!("{} missing values in core tables", diag.total_missing),
        );
    }

    // ── 4. Supply-demand balance ───────────────────────────────

    match registry.supply_demand() {
        Some(t6) => {
            let balanced_columns = [col::TOTAL_DOMESTIC_OUTPUT, col::IMPORTS, col::TAXES_LESS_SUBSIDIES];
            if balanced_columns.iter().all(|c| t6.has_column(c)) {
                let (failed, evaluated) = balance_failures(t6, q.balance_tolerance);
                diag.balance_failures = Some((failed, evaluated));
                if evaluated > 0 && failed as f64 / evaluated as f64 > q.balance_row_share {
                    ledger.deduct(
                        QualityCheck::SupplyDemandBalance,
                        q.balance_points,
                        format!(
                            "Supply-demand imbalance: {failed} of {evaluated} products outside {:.0}% tolerance",
                            q.balance_tolerance * 100.0
                        ),
                    );
                }
            }
        }
        None => {
            diag.unevaluated.push(QualityCheck::SupplyDemandBalance);
            ledger.deduct(
                QualityCheck::SupplyDemandBalance,
                q.balance_points,
                format!("Supply-demand balance not evaluable: {SUPPLY_DEMAND_TABLE} not provided"),
            );
        }
    }

    let Ledger { deductions, issues } = ledger;
    let deducted: f64 = deductions.iter().map(|d| d.points).sum();
    let score = (100.0 - deducted).clamp(0.0, 100.0);
    let rating = QualityRating::from_score(score, &q.bands);

    for d in &deductions {
        log::warn!("quality deduction -{}: {}", d.points, d.issue);
    }
    log::debug!("quality: score={score:.1} rating={}", rating.label());

    QualityReport {
        score,
        rating,
        issues,
        recommendations: recommendations(score, &diag, config),
        deductions,
        diagnostics: diag,
    }
}

fn absent_list(tables: &[(bool, &str)]) -> String {
    tables
        .iter()
        .filter(|(absent, _)| *absent)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(" and ")
}

fn completeness(table: &Table, column: &str) -> CompletenessRow {
    let missing = table.missing_count(column) + table.non_numeric_count(column);
    let records = table.len();
    CompletenessRow {
        table: table.name().to_string(),
        column: column.to_string(),
        missing,
        records,
        completeness_pct: (records > 0)
            .then(|| (records - missing.min(records)) as f64 / records as f64 * 100.0),
    }
}

/// Rows whose output + imports + taxes departs from reported supply by
/// more than `tolerance` (relative). Rows missing an operand are skipped.
fn balance_failures(table: &Table, tolerance: f64) -> (usize, usize) {
    let mut failed = 0;
    let mut evaluated = 0;
    for i in 0..table.len() {
        let operands = (
            table.value(i, col::TOTAL_DOMESTIC_OUTPUT),
            table.value(i, col::IMPORTS),
            table.value(i, col::TAXES_LESS_SUBSIDIES),
            table.value(i, col::DOMESTIC_SUPPLY),
        );
        let (Some(output), Some(imports), Some(taxes), Some(reported)) = operands else {
            continue;
        };
        evaluated += 1;
        let computed = output + imports + taxes;
        if (computed - reported).abs() > tolerance * reported.abs() {
            failed += 1;
        }
    }
    (failed, evaluated)
}

fn recommendations(score: f64, diag: &QualityDiagnostics, config: &TsaConfig) -> Vec<String> {
    if score >= 100.0 {
        return vec![
            "Maintain current high data quality standards".into(),
            "Consider expanding data collection for optional tables".into(),
        ];
    }

    let mut recs: Vec<String> = Vec::new();
    if !diag.absent_tables.is_empty() {
        recs.push(format!("Provide the missing core tables: {}", diag.absent_tables.join(", ")));
    }
    if diag.total_missing > 0 {
        recs.push("Address missing values in core tables".into());
    }
    if diag.extreme_ratios > 0 {
        recs.push(format!(
            "Review products with extreme tourism ratios (>{}%)",
            config.quality.high_ratio_pct
        ));
    }
    if diag.discrepancy_pct.is_some_and(|p| p > config.quality.consistency_minor_pct) {
        recs.push("Reconcile tourism consumption figures between tables".into());
    }
    recs.extend([
        "Implement regular data validation procedures".to_string(),
        "Establish data quality standards and monitoring".to_string(),
        "Document data collection and processing methods".to_string(),
    ]);
    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bands_are_inclusive() {
        let bands = QualityBands::default();
        assert_eq!(QualityRating::from_score(100.0, &bands), QualityRating::Excellent);
        assert_eq!(QualityRating::from_score(95.0, &bands), QualityRating::Excellent);
        assert_eq!(QualityRating::from_score(94.9, &bands), QualityRating::VeryGood);
        assert_eq!(QualityRating::from_score(75.0, &bands), QualityRating::Good);
        assert_eq!(QualityRating::from_score(60.0, &bands), QualityRating::Acceptable);
        assert_eq!(QualityRating::from_score(0.0, &bands), QualityRating::NeedsImprovement);
    }
}
