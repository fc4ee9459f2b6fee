//! Employment structure of the tourism industries.
//!
//! Shares, gender split, job quality and concentration (top-N share and
//! Herfindahl-Hirschman index) over the Employment table.

use crate::config::EmploymentConfig;
use crate::table::{columns as col, TableRegistry};
use crate::types::IndustryId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationRating {
    Competitive,
    ModeratelyConcentrated,
    HighlyConcentrated,
}

impl ConcentrationRating {
    pub fn classify(hhi: f64, config: &EmploymentConfig) -> Self {
        if hhi >= config.concentrated_hhi {
            ConcentrationRating::HighlyConcentrated
        } else if hhi >= config.moderate_hhi {
            ConcentrationRating::ModeratelyConcentrated
        } else {
            ConcentrationRating::Competitive
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConcentrationRating::Competitive            => "Competitive",
            ConcentrationRating::ModeratelyConcentrated => "Moderately concentrated",
            ConcentrationRating::HighlyConcentrated     => "Highly concentrated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentRow {
    pub industry:   IndustryId,
    pub fte:        f64,
    /// FTE / ΣFTE × 100. `None` when ΣFTE is zero.
    pub share:      Option<f64>,
    pub total_jobs: Option<f64>,
    /// FTE / total jobs × 100, only when total jobs is reported and non-zero.
    pub fte_ratio:  Option<f64>,
    pub male:       f64,
    pub female:     f64,
    /// Self-employed / total jobs × 100; 0 when total jobs is 0 or absent.
    pub self_employment_rate: f64,
    pub establishments:       Option<f64>,
    pub gva:                  Option<f64>,
    /// GVA share / FTE × 1000, thousand base units per FTE.
    pub labor_productivity:   Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmploymentAnalysis {
    /// Sorted by descending FTE, ties by industry id.
    pub rows:          Vec<EmploymentRow>,
    pub total_fte:     f64,
    pub total_jobs:    f64,
    pub total_male:    f64,
    pub total_female:  f64,
    pub top3_share:    Option<f64>,
    pub top5_share:    Option<f64>,
    pub hhi:           Option<f64>,
    pub concentration: Option<ConcentrationRating>,
    /// Mean of the per-industry productivity values that are defined.
    pub average_productivity: Option<f64>,
}

impl EmploymentAnalysis {
    pub fn female_share(&self) -> Option<f64> {
        let total = self.total_male + self.total_female;
        (total > 0.0).then(|| self.total_female / total * 100.0)
    }

    pub fn largest(&self) -> Option<&EmploymentRow> {
        self.rows.first()
    }
}

pub fn analyze_employment(registry: &TableRegistry, config: &EmploymentConfig) -> EmploymentAnalysis {
    let Some(table) = registry.employment() else {
        log::warn!("employment analysis skipped: employment table not provided");
        return EmploymentAnalysis::default();
    };

    let mut rows: Vec<EmploymentRow> = (0..table.len())
        .map(|i| {
            let v = |column: &str| table.value(i, column);
            let fte = v(col::FTE_JOBS).unwrap_or(0.0);
            let total_jobs = v(col::TOTAL_JOBS);
            let self_employed =
                v(col::SELF_EMPLOYED_MALE).unwrap_or(0.0) + v(col::SELF_EMPLOYED_FEMALE).unwrap_or(0.0);
            let gva = v(col::GVA_TOURISM_SHARE);

            EmploymentRow {
                industry: table.rows()[i].key.clone(),
                fte,
                share: None,
                total_jobs,
                fte_ratio: total_jobs.filter(|&j| j != 0.0).map(|j| fte / j * 100.0),
                male: v(col::EMPLOYEES_MALE).unwrap_or(0.0) + v(col::SELF_EMPLOYED_MALE).unwrap_or(0.0),
                female: v(col::EMPLOYEES_FEMALE).unwrap_or(0.0) + v(col::SELF_EMPLOYED_FEMALE).unwrap_or(0.0),
                self_employment_rate: match total_jobs {
                    Some(j) if j != 0.0 => self_employed / j * 100.0,
                    _ => 0.0,
                },
                establishments: v(col::ESTABLISHMENTS),
                gva,
                labor_productivity: gva.filter(|_| fte != 0.0).map(|g| g / fte * 1000.0),
            }
        })
        .collect();

    let total_fte: f64 = rows.iter().map(|r| r.fte).sum();
    if total_fte != 0.0 {
        for row in &mut rows {
            row.share = Some(row.fte / total_fte * 100.0);
        }
    } else {
        log::warn!("employment shares undefined: total FTE is zero");
    }

    rows.sort_by(|a, b| b.fte.total_cmp(&a.fte).then_with(|| a.industry.cmp(&b.industry)));

    let top_share = |n: usize| -> Option<f64> {
        rows.iter()
            .take(n)
            .map(|r| r.share)
            .sum::<Option<f64>>()
            .filter(|_| !rows.is_empty())
    };
    let top3_share = top_share(3);
    let top5_share = top_share(5);

    let hhi = rows
        .iter()
        .map(|r| r.share.map(|s| (s / 100.0).powi(2)))
        .sum::<Option<f64>>()
        .filter(|_| !rows.is_empty());

    let productivities: Vec<f64> = rows.iter().filter_map(|r| r.labor_productivity).collect();
    let average_productivity = (!productivities.is_empty())
        .then(|| productivities.iter().sum::<f64>() / productivities.len() as f64);

    let analysis = EmploymentAnalysis {
        total_fte,
        total_jobs: rows.iter().filter_map(|r| r.total_jobs).sum(),
        total_male: rows.iter().map(|r| r.male).sum(),
        total_female: rows.iter().map(|r| r.female).sum(),
        top3_share,
        top5_share,
        concentration: hhi.map(|h| ConcentrationRating::classify(h, config)),
        hhi,
        average_productivity,
        rows,
    };

    log::debug!(
        "employment: {} industries, fte={:.0} top3={:?} hhi={:?}",
        analysis.rows.len(),
        analysis.total_fte,
        analysis.top3_share,
        analysis.hhi
    );

    analysis
}
