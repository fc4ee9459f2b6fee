//! Scenario engine: growth projections, policy interventions,
//! one-factor sensitivity sweeps and crisis recovery paths.
//!
//! Every function here is a pure function of a `ScenarioBase` and the
//! scenario configuration. Same inputs, bit-identical outputs.
//!
//! Units: consumption and GDP in millions of base currency units,
//! employment in FTE, costs in base currency units.

use crate::aggregates::{CoreAggregates, MacroParams};
use crate::config::{CostBasis, CrisisConfig, GrowthPreset, InterventionConfig, RecoveryShape, ScenarioConfig, SensitivityConfig};
use crate::error::FigureError;
use crate::types::{Year, MILLION};
use serde::{Deserialize, Serialize};

/// Base-year values every projection starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBase {
    pub base_year:           Year,
    pub consumption:         f64,
    pub employment:          f64,
    pub gdp:                 f64,
    /// National totals used for the share columns; held constant.
    pub national_gdp:        f64,
    pub national_employment: f64,
}

impl ScenarioBase {
    pub fn new(base_year: Year, consumption: f64, employment: f64, gdp: f64) -> Self {
        Self {
            base_year,
            consumption,
            employment,
            gdp,
            national_gdp: 0.0,
            national_employment: 0.0,
        }
    }

    pub fn with_national_totals(mut self, gdp: f64, employment: f64) -> Self {
        self.national_gdp = gdp;
        self.national_employment = employment;
        self
    }

    pub fn from_aggregates(aggregates: &CoreAggregates, params: &MacroParams, base_year: Year) -> Self {
        Self::new(
            base_year,
            aggregates.internal_tourism_consumption.value(),
            aggregates.total_tourism_fte.value(),
            aggregates.tourism_direct_gdp.value(),
        )
        .with_national_totals(params.total_gdp, params.total_employment)
    }

    fn record(&self, year_offset: u32, consumption: f64, employment: f64, gdp: f64) -> YearRecord {
        YearRecord {
            year_offset,
            year: self.base_year + year_offset as Year,
            consumption,
            employment,
            gdp,
            gdp_share: share(gdp, self.national_gdp),
            employment_share: share(employment, self.national_employment),
        }
    }
}

fn share(part: f64, total: f64) -> Option<f64> {
    (total > 0.0).then(|| part / total * 100.0)
}

fn growth_pct(from: f64, to: f64) -> Option<f64> {
    (from != 0.0).then(|| (to / from - 1.0) * 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year_offset:      u32,
    pub year:             Year,
    pub consumption:      f64,
    pub employment:       f64,
    pub gdp:              f64,
    /// `None` when the national total is not positive.
    pub gdp_share:        Option<f64>,
    pub employment_share: Option<f64>,
}

// ── Growth ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub final_consumption:     f64,
    pub final_employment:      f64,
    pub final_gdp:             f64,
    pub gdp_growth_pct:        Option<f64>,
    pub employment_growth_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub name:    String,
    pub preset:  GrowthPreset,
    /// t = 0..=horizon; record 0 is the unchanged base.
    pub records: Vec<YearRecord>,
    pub summary: ProjectionSummary,
}

impl ScenarioProjection {
    pub fn at(&self, year_offset: u32) -> Option<&YearRecord> {
        self.records.get(year_offset as usize)
    }

    pub fn last(&self) -> Option<&YearRecord> {
        self.records.last()
    }
}

/// Year t: consumption = base × (1+g)^t, employment = base × (1+g·e)^t,
/// GDP = base × (1+g)^t × (1+p)^t.
pub fn project_growth(base: &ScenarioBase, preset: &GrowthPreset, horizon_years: u32) -> ScenarioProjection {
    let g = preset.growth_rate;
    let records: Vec<YearRecord> = (0..=horizon_years)
        .map(|t| {
            let n = t as i32;
            let volume = (1.0 + g).powi(n);
            base.record(
                t,
                base.consumption * volume,
                base.employment * (1.0 + g * preset.employment_elasticity).powi(n),
                base.gdp * volume * (1.0 + preset.productivity_growth).powi(n),
            )
        })
        .collect();

    let last = records.last().cloned().unwrap_or_else(|| base.record(0, base.consumption, base.employment, base.gdp));
    let summary = ProjectionSummary {
        final_consumption:     last.consumption,
        final_employment:      last.employment,
        final_gdp:             last.gdp,
        gdp_growth_pct:        growth_pct(base.gdp, last.gdp),
        employment_growth_pct: growth_pct(base.employment, last.employment),
    };

    ScenarioProjection {
        name: preset.name.clone(),
        preset: preset.clone(),
        records,
        summary,
    }
}

pub fn growth_scenarios(base: &ScenarioBase, presets: &[GrowthPreset], horizon_years: u32) -> Vec<ScenarioProjection> {
    presets.iter().map(|p| project_growth(base, p, horizon_years)).collect()
}

// ── Policy interventions ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionResult {
    pub name:             String,
    pub description:      String,
    pub consumption:      f64,
    pub employment:       f64,
    pub gdp:              f64,
    /// Millions.
    pub delta_gdp:        f64,
    pub delta_employment: f64,
    /// Base currency units.
    pub cost:             f64,
    /// ΔGDP × 1e6 / cost.
    pub roi:              Result<f64, FigureError>,
    /// cost / (ΔGDP × 1e6); only when ΔGDP is positive.
    pub payback_years:    Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyAnalysis {
    pub results:  Vec<InterventionResult>,
    pub best_roi: Option<String>,
    pub best_gdp: Option<String>,
}

pub fn intervention_cost(basis: &CostBasis, base: &ScenarioBase) -> f64 {
    match *basis {
        CostBasis::Fixed { amount } => amount,
        CostBasis::PerJob { amount_per_fte } => amount_per_fte * base.employment,
        CostBasis::ShareOfConsumption { fraction } => fraction * base.consumption * MILLION,
    }
}

pub fn evaluate_intervention(base: &ScenarioBase, intervention: &InterventionConfig) -> InterventionResult {
    let consumption = base.consumption * (1.0 + intervention.consumption_impact);
    let employment = base.employment * (1.0 + intervention.employment_impact);
    let gdp = base.gdp * (1.0 + intervention.gdp_impact);
    let delta_gdp = gdp - base.gdp;
    let cost = intervention_cost(&intervention.cost, base);

    let roi = if cost == 0.0 {
        Err(FigureError::division_undefined(
            &format!("{} roi", intervention.name),
            "intervention cost",
        ))
    } else {
        Ok(delta_gdp * MILLION / cost)
    };

    InterventionResult {
        name: intervention.name.clone(),
        description: intervention.description.clone(),
        consumption,
        employment,
        gdp,
        delta_gdp,
        delta_employment: employment - base.employment,
        cost,
        roi,
        payback_years: (delta_gdp > 0.0).then(|| cost / (delta_gdp * MILLION)),
    }
}

pub fn policy_interventions(base: &ScenarioBase, interventions: &[InterventionConfig]) -> PolicyAnalysis {
    let results: Vec<InterventionResult> = interventions
        .iter()
        .map(|i| evaluate_intervention(base, i))
        .collect();

    // First of equals wins.
    let best_by = |key: &dyn Fn(&InterventionResult) -> Option<f64>| {
        results
            .iter()
            .filter_map(|r| Some((r, key(r)?)))
            .fold(None, |best: Option<(&InterventionResult, f64)>, (r, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((r, v)),
            })
            .map(|(r, _)| r.name.clone())
    };
    let best_roi = best_by(&|r| r.roi.as_ref().ok().copied());
    let best_gdp = best_by(&|r| Some(r.delta_gdp));

    for r in &results {
        if let Err(e) = &r.roi {
            log::warn!("intervention {}: {e}", r.name);
        }
    }

    PolicyAnalysis { results, best_roi, best_gdp }
}

// ── Sensitivity ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityFactor {
    /// Scales base consumption and GDP; employment held.
    TourismRatio,
    /// Scales the preset's productivity growth.
    Productivity,
    /// Scales the preset's employment elasticity.
    EmploymentElasticity,
}

impl SensitivityFactor {
    pub const ALL: [SensitivityFactor; 3] = [
        SensitivityFactor::TourismRatio,
        SensitivityFactor::Productivity,
        SensitivityFactor::EmploymentElasticity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SensitivityFactor::TourismRatio         => "Tourism ratios",
            SensitivityFactor::Productivity         => "Productivity growth",
            SensitivityFactor::EmploymentElasticity => "Employment elasticity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub factor:               SensitivityFactor,
    pub change_pct:           f64,
    pub gdp:                  f64,
    pub employment:           f64,
    pub delta_gdp:            f64,
    pub delta_employment:     f64,
    pub delta_gdp_pct:        Option<f64>,
    pub delta_employment_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    pub reference_preset:     String,
    pub horizon_years:        u32,
    pub reference_gdp:        f64,
    pub reference_employment: f64,
    /// Grouped by factor, then in sweep order.
    pub points:               Vec<SensitivityPoint>,
}

impl SensitivityAnalysis {
    pub fn for_factor(&self, factor: SensitivityFactor) -> impl Iterator<Item = &SensitivityPoint> {
        self.points.iter().filter(move |p| p.factor == factor)
    }
}

/// One-factor-at-a-time sweep measured at the horizon against the
/// unperturbed reference projection.
pub fn sensitivity_analysis(base: &ScenarioBase, preset: &GrowthPreset, config: &SensitivityConfig) -> SensitivityAnalysis {
    let horizon = config.horizon_years;
    let at_horizon = |b: &ScenarioBase, p: &GrowthPreset| {
        let projection = project_growth(b, p, horizon);
        projection
            .last()
            .map_or((b.gdp, b.employment), |r| (r.gdp, r.employment))
    };
    let (reference_gdp, reference_employment) = at_horizon(base, preset);

    let mut points = Vec::with_capacity(SensitivityFactor::ALL.len() * config.changes_pct.len());
    for factor in SensitivityFactor::ALL {
        for &change_pct in &config.changes_pct {
            let scale = 1.0 + change_pct / 100.0;
            let mut b = base.clone();
            let mut p = preset.clone();
            match factor {
                SensitivityFactor::TourismRatio => {
                    b.consumption *= scale;
                    b.gdp *= scale;
                }
                SensitivityFactor::Productivity => p.productivity_growth *= scale,
                SensitivityFactor::EmploymentElasticity => p.employment_elasticity *= scale,
            }
            let (gdp, employment) = at_horizon(&b, &p);
            points.push(SensitivityPoint {
                factor,
                change_pct,
                gdp,
                employment,
                delta_gdp: gdp - reference_gdp,
                delta_employment: employment - reference_employment,
                delta_gdp_pct: growth_pct(reference_gdp, gdp),
                delta_employment_pct: growth_pct(reference_employment, employment),
            });
        }
    }

    SensitivityAnalysis {
        reference_preset: preset.name.clone(),
        horizon_years: horizon,
        reference_gdp,
        reference_employment,
        points,
    }
}

// ── Crisis recovery ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisPath {
    pub shape:               RecoveryShape,
    /// Demand level per path year as a fraction of pre-crisis.
    pub demand_fractions:    Vec<f64>,
    /// t = 0 pre-crisis, t = 1 shock, t ≥ 2 recovery years.
    pub records:             Vec<YearRecord>,
    /// Σ (base GDP − GDP_t) over t ≥ 1, millions.
    pub cumulative_gdp_loss: f64,
}

impl CrisisPath {
    /// Record at recovery year `n` (1-based).
    pub fn recovery_year(&self, n: usize) -> Option<&YearRecord> {
        self.records.get(n + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisAnalysis {
    pub demand_shock:     f64,
    /// resilience × demand shock.
    pub employment_shock: f64,
    pub paths:            Vec<CrisisPath>,
}

impl CrisisAnalysis {
    pub fn path(&self, shape: RecoveryShape) -> Option<&CrisisPath> {
        self.paths.iter().find(|p| p.shape == shape)
    }
}

pub fn crisis_recovery(base: &ScenarioBase, config: &CrisisConfig) -> CrisisAnalysis {
    let paths = config
        .paths
        .iter()
        .map(|path| {
            let demand_fractions: Vec<f64> = std::iter::once(1.0)
                .chain(std::iter::once(1.0 - config.demand_shock))
                .chain(path.recovery_fractions.iter().copied())
                .collect();

            let records: Vec<YearRecord> = demand_fractions
                .iter()
                .enumerate()
                .map(|(t, &d)| {
                    let employment_fraction = 1.0 - config.employment_resilience * (1.0 - d);
                    base.record(
                        t as u32,
                        base.consumption * d,
                        base.employment * employment_fraction,
                        base.gdp * d,
                    )
                })
                .collect();

            let cumulative_gdp_loss = records.iter().skip(1).map(|r| base.gdp - r.gdp).sum();

            CrisisPath {
                shape: path.shape,
                demand_fractions,
                records,
                cumulative_gdp_loss,
            }
        })
        .collect();

    CrisisAnalysis {
        demand_shock: config.demand_shock,
        employment_shock: config.employment_resilience * config.demand_shock,
        paths,
    }
}

// ── Suite ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSuite {
    pub base:        ScenarioBase,
    pub growth:      Vec<ScenarioProjection>,
    pub policy:      PolicyAnalysis,
    pub sensitivity: SensitivityAnalysis,
    pub crisis:      CrisisAnalysis,
}

impl ScenarioSuite {
    pub fn projection(&self, name: &str) -> Option<&ScenarioProjection> {
        self.growth.iter().find(|p| p.name == name)
    }
}

pub fn run_scenarios(base: &ScenarioBase, config: &ScenarioConfig) -> ScenarioSuite {
    let reference = match config.preset(&config.sensitivity.reference_preset) {
        Some(p) => p.clone(),
        None => {
            log::warn!(
                "sensitivity reference preset '{}' not configured; using realistic defaults",
                config.sensitivity.reference_preset
            );
            GrowthPreset::realistic()
        }
    };

    let suite = ScenarioSuite {
        base:        base.clone(),
        growth:      growth_scenarios(base, &config.growth_presets, config.horizon_years),
        policy:      policy_interventions(base, &config.interventions),
        sensitivity: sensitivity_analysis(base, &reference, &config.sensitivity),
        crisis:      crisis_recovery(base, &config.crisis),
    };

    log::debug!(
        "scenarios: {} projections over {} years, {} interventions, {} sensitivity points, {} crisis paths",
        suite.growth.len(),
        config.horizon_years,
        suite.policy.results.len(),
        suite.sensitivity.points.len(),
        suite.crisis.paths.len()
    );

    suite
}
