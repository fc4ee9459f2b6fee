//! Engine configuration.
//!
//! Every constant the formulas depend on lives here with its default.
//! None of the defaults carry a calibration basis; callers override
//! them through `TsaConfig::load` or by editing the struct directly.

use crate::error::{TsaError, TsaResult};
use crate::types::Year;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ── Aggregate estimation ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    /// GVA-to-output ratio applied to tourism supply when no direct
    /// GVA measure is available.
    pub gva_to_output_ratio: f64,
    /// Tax rate on GVA used when taxes less subsidies are not reported.
    pub tax_rate_on_gva: f64,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            gva_to_output_ratio: 0.4,
            tax_rate_on_gva:     0.15,
        }
    }
}

// ── Ratio analysis ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioConfig {
    /// Maximum gap, in percentage points, between a supplied ratio and
    /// consumption / supply before the supplied value is replaced.
    pub tolerance_pp: f64,
    pub highly_specialized_above: f64,
    pub characteristic_above: f64,
    pub mixed_use_min: f64,
    pub mixed_use_max: f64,
    pub high_intensity_above: f64,
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            tolerance_pp:             1.0,
            highly_specialized_above: 80.0,
            characteristic_above:     25.0,
            mixed_use_min:            5.0,
            mixed_use_max:            25.0,
            high_intensity_above:     50.0,
        }
    }
}

// ── Employment analysis ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmploymentConfig {
    /// HHI below this is competitive.
    pub moderate_hhi: f64,
    /// HHI at or above this is highly concentrated.
    pub concentrated_hhi: f64,
}

impl Default for EmploymentConfig {
    fn default() -> Self {
        Self {
            moderate_hhi:     0.15,
            concentrated_hhi: 0.25,
        }
    }
}

// ── Quality scoring ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Discrepancy % at or above which the severe deduction applies.
    pub consistency_severe_pct: f64,
    /// Discrepancy % above which the minor deduction applies.
    pub consistency_minor_pct: f64,
    pub consistency_severe_points: f64,
    pub consistency_minor_points: f64,

    pub extreme_ratio_pct: f64,
    pub high_ratio_pct: f64,
    pub extreme_ratio_points: f64,
    pub high_ratio_points: f64,

    pub points_per_missing_value: f64,
    pub max_missing_points: f64,

    /// Relative tolerance between computed and reported supply.
    pub balance_tolerance: f64,
    /// Share of rows out of tolerance that triggers the deduction.
    pub balance_row_share: f64,
    pub balance_points: f64,

    pub bands: QualityBands,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            consistency_severe_pct:    5.0,
            consistency_minor_pct:     1.0,
            consistency_severe_points: 25.0,
            consistency_minor_points:  15.0,
            extreme_ratio_pct:         200.0,
            high_ratio_pct:            150.0,
            extreme_ratio_points:      30.0,
            high_ratio_points:         15.0,
            points_per_missing_value:  2.0,
            max_missing_points:        20.0,
            balance_tolerance:         0.05,
            balance_row_share:         0.10,
            balance_points:            25.0,
            bands:                     QualityBands::default(),
        }
    }
}

/// Lower score bounds of each rating band.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityBands {
    pub excellent:  f64,
    pub very_good:  f64,
    pub good:       f64,
    pub acceptable: f64,
}

impl Default for QualityBands {
    fn default() -> Self {
        Self {
            excellent:  95.0,
            very_good:  85.0,
            good:       75.0,
            acceptable: 60.0,
        }
    }
}

// ── Scenarios ──────────────────────────────────────────────────

/// Longest projection or sensitivity horizon `validate` accepts.
pub const MAX_HORIZON_YEARS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPreset {
    pub name: String,
    pub growth_rate: f64,
    pub employment_elasticity: f64,
    pub productivity_growth: f64,
}

impl GrowthPreset {
    pub fn new(name: &str, growth_rate: f64, employment_elasticity: f64, productivity_growth: f64) -> Self {
        Self {
            name: name.into(),
            growth_rate,
            employment_elasticity,
            productivity_growth,
        }
    }

    pub fn pessimistic() -> Self {
        Self::new("pessimistic", 0.01, 0.8, 0.005)
    }

    pub fn realistic() -> Self {
        Self::new("realistic", 0.04, 0.9, 0.02)
    }

    pub fn optimistic() -> Self {
        Self::new("optimistic", 0.07, 1.1, 0.03)
    }
}

/// How an intervention's cost is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum CostBasis {
    /// Flat cost in base currency units.
    Fixed { amount: f64 },
    /// Cost per base-year FTE job, in base currency units.
    PerJob { amount_per_fte: f64 },
    /// Fraction of base-year consumption (millions) converted to base units.
    ShareOfConsumption { fraction: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionConfig {
    pub name: String,
    pub description: String,
    pub consumption_impact: f64,
    pub employment_impact: f64,
    pub gdp_impact: f64,
    pub cost: CostBasis,
}

impl InterventionConfig {
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                name:               "marketing_boost".into(),
                description:        "Intensive international marketing campaign".into(),
                consumption_impact: 0.15,
                employment_impact:  0.10,
                gdp_impact:         0.15,
                cost:               CostBasis::Fixed { amount: 50.0e6 },
            },
            Self {
                name:               "infrastructure_investment".into(),
                description:        "Major tourism infrastructure development".into(),
                consumption_impact: 0.25,
                employment_impact:  0.20,
                gdp_impact:         0.25,
                cost:               CostBasis::Fixed { amount: 500.0e6 },
            },
            Self {
                name:               "skills_development".into(),
                description:        "Comprehensive workforce training program".into(),
                consumption_impact: 0.05,
                employment_impact:  0.05,
                gdp_impact:         0.20,
                cost:               CostBasis::PerJob { amount_per_fte: 2_000.0 },
            },
            Self {
                name:               "digital_transformation".into(),
                description:        "Tourism sector digitalization initiative".into(),
                consumption_impact: 0.10,
                employment_impact:  -0.05,
                gdp_impact:         0.18,
                cost:               CostBasis::Fixed { amount: 150.0e6 },
            },
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    /// Percentage changes applied to each factor in turn.
    pub changes_pct: Vec<f64>,
    pub horizon_years: u32,
    /// Growth preset the sweep perturbs.
    pub reference_preset: String,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            changes_pct:      vec![-20.0, -10.0, -5.0, 5.0, 10.0, 20.0],
            horizon_years:    5,
            reference_preset: "realistic".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryShape {
    V,
    U,
    L,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryPathConfig {
    pub shape: RecoveryShape,
    /// Demand level in recovery years 1..=n, as a fraction of pre-crisis.
    pub recovery_fractions: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrisisConfig {
    /// Fractional demand loss in the shock year.
    pub demand_shock: f64,
    /// Employment loss per unit of demand loss.
    pub employment_resilience: f64,
    pub paths: Vec<RecoveryPathConfig>,
}

impl Default for CrisisConfig {
    fn default() -> Self {
        Self {
            demand_shock:          0.40,
            employment_resilience: 0.8,
            paths: vec![
                RecoveryPathConfig {
                    shape:              RecoveryShape::V,
                    recovery_fractions: vec![0.85, 0.97, 1.00],
                },
                RecoveryPathConfig {
                    shape:              RecoveryShape::U,
                    recovery_fractions: vec![0.70, 0.85, 0.95],
                },
                RecoveryPathConfig {
                    shape:              RecoveryShape::L,
                    recovery_fractions: vec![0.62, 0.66, 0.70],
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub base_year: Year,
    pub horizon_years: u32,
    pub growth_presets: Vec<GrowthPreset>,
    pub interventions: Vec<InterventionConfig>,
    pub sensitivity: SensitivityConfig,
    pub crisis: CrisisConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            base_year:      2024,
            horizon_years:  5,
            growth_presets: vec![
                GrowthPreset::pessimistic(),
                GrowthPreset::realistic(),
                GrowthPreset::optimistic(),
            ],
            interventions:  InterventionConfig::defaults(),
            sensitivity:    SensitivityConfig::default(),
            crisis:         CrisisConfig::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn preset(&self, name: &str) -> Option<&GrowthPreset> {
        self.growth_presets.iter().find(|p| p.name == name)
    }
}

// ── Insights ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    /// GDP share (%) bounds for Very High / High / Moderate significance.
    pub significance_very_high: f64,
    pub significance_high: f64,
    pub significance_moderate: f64,

    /// Productivity (base units per FTE) bounds.
    pub productivity_excellent: f64,
    pub productivity_high: f64,
    pub productivity_moderate: f64,

    /// Count of products above `specialization_ratio`.
    pub specialization_very_high_count: usize,
    pub specialization_high_count: usize,
    pub specialization_ratio: f64,
    pub specialization_mean_ratio: f64,

    /// GDP share below which tourism is flagged as under-developed.
    pub growth_potential_share: f64,
    /// Top-3 employment share above which the industry mix is concentrated.
    pub top3_concentration_share: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            significance_very_high:         15.0,
            significance_high:              10.0,
            significance_moderate:          5.0,
            productivity_excellent:         100_000.0,
            productivity_high:              80_000.0,
            productivity_moderate:          60_000.0,
            specialization_very_high_count: 10,
            specialization_high_count:      5,
            specialization_ratio:           100.0,
            specialization_mean_ratio:      30.0,
            growth_potential_share:         3.0,
            top3_concentration_share:       70.0,
        }
    }
}

// ── Root ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TsaConfig {
    pub estimation: EstimationConfig,
    pub ratio:      RatioConfig,
    pub employment: EmploymentConfig,
    pub quality:    QualityConfig,
    pub scenario:   ScenarioConfig,
    pub insight:    InsightThresholds,
}

impl TsaConfig {
    /// Load overrides from a JSON file. Absent sections and fields
    /// keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> TsaResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> TsaResult<Self> {
        let config: TsaConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the formulas cannot work with.
    pub fn validate(&self) -> TsaResult<()> {
        let e = &self.estimation;
        if !(e.gva_to_output_ratio > 0.0 && e.gva_to_output_ratio <= 1.0) {
            return Err(invalid(format!(
                "gva_to_output_ratio must be in (0, 1], got {}",
                e.gva_to_output_ratio
            )));
        }
        if e.tax_rate_on_gva < 0.0 {
            return Err(invalid(format!(
                "tax_rate_on_gva must be non-negative, got {}",
                e.tax_rate_on_gva
            )));
        }
        if self.ratio.tolerance_pp < 0.0 {
            return Err(invalid("ratio tolerance_pp must be non-negative".into()));
        }
        if self.employment.moderate_hhi > self.employment.concentrated_hhi {
            return Err(invalid("moderate_hhi must not exceed concentrated_hhi".into()));
        }
        let s = &self.scenario;
        if s.growth_presets.is_empty() {
            return Err(invalid("at least one growth preset is required".into()));
        }
        if let Some(p) = s.growth_presets.iter().find(|p| p.growth_rate <= -1.0) {
            return Err(invalid(format!("growth preset '{}' has growth_rate <= -100%", p.name)));
        }
        for (name, horizon) in [
            ("scenario horizon_years", s.horizon_years),
            ("sensitivity horizon_years", s.sensitivity.horizon_years),
        ] {
            if horizon > MAX_HORIZON_YEARS {
                return Err(invalid(format!("{name} must be at most {MAX_HORIZON_YEARS}, got {horizon}")));
            }
        }
        if !(0.0..1.0).contains(&s.crisis.demand_shock) {
            return Err(invalid(format!(
                "crisis demand_shock must be in [0, 1), got {}",
                s.crisis.demand_shock
            )));
        }
        s.crisis.check_path_order()?;
        Ok(())
    }
}

impl CrisisConfig {
    /// Demand level in the last configured recovery year, at most year 3.
    pub fn year3_fraction(&self, shape: RecoveryShape) -> Option<f64> {
        let path = self.paths.iter().find(|p| p.shape == shape)?;
        path.recovery_fractions
            .get(2)
            .or_else(|| path.recovery_fractions.last())
            .copied()
    }

    /// V recovers at least as far as U, and U as L, by year 3.
    fn check_path_order(&self) -> TsaResult<()> {
        use RecoveryShape::{L, U, V};
        for (fast, slow) in [(V, U), (U, L), (V, L)] {
            if let (Some(faster), Some(slower)) = (self.year3_fraction(fast), self.year3_fraction(slow)) {
                if faster < slower {
                    return Err(invalid(format!(
                        "crisis path {fast:?} recovers to {faster} by year 3, below {slow:?} at {slower}"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn invalid(reason: String) -> TsaError {
    TsaError::InvalidConfig { reason }
}
