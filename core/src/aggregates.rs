//! Core TSA aggregates.
//!
//! Every figure carries its provenance: `Figure::Direct` when read from
//! the tables, `Figure::Estimated` when a documented fallback produced
//! it. Figures that cannot be computed are held as `Err(FigureError)`
//! next to the ones that could; one bad parameter never poisons an
//! unrelated figure.
//!
//! IDENTITY: tourism_direct_gdp = tourism_direct_gva + tourism_taxes,
//! always, computed by that one addition.

use crate::config::TsaConfig;
use crate::error::FigureError;
use crate::ratios::resolve_ratios;
use crate::table::{columns as col, Table, TableRegistry};
use crate::types::MILLION;
use serde::{Deserialize, Serialize};

/// Macro-economic parameters supplied with the tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroParams {
    pub country_name:     String,
    pub population:       f64,
    /// National GDP, millions of base currency units.
    pub total_gdp:        f64,
    /// National employment, FTE.
    pub total_employment: f64,
}

impl Default for MacroParams {
    fn default() -> Self {
        Self {
            country_name:     "Country".into(),
            population:       10_000_000.0,
            total_gdp:        200_000.0,
            total_employment: 4_000_000.0,
        }
    }
}

/// The documented approximation behind an estimated figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum EstimationMethod {
    /// Inbound/domestic columns absent: inbound = 0, domestic = total.
    ExpenditureSplitFallback,
    /// GVA = Σ ratio × supply × gva_to_output_ratio.
    GvaFromOutputRatio { gva_to_output_ratio: f64 },
    /// Taxes = tax_rate × GVA.
    TaxesFromGvaRate { tax_rate: f64 },
    /// Derived from inputs estimated by different methods.
    FromEstimatedComponents,
}

impl EstimationMethod {
    pub fn describe(&self) -> String {
        match self {
            Self::ExpenditureSplitFallback => {
                "inbound/domestic split not reported; all internal expenditure treated as domestic".into()
            }
            Self::GvaFromOutputRatio { gva_to_output_ratio } => format!(
                "value added estimated from tourism supply at a {gva_to_output_ratio:.2} GVA-to-output ratio"
            ),
            Self::TaxesFromGvaRate { tax_rate } => {
                format!("taxes estimated at {:.1}% of tourism value added", tax_rate * 100.0)
            }
            Self::FromEstimatedComponents => "derived from estimated components".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Figure {
    Direct(f64),
    Estimated { value: f64, method: EstimationMethod },
}

impl Figure {
    pub fn value(&self) -> f64 {
        match *self {
            Figure::Direct(v) => v,
            Figure::Estimated { value, .. } => value,
        }
    }

    pub fn is_estimated(&self) -> bool {
        matches!(self, Figure::Estimated { .. })
    }

    pub fn method(&self) -> Option<EstimationMethod> {
        match *self {
            Figure::Direct(_) => None,
            Figure::Estimated { method, .. } => Some(method),
        }
    }

    /// A value computed from `inputs` inherits their provenance: direct
    /// if all are direct, the shared method if one method, otherwise
    /// `FromEstimatedComponents`.
    pub fn derived(value: f64, inputs: &[Figure]) -> Figure {
        let mut methods = inputs.iter().filter_map(Figure::method);
        match methods.next() {
            None => Figure::Direct(value),
            Some(first) => {
                let method = if methods.all(|m| m == first) {
                    first
                } else {
                    EstimationMethod::FromEstimatedComponents
                };
                Figure::Estimated { value, method }
            }
        }
    }
}

pub type FigureResult = Result<Figure, FigureError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreAggregates {
    // Demand side
    pub internal_tourism_consumption: Figure,
    pub inbound_expenditure:          Figure,
    pub domestic_expenditure:         Figure,
    pub inbound_share:                FigureResult,
    pub domestic_share:               FigureResult,
    pub consumption_per_capita:       FigureResult,
    // Supply side
    pub tourism_direct_gva:           Figure,
    pub tourism_taxes:                Figure,
    pub tourism_direct_gdp:           Figure,
    pub tourism_gdp_share:            FigureResult,
    // Employment
    pub total_tourism_fte:            Figure,
    pub tourism_employment_share:     FigureResult,
    /// Base currency units of GDP per FTE job.
    pub labor_productivity:           FigureResult,
    /// Consumption / GDP.
    pub tourism_multiplier:           FigureResult,
}

impl CoreAggregates {
    fn named_figures(&self) -> [(&'static str, Result<&Figure, &FigureError>); 14] {
        [
            ("internal_tourism_consumption", Ok(&self.internal_tourism_consumption)),
            ("inbound_expenditure", Ok(&self.inbound_expenditure)),
            ("domestic_expenditure", Ok(&self.domestic_expenditure)),
            ("inbound_share", self.inbound_share.as_ref()),
            ("domestic_share", self.domestic_share.as_ref()),
            ("consumption_per_capita", self.consumption_per_capita.as_ref()),
            ("tourism_direct_gva", Ok(&self.tourism_direct_gva)),
            ("tourism_taxes", Ok(&self.tourism_taxes)),
            ("tourism_direct_gdp", Ok(&self.tourism_direct_gdp)),
            ("tourism_gdp_share", self.tourism_gdp_share.as_ref()),
            ("total_tourism_fte", Ok(&self.total_tourism_fte)),
            ("tourism_employment_share", self.tourism_employment_share.as_ref()),
            ("labor_productivity", self.labor_productivity.as_ref()),
            ("tourism_multiplier", self.tourism_multiplier.as_ref()),
        ]
    }

    /// Every estimated figure with the method behind it.
    pub fn estimation_flags(&self) -> Vec<(&'static str, EstimationMethod)> {
        self.named_figures()
            .into_iter()
            .filter_map(|(name, fig)| Some((name, fig.ok()?.method()?)))
            .collect()
    }

    /// Every figure that could not be computed, with the reason.
    pub fn undefined_figures(&self) -> Vec<(&'static str, FigureError)> {
        self.named_figures()
            .into_iter()
            .filter_map(|(name, fig)| fig.err().map(|e| (name, e.clone())))
            .collect()
    }

    pub fn gdp_share_value(&self) -> Option<f64> {
        self.tourism_gdp_share.as_ref().ok().map(Figure::value)
    }

    pub fn productivity_value(&self) -> Option<f64> {
        self.labor_productivity.as_ref().ok().map(Figure::value)
    }
}

pub fn compute_aggregates(
    registry: &TableRegistry,
    params:   &MacroParams,
    config:   &TsaConfig,
) -> CoreAggregates {
    let consumption_table = registry.consumption();
    let supply_table = registry.supply_demand();
    let employment_table = registry.employment();

    // ── Demand side ────────────────────────────────────────────

    let consumption = Figure::Direct(sum_or_zero(consumption_table, col::INTERNAL_TOURISM_CONSUMPTION));
    let (inbound, domestic) = expenditure_split(consumption_table, consumption.value());

    let split_total = inbound.value() + domestic.value();
    let share_of_split = |part: Figure, name: &str| {
        if split_total == 0.0 {
            Err(FigureError::division_undefined(name, "total tourism expenditure"))
        } else {
            Ok(Figure::derived(part.value() / split_total * 100.0, &[inbound, domestic]))
        }
    };
    let inbound_share = share_of_split(inbound, "inbound_share");
    let domestic_share = share_of_split(domestic, "domestic_share");

    let consumption_per_capita = positive(params.population, "population")
        .map(|pop| Figure::derived(consumption.value() * MILLION / pop, &[consumption]));

    // ── Supply side ────────────────────────────────────────────

    let resolved = supply_table
        .map(|t| resolve_ratios(t, config.ratio.tolerance_pp))
        .unwrap_or_default();

    let gva = match employment_table.and_then(|t| t.sum(col::GVA_TOURISM_SHARE)) {
        Some(direct) => Figure::Direct(direct),
        None => {
            let r = config.estimation.gva_to_output_ratio;
            let value = resolved
                .iter()
                .filter_map(|row| Some(row.ratio? / 100.0 * row.supply? * r))
                .sum();
            log::warn!("tourism GVA estimated from supply at GVA/output ratio {r}");
            Figure::Estimated {
                value,
                method: EstimationMethod::GvaFromOutputRatio { gva_to_output_ratio: r },
            }
        }
    };

    let taxes = match supply_table.filter(|t| t.has_column(col::TAXES_LESS_SUBSIDIES)) {
        Some(table) => {
            let value = resolved
                .iter()
                .enumerate()
                .filter_map(|(i, row)| Some(table.value(i, col::TAXES_LESS_SUBSIDIES)? * row.ratio? / 100.0))
                .sum();
            Figure::Direct(value)
        }
        None => {
            let rate = config.estimation.tax_rate_on_gva;
            log::warn!("tourism taxes estimated at {rate} of GVA");
            Figure::Estimated {
                value:  gva.value() * rate,
                method: EstimationMethod::TaxesFromGvaRate { tax_rate: rate },
            }
        }
    };

    let gdp = Figure::derived(gva.value() + taxes.value(), &[gva, taxes]);

    let tourism_gdp_share = positive(params.total_gdp, "total_gdp")
        .map(|total| Figure::derived(gdp.value() / total * 100.0, &[gdp]));

    // ── Employment ─────────────────────────────────────────────

    let fte = Figure::Direct(sum_or_zero(employment_table, col::FTE_JOBS));

    let tourism_employment_share = positive(params.total_employment, "total_employment")
        .map(|total| Figure::derived(fte.value() / total * 100.0, &[fte]));

    let labor_productivity = if fte.value() == 0.0 {
        Err(FigureError::division_undefined("labor_productivity", "total tourism FTE"))
    } else {
        Ok(Figure::derived(gdp.value() * MILLION / fte.value(), &[gdp, fte]))
    };

    let tourism_multiplier = if gdp.value() == 0.0 {
        Err(FigureError::division_undefined("tourism_multiplier", "tourism direct GDP"))
    } else {
        Ok(Figure::derived(consumption.value() / gdp.value(), &[consumption, gdp]))
    };

    let aggregates = CoreAggregates {
        internal_tourism_consumption: consumption,
        inbound_expenditure: inbound,
        domestic_expenditure: domestic,
        inbound_share,
        domestic_share,
        consumption_per_capita,
        tourism_direct_gva: gva,
        tourism_taxes: taxes,
        tourism_direct_gdp: gdp,
        tourism_gdp_share,
        total_tourism_fte: fte,
        tourism_employment_share,
        labor_productivity,
        tourism_multiplier,
    };

    for (name, err) in aggregates.undefined_figures() {
        log::warn!("{name}: {err}");
    }
    log::debug!(
        "aggregates: consumption={:.1} gva={:.1} taxes={:.1} gdp={:.1} fte={:.0} estimated={}",
        consumption.value(),
        gva.value(),
        taxes.value(),
        gdp.value(),
        fte.value(),
        aggregates.estimation_flags().len()
    );

    aggregates
}

fn sum_or_zero(table: Option<&Table>, column: &str) -> f64 {
    table.and_then(|t| t.sum(column)).unwrap_or(0.0)
}

fn positive(value: f64, name: &str) -> Result<f64, FigureError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(FigureError::invalid_parameter(name, value))
    }
}

/// Inbound and domestic expenditure. Both columns present: direct.
/// One present: the other is the residual of internal expenditure.
/// Neither: inbound = 0, domestic = internal expenditure.
fn expenditure_split(table: Option<&Table>, consumption: f64) -> (Figure, Figure) {
    let inbound = table.and_then(|t| t.sum(col::INBOUND_EXPENDITURE));
    let domestic = table.and_then(|t| t.sum(col::DOMESTIC_EXPENDITURE));
    let internal = table
        .and_then(|t| t.sum(col::INTERNAL_EXPENDITURE))
        .unwrap_or(consumption);

    let fallback = |value: f64| Figure::Estimated {
        value,
        method: EstimationMethod::ExpenditureSplitFallback,
    };

    match (inbound, domestic) {
        (Some(i), Some(d)) => (Figure::Direct(i), Figure::Direct(d)),
        (Some(i), None) => (Figure::Direct(i), fallback((internal - i).max(0.0))),
        (None, Some(d)) => (fallback((internal - d).max(0.0)), Figure::Direct(d)),
        (None, None) => {
            log::warn!("expenditure split not reported; domestic = internal expenditure");
            (fallback(0.0), fallback(internal))
        }
    }
}
