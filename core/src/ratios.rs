//! Tourism ratio analysis per product.
//!
//! The tourism ratio is the share of a product's domestic supply
//! consumed by tourism: consumption / supply × 100. A supplied ratio
//! column is trusted while it agrees with that quotient within the
//! configured tolerance.

use crate::config::RatioConfig;
use crate::table::{columns as col, Table, TableRegistry};
use crate::types::ProductId;
use serde::{Deserialize, Serialize};

/// Where a row's ratio came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioSource {
    /// Supplied value, agrees with consumption / supply.
    Supplied,
    /// Supplied value disagreed beyond tolerance and was replaced.
    Recomputed,
    /// No supplied value; computed from consumption / supply.
    Computed,
    /// Supplied value kept because supply was zero or missing.
    SuppliedUnverified,
}

/// Intensity bins, lowest bound inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Intensity {
    pub const ALL: [Intensity; 5] = [
        Intensity::VeryLow,
        Intensity::Low,
        Intensity::Medium,
        Intensity::High,
        Intensity::VeryHigh,
    ];

    /// [0,10) [10,30) [30,50) [50,100) [100,∞). Negative ratios fall
    /// in the lowest bin.
    pub fn classify(ratio: f64) -> Self {
        if ratio >= 100.0 {
            Intensity::VeryHigh
        } else if ratio >= 50.0 {
            Intensity::High
        } else if ratio >= 30.0 {
            Intensity::Medium
        } else if ratio >= 10.0 {
            Intensity::Low
        } else {
            Intensity::VeryLow
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Intensity::VeryLow  => "Very Low (<10%)",
            Intensity::Low      => "Low (10-30%)",
            Intensity::Medium   => "Medium (30-50%)",
            Intensity::High     => "High (50-100%)",
            Intensity::VeryHigh => "Very High (>100%)",
        }
    }
}

/// A Supply-Demand row with its ratio resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRatio {
    pub product:     ProductId,
    pub consumption: Option<f64>,
    pub supply:      Option<f64>,
    pub supplied:    Option<f64>,
    /// `None` when neither a supplied ratio nor a non-zero supply exists.
    pub ratio:       Option<f64>,
    pub source:      Option<RatioSource>,
}

/// Resolve every row's ratio. Shared by the aggregate calculator, the
/// ratio analyzer and the quality scorer so they agree row by row.
pub fn resolve_ratios(table: &Table, tolerance_pp: f64) -> Vec<ResolvedRatio> {
    (0..table.len())
        .map(|i| {
            let consumption = table.value(i, col::INTERNAL_TOURISM_CONSUMPTION);
            let supply = table.value(i, col::DOMESTIC_SUPPLY);
            let supplied = table.value(i, col::TOURISM_RATIO);

            let computed = match (consumption, supply) {
                (Some(c), Some(s)) if s != 0.0 => Some(c / s * 100.0),
                _ => None,
            };

            let (ratio, source) = match (supplied, computed) {
                (Some(s), Some(c)) if (s - c).abs() > tolerance_pp => (Some(c), Some(RatioSource::Recomputed)),
                (Some(s), Some(_)) => (Some(s), Some(RatioSource::Supplied)),
                (Some(s), None) => (Some(s), Some(RatioSource::SuppliedUnverified)),
                (None, Some(c)) => (Some(c), Some(RatioSource::Computed)),
                (None, None) => (None, None),
            };

            ResolvedRatio {
                product: table.rows()[i].key.clone(),
                consumption,
                supply,
                supplied,
                ratio,
                source,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    pub product:     ProductId,
    pub ratio:       f64,
    pub source:      RatioSource,
    pub intensity:   Intensity,
    pub consumption: Option<f64>,
    pub supply:      Option<f64>,
    /// Share of total tourism consumption across analyzed rows.
    pub consumption_share: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioSegments {
    pub highly_specialized: Vec<ProductId>,
    pub characteristic:     Vec<ProductId>,
    pub mixed_use:          Vec<ProductId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityCount {
    pub intensity: Intensity,
    pub label:     String,
    pub count:     usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioAnalysis {
    /// Sorted by descending ratio, ties by product id.
    pub rows: Vec<RatioRow>,
    /// Products whose ratio could not be determined.
    pub undefined_products: Vec<ProductId>,
    /// Arithmetic mean of per-row ratios: the typical product.
    pub unweighted_mean: Option<f64>,
    /// Σconsumption / Σsupply × 100: aggregate intensity.
    pub weighted_mean: Option<f64>,
    pub max_ratio: Option<f64>,
    pub high_intensity_count: usize,
    pub recomputed_count: usize,
    pub distribution: Vec<IntensityCount>,
    pub segments: RatioSegments,
}

impl RatioAnalysis {
    pub fn top(&self) -> Option<&RatioRow> {
        self.rows.first()
    }

    pub fn count_above(&self, threshold: f64) -> usize {
        self.rows.iter().filter(|r| r.ratio > threshold).count()
    }

    /// Rows at or above `min_ratio`, optionally restricted to one bin.
    pub fn filter(&self, min_ratio: f64, intensity: Option<Intensity>) -> Vec<&RatioRow> {
        self.rows
            .iter()
            .filter(|r| r.ratio >= min_ratio)
            .filter(|r| intensity.map_or(true, |i| r.intensity == i))
            .collect()
    }
}

pub fn analyze_ratios(registry: &TableRegistry, config: &RatioConfig) -> RatioAnalysis {
    let Some(table) = registry.supply_demand() else {
        log::warn!("ratio analysis skipped: supply-demand table not provided");
        return RatioAnalysis {
            distribution: distribution(&[]),
            ..RatioAnalysis::default()
        };
    };

    let mut resolved = resolve_ratios(table, config.tolerance_pp);

    // Sum in key order so the totals do not depend on row order.
    resolved.sort_by(|a, b| a.product.cmp(&b.product));
    let (sum_c, sum_s) = resolved
        .iter()
        .filter_map(|r| Some((r.consumption?, r.supply?)))
        .fold((0.0, 0.0), |(c, s), (rc, rs)| (c + rc, s + rs));
    let weighted_mean = (sum_s != 0.0).then(|| sum_c / sum_s * 100.0);

    let mut undefined_products = Vec::new();
    let mut rows: Vec<RatioRow> = Vec::with_capacity(resolved.len());
    for r in resolved {
        match (r.ratio, r.source) {
            (Some(ratio), Some(source)) => rows.push(RatioRow {
                product: r.product,
                ratio,
                source,
                intensity: Intensity::classify(ratio),
                consumption: r.consumption,
                supply: r.supply,
                consumption_share: None,
            }),
            _ => undefined_products.push(r.product),
        }
    }

    if !undefined_products.is_empty() {
        log::warn!(
            "tourism ratio undefined for {} products (no ratio, zero supply): {:?}",
            undefined_products.len(),
            undefined_products
        );
    }

    // `rows` is still in key order here.
    let total_consumption: f64 = rows.iter().filter_map(|r| r.consumption).sum();
    let unweighted_mean = (!rows.is_empty())
        .then(|| rows.iter().map(|r| r.ratio).sum::<f64>() / rows.len() as f64);

    for row in &mut rows {
        row.consumption_share = match row.consumption {
            Some(c) if total_consumption != 0.0 => Some(c / total_consumption * 100.0),
            _ => None,
        };
    }

    rows.sort_by(|a, b| {
        b.ratio
            .total_cmp(&a.ratio)
            .then_with(|| a.product.cmp(&b.product))
    });

    let segments = RatioSegments {
        highly_specialized: select(&rows, |r| r > config.highly_specialized_above),
        characteristic:     select(&rows, |r| r > config.characteristic_above),
        mixed_use:          select(&rows, |r| r >= config.mixed_use_min && r <= config.mixed_use_max),
    };

    let analysis = RatioAnalysis {
        max_ratio: rows.first().map(|r| r.ratio),
        high_intensity_count: rows.iter().filter(|r| r.ratio > config.high_intensity_above).count(),
        recomputed_count: rows.iter().filter(|r| r.source == RatioSource::Recomputed).count(),
        distribution: distribution(&rows),
        rows,
        undefined_products,
        unweighted_mean,
        weighted_mean,
        segments,
    };

    log::debug!(
        "ratios: {} products, mean={:?} weighted={:?} recomputed={}",
        analysis.rows.len(),
        analysis.unweighted_mean,
        analysis.weighted_mean,
        analysis.recomputed_count
    );

    analysis
}

fn select(rows: &[RatioRow], pred: impl Fn(f64) -> bool) -> Vec<ProductId> {
    rows.iter()
        .filter(|r| pred(r.ratio))
        .map(|r| r.product.clone())
        .collect()
}

fn distribution(rows: &[RatioRow]) -> Vec<IntensityCount> {
    Intensity::ALL
        .iter()
        .map(|&intensity| IntensityCount {
            intensity,
            label: intensity.label().to_string(),
            count: rows.iter().filter(|r| r.intensity == intensity).count(),
        })
        .collect()
}
