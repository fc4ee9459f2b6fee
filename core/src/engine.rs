//! The TSA engine: runs every stage over one table registry.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Structural validation
//!   2. Core aggregates          (memoized)
//!   3. Ratio analysis
//!   4. Employment analysis
//!   5. Quality scoring          (memoized)
//!   6. Scenarios                (growth, policy, sensitivity, crisis)
//!   7. Insights
//!
//! RULES:
//!   - Each stage reads only the registry, the parameters, the config
//!     and the outputs of earlier stages.
//!   - No stage mutates a table or an earlier stage's output.
//!   - A stage that cannot compute a figure records why and carries on.
//!   - The config is fixed for the lifetime of an engine.

use crate::{
    aggregates::{compute_aggregates, CoreAggregates, MacroParams},
    config::TsaConfig,
    employment::{analyze_employment, EmploymentAnalysis},
    error::TsaResult,
    insight::{generate_insights, InsightReport},
    memo::{hash_registry, MemoCache, MemoKey},
    quality::{score_quality, QualityReport},
    ratios::{analyze_ratios, RatioAnalysis},
    scenario::{run_scenarios, ScenarioBase, ScenarioSuite},
    table::TableRegistry,
    validator::{validate, TsaSchema, ValidationReport},
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(8) {
    Some(n) => n,
    None => panic!("cache capacity must be non-zero"),
};

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsaReport {
    pub params:     MacroParams,
    pub validation: ValidationReport,
    pub aggregates: CoreAggregates,
    pub ratios:     RatioAnalysis,
    pub employment: EmploymentAnalysis,
    pub quality:    QualityReport,
    pub scenarios:  ScenarioSuite,
    pub insights:   InsightReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub aggregate_hits:   u64,
    pub aggregate_misses: u64,
    pub quality_hits:     u64,
    pub quality_misses:   u64,
}

pub struct TsaEngine {
    config:          TsaConfig,
    schema:          TsaSchema,
    aggregate_cache: MemoCache<CoreAggregates>,
    quality_cache:   MemoCache<QualityReport>,
}

impl TsaEngine {
    pub fn new(config: TsaConfig) -> TsaResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            schema:          TsaSchema::standard(),
            aggregate_cache: MemoCache::new(CACHE_CAPACITY),
            quality_cache:   MemoCache::new(CACHE_CAPACITY),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            config:          TsaConfig::default(),
            schema:          TsaSchema::standard(),
            aggregate_cache: MemoCache::new(CACHE_CAPACITY),
            quality_cache:   MemoCache::new(CACHE_CAPACITY),
        }
    }

    pub fn config(&self) -> &TsaConfig {
        &self.config
    }

    pub fn validate(&self, registry: &TableRegistry) -> ValidationReport {
        validate(registry, &self.schema)
    }

    /// Core aggregates, served from the cache when the tables and the
    /// numeric parameters are unchanged. The country name is not part
    /// of the key.
    pub fn aggregates(&mut self, registry: &TableRegistry, params: &MacroParams) -> CoreAggregates {
        let key = MemoKey::new(
            hash_registry(registry),
            &[params.population, params.total_gdp, params.total_employment],
        );
        let config = &self.config;
        self.aggregate_cache
            .get_or_insert_with(key, || compute_aggregates(registry, params, config))
    }

    pub fn quality(&mut self, registry: &TableRegistry) -> QualityReport {
        let key = MemoKey::new(hash_registry(registry), &[]);
        let config = &self.config;
        self.quality_cache
            .get_or_insert_with(key, || score_quality(registry, config))
    }

    pub fn run(&mut self, registry: &TableRegistry, params: &MacroParams) -> TsaReport {
        let validation = self.validate(registry);
        let aggregates = self.aggregates(registry, params);
        let ratios = analyze_ratios(registry, &self.config.ratio);
        let employment = analyze_employment(registry, &self.config.employment);
        let quality = self.quality(registry);

        let base = ScenarioBase::from_aggregates(&aggregates, params, self.config.scenario.base_year);
        let scenarios = run_scenarios(&base, &self.config.scenario);

        let insights = generate_insights(&aggregates, &quality, &employment, &ratios, &self.config.insight);

        log::info!(
            "TSA run for {}: {} tables, {} defects, GDP {:.1}M, quality {:.0} ({})",
            params.country_name,
            registry.len(),
            validation.defects.len(),
            aggregates.tourism_direct_gdp.value(),
            quality.score,
            quality.rating.label()
        );

        TsaReport {
            params: params.clone(),
            validation,
            aggregates,
            ratios,
            employment,
            quality,
            scenarios,
            insights,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            aggregate_hits:   self.aggregate_cache.hits(),
            aggregate_misses: self.aggregate_cache.misses(),
            quality_hits:     self.quality_cache.hits(),
            quality_misses:   self.quality_cache.misses(),
        }
    }
}
