//! Insight and recommendation engine.
//!
//! Ratings are threshold lookups. Findings and recommendations come
//! from ordered rule tables: findings are grouped and the first
//! matching rule of each group wins, recommendations fire for every
//! matching rule in table order.

use crate::aggregates::CoreAggregates;
use crate::config::InsightThresholds;
use crate::employment::EmploymentAnalysis;
use crate::quality::{QualityRating, QualityReport};
use crate::ratios::RatioAnalysis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Low,
    Moderate,
    High,
    VeryHigh,
    Excellent,
}

impl Rating {
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Low       => "Low",
            Rating::Moderate  => "Moderate",
            Rating::High      => "High",
            Rating::VeryHigh  => "Very High",
            Rating::Excellent => "Excellent",
        }
    }

    /// GDP share: >15 Very High, >10 High, >5 Moderate.
    pub fn significance(gdp_share: f64, t: &InsightThresholds) -> Self {
        if gdp_share > t.significance_very_high {
            Rating::VeryHigh
        } else if gdp_share > t.significance_high {
            Rating::High
        } else if gdp_share > t.significance_moderate {
            Rating::Moderate
        } else {
            Rating::Low
        }
    }

    /// Productivity per FTE: ≥100k Excellent, ≥80k High, ≥60k Moderate.
    pub fn productivity(per_fte: f64, t: &InsightThresholds) -> Self {
        if per_fte >= t.productivity_excellent {
            Rating::Excellent
        } else if per_fte >= t.productivity_high {
            Rating::High
        } else if per_fte >= t.productivity_moderate {
            Rating::Moderate
        } else {
            Rating::Low
        }
    }

    pub fn specialization(products_above: usize, mean_ratio: Option<f64>, t: &InsightThresholds) -> Self {
        if products_above > t.specialization_very_high_count {
            Rating::VeryHigh
        } else if products_above > t.specialization_high_count {
            Rating::High
        } else if mean_ratio.is_some_and(|m| m > t.specialization_mean_ratio) {
            Rating::Moderate
        } else {
            Rating::Low
        }
    }
}

/// Everything a rule predicate may look at.
pub struct InsightContext<'a> {
    pub gdp_share:           Option<f64>,
    pub productivity:        Option<f64>,
    pub top3_share:          Option<f64>,
    pub products_analyzed:   usize,
    pub high_ratio_products: usize,
    pub quality_rating:      QualityRating,
    pub thresholds:          &'a InsightThresholds,
}

impl InsightContext<'_> {
    fn gdp_share_above(&self, limit: f64) -> bool {
        self.gdp_share.is_some_and(|s| s > limit)
    }

    fn gdp_share_below(&self, limit: f64) -> bool {
        self.gdp_share.is_some_and(|s| s < limit)
    }
}

pub struct Rule {
    pub id:      &'static str,
    pub applies: fn(&InsightContext) -> bool,
    pub title:   &'static str,
    pub detail:  &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id:     String,
    pub title:  String,
    pub detail: String,
}

impl Insight {
    fn from_rule(rule: &Rule) -> Self {
        Self {
            id:     rule.id.to_string(),
            title:  rule.title.to_string(),
            detail: rule.detail.to_string(),
        }
    }

    pub fn text(&self) -> String {
        format!("{}: {}", self.title, self.detail)
    }
}

// ── Predicates ─────────────────────────────────────────────────

fn major_driver(c: &InsightContext) -> bool {
    c.gdp_share_above(c.thresholds.significance_high)
}

fn under_developed(c: &InsightContext) -> bool {
    c.gdp_share_below(c.thresholds.growth_potential_share)
}

fn gdp_share_known(c: &InsightContext) -> bool {
    c.gdp_share.is_some()
}

fn productive(c: &InsightContext) -> bool {
    c.productivity.is_some_and(|p| p > c.thresholds.productivity_high)
}

fn productivity_known(c: &InsightContext) -> bool {
    c.productivity.is_some()
}

fn many_intense_products(c: &InsightContext) -> bool {
    c.high_ratio_products > c.thresholds.specialization_high_count
}

fn no_intense_products(c: &InsightContext) -> bool {
    c.products_analyzed > 0 && c.high_ratio_products == 0
}

fn some_intense_products(c: &InsightContext) -> bool {
    c.high_ratio_products > 0
}

fn concentrated_industries(c: &InsightContext) -> bool {
    c.top3_share.is_some_and(|s| s > c.thresholds.top3_concentration_share)
}

fn diversified_industries(c: &InsightContext) -> bool {
    c.top3_share.is_some()
}

fn dependent(c: &InsightContext) -> bool {
    c.gdp_share_above(c.thresholds.significance_very_high)
}

fn small_sector(c: &InsightContext) -> bool {
    c.gdp_share_below(c.thresholds.significance_moderate)
}

fn low_productivity(c: &InsightContext) -> bool {
    c.productivity.is_some_and(|p| p < c.thresholds.productivity_moderate)
}

fn weak_data(c: &InsightContext) -> bool {
    c.quality_rating < QualityRating::Good
}

fn always(_: &InsightContext) -> bool {
    true
}

// ── Rule tables ────────────────────────────────────────────────

/// One finding per group: the first rule that applies.
pub const FINDING_GROUPS: &[&[Rule]] = &[
    &[
        Rule {
            id: "high_economic_impact",
            applies: major_driver,
            title: "High Economic Impact",
            detail: "Tourism is a major economic driver with significant GDP and employment contributions.",
        },
        Rule {
            id: "growth_opportunity",
            applies: under_developed,
            title: "Growth Opportunity",
            detail: "Tourism sector shows potential for expansion and development.",
        },
        Rule {
            id: "balanced_development",
            applies: gdp_share_known,
            title: "Balanced Development",
            detail: "Tourism maintains a healthy contribution to the economy.",
        },
    ],
    &[
        Rule {
            id: "high_productivity",
            applies: productive,
            title: "High Productivity",
            detail: "Tourism sector demonstrates strong labor productivity.",
        },
        Rule {
            id: "productivity_focus",
            applies: productivity_known,
            title: "Productivity Focus",
            detail: "Opportunities exist to improve tourism labor productivity.",
        },
    ],
    &[
        Rule {
            id: "high_tourism_intensity",
            applies: many_intense_products,
            title: "High Tourism Intensity",
            detail: "Multiple products show very high tourism dependency.",
        },
        Rule {
            id: "balanced_tourism_ratios",
            applies: no_intense_products,
            title: "Balanced Tourism Ratios",
            detail: "No products show extreme tourism dependency.",
        },
        Rule {
            id: "moderate_intensity",
            applies: some_intense_products,
            title: "Moderate Intensity",
            detail: "Some products show high tourism specialization.",
        },
    ],
    &[
        Rule {
            id: "concentrated_structure",
            applies: concentrated_industries,
            title: "Concentrated Structure",
            detail: "Tourism employment is concentrated in a few industries.",
        },
        Rule {
            id: "diversified_structure",
            applies: diversified_industries,
            title: "Diversified Structure",
            detail: "Tourism employment is spread across industries.",
        },
    ],
];

/// Every rule that applies, in table order.
pub const RECOMMENDATION_RULES: &[Rule] = &[
    Rule {
        id: "diversification_strategy",
        applies: dependent,
        title: "Diversification Strategy",
        detail: "Reduce tourism dependency through economic diversification",
    },
    Rule {
        id: "crisis_preparedness",
        applies: dependent,
        title: "Crisis Preparedness",
        detail: "Develop robust crisis response and recovery plans",
    },
    Rule {
        id: "growth_strategy",
        applies: small_sector,
        title: "Growth Strategy",
        detail: "Invest in tourism infrastructure and marketing to capture potential",
    },
    Rule {
        id: "market_development",
        applies: small_sector,
        title: "Market Development",
        detail: "Focus on developing new tourism products and markets",
    },
    Rule {
        id: "industry_diversification",
        applies: concentrated_industries,
        title: "Industry Diversification",
        detail: "Develop broader range of tourism industries",
    },
    Rule {
        id: "skills_development",
        applies: low_productivity,
        title: "Skills Development",
        detail: "Invest in workforce training and capacity building",
    },
    Rule {
        id: "technology_adoption",
        applies: low_productivity,
        title: "Technology Adoption",
        detail: "Implement digital solutions to improve efficiency",
    },
    Rule {
        id: "data_quality",
        applies: weak_data,
        title: "Data Quality",
        detail: "Strengthen collection and validation of the core TSA tables",
    },
    Rule {
        id: "continuous_monitoring",
        applies: always,
        title: "Continuous Monitoring",
        detail: "Implement regular TSA updates for policy guidance",
    },
    Rule {
        id: "sustainable_development",
        applies: always,
        title: "Sustainable Development",
        detail: "Balance tourism growth with environmental protection",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub significance:    Option<Rating>,
    pub productivity:    Option<Rating>,
    pub specialization:  Rating,
    pub findings:        Vec<Insight>,
    pub recommendations: Vec<Insight>,
}

pub fn evaluate_rules(ctx: &InsightContext) -> (Vec<Insight>, Vec<Insight>) {
    let findings = FINDING_GROUPS
        .iter()
        .filter_map(|group| group.iter().find(|r| (r.applies)(ctx)))
        .map(Insight::from_rule)
        .collect();
    let recommendations = RECOMMENDATION_RULES
        .iter()
        .filter(|r| (r.applies)(ctx))
        .map(Insight::from_rule)
        .collect();
    (findings, recommendations)
}

pub fn generate_insights(
    aggregates: &CoreAggregates,
    quality:    &QualityReport,
    employment: &EmploymentAnalysis,
    ratios:     &RatioAnalysis,
    thresholds: &InsightThresholds,
) -> InsightReport {
    let ctx = InsightContext {
        gdp_share:           aggregates.gdp_share_value(),
        productivity:        aggregates.productivity_value(),
        top3_share:          employment.top3_share,
        products_analyzed:   ratios.rows.len(),
        high_ratio_products: ratios.count_above(thresholds.specialization_ratio),
        quality_rating:      quality.rating,
        thresholds,
    };

    let (findings, recommendations) = evaluate_rules(&ctx);

    let report = InsightReport {
        significance:   ctx.gdp_share.map(|s| Rating::significance(s, thresholds)),
        productivity:   ctx.productivity.map(|p| Rating::productivity(p, thresholds)),
        specialization: Rating::specialization(ctx.high_ratio_products, ratios.unweighted_mean, thresholds),
        findings,
        recommendations,
    };

    log::debug!(
        "insights: significance={:?} productivity={:?} findings={} recommendations={}",
        report.significance,
        report.productivity,
        report.findings.len(),
        report.recommendations.len()
    );

    report
}
