//! Scenario engine tests.
//!
//! Tests cover: growth compounding, year-0 identity, interventions and
//! their cost bases, one-factor sensitivity, crisis path ordering,
//! bit-identical reruns.

use tsa_core::config::{CostBasis, CrisisConfig, GrowthPreset, InterventionConfig, RecoveryShape, ScenarioConfig, SensitivityConfig};
use tsa_core::error::FigureError;
use tsa_core::scenario::{
    crisis_recovery, evaluate_intervention, growth_scenarios, policy_interventions, project_growth,
    run_scenarios, sensitivity_analysis, ScenarioBase, SensitivityFactor,
};

fn base() -> ScenarioBase {
    ScenarioBase::new(2024, 1_000.0, 50_000.0, 200.0).with_national_totals(10_000.0, 2_000_000.0)
}

fn intervention(name: &str, gdp_impact: f64, cost: CostBasis) -> InterventionConfig {
    InterventionConfig {
        name: name.into(),
        description: String::new(),
        consumption_impact: 0.0,
        employment_impact: 0.0,
        gdp_impact,
        cost,
    }
}

#[test]
fn realistic_year_one_gdp() {
    let projection = project_growth(&base(), &GrowthPreset::realistic(), 5);
    let year1 = projection.at(1).unwrap();
    assert!((year1.gdp - 212.16).abs() < 1e-9, "year-1 GDP {}", year1.gdp);
    assert_eq!(year1.year, 2025);
    assert!((year1.consumption - 1_040.0).abs() < 1e-9);
    assert!((year1.employment - 50_000.0 * 1.036).abs() < 1e-9);
}

#[test]
fn year_zero_is_the_base() {
    let b = base();
    for projection in growth_scenarios(&b, &ScenarioConfig::default().growth_presets, 5) {
        let r0 = projection.at(0).unwrap();
        assert_eq!(r0.year, b.base_year);
        assert_eq!(r0.consumption.to_bits(), b.consumption.to_bits());
        assert_eq!(r0.employment.to_bits(), b.employment.to_bits());
        assert_eq!(r0.gdp.to_bits(), b.gdp.to_bits());
        assert_eq!(projection.records.len(), 6);
    }
}

#[test]
fn shares_follow_national_totals() {
    let projection = project_growth(&base(), &GrowthPreset::pessimistic(), 1);
    let r0 = projection.at(0).unwrap();
    assert_eq!(r0.gdp_share, Some(2.0));
    assert_eq!(r0.employment_share, Some(2.5));

    let no_totals = ScenarioBase::new(2024, 1.0, 1.0, 1.0);
    let r0 = project_growth(&no_totals, &GrowthPreset::pessimistic(), 0).records[0].clone();
    assert_eq!(r0.gdp_share, None);
}

#[test]
fn summary_reports_horizon_growth() {
    let projection = project_growth(&base(), &GrowthPreset::optimistic(), 3);
    let expected = (1.07f64 * 1.03).powi(3) * 200.0;
    assert!((projection.summary.final_gdp - expected).abs() < 1e-9);
    let growth = projection.summary.gdp_growth_pct.unwrap();
    assert!((growth - (expected / 200.0 - 1.0) * 100.0).abs() < 1e-9);
}

#[test]
fn marketing_boost_roi_and_payback() {
    let defaults = InterventionConfig::defaults();
    let marketing = defaults.iter().find(|i| i.name == "marketing_boost").unwrap();
    let result = evaluate_intervention(&base(), marketing);

    assert!((result.delta_gdp - 30.0).abs() < 1e-9);
    assert_eq!(result.cost, 50.0e6);
    let roi = *result.roi.as_ref().unwrap();
    assert!((roi - 0.6).abs() < 1e-9, "ROI {roi}");
    assert!((result.payback_years.unwrap() - 50.0 / 30.0).abs() < 1e-9);
}

#[test]
fn cost_bases() {
    let b = base();
    let per_job = evaluate_intervention(&b, &intervention("train", 0.1, CostBasis::PerJob { amount_per_fte: 2_000.0 }));
    assert_eq!(per_job.cost, 100.0e6);

    let share = evaluate_intervention(&b, &intervention("promo", 0.1, CostBasis::ShareOfConsumption { fraction: 0.01 }));
    assert!((share.cost - 10.0e6).abs() < 1e-6);
}

#[test]
fn zero_cost_roi_is_undefined() {
    let result = evaluate_intervention(&base(), &intervention("free", 0.1, CostBasis::Fixed { amount: 0.0 }));
    assert!(matches!(result.roi, Err(FigureError::DivisionUndefined { .. })));
    assert_eq!(result.payback_years, Some(0.0));
}

#[test]
fn negative_impact_has_no_payback() {
    let result = evaluate_intervention(&base(), &intervention("bad", -0.1, CostBasis::Fixed { amount: 1.0e6 }));
    assert_eq!(result.payback_years, None);
    assert!(result.roi.unwrap() < 0.0);
}

#[test]
fn best_interventions_are_selected() {
    let analysis = policy_interventions(&base(), &InterventionConfig::defaults());
    assert_eq!(analysis.results.len(), 4);
    // marketing 30/50, infrastructure 50/500, skills 40/100, digital 36/150 (ΔGDP M / cost M).
    assert_eq!(analysis.best_roi.as_deref(), Some("marketing_boost"));
    assert_eq!(analysis.best_gdp.as_deref(), Some("infrastructure_investment"));
}

#[test]
fn sensitivity_is_one_factor_at_a_time() {
    let b = base();
    let preset = GrowthPreset::realistic();
    let config = SensitivityConfig::default();
    let analysis = sensitivity_analysis(&b, &preset, &config);

    assert_eq!(analysis.points.len(), 3 * config.changes_pct.len());

    let ratio_up: Vec<_> = analysis
        .for_factor(SensitivityFactor::TourismRatio)
        .filter(|p| p.change_pct == 10.0)
        .collect();
    let p = ratio_up[0];
    assert!((p.delta_gdp_pct.unwrap() - 10.0).abs() < 1e-9);
    assert_eq!(p.delta_employment, 0.0);

    for p in analysis.for_factor(SensitivityFactor::EmploymentElasticity) {
        assert_eq!(p.delta_gdp, 0.0, "elasticity must not move GDP");
    }
    for p in analysis.for_factor(SensitivityFactor::Productivity) {
        assert_eq!(p.delta_employment, 0.0, "productivity must not move employment");
        assert_eq!(p.delta_gdp > 0.0, p.change_pct > 0.0);
    }
}

#[test]
fn crisis_paths_are_ordered() {
    let analysis = crisis_recovery(&base(), &CrisisConfig::default());
    let year3 = |shape| analysis.path(shape).unwrap().recovery_year(3).unwrap().gdp;

    assert!(year3(RecoveryShape::V) >= year3(RecoveryShape::U));
    assert!(year3(RecoveryShape::U) >= year3(RecoveryShape::L));

    let v = analysis.path(RecoveryShape::V).unwrap();
    assert_eq!(v.records.len(), 5);
    assert_eq!(v.records[0].gdp, 200.0);
    assert!((v.records[1].gdp - 120.0).abs() < 1e-9);
    // Employment falls by resilience × demand loss.
    assert!((v.records[1].employment - 50_000.0 * (1.0 - 0.8 * 0.4)).abs() < 1e-6);
    assert!((analysis.employment_shock - 0.32).abs() < 1e-12);

    let l = analysis.path(RecoveryShape::L).unwrap();
    assert!(l.cumulative_gdp_loss > v.cumulative_gdp_loss);
    let expected_v_loss = 200.0 * (0.4 + 0.15 + 0.03 + 0.0);
    assert!((v.cumulative_gdp_loss - expected_v_loss).abs() < 1e-9);
}

#[test]
fn reruns_are_bit_identical() {
    let config = ScenarioConfig::default();
    let first = run_scenarios(&base(), &config);
    let second = run_scenarios(&base(), &config);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn unknown_reference_preset_falls_back_to_realistic() {
    let mut config = ScenarioConfig::default();
    config.sensitivity.reference_preset = "missing".into();
    let suite = run_scenarios(&base(), &config);
    assert_eq!(suite.sensitivity.reference_preset, "realistic");
}
