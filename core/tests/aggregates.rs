//! Core aggregate tests.
//!
//! Tests cover: the GDP identity, provenance of estimated figures,
//! parameter and division errors held per figure.

use tsa_core::aggregates::{compute_aggregates, EstimationMethod, Figure, MacroParams};
use tsa_core::config::TsaConfig;
use tsa_core::error::FigureError;
use tsa_core::fixtures;
use tsa_core::table::{columns as col, Table, TableRegistry, CONSUMPTION_TABLE, EMPLOYMENT_TABLE, SUPPLY_DEMAND_TABLE};

fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

fn sample() -> TableRegistry {
    fixtures::sample_registry().expect("sample tables")
}

/// Employment table without the GVA column, forcing the supply-based estimate.
fn employment_without_gva() -> Table {
    Table::builder(EMPLOYMENT_TABLE, col::INDUSTRIES)
        .column(col::FTE_JOBS)
        .row("Accommodation", vec![60_000.0])
        .row("Food and beverage", vec![60_000.0])
        .build()
        .unwrap()
}

/// Supply-demand table without the taxes column.
fn supply_without_taxes() -> Table {
    Table::builder(SUPPLY_DEMAND_TABLE, col::PRODUCTS)
        .columns(&[col::DOMESTIC_SUPPLY, col::INTERNAL_TOURISM_CONSUMPTION, col::TOURISM_RATIO])
        .row("Accommodation services", vec![1000.0, 800.0, 80.0])
        .row("Retail goods", vec![4000.0, 200.0, 5.0])
        .build()
        .unwrap()
}

#[test]
fn gdp_is_exactly_gva_plus_taxes() {
    let config = TsaConfig::default();
    let registries = [
        sample(),
        TableRegistry::new()
            .with_table(supply_without_taxes())
            .with_table(employment_without_gva()),
        TableRegistry::new(),
    ];
    for registry in &registries {
        let agg = compute_aggregates(registry, &MacroParams::default(), &config);
        assert_eq!(
            agg.tourism_direct_gdp.value(),
            agg.tourism_direct_gva.value() + agg.tourism_taxes.value(),
            "GDP identity broken"
        );
    }
}

#[test]
fn sample_figures_are_direct() {
    let agg = compute_aggregates(&sample(), &fixtures::sample_params(), &TsaConfig::default());

    assert!(agg.estimation_flags().is_empty(), "unexpected estimates: {:?}", agg.estimation_flags());
    assert!(agg.undefined_figures().is_empty());

    assert_eq!(agg.internal_tourism_consumption, Figure::Direct(13_400.0));
    assert_eq!(agg.inbound_expenditure, Figure::Direct(6_450.0));
    assert_eq!(agg.domestic_expenditure, Figure::Direct(6_950.0));
    assert_eq!(agg.tourism_direct_gva, Figure::Direct(5_900.0));
    assert!(approx(agg.tourism_taxes.value(), 702.8, 1e-6), "taxes {}", agg.tourism_taxes.value());
    assert_eq!(agg.total_tourism_fte, Figure::Direct(120_000.0));

    let inbound = agg.inbound_share.as_ref().unwrap().value();
    let domestic = agg.domestic_share.as_ref().unwrap().value();
    assert!(approx(inbound + domestic, 100.0, 1e-9), "shares must partition: {inbound} + {domestic}");

    let gdp_share = agg.gdp_share_value().unwrap();
    assert!(approx(gdp_share, 6_602.8 / 200_000.0 * 100.0, 1e-6));

    let productivity = agg.productivity_value().unwrap();
    assert!(approx(productivity, 6_602.8e6 / 120_000.0, 1e-3));

    let per_capita = agg.consumption_per_capita.as_ref().unwrap().value();
    assert!(approx(per_capita, 1_340.0, 1e-6), "per capita {per_capita}");
}

#[test]
fn gva_falls_back_to_supply_estimate() {
    let registry = sample().with_table(employment_without_gva());
    let agg = compute_aggregates(&registry, &MacroParams::default(), &TsaConfig::default());

    // Σ ratio/100 × supply × 0.4; the accommodation row uses its supplied 88.9%.
    let expected = (88.9 * 45.0 + 3_000.0 + 3_000.0 + 800.0 + 500.0 + 500.0 + 1_600.0) * 0.4;
    assert!(
        approx(agg.tourism_direct_gva.value(), expected, 1e-6),
        "GVA estimate {} != {expected}",
        agg.tourism_direct_gva.value()
    );
    assert_eq!(
        agg.tourism_direct_gva.method(),
        Some(EstimationMethod::GvaFromOutputRatio { gva_to_output_ratio: 0.4 })
    );

    // Taxes are still direct, so GDP inherits the GVA method.
    assert!(!agg.tourism_taxes.is_estimated());
    assert_eq!(agg.tourism_direct_gdp.method(), agg.tourism_direct_gva.method());
}

#[test]
fn mixed_estimates_mark_gdp_as_derived() {
    let registry = TableRegistry::new()
        .with_table(supply_without_taxes())
        .with_table(employment_without_gva());
    let agg = compute_aggregates(&registry, &MacroParams::default(), &TsaConfig::default());

    let gva = agg.tourism_direct_gva.value();
    assert!(approx(gva, (800.0 + 200.0) * 0.4, 1e-9));
    assert!(approx(agg.tourism_taxes.value(), gva * 0.15, 1e-9));
    assert_eq!(
        agg.tourism_taxes.method(),
        Some(EstimationMethod::TaxesFromGvaRate { tax_rate: 0.15 })
    );
    assert_eq!(
        agg.tourism_direct_gdp.method(),
        Some(EstimationMethod::FromEstimatedComponents)
    );
}

#[test]
fn missing_split_columns_use_fallback() {
    let t4 = Table::builder(CONSUMPTION_TABLE, col::PRODUCTS)
        .column(col::INTERNAL_TOURISM_CONSUMPTION)
        .row("Accommodation services", vec![700.0])
        .row("Retail goods", vec![300.0])
        .build()
        .unwrap();
    let registry = TableRegistry::new().with_table(t4);
    let agg = compute_aggregates(&registry, &MacroParams::default(), &TsaConfig::default());

    assert_eq!(agg.inbound_expenditure.value(), 0.0);
    assert_eq!(agg.domestic_expenditure.value(), 1_000.0);
    assert_eq!(agg.domestic_expenditure.method(), Some(EstimationMethod::ExpenditureSplitFallback));
    let flagged: Vec<&str> = agg.estimation_flags().iter().map(|(name, _)| *name).collect();
    assert!(flagged.contains(&"inbound_expenditure"));
    assert!(flagged.contains(&"domestic_expenditure"));
}

#[test]
fn invalid_parameters_are_held_per_figure() {
    let params = MacroParams {
        population: 0.0,
        total_gdp: -5.0,
        ..MacroParams::default()
    };
    let agg = compute_aggregates(&sample(), &params, &TsaConfig::default());

    assert!(matches!(
        agg.consumption_per_capita,
        Err(FigureError::InvalidParameter { ref name, .. }) if name == "population"
    ));
    assert!(matches!(
        agg.tourism_gdp_share,
        Err(FigureError::InvalidParameter { ref name, .. }) if name == "total_gdp"
    ));
    // Unrelated figures still compute.
    assert!(agg.tourism_employment_share.is_ok());
    assert!(agg.labor_productivity.is_ok());
    assert_eq!(agg.undefined_figures().len(), 2);
}

#[test]
fn empty_registry_reports_undefined_divisions() {
    let agg = compute_aggregates(&TableRegistry::new(), &MacroParams::default(), &TsaConfig::default());

    assert_eq!(agg.tourism_direct_gdp.value(), 0.0);
    assert!(matches!(agg.labor_productivity, Err(FigureError::DivisionUndefined { .. })));
    assert!(matches!(agg.tourism_multiplier, Err(FigureError::DivisionUndefined { .. })));
    assert!(matches!(agg.inbound_share, Err(FigureError::DivisionUndefined { .. })));
}
