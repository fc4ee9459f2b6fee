//! Tourism ratio analysis tests.

use tsa_core::config::RatioConfig;
use tsa_core::fixtures;
use tsa_core::ratios::{analyze_ratios, resolve_ratios, Intensity, RatioSource};
use tsa_core::table::{columns as col, Cell, Table, TableRegistry, SUPPLY_DEMAND_TABLE};

/// (product, supply, consumption, supplied ratio)
fn supply_table(rows: &[(&str, f64, f64, Option<f64>)]) -> Table {
    rows.iter()
        .fold(
            Table::builder(SUPPLY_DEMAND_TABLE, col::PRODUCTS).columns(&[
                col::DOMESTIC_SUPPLY,
                col::INTERNAL_TOURISM_CONSUMPTION,
                col::TOURISM_RATIO,
            ]),
            |b, &(p, s, c, r)| b.row(p, vec![Cell::Number(s), Cell::Number(c), Cell::from(r)]),
        )
        .build()
        .unwrap()
}

#[test]
fn weighted_mean_does_not_depend_on_row_order() {
    let rows = [
        ("Accommodation services", 4_500.0, 4_000.0, None),
        ("Food and beverage serving", 10_000.0, 3_000.0, None),
        ("Passenger transport", 7_300.0, 2_900.0, Some(39.7)),
        ("Cultural services", 1_900.0, 511.0, None),
        ("Retail goods", 31_700.0, 1_613.0, None),
    ];
    let mut reversed = rows;
    reversed.reverse();
    let mut rotated = rows;
    rotated.rotate_left(2);

    let config = RatioConfig::default();
    let mean = |r: &[(&str, f64, f64, Option<f64>)]| {
        let registry = TableRegistry::new().with_table(supply_table(r));
        analyze_ratios(&registry, &config).weighted_mean.unwrap()
    };

    let expected = mean(&rows);
    assert_eq!(expected.to_bits(), mean(&reversed).to_bits());
    assert_eq!(expected.to_bits(), mean(&rotated).to_bits());
}

#[test]
fn supplied_ratio_is_kept_within_tolerance() {
    let table = supply_table(&[
        ("close", 1_000.0, 500.0, Some(50.8)),
        ("far", 1_000.0, 500.0, Some(55.0)),
        ("computed", 1_000.0, 250.0, None),
        ("unverified", 0.0, 0.0, Some(12.0)),
        ("undefined", 0.0, 40.0, None),
    ]);
    let resolved = resolve_ratios(&table, 1.0);

    assert_eq!(resolved[0].source, Some(RatioSource::Supplied));
    assert_eq!(resolved[0].ratio, Some(50.8));
    assert_eq!(resolved[1].source, Some(RatioSource::Recomputed));
    assert_eq!(resolved[1].ratio, Some(50.0));
    assert_eq!(resolved[2].source, Some(RatioSource::Computed));
    assert_eq!(resolved[2].ratio, Some(25.0));
    assert_eq!(resolved[3].source, Some(RatioSource::SuppliedUnverified));
    assert_eq!(resolved[4].ratio, None);
}

#[test]
fn undefined_rows_are_excluded_from_statistics() {
    let registry = TableRegistry::new().with_table(supply_table(&[
        ("a", 100.0, 20.0, None),
        ("b", 100.0, 40.0, None),
        ("c", 0.0, 10.0, None),
    ]));
    let analysis = analyze_ratios(&registry, &RatioConfig::default());

    assert_eq!(analysis.undefined_products, vec!["c".to_string()]);
    assert_eq!(analysis.rows.len(), 2);
    assert!((analysis.unweighted_mean.unwrap() - 30.0).abs() < 1e-9);
}

#[test]
fn zero_ratio_is_very_low() {
    let registry = TableRegistry::new().with_table(supply_table(&[("idle", 500.0, 0.0, Some(0.0))]));
    let analysis = analyze_ratios(&registry, &RatioConfig::default());

    assert_eq!(analysis.rows[0].intensity, Intensity::VeryLow);
    let very_low = analysis
        .distribution
        .iter()
        .find(|d| d.intensity == Intensity::VeryLow)
        .unwrap();
    assert_eq!(very_low.count, 1);
}

#[test]
fn sample_rows_sorted_and_segmented() {
    let registry = fixtures::sample_registry().unwrap();
    let analysis = analyze_ratios(&registry, &RatioConfig::default());

    let ratios: Vec<f64> = analysis.rows.iter().map(|r| r.ratio).collect();
    assert!(ratios.windows(2).all(|w| w[0] >= w[1]), "not descending: {ratios:?}");
    assert_eq!(analysis.top().unwrap().product, "Accommodation services");
    assert_eq!(analysis.max_ratio, Some(88.9));

    let weighted = analysis.weighted_mean.unwrap();
    assert!((weighted - 13_400.0 / 61_500.0 * 100.0).abs() < 1e-9, "weighted mean {weighted}");
    let unweighted = analysis.unweighted_mean.unwrap();
    assert!((unweighted - 288.9 / 7.0).abs() < 1e-9, "unweighted mean {unweighted}");

    // Segments may overlap: 25% is mixed-use but not characteristic.
    assert_eq!(analysis.segments.highly_specialized, vec!["Accommodation services".to_string()]);
    assert_eq!(analysis.segments.characteristic.len(), 4);
    assert!(analysis.segments.mixed_use.contains(&"Cultural services".to_string()));
    assert!(analysis.segments.mixed_use.contains(&"Retail goods".to_string()));

    assert_eq!(analysis.high_intensity_count, 2);
    assert_eq!(analysis.recomputed_count, 0);

    let shares: f64 = analysis.rows.iter().filter_map(|r| r.consumption_share).sum();
    assert!((shares - 100.0).abs() < 1e-9, "consumption shares sum to {shares}");

    let medium = analysis.filter(30.0, Some(Intensity::Medium));
    assert_eq!(medium.len(), 2);
}

#[test]
fn missing_table_yields_empty_analysis() {
    let analysis = analyze_ratios(&TableRegistry::new(), &RatioConfig::default());
    assert!(analysis.rows.is_empty());
    assert_eq!(analysis.weighted_mean, None);
    assert_eq!(analysis.distribution.len(), 5);
}
