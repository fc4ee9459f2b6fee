//! Structural validation tests.

use tsa_core::fixtures;
use tsa_core::table::{columns as col, Cell, Table, TableRegistry, CONSUMPTION_TABLE, EMPLOYMENT_TABLE, SUPPLY_DEMAND_TABLE};
use tsa_core::validator::{validate, StructuralDefect, TsaSchema};

fn sample() -> TableRegistry {
    fixtures::sample_registry().unwrap()
}

#[test]
fn sample_tables_are_clean() {
    let report = validate(&sample(), &TsaSchema::standard());
    assert!(report.is_clean(), "defects: {:?}", report.defects);
    assert_eq!(report.tables.len(), 3);
    let status = report.status(SUPPLY_DEMAND_TABLE).unwrap();
    assert!(status.valid);
    assert_eq!(status.rows, 7);
    assert_eq!(status.detail, "Valid");
}

#[test]
fn missing_table_is_reported() {
    let registry = TableRegistry::new().with_table(fixtures::sample_consumption().unwrap());
    let report = validate(&registry, &TsaSchema::standard());

    assert_eq!(
        report.defects_for(EMPLOYMENT_TABLE).collect::<Vec<_>>(),
        vec![&StructuralDefect::MissingTable { table: EMPLOYMENT_TABLE.into() }]
    );
    let status = report.status(SUPPLY_DEMAND_TABLE).unwrap();
    assert!(!status.valid);
    assert_eq!(status.detail, "Not provided");
    assert_eq!(report.missing_workbook_tables.len(), 6);
}

#[test]
fn missing_required_column_is_reported() {
    let table = Table::builder(SUPPLY_DEMAND_TABLE, col::PRODUCTS)
        .columns(&[col::DOMESTIC_SUPPLY, col::INTERNAL_TOURISM_CONSUMPTION])
        .row("Accommodation services", vec![100.0, 80.0])
        .build()
        .unwrap();
    let report = validate(&sample().with_table(table), &TsaSchema::standard());

    assert_eq!(
        report.defects,
        vec![StructuralDefect::MissingColumns {
            table:   SUPPLY_DEMAND_TABLE.into(),
            columns: vec![col::TOURISM_RATIO.into()],
        }]
    );
    assert!(!report.status(SUPPLY_DEMAND_TABLE).unwrap().valid);
}

#[test]
fn non_numeric_cells_and_duplicates_are_reported() {
    let table = Table::builder(CONSUMPTION_TABLE, col::PRODUCTS)
        .column(col::INTERNAL_TOURISM_CONSUMPTION)
        .row("Accommodation services", vec![Cell::Text("lots".into())])
        .row("Accommodation services", vec![Cell::Text(" 12.5 ".into())])
        .row("Retail goods", vec![Cell::Missing])
        .build()
        .unwrap();
    let report = validate(&sample().with_table(table), &TsaSchema::standard());
    let defects: Vec<_> = report.defects_for(CONSUMPTION_TABLE).cloned().collect();

    assert_eq!(
        defects,
        vec![
            StructuralDefect::NonNumericValues {
                table:  CONSUMPTION_TABLE.into(),
                column: col::INTERNAL_TOURISM_CONSUMPTION.into(),
                count:  1,
            },
            StructuralDefect::DuplicateKeys {
                table: CONSUMPTION_TABLE.into(),
                keys:  vec!["Accommodation services".into()],
            },
        ]
    );
    let detail = &report.status(CONSUMPTION_TABLE).unwrap().detail;
    assert!(detail.contains("1 non-numeric values"), "detail: {detail}");
    assert!(detail.contains("; "), "defects should be joined: {detail}");
}

#[test]
fn optional_columns_are_not_required() {
    let table = Table::builder(EMPLOYMENT_TABLE, col::INDUSTRIES)
        .column(col::FTE_JOBS)
        .row("Accommodation", vec![10.0])
        .build()
        .unwrap();
    let report = validate(&sample().with_table(table), &TsaSchema::standard());
    assert!(report.is_clean());
}
