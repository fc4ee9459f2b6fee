//! Built-in sample tables for a small, internally consistent economy.
//!
//! Used by the runner's `--demo` mode and by the integration tests.
//! Monetary values in millions, employment in FTE.
//!
//! The tables balance: Table 4 and Table 6 consumption totals agree,
//! every supplied ratio matches consumption / supply within 0.1 pp, and
//! output + imports + taxes equals domestic supply on every row.

use crate::aggregates::MacroParams;
use crate::error::TsaResult;
use crate::table::{columns as col, Table, TableRegistry, CONSUMPTION_TABLE, EMPLOYMENT_TABLE, SUPPLY_DEMAND_TABLE};

const PRODUCTS: [&str; 7] = [
    "Accommodation services",
    "Food and beverage serving",
    "Passenger transport",
    "Travel agencies",
    "Cultural services",
    "Sports and recreation",
    "Retail goods",
];

pub fn sample_consumption() -> TsaResult<Table> {
    // (inbound, domestic)
    let spend: [(f64, f64); 7] = [
        (2400.0, 1600.0),
        (1500.0, 1500.0),
        (1200.0, 1800.0),
        (300.0, 500.0),
        (250.0, 250.0),
        (200.0, 300.0),
        (600.0, 1000.0),
    ];
    PRODUCTS
        .iter()
        .zip(spend)
        .fold(
            Table::builder(CONSUMPTION_TABLE, col::PRODUCTS).columns(&[
                col::INBOUND_EXPENDITURE,
                col::DOMESTIC_EXPENDITURE,
                col::INTERNAL_TOURISM_CONSUMPTION,
            ]),
            |b, (product, (inbound, domestic))| b.row(product, vec![inbound, domestic, inbound + domestic]),
        )
        .build()
}

pub fn sample_supply_demand() -> TsaResult<Table> {
    // (supply, consumption, ratio, output, imports, taxes)
    let rows: [(f64, f64, f64, f64, f64, f64); 7] = [
        (4500.0, 4000.0, 88.9, 4200.0, 100.0, 200.0),
        (10000.0, 3000.0, 30.0, 9000.0, 400.0, 600.0),
        (7500.0, 3000.0, 40.0, 6500.0, 600.0, 400.0),
        (1000.0, 800.0, 80.0, 900.0, 50.0, 50.0),
        (2000.0, 500.0, 25.0, 1850.0, 50.0, 100.0),
        (2500.0, 500.0, 20.0, 2300.0, 100.0, 100.0),
        (32000.0, 1600.0, 5.0, 24000.0, 6000.0, 2000.0),
    ];
    PRODUCTS
        .iter()
        .zip(rows)
        .fold(
            Table::builder(SUPPLY_DEMAND_TABLE, col::PRODUCTS).columns(&[
                col::DOMESTIC_SUPPLY,
                col::INTERNAL_TOURISM_CONSUMPTION,
                col::TOURISM_RATIO,
                col::TOTAL_DOMESTIC_OUTPUT,
                col::IMPORTS,
                col::TAXES_LESS_SUBSIDIES,
            ]),
            |b, (product, (s, c, r, o, i, t))| b.row(product, vec![s, c, r, o, i, t]),
        )
        .build()
}

pub fn sample_employment() -> TsaResult<Table> {
    // (fte, jobs, emp_m, emp_f, self_m, self_f, establishments, gva)
    let rows: [(&str, [f64; 8]); 6] = [
        ("Accommodation", [42000.0, 50000.0, 20000.0, 25000.0, 2500.0, 2500.0, 3200.0, 2100.0]),
        ("Food and beverage", [38000.0, 52000.0, 22000.0, 24000.0, 3000.0, 3000.0, 9500.0, 1300.0]),
        ("Passenger transport", [21000.0, 23000.0, 15000.0, 6000.0, 1500.0, 500.0, 1400.0, 1400.0]),
        ("Retail trade", [8000.0, 10000.0, 4000.0, 5000.0, 500.0, 500.0, 2500.0, 500.0]),
        ("Travel agencies", [6000.0, 7000.0, 2500.0, 3800.0, 400.0, 300.0, 900.0, 350.0]),
        ("Cultural and recreation", [5000.0, 6500.0, 2500.0, 3000.0, 500.0, 500.0, 1100.0, 250.0]),
    ];
    rows.iter()
        .fold(
            Table::builder(EMPLOYMENT_TABLE, col::INDUSTRIES).columns(&[
                col::FTE_JOBS,
                col::TOTAL_JOBS,
                col::EMPLOYEES_MALE,
                col::EMPLOYEES_FEMALE,
                col::SELF_EMPLOYED_MALE,
                col::SELF_EMPLOYED_FEMALE,
                col::ESTABLISHMENTS,
                col::GVA_TOURISM_SHARE,
            ]),
            |b, (industry, values)| b.row(industry, values.to_vec()),
        )
        .build()
}

pub fn sample_registry() -> TsaResult<TableRegistry> {
    Ok(TableRegistry::new()
        .with_table(sample_consumption()?)
        .with_table(sample_supply_demand()?)
        .with_table(sample_employment()?))
}

pub fn sample_params() -> MacroParams {
    MacroParams {
        country_name: "Demoland".into(),
        ..MacroParams::default()
    }
}
