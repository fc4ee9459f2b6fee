//! CSV ingestion for the runner.
//!
//! The first column of each file is the dimension key; every other
//! column is a measure. Cells that do not parse as numbers are kept as
//! text so the validator can report them.

use anyhow::{Context, Result};
use std::path::Path;
use tsa_core::table::{columns as col, Cell, Table, TableRegistry, CONSUMPTION_TABLE, EMPLOYMENT_TABLE, SUPPLY_DEMAND_TABLE};

/// (file name, table name, expected key column)
pub const CORE_FILES: [(&str, &str, &str); 3] = [
    ("consumption.csv", CONSUMPTION_TABLE, col::PRODUCTS),
    ("supply_demand.csv", SUPPLY_DEMAND_TABLE, col::PRODUCTS),
    ("employment.csv", EMPLOYMENT_TABLE, col::INDUSTRIES),
];

pub fn load_registry(data_dir: &Path) -> Result<TableRegistry> {
    let mut registry = TableRegistry::new();
    for (file, table_name, key_column) in CORE_FILES {
        let path = data_dir.join(file);
        if !path.exists() {
            log::warn!("{} not found; {table_name} will be reported missing", path.display());
            continue;
        }
        let table = load_table(&path, table_name)
            .with_context(|| format!("loading {}", path.display()))?;
        if table.key_column() != key_column {
            log::warn!("{table_name}: key column is '{}', expected '{key_column}'", table.key_column());
        }
        log::info!("loaded {table_name}: {} rows, {} columns", table.len(), table.columns().len());
        registry.insert(table);
    }
    Ok(registry)
}

pub fn load_table(path: &Path, table_name: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut header_iter = headers.iter();
    let key_column = header_iter
        .next()
        .with_context(|| format!("{table_name}: header row is empty"))?
        .to_string();
    let measures: Vec<&str> = header_iter.collect();

    let mut builder = Table::builder(table_name, &key_column).columns(&measures);
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("{table_name}: bad record at line {}", row_idx + 2))?;
        let key = get_string_field(&record, 0).unwrap_or_default();
        let cells: Vec<Cell> = (1..=measures.len()).map(|i| get_cell(&record, i)).collect();
        builder = builder.row(&key, cells);
    }

    Ok(builder.build()?)
}

fn get_string_field(record: &csv::StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_cell(record: &csv::StringRecord, index: usize) -> Cell {
    match get_string_field(record, index) {
        None => Cell::Missing,
        Some(s) => match s.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(s),
        },
    }
}
