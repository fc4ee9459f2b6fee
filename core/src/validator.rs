//! Structural validation of the registered tables.
//!
//! Validation never fails. It returns the defects it found and the
//! downstream stages decide for themselves whether a degraded table
//! is still usable (most fall back or zero-default).

use crate::table::{columns as col, TableRegistry, CONSUMPTION_TABLE, EMPLOYMENT_TABLE, SUPPLY_DEMAND_TABLE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table:    String,
    pub required: Vec<String>,
    pub optional: Vec<String>,
    /// Columns (required or optional) whose cells must be numeric.
    pub numeric:  Vec<String>,
}

impl TableSchema {
    fn new(table: &str, required: &[&str], optional: &[&str], numeric: &[&str]) -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            table:    table.into(),
            required: owned(required),
            optional: owned(optional),
            numeric:  owned(numeric),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsaSchema {
    pub tables: Vec<TableSchema>,
}

impl TsaSchema {
    /// The three core tables the engine computes from.
    pub fn standard() -> Self {
        let consumption = TableSchema::new(
            CONSUMPTION_TABLE,
            &[col::PRODUCTS, col::INTERNAL_TOURISM_CONSUMPTION],
            &[
                col::INBOUND_EXPENDITURE,
                col::DOMESTIC_EXPENDITURE,
                col::INTERNAL_EXPENDITURE,
                col::OTHER_COMPONENTS,
            ],
            &[
                col::INTERNAL_TOURISM_CONSUMPTION,
                col::INBOUND_EXPENDITURE,
                col::DOMESTIC_EXPENDITURE,
                col::INTERNAL_EXPENDITURE,
                col::OTHER_COMPONENTS,
            ],
        );

        let supply_demand = TableSchema::new(
            SUPPLY_DEMAND_TABLE,
            &[
                col::PRODUCTS,
                col::DOMESTIC_SUPPLY,
                col::INTERNAL_TOURISM_CONSUMPTION,
                col::TOURISM_RATIO,
            ],
            &[
                col::TOTAL_DOMESTIC_OUTPUT,
                col::IMPORTS,
                col::TAXES_LESS_SUBSIDIES,
                col::TRADE_MARGINS,
            ],
            &[
                col::DOMESTIC_SUPPLY,
                col::INTERNAL_TOURISM_CONSUMPTION,
                col::TOURISM_RATIO,
                col::TOTAL_DOMESTIC_OUTPUT,
                col::IMPORTS,
                col::TAXES_LESS_SUBSIDIES,
                col::TRADE_MARGINS,
            ],
        );

        let employment = TableSchema::new(
            EMPLOYMENT_TABLE,
            &[col::INDUSTRIES, col::FTE_JOBS],
            &[
                col::TOTAL_JOBS,
                col::ESTABLISHMENTS,
                col::GVA_TOURISM_SHARE,
                col::EMPLOYEES_MALE,
                col::EMPLOYEES_FEMALE,
                col::SELF_EMPLOYED_MALE,
                col::SELF_EMPLOYED_FEMALE,
            ],
            &[
                col::FTE_JOBS,
                col::TOTAL_JOBS,
                col::ESTABLISHMENTS,
                col::GVA_TOURISM_SHARE,
                col::EMPLOYEES_MALE,
                col::EMPLOYEES_FEMALE,
                col::SELF_EMPLOYED_MALE,
                col::SELF_EMPLOYED_FEMALE,
            ],
        );

        Self { tables: vec![consumption, supply_demand, employment] }
    }
}

/// A structural problem in one table. Recorded, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "defect", rename_all = "snake_case")]
pub enum StructuralDefect {
    #[error("{table}: table not provided")]
    MissingTable { table: String },

    #[error("{table}: missing columns {columns:?}")]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("{table}.{column}: {count} non-numeric values")]
    NonNumericValues { table: String, column: String, count: usize },

    #[error("{table}: duplicate keys {keys:?}")]
    DuplicateKeys { table: String, keys: Vec<String> },
}

impl StructuralDefect {
    pub fn table(&self) -> &str {
        match self {
            Self::MissingTable { table }
            | Self::MissingColumns { table, .. }
            | Self::NonNumericValues { table, .. }
            | Self::DuplicateKeys { table, .. } => table,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStatus {
    pub table:  String,
    pub rows:   usize,
    pub valid:  bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub defects: Vec<StructuralDefect>,
    pub tables:  Vec<TableStatus>,
    /// Required workbook tables absent from the registry.
    pub missing_workbook_tables: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }

    pub fn defects_for<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a StructuralDefect> + 'a {
        self.defects.iter().filter(move |d| d.table() == table)
    }

    pub fn status(&self, table: &str) -> Option<&TableStatus> {
        self.tables.iter().find(|s| s.table == table)
    }
}

pub fn validate(registry: &TableRegistry, schema: &TsaSchema) -> ValidationReport {
    let mut report = ValidationReport {
        missing_workbook_tables: registry
            .missing_tables()
            .into_iter()
            .map(String::from)
            .collect(),
        ..ValidationReport::default()
    };

    for expected in &schema.tables {
        let Some(table) = registry.get(&expected.table) else {
            report.defects.push(StructuralDefect::MissingTable { table: expected.table.clone() });
            report.tables.push(TableStatus {
                table:  expected.table.clone(),
                rows:   0,
                valid:  false,
                detail: "Not provided".into(),
            });
            continue;
        };

        let mut table_defects = Vec::new();

        let missing: Vec<String> = expected
            .required
            .iter()
            .filter(|c| !table.has_column(c))
            .cloned()
            .collect();
        if !missing.is_empty() {
            table_defects.push(StructuralDefect::MissingColumns {
                table:   expected.table.clone(),
                columns: missing,
            });
        }

        for column in expected.numeric.iter().filter(|c| table.has_column(c)) {
            let count = table.non_numeric_count(column);
            if count > 0 {
                table_defects.push(StructuralDefect::NonNumericValues {
                    table:  expected.table.clone(),
                    column: column.clone(),
                    count,
                });
            }
        }

        let dups = table.duplicate_keys();
        if !dups.is_empty() {
            table_defects.push(StructuralDefect::DuplicateKeys {
                table: expected.table.clone(),
                keys:  dups,
            });
        }

        let detail = if table_defects.is_empty() {
            "Valid".to_string()
        } else {
            table_defects
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        };

        for defect in &table_defects {
            log::warn!("structural defect: {defect}");
        }

        report.tables.push(TableStatus {
            table: expected.table.clone(),
            rows: table.len(),
            valid: table_defects.is_empty(),
            detail,
        });
        report.defects.extend(table_defects);
    }

    log::debug!(
        "validation: {} tables checked, {} defects",
        report.tables.len(),
        report.defects.len()
    );

    report
}
