//! Table registry: the raw input tables handed to the engine.
//!
//! RULE: Tables are immutable once built. Stages read them through
//! the query methods here and never mutate a registered table.
//! Table loading (files, sheets) is the caller's concern.

use crate::error::{TsaError, TsaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Table names ────────────────────────────────────────────────

pub const CONSUMPTION_TABLE: &str = "Table_4_Internal_Consumption";
pub const SUPPLY_DEMAND_TABLE: &str = "Table_6_Supply_Demand_Core";
pub const EMPLOYMENT_TABLE: &str = "Table_7_Employment";

/// Workbook tables a complete TSA submission carries.
pub const REQUIRED_WORKBOOK_TABLES: [&str; 7] = [
    "Table_1_Inbound_Expenditure",
    "Table_2_Domestic_Expenditure",
    "Table_3_Outbound_Expenditure",
    CONSUMPTION_TABLE,
    "Table_5_Production_Accounts",
    SUPPLY_DEMAND_TABLE,
    EMPLOYMENT_TABLE,
];

pub const OPTIONAL_WORKBOOK_TABLES: [&str; 5] = [
    "Table_8_Capital_Formation",
    "Table_9_Collective_Consumption",
    "Table_10a_Trips_Overnights",
    "Table_10b_Transport_Arrivals",
    "Table_10c_Accommodation",
];

/// Canonical column names of the three core tables.
pub mod columns {
    pub const PRODUCTS: &str = "Products";
    pub const INDUSTRIES: &str = "Tourism_Industries";

    // Table 4 / Table 6
    pub const INTERNAL_TOURISM_CONSUMPTION: &str = "Internal_Tourism_Consumption";
    pub const INBOUND_EXPENDITURE: &str = "Inbound_Tourism_Expenditure";
    pub const DOMESTIC_EXPENDITURE: &str = "Domestic_Tourism_Expenditure";
    pub const INTERNAL_EXPENDITURE: &str = "Internal_Tourism_Expenditure";
    pub const OTHER_COMPONENTS: &str = "Other_Components";

    // Table 6
    pub const DOMESTIC_SUPPLY: &str = "Domestic_Supply";
    pub const TOURISM_RATIO: &str = "Tourism_Ratio_Percent";
    pub const TOTAL_DOMESTIC_OUTPUT: &str = "Total_Domestic_Output";
    pub const IMPORTS: &str = "Imports";
    pub const TAXES_LESS_SUBSIDIES: &str = "Taxes_less_Subsidies";
    pub const TRADE_MARGINS: &str = "Trade_Margins";

    // Table 7
    pub const FTE_JOBS: &str = "Full_Time_Equivalent_Jobs";
    pub const TOTAL_JOBS: &str = "Total_Jobs";
    pub const ESTABLISHMENTS: &str = "Number_of_Establishments";
    pub const GVA_TOURISM_SHARE: &str = "GVA_Tourism_Share";
    pub const EMPLOYEES_MALE: &str = "Employees_Male";
    pub const EMPLOYEES_FEMALE: &str = "Employees_Female";
    pub const SELF_EMPLOYED_MALE: &str = "Self_Employed_Male";
    pub const SELF_EMPLOYED_FEMALE: &str = "Self_Employed_Female";
}

// ── Cells ──────────────────────────────────────────────────────

/// One table cell as delivered by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Numeric value, coercing numeric text. `None` for missing,
    /// NaN, or text that does not parse.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_nan() => None,
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
            Cell::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Number(v) => v.is_nan(),
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// Present but not coercible to a number.
    pub fn is_non_numeric(&self) -> bool {
        !self.is_missing() && self.as_f64().is_none()
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Missing, Cell::Number)
    }
}

// ── Table ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub key:   String,
    pub cells: Vec<Cell>,
}

/// A named row collection: one key column plus measure columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    name:       String,
    key_column: String,
    columns:    Vec<String>,
    rows:       Vec<Row>,
}

impl Table {
    pub fn builder(name: &str, key_column: &str) -> TableBuilder {
        TableBuilder {
            name:       name.to_string(),
            key_column: key_column.to_string(),
            columns:    Vec::new(),
            rows:       Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Measure columns, in declaration order (key column excluded).
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True for the key column and for any measure column.
    pub fn has_column(&self, column: &str) -> bool {
        self.key_column == column || self.column_index(column).is_some()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.key.as_str())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.cells.get(idx))
    }

    /// Numeric value at (row, column); `None` if the column is absent
    /// or the cell is missing / non-numeric.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        self.cell(row, column).and_then(Cell::as_f64)
    }

    /// Column sum skipping missing and non-numeric cells.
    /// `None` when the column does not exist.
    pub fn sum(&self, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        Some(
            self.rows
                .iter()
                .filter_map(|r| r.cells.get(idx).and_then(Cell::as_f64))
                .sum(),
        )
    }

    /// Missing cells in a column. An absent column counts every row.
    pub fn missing_count(&self, column: &str) -> usize {
        match self.column_index(column) {
            Some(idx) => self
                .rows
                .iter()
                .filter(|r| r.cells.get(idx).map_or(true, Cell::is_missing))
                .count(),
            None => self.rows.len(),
        }
    }

    /// Present-but-not-numeric cells in a column.
    pub fn non_numeric_count(&self, column: &str) -> usize {
        match self.column_index(column) {
            Some(idx) => self
                .rows
                .iter()
                .filter(|r| r.cells.get(idx).is_some_and(Cell::is_non_numeric))
                .count(),
            None => 0,
        }
    }

    /// Keys appearing on more than one row, in first-seen order.
    pub fn duplicate_keys(&self) -> Vec<String> {
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dups = Vec::new();
        for row in &self.rows {
            let count = seen.entry(row.key.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                dups.push(row.key.clone());
            }
        }
        dups
    }
}

pub struct TableBuilder {
    name:       String,
    key_column: String,
    columns:    Vec<String>,
    rows:       Vec<Row>,
}

impl TableBuilder {
    pub fn column(mut self, name: &str) -> Self {
        self.columns.push(name.to_string());
        self
    }

    pub fn columns(mut self, names: &[&str]) -> Self {
        self.columns.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn row<C: Into<Cell>>(mut self, key: &str, cells: Vec<C>) -> Self {
        self.rows.push(Row {
            key:   key.to_string(),
            cells: cells.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Fails if any row's width differs from the declared columns.
    pub fn build(self) -> TsaResult<Table> {
        let expected = self.columns.len();
        if let Some(bad) = self.rows.iter().find(|r| r.cells.len() != expected) {
            return Err(TsaError::RowWidthMismatch {
                table:  self.name,
                key:    bad.key.clone(),
                expected,
                actual: bad.cells.len(),
            });
        }
        Ok(Table {
            name:       self.name,
            key_column: self.key_column,
            columns:    self.columns,
            rows:       self.rows,
        })
    }
}

// ── Registry ───────────────────────────────────────────────────

/// Named tables, ordered by name so iteration and hashing are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRegistry {
    tables: BTreeMap<String, Table>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under its own name, returning any table it replaced.
    pub fn insert(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name().to_string(), table)
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.insert(table);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// False when either the table or the column is absent.
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.get(table).is_some_and(|t| t.has_column(column))
    }

    /// Required workbook tables that were not registered.
    pub fn missing_tables(&self) -> Vec<&'static str> {
        REQUIRED_WORKBOOK_TABLES
            .iter()
            .copied()
            .filter(|name| !self.contains(name))
            .collect()
    }

    /// Optional workbook tables that were registered.
    pub fn optional_tables_present(&self) -> Vec<&'static str> {
        OPTIONAL_WORKBOOK_TABLES
            .iter()
            .copied()
            .filter(|name| self.contains(name))
            .collect()
    }

    pub fn consumption(&self) -> Option<&Table> {
        self.get(CONSUMPTION_TABLE)
    }

    pub fn supply_demand(&self) -> Option<&Table> {
        self.get(SUPPLY_DEMAND_TABLE)
    }

    pub fn employment(&self) -> Option<&Table> {
        self.get(EMPLOYMENT_TABLE)
    }
}
