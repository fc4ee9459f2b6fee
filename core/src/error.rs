use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TsaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Table '{table}' row '{key}' has {actual} cells, expected {expected}")]
    RowWidthMismatch {
        table:    String,
        key:      String,
        expected: usize,
        actual:   usize,
    },
}

pub type TsaResult<T> = Result<T, TsaError>;

/// Why a single figure could not be computed.
///
/// Held inside result records next to the figures that did compute.
/// A failing figure never aborts the stage that owns it.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FigureError {
    #[error("invalid parameter {name} = {value} (must be positive)")]
    InvalidParameter { name: String, value: f64 },

    #[error("{figure} is undefined: {denominator} is zero")]
    DivisionUndefined { figure: String, denominator: String },
}

impl FigureError {
    pub fn invalid_parameter(name: &str, value: f64) -> Self {
        Self::InvalidParameter { name: name.into(), value }
    }

    pub fn division_undefined(figure: &str, denominator: &str) -> Self {
        Self::DivisionUndefined {
            figure:      figure.into(),
            denominator: denominator.into(),
        }
    }
}
