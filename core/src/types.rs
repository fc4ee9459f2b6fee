//! Shared primitive types used across the entire engine.

/// Dimension key of a Supply-Demand or Consumption row.
pub type ProductId = String;

/// Dimension key of an Employment row.
pub type IndustryId = String;

/// A calendar year in projections.
pub type Year = i32;

/// Aggregates are reported in millions of base currency units.
/// Multiply by this to get base units (productivity, ROI).
pub const MILLION: f64 = 1_000_000.0;
