//! Tourism Satellite Account computation engine.
//!
//! Stages (leaves first): table registry, structural validation,
//! core aggregates, ratio and employment analysis, quality scoring,
//! scenario projection, insights. `engine::TsaEngine` runs them in
//! that fixed order.

pub mod aggregates;
pub mod config;
pub mod employment;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod insight;
pub mod memo;
pub mod quality;
pub mod ratios;
pub mod report;
pub mod scenario;
pub mod table;
pub mod types;
pub mod validator;
