//! Sieve analysis of granular materials.
//!
//! Load a sieve table ([`data::loader::load_file`]), run
//! [`analysis::analyze`] with the material density, then write the results
//! table ([`data::writer::write_results_csv`]) and the percent-passing
//! charts ([`chart::export_plots`]).

pub mod analysis;
pub mod chart;
pub mod color;
pub mod data;

pub use analysis::{AnalysisError, AnalysisResult, AnalyzedRecord, SieveAnalysis, analyze};
pub use data::model::{SieveRecord, SieveTable};

/// Density of the sieved material (g/cm³) used when none is supplied.
pub const DEFAULT_DENSITY: f64 = 1.32;
