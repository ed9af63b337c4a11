/// Data layer: sieve table types, loading, and result writing.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SieveTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ SieveTable  │  label columns, Vec<SieveRecord>
///   └────────────┘
///        │  analysis::analyze
///        ▼
///   ┌──────────┐
///   │  writer   │  SieveAnalysis → sieve_results.csv
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod writer;
