/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawRows → FacultyTable (current rows only)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  conjunctive row predicates → visible indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  category counts, bubble series, correlations
///   └───────────┘
///
///  ranking files ──► ranking  (snapshot join on university key)
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod ranking;
