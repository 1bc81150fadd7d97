/// Data layer: core types, loading, caching and filtering.
///
/// Architecture:
/// ```text
///  Google Sheet (gviz CSV) / local .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → TargetTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  keep the result for the TTL
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  selected issuers → rows sorted by date
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod format;
pub mod loader;
pub mod model;
