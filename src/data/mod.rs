/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .xls / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  raw cells → schema::Schema → MovieDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ MovieDataset  │  Vec<MovieRecord>, year / tag / genre option lists
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year / genre / tag predicates → borrowed views
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group, reduce, rank → result tables
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
