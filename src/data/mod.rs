/// Data layer: core types, loading, enrichment, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<BookingRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  enrich   │  drop incomplete rows, derive nights / date / group
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ EnrichedDataset│  immutable snapshot, memoized by `cache`
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range + hotel types → FilteredSet
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  one AggregateTable per chart
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod enrich;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
