/// Data layer: core types, loading, filtering and ranking.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable → HotelDataset (schema flags, bounds)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  ConstraintSet → FilteredSet (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   rank    │  top-10 cheapest / rated / value / walk → RankedTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ evaluate  │  one pass per constraint snapshot → Evaluation
///   └──────────┘
/// ```

pub mod evaluate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod rank;
