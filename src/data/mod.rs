/// Data layer: feature groups, loading, and dataset assembly.
///
/// Architecture:
/// ```text
///  <group>.parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files → FeatureSet
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  FeatureSet   │  group name → Array2<f64>
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ assemble  │  concat, ±1 labels, truncate, seeded split → Split
///   └──────────┘
/// ```

pub mod assemble;
pub mod loader;
pub mod model;
