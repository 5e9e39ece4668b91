#![deny(rust_2018_idioms)]

// This module contains the definition of `BenchRecord`, `StorageType` and
// `CacheSize`.
pub mod record;

// This module contains the naming of policy variants.
pub mod variant;

// This module contains the parsing of benchmark folder names.
pub mod folder;

// This module contains the definition of `Dataset` and `Search`.
pub mod dataset;

// This module contains summary statistics.
pub mod stats;

// This module contains the ranking of values within groups.
pub mod rank;

// This module contains the computations behind each figure.
pub mod analysis;

// This module contains utilitary functions.
pub mod util;

// Re-exports.
pub use dataset::{Dataset, Search};
pub use record::{BenchRecord, CacheSize, StorageType};
pub use stats::Summary;
