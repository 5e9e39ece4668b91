mod profiling;
mod rows;

// Re-exports.
pub use profiling::{
    print_summary, ProfilingDB, ANALYSIS_DIR, PROCESSED_FILE, RAW_FILE,
};
pub use rows::{aggregate_runs, BenchmarkRow, ProcessedRow, RawRow};
