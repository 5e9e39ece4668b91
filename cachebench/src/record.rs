use crate::variant;
use color_eyre::eyre::{self, WrapErr};
use color_eyre::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;

const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Storage device the benchmarked tree was backed by.
///
/// The declaration order is the order in which storage types are shown in
/// every plot: NVDIMM, NVM, then SSD.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageType {
    VolatileStorage,
    PMemStorage,
    FileStorage,
    Other(String),
}

impl StorageType {
    pub fn all() -> Vec<Self> {
        vec![Self::VolatileStorage, Self::PMemStorage, Self::FileStorage]
    }

    pub fn name(&self) -> &str {
        match self {
            Self::VolatileStorage => "VolatileStorage",
            Self::PMemStorage => "PMemStorage",
            Self::FileStorage => "FileStorage",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for StorageType {
    fn from(name: String) -> Self {
        // both the class names and the display names may show up in csv files
        match name.trim() {
            "VolatileStorage" | "NVDIMM" => Self::VolatileStorage,
            "PMemStorage" | "NVM" => Self::PMemStorage,
            "FileStorage" | "SSD" | "SSD NVMe" => Self::FileStorage,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<&str> for StorageType {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<StorageType> for String {
    fn from(storage_type: StorageType) -> Self {
        storage_type.name().to_string()
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Cache size as a fraction of the data set, kept in basis points so that it
/// can be used as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct CacheSize {
    basis_points: u32,
}

impl CacheSize {
    pub fn from_fraction(fraction: f64) -> Self {
        let basis_points = (fraction * 10_000.0).round().max(0.0) as u32;
        Self { basis_points }
    }

    pub fn fraction(&self) -> f64 {
        self.basis_points as f64 / 10_000.0
    }

    pub fn percent(&self) -> f64 {
        self.basis_points as f64 / 100.0
    }
}

impl From<f64> for CacheSize {
    fn from(fraction: f64) -> Self {
        Self::from_fraction(fraction)
    }
}

impl From<CacheSize> for f64 {
    fn from(cache_size: CacheSize) -> Self {
        cache_size.fraction()
    }
}

impl fmt::Display for CacheSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// One benchmark observation, as written by the benchmark's csv logger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchRecord {
    #[serde(default)]
    pub tree_type: String,
    pub policy_name: String,
    pub storage_type: StorageType,
    #[serde(default)]
    pub config_name: String,
    pub cache_size: CacheSize,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cache_page_limit: Option<u64>,
    pub thread_count: usize,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub key_type: String,
    #[serde(default)]
    pub value_type: String,
    pub record_count: u64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub degree: Option<u64>,
    pub operation: String,
    pub time_us: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub throughput_ops_sec: Option<f64>,
    #[serde(default)]
    pub test_run_id: u64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cache_hits: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cache_misses: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cache_evictions: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cache_dirty_evictions: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cache_hit_rate: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub perf_cycles: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub perf_instructions: Option<f64>,
    #[serde(default)]
    pub workload_type: Option<String>,
    /// Composite key of policy name and cleaned config name, set on load.
    #[serde(skip)]
    pub policy_variant: String,
}

impl BenchRecord {
    /// Records processed per second.
    pub fn throughput(&self) -> f64 {
        self.record_count as f64 * MICROS_PER_SEC / self.time_us
    }

    /// Cache hit rate in percent, if any cache access was recorded.
    pub fn hit_rate(&self) -> Option<f64> {
        let hits = self.cache_hits.unwrap_or(0);
        let accesses = hits + self.cache_misses.unwrap_or(0);
        if accesses == 0 {
            return None;
        }
        Some(hits as f64 / accesses as f64 * 100.0)
    }

    /// Cycles per instruction, if the perf counters yield a finite positive
    /// value. Zero instructions are counted as one.
    pub fn cpi(&self) -> Option<f64> {
        let cycles = self.perf_cycles?;
        let instructions = match self.perf_instructions? {
            instructions if instructions == 0.0 => 1.0,
            instructions => instructions,
        };
        let cpi = cycles / instructions;
        if cpi.is_finite() && cpi > 0.0 {
            Some(cpi)
        } else {
            None
        }
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.unwrap_or(0)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.unwrap_or(0)
    }

    pub fn cache_evictions(&self) -> u64 {
        self.cache_evictions.unwrap_or(0)
    }

    pub fn cache_dirty_evictions(&self) -> u64 {
        self.cache_dirty_evictions.unwrap_or(0)
    }

    // recompute the derived key from the raw columns
    pub(crate) fn set_policy_variant(&mut self) {
        self.policy_variant =
            variant::policy_variant(&self.policy_name, &self.config_name);
    }
}

/// Loads all records from the csv file at `path`.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<BenchRecord>, Report> {
    let path = path.as_ref();
    if !path.is_file() {
        eyre::bail!("input file {} not found", path.display());
    }
    let file = std::fs::File::open(path)
        .wrap_err_with(|| format!("open {}", path.display()))?;
    let records = read_csv(file)
        .wrap_err_with(|| format!("read records from {}", path.display()))?;
    tracing::info!(
        "loaded {} records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Reads all records from csv data. Rows with a non-positive elapsed time
/// can't produce a throughput and are dropped.
pub fn read_csv(reader: impl Read) -> Result<Vec<BenchRecord>, Report> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    let mut dropped = 0;
    for (index, row) in reader.deserialize().enumerate() {
        let mut record: BenchRecord =
            row.wrap_err_with(|| format!("parse row {}", index + 1))?;
        if !(record.time_us.is_finite() && record.time_us > 0.0) {
            dropped += 1;
            continue;
        }
        record.set_policy_variant();
        records.push(record);
    }
    if dropped > 0 {
        tracing::warn!(
            "dropped {} rows without a positive elapsed time",
            dropped
        );
    }
    Ok(records)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const HEADER: &str = "tree_type,policy_name,storage_type,config_name,cache_size,cache_page_limit,thread_count,timestamp,key_type,value_type,record_count,degree,operation,time_us,throughput_ops_sec,test_run_id,cache_hits,cache_misses,cache_evictions,cache_dirty_evictions,cache_hit_rate";

    /// Builds a record with the fields that matter for the analysis.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn record(
        policy: &str,
        config: &str,
        storage: StorageType,
        cache_size: f64,
        threads: usize,
        operation: &str,
        run: u64,
        time_us: f64,
    ) -> BenchRecord {
        let mut record = BenchRecord {
            tree_type: String::from("BplusTreeSOA"),
            policy_name: policy.to_string(),
            storage_type: storage,
            config_name: config.to_string(),
            cache_size: CacheSize::from_fraction(cache_size),
            cache_page_limit: None,
            thread_count: threads,
            timestamp: String::new(),
            key_type: String::from("uint64_t"),
            value_type: String::from("uint64_t"),
            record_count: 1_000,
            degree: Some(24),
            operation: operation.to_string(),
            time_us,
            throughput_ops_sec: None,
            test_run_id: run,
            cache_hits: None,
            cache_misses: None,
            cache_evictions: None,
            cache_dirty_evictions: None,
            cache_hit_rate: None,
            perf_cycles: None,
            perf_instructions: None,
            workload_type: None,
            policy_variant: String::new(),
        };
        record.set_policy_variant();
        record
    }

    #[test]
    fn read_logger_output() {
        let data = format!(
            "{}\n{}\n{}\n",
            HEADER,
            "BplusTreeSOA,LRU,PMemStorage,concurrent_relaxed,0.15,1500,4,2024-01-01 10:00:00,uint64_t,uint64_t,100000,24,insert,2000000,50000,1,900,100,80,10,90",
            "BplusTreeSOA,A2Q,VolatileStorage,non_concurrent_default,0.1,,1,,uint64_t,uint64_t,1000,24,search_random,0,0,2,,,,,"
        );
        let records = read_csv(data.as_bytes()).expect("csv should parse");

        // the second row has no elapsed time and is dropped
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.policy_name, "LRU");
        assert_eq!(record.storage_type, StorageType::PMemStorage);
        assert_eq!(record.cache_size, CacheSize::from_fraction(0.15));
        assert_eq!(record.thread_count, 4);
        assert_eq!(record.test_run_id, 1);
        assert_eq!(record.policy_variant, "LRU_relaxed");
        assert_eq!(record.cache_hits(), 900);
        assert_eq!(record.perf_cycles, None);
        assert_eq!(record.workload_type, None);
    }

    #[test]
    fn throughput_matches_reported() {
        let data = format!(
            "{}\n{}\n",
            HEADER,
            "BplusTreeSOA,CLOCK,FileStorage,default,0.02,,1,,uint64_t,uint64_t,250000,24,insert,3125000,80000,3,,,,,"
        );
        let records = read_csv(data.as_bytes()).expect("csv should parse");
        let record = &records[0];
        let reported = record.throughput_ops_sec.expect("reported throughput");
        assert!((record.throughput() - reported).abs() < 1e-6);
        assert_eq!(record.storage_type, StorageType::FileStorage);
        assert_eq!(record.cache_misses(), 0);
        assert_eq!(record.hit_rate(), None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_csv("/this/path/does/not/exist.csv");
        assert!(result.is_err());
    }

    #[test]
    fn hit_rate() {
        let mut record = record(
            "LRU",
            "default",
            StorageType::FileStorage,
            0.15,
            1,
            "insert",
            1,
            10.0,
        );
        record.cache_hits = Some(3);
        record.cache_misses = Some(1);
        assert_eq!(record.hit_rate(), Some(75.0));
    }

    #[test]
    fn cpi() {
        let mut record = record(
            "LRU",
            "default",
            StorageType::FileStorage,
            0.15,
            1,
            "insert",
            1,
            10.0,
        );
        assert_eq!(record.cpi(), None);

        record.perf_cycles = Some(300.0);
        record.perf_instructions = Some(200.0);
        assert_eq!(record.cpi(), Some(1.5));

        // zero instructions count as one
        record.perf_instructions = Some(0.0);
        assert_eq!(record.cpi(), Some(300.0));

        // non-positive values are discarded
        record.perf_cycles = Some(0.0);
        assert_eq!(record.cpi(), None);
    }

    #[test]
    fn storage_type_names() {
        assert_eq!(StorageType::from("NVDIMM"), StorageType::VolatileStorage);
        assert_eq!(StorageType::from("NVM"), StorageType::PMemStorage);
        assert_eq!(StorageType::from("SSD NVMe"), StorageType::FileStorage);
        assert_eq!(
            StorageType::from("TapeStorage"),
            StorageType::Other(String::from("TapeStorage"))
        );
        let mut storages = vec![
            StorageType::FileStorage,
            StorageType::VolatileStorage,
            StorageType::PMemStorage,
        ];
        storages.sort();
        assert_eq!(storages, StorageType::all());
    }

    #[test]
    fn cache_size_display() {
        assert_eq!(CacheSize::from_fraction(0.15).to_string(), "15%");
        assert_eq!(CacheSize::from_fraction(0.025).to_string(), "2.5%");
        assert_eq!(CacheSize::from_fraction(0.1).percent(), 10.0);
        assert!(CacheSize::from_fraction(0.02) < CacheSize::from_fraction(0.1));
    }
}
