use cachebench::folder::FolderInfo;
use cachebench::stats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MICROS_PER_SEC: f64 = 1_000_000.0;

// cache variants that only name the concurrency mode
const PLAIN_VARIANTS: [&str; 2] =
    ["concurrent_concurrent", "non_concurrent_non_concurrent"];

// storage types renamed in the processed tables; others keep their name
const STORAGE_NAMES: [(&str, &str); 2] =
    [("VolatileStorage", "NVDIMM"), ("PMemStorage", "NVM")];

/// A row of the csv file written by a single benchmark run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BenchmarkRow {
    pub time_us: f64,
    pub record_count: u64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cache_hits: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cache_misses: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cache_evictions: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cache_dirty_evictions: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub cache_hit_rate: Option<f64>,
    #[serde(default)]
    pub test_run_id: u64,
    #[serde(default)]
    pub tree_type: String,
    #[serde(default)]
    pub key_type: String,
    #[serde(default)]
    pub value_type: String,
    #[serde(default)]
    pub workload_type: String,
    #[serde(default)]
    pub timestamp: String,
}

/// A benchmark row joined with the parameters of its folder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRow {
    pub cache_policy: String,
    pub cache_variant: String,
    pub concurrency: String,
    pub storage_type: String,
    pub cache_size: u64,
    pub operation: String,
    pub degree: u64,
    pub threads: usize,
    pub time_us: f64,
    pub throughput_ops_sec: f64,
    pub record_count: u64,
    pub cache_hits: Option<f64>,
    pub cache_misses: Option<f64>,
    pub cache_evictions: Option<f64>,
    pub cache_dirty_evictions: Option<f64>,
    pub cache_hit_rate: Option<f64>,
    pub test_run_id: u64,
    pub tree_type: String,
    pub key_type: String,
    pub value_type: String,
    pub workload_type: String,
    pub timestamp: String,
}

impl RawRow {
    pub fn new(folder: &FolderInfo, row: BenchmarkRow) -> Self {
        // the throughput logged by the benchmark is not trusted
        let throughput_ops_sec = if row.time_us > 0.0 {
            row.record_count as f64 * MICROS_PER_SEC / row.time_us
        } else {
            0.0
        };
        let concurrency = if folder.threads > 1 {
            "concurrent"
        } else {
            "non_concurrent"
        };
        let plain = PLAIN_VARIANTS.contains(&folder.cache_variant.as_str());
        let cache_variant = if plain {
            format!("{}_{}", folder.cache_variant, folder.cache_policy)
        } else {
            folder.cache_variant.clone()
        };
        let storage_type = STORAGE_NAMES
            .iter()
            .find(|(name, _)| *name == folder.storage_type)
            .map_or(folder.storage_type.as_str(), |(_, renamed)| *renamed);

        Self {
            cache_policy: folder.cache_policy.clone(),
            cache_variant,
            concurrency: concurrency.to_string(),
            storage_type: storage_type.to_string(),
            cache_size: folder.cache_size,
            operation: folder.operation.clone(),
            degree: folder.degree,
            threads: folder.threads,
            time_us: row.time_us,
            throughput_ops_sec,
            record_count: row.record_count,
            cache_hits: row.cache_hits,
            cache_misses: row.cache_misses,
            cache_evictions: row.cache_evictions,
            cache_dirty_evictions: row.cache_dirty_evictions,
            cache_hit_rate: row.cache_hit_rate,
            test_run_id: row.test_run_id,
            tree_type: row.tree_type,
            key_type: row.key_type,
            value_type: row.value_type,
            workload_type: row.workload_type,
            timestamp: row.timestamp,
        }
    }

    fn config(&self) -> ConfigKey {
        ConfigKey {
            cache_policy: self.cache_policy.clone(),
            cache_variant: self.cache_variant.clone(),
            concurrency: self.concurrency.clone(),
            storage_type: self.storage_type.clone(),
            cache_size: self.cache_size,
            operation: self.operation.clone(),
            degree: self.degree,
            threads: self.threads,
            record_count: self.record_count,
            tree_type: self.tree_type.clone(),
            key_type: self.key_type.clone(),
            value_type: self.value_type.clone(),
            workload_type: self.workload_type.clone(),
        }
    }
}

// every column identifying a configuration, in output order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ConfigKey {
    cache_policy: String,
    cache_variant: String,
    concurrency: String,
    storage_type: String,
    cache_size: u64,
    operation: String,
    degree: u64,
    threads: usize,
    record_count: u64,
    tree_type: String,
    key_type: String,
    value_type: String,
    workload_type: String,
}

/// A configuration aggregated over its test runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedRow {
    pub cache_policy: String,
    pub cache_variant: String,
    pub concurrency: String,
    pub storage_type: String,
    pub cache_size: u64,
    pub operation: String,
    pub degree: u64,
    pub threads: usize,
    pub record_count: u64,
    pub tree_type: String,
    pub key_type: String,
    pub value_type: String,
    pub workload_type: String,
    pub time_us_mean: f64,
    pub time_us_std: f64,
    pub throughput_ops_sec_mean: f64,
    pub throughput_ops_sec_std: f64,
    pub cache_hits_mean: Option<f64>,
    pub cache_misses_mean: Option<f64>,
    pub cache_evictions_mean: Option<f64>,
    pub cache_dirty_evictions_mean: Option<f64>,
    pub cache_hit_rate_mean: Option<f64>,
    pub num_test_runs: usize,
}

impl ProcessedRow {
    fn new(key: ConfigKey, rows: &[&RawRow]) -> Self {
        let column = |value: fn(&RawRow) -> f64| -> Vec<f64> {
            rows.iter().map(|row| value(row)).collect()
        };
        let optional_mean = |value: fn(&RawRow) -> Option<f64>| {
            let values: Vec<_> =
                rows.iter().filter_map(|row| value(row)).collect();
            stats::mean(&values)
        };
        // a single run has no deviation
        let mean_std = |values: Vec<f64>| {
            let mean = stats::mean(&values).unwrap_or(0.0);
            let std = stats::stddev(&values).unwrap_or(0.0);
            (mean, std)
        };
        let (time_us_mean, time_us_std) = mean_std(column(|row| row.time_us));
        let (throughput_ops_sec_mean, throughput_ops_sec_std) =
            mean_std(column(|row| row.throughput_ops_sec));

        Self {
            cache_policy: key.cache_policy,
            cache_variant: key.cache_variant,
            concurrency: key.concurrency,
            storage_type: key.storage_type,
            cache_size: key.cache_size,
            operation: key.operation,
            degree: key.degree,
            threads: key.threads,
            record_count: key.record_count,
            tree_type: key.tree_type,
            key_type: key.key_type,
            value_type: key.value_type,
            workload_type: key.workload_type,
            time_us_mean,
            time_us_std,
            throughput_ops_sec_mean,
            throughput_ops_sec_std,
            cache_hits_mean: optional_mean(|row| row.cache_hits),
            cache_misses_mean: optional_mean(|row| row.cache_misses),
            cache_evictions_mean: optional_mean(|row| row.cache_evictions),
            cache_dirty_evictions_mean: optional_mean(|row| {
                row.cache_dirty_evictions
            }),
            cache_hit_rate_mean: optional_mean(|row| row.cache_hit_rate),
            num_test_runs: rows.len(),
        }
    }
}

/// Aggregates the test runs of every configuration; configurations are
/// sorted by their columns.
pub fn aggregate_runs(rows: &[RawRow]) -> Vec<ProcessedRow> {
    let mut configs: BTreeMap<ConfigKey, Vec<&RawRow>> = BTreeMap::new();
    for row in rows {
        configs.entry(row.config()).or_default().push(row);
    }
    configs
        .into_iter()
        .map(|(key, rows)| ProcessedRow::new(key, &rows))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(threads: usize, variant: &str) -> FolderInfo {
        let name = format!(
            "{}_BplusTreeSOA_LRU_PMemStorage_150000_4096_2147483648_uint64_t_uint64_t_insert_64_1000000_threads{}",
            variant, threads
        );
        FolderInfo::parse(&name).expect("valid folder name")
    }

    fn row(run: u64, time_us: f64, hits: Option<f64>) -> BenchmarkRow {
        BenchmarkRow {
            time_us,
            record_count: 1000,
            cache_hits: hits,
            cache_misses: hits.map(|hits| 100.0 - hits),
            cache_evictions: None,
            cache_dirty_evictions: None,
            cache_hit_rate: hits,
            test_run_id: run,
            tree_type: String::from("BplusTreeSOA"),
            key_type: String::from("uint64_t"),
            value_type: String::from("uint64_t"),
            workload_type: String::new(),
            timestamp: String::from("20251002_072156"),
        }
    }

    #[test]
    fn raw_row_from_folder() {
        let info = folder(4, "concurrent_concurrent");
        let raw = RawRow::new(&info, row(1, 100.0, None));
        assert_eq!(raw.cache_variant, "concurrent_concurrent_LRU");
        assert_eq!(raw.concurrency, "concurrent");
        assert_eq!(raw.storage_type, "NVM");
        assert_eq!(raw.cache_size, 150000);
        assert_eq!(raw.operation, "insert");
        assert_eq!(raw.throughput_ops_sec, 1e7);

        let raw = RawRow::new(
            &folder(1, "non_concurrent_relaxed"),
            row(1, 0.0, None),
        );
        assert_eq!(raw.cache_variant, "non_concurrent_relaxed");
        assert_eq!(raw.concurrency, "non_concurrent");
        assert_eq!(raw.throughput_ops_sec, 0.0);
    }

    #[test]
    fn storage_names() {
        let storage = |storage: &str| {
            let name = format!(
                "concurrent_relaxed_BplusTreeSOA_LRU_{}_150000_4096_2147483648_uint64_t_uint64_t_insert_64_1000000_threads4",
                storage
            );
            let folder = FolderInfo::parse(&name).expect("valid folder name");
            RawRow::new(&folder, row(1, 100.0, None)).storage_type
        };
        assert_eq!(storage("VolatileStorage"), "NVDIMM");
        assert_eq!(storage("PMemStorage"), "NVM");
        // only shown as SSD NVMe in the plots
        assert_eq!(storage("FileStorage"), "FileStorage");
    }

    #[test]
    fn aggregate_test_runs() {
        let two_threads = folder(2, "concurrent_relaxed");
        let single = folder(1, "non_concurrent_relaxed");
        let rows = vec![
            RawRow::new(&two_threads, row(1, 100.0, Some(80.0))),
            RawRow::new(&two_threads, row(2, 200.0, Some(60.0))),
            RawRow::new(&two_threads, row(3, 300.0, None)),
            RawRow::new(&single, row(1, 100.0, None)),
        ];
        let processed = aggregate_runs(&rows);
        assert_eq!(processed.len(), 2);

        let concurrent = &processed[0];
        assert_eq!(concurrent.concurrency, "concurrent");
        assert_eq!(concurrent.num_test_runs, 3);
        assert_eq!(concurrent.time_us_mean, 200.0);
        assert_eq!(concurrent.time_us_std, 100.0);
        // counters are averaged over the runs that have them
        assert_eq!(concurrent.cache_hits_mean, Some(70.0));
        assert_eq!(concurrent.cache_evictions_mean, None);

        let non_concurrent = &processed[1];
        assert_eq!(non_concurrent.num_test_runs, 1);
        assert_eq!(non_concurrent.throughput_ops_sec_mean, 1e7);
        assert_eq!(non_concurrent.throughput_ops_sec_std, 0.0);
    }

    #[test]
    fn read_benchmark_rows() {
        let data = "\
tree_type,time_us,record_count,cache_hits,cache_misses,cache_evictions,cache_dirty_evictions,cache_hit_rate,test_run_id,key_type,value_type,workload_type,timestamp
BplusTreeSOA,250,1000,10,90,5,1,0.1,2,uint64_t,uint64_t,,20251002
BplusTreeSOA,500,1000,,,,,,3,uint64_t,uint64_t,ycsb_a,20251002
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<BenchmarkRow> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("rows should parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cache_hits, Some(10.0));
        assert_eq!(rows[0].test_run_id, 2);
        assert_eq!(rows[1].cache_hits, None);
        assert_eq!(rows[1].workload_type, "ycsb_a");
    }
}
