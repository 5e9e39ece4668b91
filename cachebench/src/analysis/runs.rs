use crate::analysis::group_by;
use crate::dataset::Dataset;
use crate::record::{CacheSize, StorageType};
use crate::stats;
use std::collections::BTreeMap;

const MICROS_PER_SEC: f64 = 1_000_000.0;

/// A metric value of a single test run (or of a single row of one).
#[derive(Debug, Clone, PartialEq)]
pub struct RunPoint {
    pub policy_name: String,
    pub storage_type: StorageType,
    pub cache_size: CacheSize,
    pub thread_count: usize,
    pub test_run_id: u64,
    pub value: f64,
}

/// Throughput of every complete test run: all operations executed in a run
/// are merged, so the throughput is the total record count over the total
/// elapsed time.
pub fn run_throughputs(dataset: &Dataset) -> Vec<RunPoint> {
    let runs = group_by(dataset.records(), |record| {
        (
            record.policy_name.clone(),
            record.storage_type.clone(),
            record.cache_size,
            record.thread_count,
            record.test_run_id,
        )
    });
    runs.into_iter()
        .map(|(key, records)| {
            let (policy_name, storage_type, cache_size, thread_count, run) =
                key;
            let total_records: u64 =
                records.iter().map(|record| record.record_count).sum();
            let total_time_us: f64 =
                records.iter().map(|record| record.time_us).sum();
            let value = if total_time_us > 0.0 {
                total_records as f64 / total_time_us * MICROS_PER_SEC
            } else {
                0.0
            };
            RunPoint {
                policy_name,
                storage_type,
                cache_size,
                thread_count,
                test_run_id: run,
                value,
            }
        })
        .collect()
}

/// Cycles per instruction of every row with valid perf counters.
pub fn cpi_points(dataset: &Dataset) -> Vec<RunPoint> {
    dataset
        .records()
        .iter()
        .filter_map(|record| {
            let cpi = record.cpi()?;
            Some(RunPoint {
                policy_name: record.policy_name.clone(),
                storage_type: record.storage_type.clone(),
                cache_size: record.cache_size,
                thread_count: record.thread_count,
                test_run_id: record.test_run_id,
                value: cpi,
            })
        })
        .collect()
}

/// Throughput of a configuration aggregated over its test runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigAggregate {
    pub storage_type: StorageType,
    pub cache_size: CacheSize,
    pub thread_count: usize,
    pub policy_variant: String,
    pub mean: f64,
    pub stddev: f64,
    pub runs: usize,
}

/// Aggregates throughput in two steps: first the mean over the operations of
/// each test run, then mean, standard deviation and count over the runs of
/// each (storage, cache size, threads, variant) configuration.
pub fn aggregate_runs(dataset: &Dataset) -> Vec<ConfigAggregate> {
    let runs = group_by(dataset.records(), |record| {
        (
            record.storage_type.clone(),
            record.cache_size,
            record.thread_count,
            record.policy_variant.clone(),
            record.test_run_id,
        )
    });

    let mut configs: BTreeMap<_, Vec<f64>> = BTreeMap::new();
    for ((storage, cache_size, threads, variant, _run), records) in runs {
        let throughputs: Vec<_> =
            records.iter().map(|record| record.throughput()).collect();
        if let Some(mean) = stats::mean(&throughputs) {
            configs
                .entry((storage, cache_size, threads, variant))
                .or_default()
                .push(mean);
        }
    }

    configs
        .into_iter()
        .filter_map(|((storage, cache_size, threads, variant), means)| {
            Some(ConfigAggregate {
                storage_type: storage,
                cache_size,
                thread_count: threads,
                policy_variant: variant,
                mean: stats::mean(&means)?,
                stddev: stats::stddev(&means)?,
                runs: means.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;

    fn dataset() -> Dataset {
        let pmem = StorageType::PMemStorage;
        Dataset::from_records(vec![
            // run 1: 2000 records in 400us
            record("LRU", "relaxed", pmem.clone(), 0.1, 1, "insert", 1, 100.0),
            record("LRU", "relaxed", pmem.clone(), 0.1, 1, "delete", 1, 300.0),
            // run 2: 2000 records in 200us
            record("LRU", "relaxed", pmem.clone(), 0.1, 1, "insert", 2, 100.0),
            record("LRU", "relaxed", pmem.clone(), 0.1, 1, "delete", 2, 100.0),
            // other thread count
            record("LRU", "relaxed", pmem, 0.1, 4, "insert", 1, 50.0),
        ])
    }

    #[test]
    fn run_throughput_merges_operations() {
        let runs = run_throughputs(&dataset());
        assert_eq!(runs.len(), 3);
        let values: Vec<_> = runs
            .iter()
            .filter(|run| run.thread_count == 1)
            .map(|run| (run.test_run_id, run.value))
            .collect();
        assert_eq!(values, vec![(1, 5e6), (2, 1e7)]);
    }

    #[test]
    fn cpi_points_skip_missing_counters() {
        let mut dataset = dataset();
        assert!(cpi_points(&dataset).is_empty());

        let mut with_counters = record(
            "A2Q",
            "default",
            StorageType::FileStorage,
            0.1,
            1,
            "insert",
            1,
            10.0,
        );
        with_counters.perf_cycles = Some(10.0);
        with_counters.perf_instructions = Some(4.0);
        dataset.merge(Dataset::from_records(vec![with_counters]));

        let points = cpi_points(&dataset);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].policy_name, "A2Q");
        assert_eq!(points[0].value, 2.5);
    }

    #[test]
    fn aggregate_over_runs() {
        let aggregates = aggregate_runs(&dataset());
        assert_eq!(aggregates.len(), 2);

        // run 1 averages 1e7 and 1e7 / 3; run 2 averages 1e7 and 1e7
        let single = &aggregates[0];
        assert_eq!(single.thread_count, 1);
        assert_eq!(single.runs, 2);
        let run1 = (1e7 + 1e7 / 3.0) / 2.0;
        let expected = (run1 + 1e7) / 2.0;
        assert!((single.mean - expected).abs() < 1e-6);
        assert!(single.stddev > 0.0);

        // a single run has no deviation
        let threads = &aggregates[1];
        assert_eq!(threads.thread_count, 4);
        assert_eq!(threads.runs, 1);
        assert_eq!(threads.stddev, 0.0);
    }
}
