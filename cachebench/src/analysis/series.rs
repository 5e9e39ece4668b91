use crate::analysis::{summarize_by, throughput};
use crate::dataset::{Dataset, Search};
use crate::record::BenchRecord;
use crate::stats::{self, Summary};
use std::collections::BTreeMap;

/// Hit rate and throughput of one (variant, operation) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationSeries {
    pub hit_rate: Option<Summary>,
    pub throughput: Summary,
}

/// Summarizes hit rate and throughput per (variant, operation) for the
/// records matching `search`.
pub fn hit_rate_series(
    dataset: &Dataset,
    search: &Search,
) -> BTreeMap<(String, String), OperationSeries> {
    let key = |record: &BenchRecord| {
        (record.policy_variant.clone(), record.operation.clone())
    };
    let mut hit_rates =
        summarize_by(dataset.find(search), key, BenchRecord::hit_rate);
    summarize_by(dataset.find(search), key, throughput)
        .into_iter()
        .map(|(key, throughput)| {
            let hit_rate = hit_rates.remove(&key);
            (
                key,
                OperationSeries {
                    hit_rate,
                    throughput,
                },
            )
        })
        .collect()
}

/// Throughput of a variant at one thread count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalabilityPoint {
    pub summary: Summary,
    /// Coefficient of variation with the population standard deviation.
    pub cv: Option<f64>,
}

/// Throughput per variant and thread count, restricted to `thread_counts`.
pub fn scalability(
    dataset: &Dataset,
    search: &Search,
    thread_counts: &[usize],
) -> BTreeMap<String, BTreeMap<usize, ScalabilityPoint>> {
    let mut values: BTreeMap<_, BTreeMap<_, Vec<f64>>> = BTreeMap::new();
    for record in dataset.find(search) {
        if !thread_counts.contains(&record.thread_count) {
            continue;
        }
        values
            .entry(record.policy_variant.clone())
            .or_default()
            .entry(record.thread_count)
            .or_default()
            .push(record.throughput());
    }

    values
        .into_iter()
        .map(|(variant, by_threads)| {
            let points = by_threads
                .into_iter()
                .filter_map(|(threads, values)| {
                    let point = ScalabilityPoint {
                        summary: Summary::new(&values)?,
                        cv: stats::population_coefficient_of_variation(&values),
                    };
                    Some((threads, point))
                })
                .collect();
            (variant, points)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;
    use crate::record::{CacheSize, StorageType};

    #[test]
    fn hit_rates_per_operation() {
        let file = StorageType::FileStorage;
        let mut records = vec![
            record("LRU", "relaxed", file.clone(), 0.15, 1, "insert", 1, 100.0),
            record("LRU", "relaxed", file.clone(), 0.15, 1, "insert", 2, 100.0),
            record("LRU", "relaxed", file.clone(), 0.15, 1, "delete", 1, 100.0),
            record("LRU", "relaxed", file.clone(), 0.02, 1, "insert", 1, 100.0),
        ];
        records[0].cache_hits = Some(90);
        records[0].cache_misses = Some(10);
        records[1].cache_hits = Some(70);
        records[1].cache_misses = Some(30);
        let dataset = Dataset::from_records(records);

        let mut search = Search::new();
        search
            .thread_count(1)
            .cache_size(CacheSize::from_fraction(0.15));
        let series = hit_rate_series(&dataset, &search);
        assert_eq!(series.len(), 2);

        let insert =
            series[&(String::from("LRU_relaxed"), String::from("insert"))];
        let hit_rate = insert.hit_rate.expect("insert has hit rates");
        assert_eq!(hit_rate.mean, 80.0);
        assert_eq!(hit_rate.count, 2);
        assert_eq!(insert.throughput.count, 2);

        // no cache counters
        let delete =
            series[&(String::from("LRU_relaxed"), String::from("delete"))];
        assert_eq!(delete.hit_rate, None);
        assert_eq!(delete.throughput.mean, 1e7);
    }

    #[test]
    fn scalability_uses_population_cv() {
        let file = StorageType::FileStorage;
        let dataset = Dataset::from_records(vec![
            record("LRU", "relaxed", file.clone(), 0.1, 1, "ycsb_a", 1, 100.0),
            record("LRU", "relaxed", file.clone(), 0.1, 1, "ycsb_a", 2, 50.0),
            record("LRU", "relaxed", file.clone(), 0.1, 5, "ycsb_a", 1, 20.0),
            record("LRU", "relaxed", file, 0.1, 2, "ycsb_a", 1, 20.0),
        ]);
        let points = scalability(&dataset, &Search::new(), &[1, 5, 20, 40]);
        let lru = &points["LRU_relaxed"];
        assert_eq!(lru.keys().copied().collect::<Vec<_>>(), vec![1, 5]);

        // 1e7 and 2e7: population std is 5e6, mean 1.5e7
        let single = lru[&1];
        assert_eq!(single.summary.mean, 1.5e7);
        let cv = single.cv.expect("cv");
        assert!((cv - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(lru[&5].cv, Some(0.0));
    }
}
