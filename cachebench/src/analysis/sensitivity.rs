use crate::dataset::{Dataset, Search};
use crate::record::{CacheSize, StorageType};
use crate::stats;
use std::collections::BTreeMap;

/// How much the throughput of a policy variant depends on the storage type,
/// as the worst case over all cache sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    /// Coefficient of variation of the per-storage means, in percent.
    pub max_cv: f64,
    /// Spread between the fastest and the slowest storage, in percent of the
    /// slowest one.
    pub max_range: Option<f64>,
    /// Fastest over slowest storage.
    pub max_ratio: Option<f64>,
}

/// Computes the storage sensitivity of each variant. For every cache size,
/// the mean throughput on each storage type is taken and compared; the
/// maxima over cache sizes are reported. Variants without any comparable
/// cache size are left out.
pub fn storage_sensitivity(
    dataset: &Dataset,
    base: &Search,
    variants: &[String],
    storage_types: &[StorageType],
    cache_sizes: &[CacheSize],
) -> BTreeMap<String, Sensitivity> {
    let mut sensitivities = BTreeMap::new();
    for variant in variants {
        let mut cvs = Vec::new();
        let mut ranges = Vec::new();
        let mut ratios = Vec::new();

        for &cache_size in cache_sizes {
            let means = storage_means(
                dataset,
                base.clone().policy_variant(variant).cache_size(cache_size),
                storage_types,
            );
            if means.is_empty() {
                continue;
            }

            if let Some(cv) = stats::coefficient_of_variation(&means) {
                cvs.push(cv);
            }

            let (min, max) = match (stats::min(&means), stats::max(&means)) {
                (Some(min), Some(max)) => (min, max),
                _ => continue,
            };
            if min > 0.0 {
                ranges.push((max - min) / min * 100.0);
                ratios.push(max / min);
            }
        }

        if let Some(max_cv) = stats::max(&cvs) {
            let sensitivity = Sensitivity {
                max_cv,
                max_range: stats::max(&ranges),
                max_ratio: stats::max(&ratios),
            };
            sensitivities.insert(variant.clone(), sensitivity);
        }
    }
    sensitivities
}

/// Mean throughput on each storage type that has data for `search`.
pub fn storage_means(
    dataset: &Dataset,
    search: &Search,
    storage_types: &[StorageType],
) -> Vec<f64> {
    storage_types
        .iter()
        .filter_map(|storage_type| {
            let throughputs = dataset
                .throughputs(search.clone().storage_type(storage_type.clone()));
            stats::mean(&throughputs)
        })
        .collect()
}

/// Coefficient of variation across storage means; needs at least two storage
/// types to compare.
pub fn storage_cv(means: &[f64]) -> Option<f64> {
    if means.len() < 2 {
        return None;
    }
    stats::coefficient_of_variation(means)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;

    fn dataset() -> Dataset {
        let volatile = StorageType::VolatileStorage;
        let file = StorageType::FileStorage;
        Dataset::from_records(vec![
            // 10%: 1e7 on nvdimm, 5e6 on ssd
            record(
                "LRU",
                "relaxed",
                volatile.clone(),
                0.1,
                1,
                "insert",
                1,
                100.0,
            ),
            record("LRU", "relaxed", file.clone(), 0.1, 1, "insert", 1, 200.0),
            // 20%: 1e7 on both
            record(
                "LRU",
                "relaxed",
                volatile.clone(),
                0.2,
                1,
                "insert",
                1,
                100.0,
            ),
            record("LRU", "relaxed", file.clone(), 0.2, 1, "insert", 1, 100.0),
            // only one storage type
            record("A2Q", "default", volatile, 0.1, 1, "insert", 1, 100.0),
            // other thread count
            record("CLOCK", "default", file, 0.1, 4, "insert", 1, 100.0),
        ])
    }

    #[test]
    fn max_over_cache_sizes() {
        let dataset = dataset();
        let mut base = Search::new();
        base.thread_count(1);
        let sensitivities = storage_sensitivity(
            &dataset,
            &base,
            &dataset.policy_variants(),
            &StorageType::all(),
            &dataset.cache_sizes(),
        );

        let lru = sensitivities["LRU_relaxed"];
        // std of (1e7, 5e6) is 5e6 / sqrt(2), mean is 7.5e6
        let expected_cv = 5e6 / 2f64.sqrt() / 7.5e6 * 100.0;
        assert!((lru.max_cv - expected_cv).abs() < 1e-9);
        assert_eq!(lru.max_range, Some(100.0));
        assert_eq!(lru.max_ratio, Some(2.0));

        // a single storage type has no variation
        let a2q = sensitivities["A2Q_default"];
        assert_eq!(a2q.max_cv, 0.0);
        assert_eq!(a2q.max_ratio, Some(1.0));

        // no data at one thread
        assert!(!sensitivities.contains_key("CLOCK_default"));
    }

    #[test]
    fn cv_needs_two_storage_types() {
        assert_eq!(storage_cv(&[]), None);
        assert_eq!(storage_cv(&[5.0]), None);
        assert_eq!(storage_cv(&[5.0, 5.0]), Some(0.0));
    }
}
