use crate::analysis::runs::ConfigAggregate;
use crate::analysis::{group_by, throughput};
use crate::dataset::Dataset;
use crate::rank::{RankBy, RankTable};
use crate::record::{CacheSize, StorageType};
use crate::stats;
use std::collections::BTreeMap;

type MeanKey = (String, StorageType, String, usize);

/// Mean throughput per (variant, storage type, operation, thread count).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeanThroughputs {
    means: BTreeMap<MeanKey, f64>,
}

impl MeanThroughputs {
    pub fn new(dataset: &Dataset) -> Self {
        let groups = group_by(dataset.records(), |record| {
            (
                record.policy_variant.clone(),
                record.storage_type.clone(),
                record.operation.clone(),
                record.thread_count,
            )
        });
        let means = groups
            .into_iter()
            .filter_map(|(key, records)| {
                let values: Vec<_> =
                    records.into_iter().filter_map(throughput).collect();
                stats::mean(&values).map(|mean| (key, mean))
            })
            .collect();
        Self { means }
    }

    pub fn get(
        &self,
        variant: &str,
        storage_type: &StorageType,
        operation: &str,
        thread_count: usize,
    ) -> Option<f64> {
        let key = (
            variant.to_string(),
            storage_type.clone(),
            operation.to_string(),
            thread_count,
        );
        self.means.get(&key).copied()
    }

    /// Ranks the variants separately for every (operation, storage type)
    /// pair. Rows are ordered by operation and then by storage type.
    pub fn operation_ranking(
        &self,
        variants: &[String],
        operations: &[String],
        storage_types: &[StorageType],
        thread_count: usize,
    ) -> RankTable {
        let mut rows = Vec::new();
        let mut values = Vec::new();
        for operation in operations {
            for storage_type in storage_types {
                rows.push(format!("{} {}", operation, storage_type));
                let row = variants
                    .iter()
                    .map(|variant| {
                        self.get(variant, storage_type, operation, thread_count)
                    })
                    .collect();
                values.push(row);
            }
        }
        RankTable::new(rows, variants.to_vec(), values, RankBy::Row)
    }

    /// Ranks the variants per storage type on their mean throughput across
    /// operations.
    pub fn summary_ranking(
        &self,
        variants: &[String],
        operations: &[String],
        storage_types: &[StorageType],
        thread_count: usize,
    ) -> RankTable {
        let rows = storage_types.iter().map(|s| s.to_string()).collect();
        let values = storage_types
            .iter()
            .map(|storage_type| {
                variants
                    .iter()
                    .map(|variant| {
                        let means: Vec<_> = operations
                            .iter()
                            .filter_map(|operation| {
                                self.get(
                                    variant,
                                    storage_type,
                                    operation,
                                    thread_count,
                                )
                            })
                            .collect();
                        stats::mean(&means)
                    })
                    .collect()
            })
            .collect();
        RankTable::new(rows, variants.to_vec(), values, RankBy::Row)
    }
}

/// Ranks the variants within each cache size (column) for one storage type
/// and thread count.
pub fn cache_size_ranking(
    aggregates: &[ConfigAggregate],
    variants: &[String],
    cache_sizes: &[CacheSize],
    storage_type: &StorageType,
    thread_count: usize,
) -> RankTable {
    let means: BTreeMap<_, _> = aggregates
        .iter()
        .filter(|aggregate| {
            &aggregate.storage_type == storage_type
                && aggregate.thread_count == thread_count
        })
        .map(|aggregate| {
            let key = (aggregate.policy_variant.as_str(), aggregate.cache_size);
            (key, aggregate.mean)
        })
        .collect();

    let columns = cache_sizes.iter().map(|size| size.to_string()).collect();
    let values = variants
        .iter()
        .map(|variant| {
            cache_sizes
                .iter()
                .map(|&cache_size| {
                    means.get(&(variant.as_str(), cache_size)).copied()
                })
                .collect()
        })
        .collect();
    RankTable::new(variants.to_vec(), columns, values, RankBy::Column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::runs;
    use crate::record::tests::record;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn dataset() -> Dataset {
        let pmem = StorageType::PMemStorage;
        Dataset::from_records(vec![
            record("LRU", "relaxed", pmem.clone(), 0.1, 1, "insert", 1, 100.0),
            record("LRU", "relaxed", pmem.clone(), 0.1, 1, "insert", 2, 300.0),
            record("LRU", "relaxed", pmem.clone(), 0.1, 1, "delete", 1, 400.0),
            record("A2Q", "default", pmem.clone(), 0.1, 1, "insert", 1, 400.0),
            record("A2Q", "default", pmem.clone(), 0.1, 1, "delete", 1, 100.0),
            record(
                "CLOCK",
                "default",
                pmem.clone(),
                0.1,
                1,
                "insert",
                1,
                400.0,
            ),
            record("CLOCK", "default", pmem, 0.2, 1, "insert", 1, 50.0),
        ])
    }

    #[test]
    fn means() {
        let means = MeanThroughputs::new(&dataset());
        let pmem = StorageType::PMemStorage;
        // 1000 records in 100us and 300us
        let expected = (1e7 + 1e7 / 3.0) / 2.0;
        let lru = means.get("LRU_relaxed", &pmem, "insert", 1);
        assert!((lru.expect("lru insert mean") - expected).abs() < 1e-6);
        assert_eq!(means.get("LRU_relaxed", &pmem, "insert", 4), None);
    }

    #[test]
    fn operation_and_summary_rankings() {
        let means = MeanThroughputs::new(&dataset());
        let variants =
            strings(&["A2Q_default", "CLOCK_default", "LRU_relaxed"]);
        let operations = strings(&["delete", "insert"]);
        let storage_types = vec![StorageType::PMemStorage];

        let table =
            means.operation_ranking(&variants, &operations, &storage_types, 1);
        assert_eq!(table.rows().len(), 2);
        // delete: A2Q is best, CLOCK has no data
        assert_eq!(table.rank(0, 0), Some(1));
        assert_eq!(table.rank(0, 1), None);
        assert_eq!(table.rank(0, 2), Some(2));
        // insert: CLOCK mixes both cache sizes
        assert_eq!(table.rank(1, 0), Some(3));
        assert_eq!(table.rank(1, 1), Some(1));
        assert_eq!(table.rank(1, 2), Some(2));

        let summary =
            means.summary_ranking(&variants, &operations, &storage_types, 1);
        assert_eq!(summary.rows(), &[String::from("PMemStorage")]);
        // means across operations: 6.25e6, 1.125e7 and ~4.58e6
        assert_eq!(summary.rank(0, 0), Some(2));
        assert_eq!(summary.rank(0, 1), Some(1));
        assert_eq!(summary.rank(0, 2), Some(3));
        assert_eq!(summary.max_rank(), Some(3));
    }

    #[test]
    fn cache_size_columns() {
        let dataset = dataset();
        let aggregates = runs::aggregate_runs(&dataset);
        let variants = dataset.policy_variants();
        let cache_sizes = dataset.cache_sizes();
        let table = cache_size_ranking(
            &aggregates,
            &variants,
            &cache_sizes,
            &StorageType::PMemStorage,
            1,
        );
        assert_eq!(
            table.columns(),
            &[String::from("10%"), String::from("20%")]
        );
        // 20% only has CLOCK
        assert_eq!(table.rank(1, 1), Some(1));
        assert_eq!(table.rank(0, 1), None);
        assert_eq!(table.rank(2, 1), None);
        // every 10% entry is ranked
        assert!((0..3).all(|row| table.rank(row, 0).is_some()));
    }
}
