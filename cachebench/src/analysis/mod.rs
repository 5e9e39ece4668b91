// This module contains per-test-run aggregation.
pub mod runs;

// This module contains the comparison of two tree implementations.
pub mod versions;

// This module contains the storage sensitivity of policy variants.
pub mod sensitivity;

// This module contains the ranking tables.
pub mod ranking;

// This module contains the hit rate and scalability series.
pub mod series;

use crate::record::BenchRecord;
use crate::stats::Summary;
use std::collections::BTreeMap;

/// Groups records by the key computed by `key`.
pub fn group_by<'a, K, F, I>(
    records: I,
    key: F,
) -> BTreeMap<K, Vec<&'a BenchRecord>>
where
    I: IntoIterator<Item = &'a BenchRecord>,
    K: Ord,
    F: Fn(&BenchRecord) -> K,
{
    let mut groups: BTreeMap<K, Vec<_>> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().push(record);
    }
    groups
}

/// Groups records by `key` and summarizes the `metric` of each group. Records
/// without a metric value are ignored, and so are groups left empty.
pub fn summarize_by<'a, K, F, M, I>(
    records: I,
    key: F,
    metric: M,
) -> BTreeMap<K, Summary>
where
    I: IntoIterator<Item = &'a BenchRecord>,
    K: Ord,
    F: Fn(&BenchRecord) -> K,
    M: Fn(&BenchRecord) -> Option<f64>,
{
    group_by(records, key)
        .into_iter()
        .filter_map(|(key, records)| {
            let values: Vec<_> =
                records.into_iter().filter_map(&metric).collect();
            Summary::new(&values).map(|summary| (key, summary))
        })
        .collect()
}

/// Throughput as a metric for `summarize_by`.
pub fn throughput(record: &BenchRecord) -> Option<f64> {
    Some(record.throughput())
}
