use crate::record::{self, BenchRecord, CacheSize, StorageType};
use crate::util;
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use std::path::Path;

/// Filter over benchmark records. Every unset field matches all records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Search {
    policy_variant: Option<String>,
    policy_name: Option<String>,
    storage_type: Option<StorageType>,
    thread_count: Option<usize>,
    cache_size: Option<CacheSize>,
    operation: Option<String>,
    test_run_id: Option<u64>,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy_variant(&mut self, policy_variant: &str) -> &mut Self {
        self.policy_variant = Some(policy_variant.to_string());
        self
    }

    pub fn policy_name(&mut self, policy_name: &str) -> &mut Self {
        self.policy_name = Some(policy_name.to_string());
        self
    }

    pub fn storage_type(&mut self, storage_type: StorageType) -> &mut Self {
        self.storage_type = Some(storage_type);
        self
    }

    pub fn thread_count(&mut self, thread_count: usize) -> &mut Self {
        self.thread_count = Some(thread_count);
        self
    }

    pub fn cache_size(&mut self, cache_size: CacheSize) -> &mut Self {
        self.cache_size = Some(cache_size);
        self
    }

    pub fn operation(&mut self, operation: &str) -> &mut Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn test_run_id(&mut self, test_run_id: u64) -> &mut Self {
        self.test_run_id = Some(test_run_id);
        self
    }

    pub fn matches(&self, record: &BenchRecord) -> bool {
        // filter out records with a different policy variant (if set)
        if let Some(policy_variant) = &self.policy_variant {
            if &record.policy_variant != policy_variant {
                return false;
            }
        }

        // filter out records with a different policy (if set)
        if let Some(policy_name) = &self.policy_name {
            if &record.policy_name != policy_name {
                return false;
            }
        }

        // filter out records with a different storage type (if set)
        if let Some(storage_type) = &self.storage_type {
            if &record.storage_type != storage_type {
                return false;
            }
        }

        // filter out records with a different thread count (if set)
        if let Some(thread_count) = self.thread_count {
            if record.thread_count != thread_count {
                return false;
            }
        }

        // filter out records with a different cache size (if set)
        if let Some(cache_size) = self.cache_size {
            if record.cache_size != cache_size {
                return false;
            }
        }

        // filter out records with a different operation (if set)
        if let Some(operation) = &self.operation {
            if &record.operation != operation {
                return false;
            }
        }

        // filter out records from a different test run (if set)
        if let Some(test_run_id) = self.test_run_id {
            if record.test_run_id != test_run_id {
                return false;
            }
        }

        true
    }
}

/// In-memory collection of benchmark records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<BenchRecord>,
}

impl Dataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Report> {
        let path = path.as_ref();
        let records = record::load_csv(path)
            .wrap_err_with(|| format!("load dataset {}", path.display()))?;
        Ok(Self { records })
    }

    pub fn from_records(mut records: Vec<BenchRecord>) -> Self {
        for record in records.iter_mut() {
            record.set_policy_variant();
        }
        Self { records }
    }

    pub fn records(&self) -> &[BenchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends all records of `other`.
    pub fn merge(&mut self, other: Self) {
        self.records.extend(other.records);
    }

    /// Overrides the thread count of every record.
    pub fn set_thread_count(&mut self, thread_count: usize) {
        for record in self.records.iter_mut() {
            record.thread_count = thread_count;
        }
    }

    /// Keeps only the records for which `keep` returns true.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&BenchRecord) -> bool,
    {
        self.records.retain(keep);
    }

    /// Returns a new dataset with the records matching `search`.
    pub fn filter(&self, search: &Search) -> Self {
        let records = self
            .records
            .iter()
            .filter(|record| search.matches(record))
            .cloned()
            .collect();
        Self { records }
    }

    pub fn find<'a>(
        &'a self,
        search: &'a Search,
    ) -> impl Iterator<Item = &'a BenchRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| search.matches(record))
    }

    /// Throughput of every record matching `search`.
    pub fn throughputs(&self, search: &Search) -> Vec<f64> {
        self.find(search).map(BenchRecord::throughput).collect()
    }

    pub fn policy_variants(&self) -> Vec<String> {
        self.distinct(|record| record.policy_variant.clone())
    }

    pub fn policy_names(&self) -> Vec<String> {
        self.distinct(|record| record.policy_name.clone())
    }

    pub fn storage_types(&self) -> Vec<StorageType> {
        self.distinct(|record| record.storage_type.clone())
    }

    pub fn thread_counts(&self) -> Vec<usize> {
        self.distinct(|record| record.thread_count)
    }

    pub fn cache_sizes(&self) -> Vec<CacheSize> {
        self.distinct(|record| record.cache_size)
    }

    pub fn operations(&self) -> Vec<String> {
        self.distinct(|record| record.operation.clone())
    }

    pub fn test_run_ids(&self) -> Vec<u64> {
        self.distinct(|record| record.test_run_id)
    }

    fn distinct<T, F>(&self, key: F) -> Vec<T>
    where
        T: Ord,
        F: Fn(&BenchRecord) -> T,
    {
        util::distinct(self.records.iter().map(key).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record(
                "LRU",
                "concurrent_relaxed",
                StorageType::PMemStorage,
                0.15,
                4,
                "insert",
                1,
                100.0,
            ),
            record(
                "LRU",
                "concurrent_relaxed",
                StorageType::PMemStorage,
                0.15,
                4,
                "insert",
                2,
                200.0,
            ),
            record(
                "A2Q",
                "default",
                StorageType::FileStorage,
                0.02,
                1,
                "delete",
                1,
                1000.0,
            ),
            record(
                "A2Q",
                "default",
                StorageType::VolatileStorage,
                0.15,
                1,
                "insert",
                1,
                500.0,
            ),
        ])
    }

    #[test]
    fn distinct_dimensions() {
        let dataset = dataset();
        assert_eq!(dataset.len(), 4);
        assert_eq!(
            dataset.policy_variants(),
            vec!["A2Q_default", "LRU_relaxed"]
        );
        assert_eq!(dataset.policy_names(), vec!["A2Q", "LRU"]);
        assert_eq!(
            dataset.storage_types(),
            vec![
                StorageType::VolatileStorage,
                StorageType::PMemStorage,
                StorageType::FileStorage
            ]
        );
        assert_eq!(dataset.thread_counts(), vec![1, 4]);
        assert_eq!(
            dataset.cache_sizes(),
            vec![CacheSize::from_fraction(0.02), CacheSize::from_fraction(0.15)]
        );
        assert_eq!(dataset.operations(), vec!["delete", "insert"]);
        assert_eq!(dataset.test_run_ids(), vec![1, 2]);
    }

    #[test]
    fn search() {
        let dataset = dataset();

        let mut search = Search::new();
        search.policy_variant("LRU_relaxed").thread_count(4);
        // 1000 records in 100us and 200us
        assert_eq!(dataset.throughputs(&search), vec![1e7, 5e6]);

        search.test_run_id(2);
        assert_eq!(dataset.find(&search).count(), 1);

        let mut search = Search::new();
        search
            .cache_size(CacheSize::from_fraction(0.15))
            .operation("insert")
            .storage_type(StorageType::VolatileStorage);
        let found = dataset.filter(&search);
        assert_eq!(found.len(), 1);
        assert_eq!(found.records()[0].policy_name, "A2Q");

        let mut search = Search::new();
        search.policy_name("CLOCK");
        assert!(dataset.filter(&search).is_empty());
    }

    #[test]
    fn merge_and_override_threads() {
        let mut dataset = dataset();
        let mut other = Dataset::from_records(vec![record(
            "LRU",
            "device_aware",
            StorageType::FileStorage,
            0.1,
            8,
            "ycsb_a",
            1,
            10.0,
        )]);
        other.set_thread_count(1);
        dataset.merge(other);
        assert_eq!(dataset.len(), 5);
        assert!(dataset
            .policy_variants()
            .contains(&String::from("device_aware")));
        assert_eq!(dataset.thread_counts(), vec![1, 4]);

        dataset.retain(|record| record.thread_count == 4);
        assert_eq!(dataset.len(), 2);
    }
}
