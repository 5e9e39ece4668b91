use color_eyre::eyre::{self, WrapErr};
use color_eyre::Report;
use serde::{Deserialize, Serialize};

const TREE_MARKER: &str = "BplusTree";
const THREADS_PREFIX: &str = "threads";

/// Benchmark parameters encoded in the name of a benchmark output folder,
/// e.g. `concurrent_relaxed_BplusTreeSOA_LRU_PMemStorage_150000_4096_2147483648_uint64_t_uint64_t_search_zipfian_64_1000000_threads4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderInfo {
    pub cache_variant: String,
    pub cache_policy: String,
    pub storage_type: String,
    pub cache_size: u64,
    pub page_size: u64,
    pub max_size: u64,
    pub key_type: String,
    pub value_type: String,
    pub operation: String,
    pub degree: u64,
    pub records: u64,
    pub threads: usize,
}

impl FolderInfo {
    pub fn parse(folder_name: &str) -> Result<Self, Report> {
        let parts: Vec<_> = folder_name.split('_').collect();

        // everything before the tree type is the cache variant
        let tree_index = parts
            .iter()
            .position(|part| part.contains(TREE_MARKER))
            .ok_or_else(|| {
                eyre::eyre!("no tree type in folder name {:?}", folder_name)
            })?;
        let cache_variant = parts[..tree_index].join("_");
        let rest = &parts[tree_index + 1..];

        let part = |index| part(rest, index, folder_name);
        let number = |index, what| number(rest, index, what, folder_name);

        let cache_policy = part(0)?.to_string();
        let storage_type = part(1)?.to_string();
        let cache_size = number(2, "cache size")?;
        let page_size = number(3, "page size")?;
        let max_size = number(4, "max size")?;
        // key and value types are split in two by the separator (`uint64_t`)
        let key_type = format!("{}_{}", part(5)?, part(6)?);
        let value_type = format!("{}_{}", part(7)?, part(8)?);

        // the operation may span several parts (`search_zipfian`) and ends at
        // the first numeric part, which is the degree
        let operation_start = 9;
        let degree_index = (operation_start..rest.len())
            .find(|&index| rest[index].parse::<u64>().is_ok())
            .ok_or_else(|| {
                eyre::eyre!("no tree degree in folder name {:?}", folder_name)
            })?;
        let operation = rest[operation_start..degree_index].join("_");
        let degree = number(degree_index, "degree")?;
        let records = number(degree_index + 1, "record count")?;

        let threads = part(degree_index + 2)?;
        let threads: usize = threads
            .strip_prefix(THREADS_PREFIX)
            .unwrap_or(threads)
            .parse()
            .wrap_err_with(|| {
                format!("parse thread count of {:?}", folder_name)
            })?;

        Ok(Self {
            cache_variant,
            cache_policy,
            storage_type,
            cache_size,
            page_size,
            max_size,
            key_type,
            value_type,
            operation,
            degree,
            records,
            threads,
        })
    }
}

fn part<'a>(
    parts: &[&'a str],
    index: usize,
    folder_name: &str,
) -> Result<&'a str, Report> {
    parts.get(index).copied().ok_or_else(|| {
        eyre::eyre!(
            "folder name {:?} is missing parameter #{}",
            folder_name,
            index
        )
    })
}

fn number(
    parts: &[&str],
    index: usize,
    what: &str,
    folder_name: &str,
) -> Result<u64, Report> {
    let value = part(parts, index, folder_name)?;
    value.parse().wrap_err_with(|| {
        format!("parse {} {:?} of {:?}", what, value, folder_name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_compound_operation() {
        let name = "concurrent_lru_update_in_order_concurrent_lru_update_in_order_BplusTreeSOA_LRU_PMemStorage_150000_4096_2147483648_uint64_t_uint64_t_search_zipfian_64_1000000_threads4";
        let info = FolderInfo::parse(name).expect("folder name should parse");
        assert_eq!(
            info.cache_variant,
            "concurrent_lru_update_in_order_concurrent_lru_update_in_order"
        );
        assert_eq!(info.cache_policy, "LRU");
        assert_eq!(info.storage_type, "PMemStorage");
        assert_eq!(info.cache_size, 150000);
        assert_eq!(info.page_size, 4096);
        assert_eq!(info.max_size, 2147483648);
        assert_eq!(info.key_type, "uint64_t");
        assert_eq!(info.value_type, "uint64_t");
        assert_eq!(info.operation, "search_zipfian");
        assert_eq!(info.degree, 64);
        assert_eq!(info.records, 1000000);
        assert_eq!(info.threads, 4);
    }

    #[test]
    fn parse_simple_operation() {
        let name = "non_concurrent_non_concurrent_BplusTreeSOA_A2Q_VolatileStorage_10000_4096_1024_uint64_t_uint64_t_delete_24_500_threads1";
        let info = FolderInfo::parse(name).expect("folder name should parse");
        assert_eq!(info.cache_variant, "non_concurrent_non_concurrent");
        assert_eq!(info.operation, "delete");
        assert_eq!(info.threads, 1);
    }

    #[test]
    fn malformed_names() {
        // no tree type
        assert!(FolderInfo::parse("analysis_results").is_err());
        // non-numeric cache size
        assert!(FolderInfo::parse(
            "x_BplusTreeSOA_LRU_PMemStorage_big_4096_1_uint64_t_uint64_t_insert_24_10_threads1"
        )
        .is_err());
        // no degree after the operation
        assert!(FolderInfo::parse(
            "x_BplusTreeSOA_LRU_PMemStorage_1_4096_1_uint64_t_uint64_t_insert"
        )
        .is_err());
        // truncated after the degree
        assert!(FolderInfo::parse(
            "x_BplusTreeSOA_LRU_PMemStorage_1_4096_1_uint64_t_uint64_t_insert_24_10"
        )
        .is_err());
        // bad thread count
        assert!(FolderInfo::parse(
            "x_BplusTreeSOA_LRU_PMemStorage_1_4096_1_uint64_t_uint64_t_insert_24_10_threadsX"
        )
        .is_err());
    }
}
