use crate::analysis::runs::RunPoint;
use crate::record::StorageType;
use crate::stats;
use crate::util;

/// Implementation of the tree being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    V1,
    V2,
}

impl Version {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::V1 => "V1",
            Self::V2 => "V2",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::V1 => "Version 1",
            Self::V2 => "Version 2",
        }
    }
}

/// Values of one version at one thread count.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionBox {
    pub version: Version,
    pub thread_count: usize,
    pub values: Vec<f64>,
}

/// Mean of V2 over the mean of V1 at one thread count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Improvement {
    pub thread_count: usize,
    /// Index of the V2 box this improvement refers to.
    pub box_index: usize,
    pub v2_mean: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyComparison {
    pub policy_name: String,
    /// For each thread count, the V1 box followed by the V2 box.
    pub boxes: Vec<VersionBox>,
    pub improvements: Vec<Improvement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageComparison {
    pub storage_type: StorageType,
    pub policies: Vec<PolicyComparison>,
}

/// Compares the two versions per storage type and per policy present in both
/// versions for that storage type.
pub fn compare_versions(
    v1: &[RunPoint],
    v2: &[RunPoint],
    storage_types: &[StorageType],
    thread_counts: &[usize],
) -> Vec<StorageComparison> {
    storage_types
        .iter()
        .map(|storage_type| {
            let v1: Vec<_> = on_storage(v1, storage_type);
            let v2: Vec<_> = on_storage(v2, storage_type);
            let v1_policies = policies(&v1);
            let v2_policies = policies(&v2);
            let policies = v1_policies
                .into_iter()
                .filter(|policy| v2_policies.contains(policy))
                .map(|policy| compare_policy(&policy, &v1, &v2, thread_counts))
                .collect();
            StorageComparison {
                storage_type: storage_type.clone(),
                policies,
            }
        })
        .collect()
}

fn compare_policy(
    policy_name: &str,
    v1: &[&RunPoint],
    v2: &[&RunPoint],
    thread_counts: &[usize],
) -> PolicyComparison {
    let values = |points: &[&RunPoint], thread_count: usize| -> Vec<f64> {
        points
            .iter()
            .filter(|point| {
                point.policy_name == policy_name
                    && point.thread_count == thread_count
            })
            .map(|point| point.value)
            .collect()
    };

    let mut boxes = Vec::with_capacity(thread_counts.len() * 2);
    let mut improvements = Vec::new();
    for &thread_count in thread_counts {
        let v1_values = values(v1, thread_count);
        let v2_values = values(v2, thread_count);

        // only positive means make a meaningful ratio
        let v1_mean = stats::mean(&v1_values).filter(|mean| *mean > 0.0);
        let v2_mean = stats::mean(&v2_values).filter(|mean| *mean > 0.0);
        if let (Some(v1_mean), Some(v2_mean)) = (v1_mean, v2_mean) {
            improvements.push(Improvement {
                thread_count,
                box_index: boxes.len() + 1,
                v2_mean,
                ratio: v2_mean / v1_mean,
            });
        }

        boxes.push(VersionBox {
            version: Version::V1,
            thread_count,
            values: v1_values,
        });
        boxes.push(VersionBox {
            version: Version::V2,
            thread_count,
            values: v2_values,
        });
    }

    PolicyComparison {
        policy_name: policy_name.to_string(),
        boxes,
        improvements,
    }
}

fn on_storage<'a>(
    points: &'a [RunPoint],
    storage_type: &StorageType,
) -> Vec<&'a RunPoint> {
    points
        .iter()
        .filter(|point| &point.storage_type == storage_type)
        .collect()
}

fn policies(points: &[&RunPoint]) -> Vec<String> {
    let policies = points.iter().map(|point| point.policy_name.clone());
    util::distinct(policies.collect())
}

/// Largest value across all comparisons, used for a shared y scale.
pub fn max_value(comparisons: &[StorageComparison]) -> Option<f64> {
    comparisons
        .iter()
        .flat_map(|storage| storage.policies.iter())
        .flat_map(|policy| policy.boxes.iter())
        .flat_map(|version_box| version_box.values.iter().copied())
        .reduce(f64::max)
}
