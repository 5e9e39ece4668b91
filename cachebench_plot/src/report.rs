use crate::export::{
    self, AggregatedThroughputRow, CvMetricRow, SummaryStatisticsRow,
    WorkloadReport, STATS_HEADER,
};
use crate::fmt::PlotFmt;
use crate::layout::{GroupLayout, GroupedBoxes};
use cachebench::analysis::ranking::{cache_size_ranking, MeanThroughputs};
use cachebench::analysis::runs::aggregate_runs;
use cachebench::analysis::sensitivity::{
    storage_cv, storage_means, storage_sensitivity, Sensitivity,
};
use cachebench::rank::RankTable;
use cachebench::{Dataset, Search, StorageType, Summary};
use std::collections::BTreeMap;

/// Throughput boxes of every variant per thread count, one group per
/// variant.
pub fn thread_boxes(
    dataset: &Dataset,
    variants: &[String],
    thread_counts: &[usize],
) -> GroupedBoxes {
    let groups = variants
        .iter()
        .map(|variant| {
            thread_counts
                .iter()
                .map(|&thread_count| {
                    dataset.throughputs(
                        Search::new()
                            .policy_variant(variant)
                            .thread_count(thread_count),
                    )
                })
                .collect()
        })
        .collect();
    GroupLayout::new(4.5).place(groups)
}

/// Throughput boxes of every variant on every storage type, plus the storage
/// sensitivity of each variant.
#[derive(Debug, Clone)]
pub struct StoragePanel {
    pub placed: GroupedBoxes,
    pub sensitivities: BTreeMap<String, Sensitivity>,
}

impl StoragePanel {
    pub fn new(
        dataset: &Dataset,
        base: &Search,
        variants: &[String],
        storage_types: &[StorageType],
    ) -> Self {
        let groups = variants
            .iter()
            .map(|variant| {
                storage_types
                    .iter()
                    .map(|storage_type| {
                        dataset.throughputs(
                            base.clone()
                                .policy_variant(variant)
                                .storage_type(storage_type.clone()),
                        )
                    })
                    .collect()
            })
            .collect();
        let placed = GroupLayout::new(5.0).place(groups);
        let sensitivities = storage_sensitivity(
            dataset,
            base,
            variants,
            storage_types,
            &dataset.cache_sizes(),
        );
        Self {
            placed,
            sensitivities,
        }
    }
}

/// The three tables exported next to the per-thread storage figure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadPanelRows {
    pub aggregated: Vec<AggregatedThroughputRow>,
    pub cv_metrics: Vec<CvMetricRow>,
    pub summaries: Vec<SummaryStatisticsRow>,
}

impl ThreadPanelRows {
    /// Collects the rows of each panel; `panels` and `thread_counts` are
    /// paired in order.
    pub fn new(
        panels: &[StoragePanel],
        thread_counts: &[usize],
        variants: &[String],
        storage_types: &[StorageType],
    ) -> Self {
        let mut rows = Self::default();
        for (panel, &thread_count) in panels.iter().zip(thread_counts) {
            for placed_box in panel.placed.boxes() {
                let variant = &variants[placed_box.group];
                let storage_type =
                    PlotFmt::storage_name(&storage_types[placed_box.member]);
                rows.aggregated.extend(placed_box.values.iter().map(
                    |&value| AggregatedThroughputRow {
                        thread_count,
                        policy_variant: variant.clone(),
                        storage_type: storage_type.to_string(),
                        throughput_ops_per_sec: value,
                    },
                ));
                if let Some(summary) = Summary::new(&placed_box.values) {
                    rows.summaries.push(SummaryStatisticsRow::new(
                        thread_count,
                        variant,
                        &PlotFmt::policy_variant_label(variant),
                        storage_type,
                        &summary,
                    ));
                }
            }
            for variant in variants {
                if let Some(sensitivity) = panel.sensitivities.get(variant) {
                    rows.cv_metrics.push(CvMetricRow {
                        thread_count,
                        policy_variant: variant.clone(),
                        policy_display_name: PlotFmt::policy_variant_label(
                            variant,
                        ),
                        max_cv_percent: export::round2(sensitivity.max_cv),
                    });
                }
            }
        }
        rows
    }
}

/// Statistics per variant, storage type and cache size of one workload,
/// followed by the worst-case storage sensitivity of each variant.
pub fn workload_report(
    dataset: &Dataset,
    base: &Search,
    workload: &str,
    variants: &[String],
    storage_types: &[StorageType],
    sensitivities: &BTreeMap<String, Sensitivity>,
) -> WorkloadReport {
    let mut header = vec![
        "Policy Variant",
        "Storage Type",
        "Cache Size",
        "Mean Throughput",
    ];
    // every stats column but the raw values
    header.extend(&STATS_HEADER[..STATS_HEADER.len() - 1]);

    let mut report = WorkloadReport::new(workload, &header);
    let cache_sizes = dataset.cache_sizes();
    for variant in variants {
        for storage_type in storage_types {
            for &cache_size in &cache_sizes {
                let values = dataset.throughputs(
                    base.clone()
                        .policy_variant(variant)
                        .storage_type(storage_type.clone())
                        .cache_size(cache_size),
                );
                let summary = match Summary::new(&values) {
                    Some(summary) => summary,
                    None => continue,
                };
                let mut row = vec![
                    variant.clone(),
                    storage_type.to_string(),
                    cache_size.fraction().to_string(),
                ];
                row.extend(export::summary_cells(&summary, None));
                report.row(row);
            }
        }
    }

    report.cv_header(&["Policy Variant", "Max CV Across Cache Sizes (%)"]);
    for variant in variants {
        if let Some(sensitivity) = sensitivities.get(variant) {
            report.cv_row(vec![
                variant.clone(),
                export::fixed2(sensitivity.max_cv),
            ]);
        }
    }
    report
}

/// Statistics and raw values of every variant on one workload.
pub fn policy_report(
    dataset: &Dataset,
    workload: &str,
    variants: &[String],
) -> WorkloadReport {
    let mut header =
        vec!["Policy Variant", "Display Name", "Mean Throughput (ops/sec)"];
    header.extend(STATS_HEADER);

    let mut report = WorkloadReport::new(workload, &header);
    for variant in variants {
        let values = dataset.throughputs(
            Search::new().operation(workload).policy_variant(variant),
        );
        if let Some(summary) = Summary::new(&values) {
            let mut row =
                vec![variant.clone(), PlotFmt::policy_variant_label(variant)];
            row.extend(export::summary_cells(&summary, Some(&values)));
            report.row(row);
        }
    }
    report
}

/// Statistics and raw values of every variant on every storage type of one
/// workload, followed by the CV of each variant across storage means.
pub fn device_report(
    dataset: &Dataset,
    workload: &str,
    variants: &[String],
    storage_types: &[StorageType],
) -> WorkloadReport {
    let mut header = vec![
        "Policy Variant",
        "Display Name",
        "Storage Type",
        "Storage Display Name",
        "Mean Throughput (ops/sec)",
    ];
    header.extend(STATS_HEADER);

    let mut report = WorkloadReport::new(workload, &header);
    for variant in variants {
        let label = PlotFmt::policy_variant_label(variant);
        for storage_type in storage_types {
            let values = dataset.throughputs(
                Search::new()
                    .operation(workload)
                    .policy_variant(variant)
                    .storage_type(storage_type.clone()),
            );
            if let Some(summary) = Summary::new(&values) {
                let mut row = vec![
                    variant.clone(),
                    label.clone(),
                    storage_type.to_string(),
                    PlotFmt::storage_name(storage_type).to_string(),
                ];
                row.extend(export::summary_cells(&summary, Some(&values)));
                report.row(row);
            }
        }
    }

    report.cv_header(&["Policy Variant", "Display Name", "CV (%)"]);
    for variant in variants {
        let means = storage_means(
            dataset,
            Search::new().operation(workload).policy_variant(variant),
            storage_types,
        );
        if let Some(cv) = storage_cv(&means) {
            report.cv_row(vec![
                variant.clone(),
                PlotFmt::policy_variant_label(variant),
                export::fixed2(cv),
            ]);
        }
    }
    report
}

/// Joins the device-aware runs to the original ones. The device-aware runs
/// were logged with a wrong thread count, so all of them count as
/// `thread_count` threads; only records with that thread count are kept.
pub fn with_device_aware(
    original: &Dataset,
    device_aware: &Dataset,
    thread_count: usize,
) -> Dataset {
    let mut device_aware = device_aware.clone();
    device_aware.set_thread_count(thread_count);
    let mut dataset = original.clone();
    dataset.merge(device_aware);
    dataset.filter(Search::new().thread_count(thread_count))
}

/// Per-operation ranks on the lowest thread count and cross-operation
/// ranks on up to `summary_panels` thread counts, with the largest rank
/// over all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRankings {
    pub detailed: Option<(usize, RankTable)>,
    pub summaries: Vec<(usize, RankTable)>,
    pub max_rank: usize,
}

impl OperationRankings {
    pub fn new(
        dataset: &Dataset,
        variants: &[String],
        operations: &[String],
        storage_types: &[StorageType],
        summary_panels: usize,
    ) -> Self {
        let means = MeanThroughputs::new(dataset);
        let thread_counts = dataset.thread_counts();
        let detailed = thread_counts.first().map(|&thread_count| {
            let table = means.operation_ranking(
                variants,
                operations,
                storage_types,
                thread_count,
            );
            (thread_count, table)
        });
        let summaries: Vec<_> = thread_counts
            .iter()
            .take(summary_panels)
            .map(|&thread_count| {
                let table = means.summary_ranking(
                    variants,
                    operations,
                    storage_types,
                    thread_count,
                );
                (thread_count, table)
            })
            .collect();
        // no rank at all: shade as if every variant was ranked
        let max_rank = detailed
            .iter()
            .chain(summaries.iter())
            .filter_map(|(_, table)| table.max_rank())
            .max()
            .unwrap_or(variants.len());
        Self {
            detailed,
            summaries,
            max_rank,
        }
    }
}

/// Ranks of the variants within each cache size, indexed by thread count
/// and then by storage type.
pub fn cache_size_rankings(
    dataset: &Dataset,
    variants: &[String],
    storage_types: &[StorageType],
    thread_counts: &[usize],
) -> Vec<Vec<RankTable>> {
    let aggregates = aggregate_runs(dataset);
    tracing::info!("aggregated to {} configurations", aggregates.len());
    let cache_sizes = dataset.cache_sizes();
    thread_counts
        .iter()
        .map(|&thread_count| {
            storage_types
                .iter()
                .map(|storage_type| {
                    cache_size_ranking(
                        &aggregates,
                        variants,
                        &cache_sizes,
                        storage_type,
                        thread_count,
                    )
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachebench::record::read_csv;

    const HEADER: &str = "policy_name,config_name,storage_type,cache_size,thread_count,record_count,operation,time_us,test_run_id";

    // every row processes 1000 records
    fn dataset(rows: &[&str]) -> Dataset {
        let data = format!("{}\n{}\n", HEADER, rows.join("\n"));
        let records = read_csv(data.as_bytes()).expect("csv should parse");
        Dataset::from_records(records)
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn ycsb() -> Dataset {
        dataset(&[
            "LRU,default,VolatileStorage,0.1,1,1000,ycsb_a,100,1",
            "LRU,default,VolatileStorage,0.1,1,1000,ycsb_a,200,2",
            "LRU,default,PMemStorage,0.1,1,1000,ycsb_a,400,1",
            "CLOCK,default,FileStorage,0.1,1,1000,ycsb_a,1000,1",
            "CLOCK,default,FileStorage,0.1,1,1000,ycsb_c,500,1",
        ])
    }

    #[test]
    fn workload_rows_and_sensitivity() {
        let dataset = ycsb();
        let variants = dataset.policy_variants();
        assert_eq!(variants, strings(&["CLOCK_default", "LRU_default"]));
        let storage_types = StorageType::all();
        let mut base = Search::new();
        base.operation("ycsb_a");
        let panel =
            StoragePanel::new(&dataset, &base, &variants, &storage_types);
        let report = workload_report(
            &dataset,
            &base,
            "ycsb_a",
            &variants,
            &storage_types,
            &panel.sensitivities,
        );

        assert_eq!(report.header().len(), 11);
        assert_eq!(report.header()[3], "Mean Throughput");
        assert_eq!(report.header()[10], "Count");
        // variants first, then storage types in plot order
        assert_eq!(report.rows().len(), 3);
        assert_eq!(
            report.rows()[0][..2],
            strings(&["CLOCK_default", "FileStorage"])
        );
        assert_eq!(
            report.rows()[1],
            strings(&[
                "LRU_default",
                "VolatileStorage",
                "0.1",
                "7500000.00",
                "3535533.91",
                "6250000.00",
                "7500000.00",
                "8750000.00",
                "5000000.00",
                "10000000.00",
                "2",
            ])
        );
        assert_eq!(report.rows()[2][1], "PMemStorage");
        assert_eq!(report.rows()[2][10], "1");

        // LRU means: 7.5e6 on NVDIMM and 2.5e6 on NVM
        let lru = report
            .cv_rows()
            .iter()
            .find(|row| row[0] == "LRU_default")
            .expect("lru cv row");
        assert_eq!(lru[1], "70.71");
    }

    #[test]
    fn policy_rows_list_every_value() {
        let dataset = ycsb();
        let variants = dataset.policy_variants();
        let report = policy_report(&dataset, "ycsb_c", &variants);

        assert_eq!(report.header().len(), 11);
        assert_eq!(report.header()[10], "All Data Points");
        // LRU has no ycsb_c data
        assert_eq!(report.rows().len(), 1);
        let row = &report.rows()[0];
        assert_eq!(row[0], "CLOCK_default");
        assert_eq!(row[1], "CLOCK");
        assert_eq!(row[2], "2000000.00");
        assert_eq!(row[9], "1");
        assert_eq!(row[10], "2000000.00");

        let report = policy_report(&dataset, "ycsb_a", &variants);
        let lru = &report.rows()[1];
        assert_eq!(lru[10], "10000000.00;5000000.00;2500000.00");
        assert!(report.cv_rows().is_empty());
    }

    #[test]
    fn device_aware_runs_count_as_single_threaded() {
        let original = dataset(&[
            "LRU,default,VolatileStorage,0.1,1,1000,ycsb_a,100,1",
            "LRU,default,PMemStorage,0.1,1,1000,ycsb_a,400,1",
            "LRU,default,PMemStorage,0.1,4,1000,ycsb_a,50,1",
        ]);
        let device_aware = dataset(&[
            "LRU,device_aware_tiering,VolatileStorage,0.1,4,1000,ycsb_a,200,1",
            "LRU,device_aware_tiering,FileStorage,0.1,8,1000,ycsb_d,100,1",
        ]);
        let dataset = with_device_aware(&original, &device_aware, 1);

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.thread_counts(), vec![1]);
        let variants = dataset.policy_variants();
        assert_eq!(variants, strings(&["LRU_default", "device_aware"]));

        let storage_types = StorageType::all();
        let report =
            device_report(&dataset, "ycsb_a", &variants, &storage_types);
        assert_eq!(report.header().len(), 13);
        assert_eq!(report.rows().len(), 3);
        let device = &report.rows()[2];
        assert_eq!(
            device[..4],
            strings(&[
                "device_aware",
                "Device Aware",
                "VolatileStorage",
                "NVDIMM",
            ])
        );
        // the four-thread LRU run is gone
        assert_eq!(report.rows()[1][4], "2500000.00");

        // only LRU has two storage types: means 1e7 and 2.5e6
        assert_eq!(report.cv_rows().len(), 1);
        assert_eq!(
            report.cv_rows()[0],
            strings(&["LRU_default", "LRU", "84.85"])
        );
    }

    #[test]
    fn thread_panel_tables() {
        let dataset = dataset(&[
            "LRU,default,VolatileStorage,0.1,1,1000,insert,100,1",
            "LRU,default,VolatileStorage,0.1,1,1000,insert,200,2",
            "LRU,default,PMemStorage,0.1,1,1000,insert,400,1",
            "LRU,default,FileStorage,0.1,4,1000,insert,1000,1",
        ]);
        let variants = dataset.policy_variants();
        let storage_types = StorageType::all();
        let thread_counts = [1, 4];
        let panels: Vec<_> = thread_counts
            .iter()
            .map(|&thread_count| {
                let mut base = Search::new();
                base.thread_count(thread_count);
                StoragePanel::new(&dataset, &base, &variants, &storage_types)
            })
            .collect();
        let rows = ThreadPanelRows::new(
            &panels,
            &thread_counts,
            &variants,
            &storage_types,
        );

        // one row per plotted value
        assert_eq!(rows.aggregated.len(), 4);
        assert_eq!(rows.aggregated[0].storage_type, "NVDIMM");
        assert_eq!(rows.aggregated[3].thread_count, 4);
        assert_eq!(rows.aggregated[3].storage_type, "SSD NVMe");

        // one row per box
        assert_eq!(rows.summaries.len(), 3);
        assert_eq!(rows.summaries[0].count, 2);
        assert_eq!(rows.summaries[0].mean_throughput, 7.5e6);
        assert_eq!(rows.summaries[0].policy_display_name, "LRU");

        // a single storage type at 4 threads still yields a CV of 0
        assert_eq!(rows.cv_metrics.len(), 2);
        assert_eq!(rows.cv_metrics[0].thread_count, 1);
        assert_eq!(rows.cv_metrics[0].max_cv_percent, 70.71);
        assert_eq!(rows.cv_metrics[1].max_cv_percent, 0.0);
    }

    #[test]
    fn thread_boxes_per_variant() {
        let dataset = dataset(&[
            "LRU,default,PMemStorage,0.1,1,1000,insert,100,1",
            "LRU,default,PMemStorage,0.1,4,1000,insert,200,1",
            "CLOCK,default,PMemStorage,0.1,4,1000,insert,400,1",
        ]);
        let variants = dataset.policy_variants();
        let placed = thread_boxes(&dataset, &variants, &[1, 4]);
        // CLOCK has no single-threaded run
        assert_eq!(placed.boxes().len(), 3);
        assert_eq!(placed.members(), vec![1, 0, 1]);
        assert_eq!(placed.centers().len(), 2);
    }

    fn ranked() -> Dataset {
        dataset(&[
            "LRU,default,PMemStorage,0.1,1,1000,insert,100,1",
            "LRU,default,PMemStorage,0.2,1,1000,insert,400,1",
            "LRU,default,PMemStorage,0.1,1,1000,delete,100,1",
            "CLOCK,default,PMemStorage,0.1,1,1000,insert,200,1",
            "CLOCK,default,PMemStorage,0.2,1,1000,insert,100,1",
            "CLOCK,default,PMemStorage,0.1,1,1000,delete,400,1",
            "A2Q,default,PMemStorage,0.1,1,1000,insert,200,1",
            "LRU,default,PMemStorage,0.1,4,1000,insert,100,1",
            "CLOCK,default,PMemStorage,0.1,4,1000,insert,100,1",
        ])
    }

    #[test]
    fn operation_rankings_share_one_scale() {
        let dataset = ranked();
        let variants = dataset.policy_variants();
        let operations = dataset.operations();
        let storage_types = vec![StorageType::PMemStorage];
        let rankings = OperationRankings::new(
            &dataset,
            &variants,
            &operations,
            &storage_types,
            1,
        );

        // per operation, on the lowest thread count only
        let (thread_count, detailed) =
            rankings.detailed.as_ref().expect("detailed table");
        assert_eq!(*thread_count, 1);
        assert_eq!(detailed.rows().len(), 2);
        assert_eq!(
            variants,
            strings(&["A2Q_default", "CLOCK_default", "LRU_default"])
        );
        // delete: LRU ahead of CLOCK, A2Q unranked
        assert_eq!(detailed.rank(0, 0), None);
        assert_eq!(detailed.rank(0, 1), Some(2));
        assert_eq!(detailed.rank(0, 2), Some(1));

        // a single summary panel was asked for
        assert_eq!(rankings.summaries.len(), 1);
        assert_eq!(rankings.max_rank, 3);

        let rankings = OperationRankings::new(
            &dataset,
            &variants,
            &operations,
            &storage_types,
            3,
        );
        assert_eq!(rankings.summaries.len(), 2);
        let (thread_count, summary) = &rankings.summaries[1];
        assert_eq!(*thread_count, 4);
        // LRU and CLOCK tie at four threads
        assert_eq!(summary.rank(0, 1), Some(1));
        assert_eq!(summary.rank(0, 2), Some(1));
        assert_eq!(summary.rank(0, 0), None);

        let empty = OperationRankings::new(
            &Dataset::default(),
            &variants,
            &[],
            &storage_types,
            3,
        );
        assert!(empty.detailed.is_none());
        assert_eq!(empty.max_rank, 3);
    }

    #[test]
    fn cache_size_rankings_per_column() {
        let dataset = ranked();
        let variants = dataset.policy_variants();
        let storage_types =
            vec![StorageType::VolatileStorage, StorageType::PMemStorage];
        let tables = cache_size_rankings(
            &dataset,
            &variants,
            &storage_types,
            &dataset.thread_counts(),
        );

        assert_eq!(tables.len(), 2);
        assert!(tables.iter().all(|row| row.len() == 2));
        // no NVDIMM data at all
        assert_eq!(tables[0][0].max_rank(), None);

        let table = &tables[0][1];
        assert_eq!(table.columns(), &strings(&["10%", "20%"])[..]);
        assert_eq!(table.rows(), &variants[..]);
        // 10%: runs are averaged over their operations
        assert_eq!(table.rank(0, 0), Some(2));
        assert_eq!(table.rank(1, 0), Some(3));
        assert_eq!(table.rank(2, 0), Some(1));
        // 20%: CLOCK beats LRU, A2Q has no run
        assert_eq!(table.rank(2, 1), Some(2));
        assert_eq!(table.rank(1, 1), Some(1));
        assert_eq!(table.rank(0, 1), None);
    }
}
