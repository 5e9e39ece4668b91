use cachebench::Summary;
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Directory, next to the figures, where per-workload tables are written.
pub const WORKLOAD_DATA_DIR: &str = "workload_data_csv";

/// One throughput value shown in a storage box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedThroughputRow {
    pub thread_count: usize,
    pub policy_variant: String,
    pub storage_type: String,
    pub throughput_ops_per_sec: f64,
}

/// Worst-case storage sensitivity of a variant at one thread count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvMetricRow {
    pub thread_count: usize,
    pub policy_variant: String,
    pub policy_display_name: String,
    pub max_cv_percent: f64,
}

/// Statistics of one box of a storage box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatisticsRow {
    pub thread_count: usize,
    pub policy_variant: String,
    pub policy_display_name: String,
    pub storage_type: String,
    pub count: usize,
    pub mean_throughput: f64,
    pub median_throughput: f64,
    pub std_throughput: f64,
    pub min_throughput: f64,
    pub max_throughput: f64,
    pub q1_throughput: f64,
    pub q3_throughput: f64,
}

impl SummaryStatisticsRow {
    pub fn new(
        thread_count: usize,
        policy_variant: &str,
        policy_display_name: &str,
        storage_type: &str,
        summary: &Summary,
    ) -> Self {
        Self {
            thread_count,
            policy_variant: policy_variant.to_string(),
            policy_display_name: policy_display_name.to_string(),
            storage_type: storage_type.to_string(),
            count: summary.count,
            mean_throughput: round2(summary.mean),
            median_throughput: round2(summary.median),
            std_throughput: round2(summary.stddev),
            min_throughput: round2(summary.min),
            max_throughput: round2(summary.max),
            q1_throughput: round2(summary.p25),
            q3_throughput: round2(summary.p75),
        }
    }
}

/// Writes serializable rows, with a header, to a csv file.
pub fn write_rows<T: Serialize>(
    path: impl AsRef<Path>,
    rows: &[T],
) -> Result<(), Report> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .wrap_err_with(|| format!("create {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .wrap_err_with(|| format!("write row to {}", path.display()))?;
    }
    writer
        .flush()
        .wrap_err_with(|| format!("flush {}", path.display()))?;
    tracing::info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Per-workload table: a `Workload` line, the data table and an optional
/// storage sensitivity section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkloadReport {
    workload: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    cv_header: Vec<String>,
    cv_rows: Vec<Vec<String>>,
}

impl WorkloadReport {
    pub fn new(workload: &str, header: &[&str]) -> Self {
        Self {
            workload: workload.to_string(),
            header: strings(header),
            ..Self::default()
        }
    }

    pub fn row(&mut self, row: Vec<String>) -> &mut Self {
        self.rows.push(row);
        self
    }

    pub fn cv_header(&mut self, header: &[&str]) -> &mut Self {
        self.cv_header = strings(header);
        self
    }

    pub fn cv_row(&mut self, row: Vec<String>) -> &mut Self {
        self.cv_rows.push(row);
        self
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn cv_rows(&self) -> &[Vec<String>] {
        &self.cv_rows
    }

    /// Writes the report to `<dir>/<workload>_data.csv`.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<PathBuf, Report> {
        let path = dir.as_ref().join(format!("{}_data.csv", self.workload));
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .wrap_err_with(|| format!("create {}", path.display()))?;
        let empty: [&str; 0] = [];

        let mut lines =
            vec![vec![String::from("Workload"), self.workload.clone()]];
        lines.push(Vec::new());
        lines.push(self.header.clone());
        lines.extend(self.rows.iter().cloned());
        if !self.cv_header.is_empty() {
            lines.push(Vec::new());
            lines.push(Vec::new());
            lines.push(vec![String::from(
                "Coefficient of Variation (CV) - Storage Sensitivity",
            )]);
            lines.push(self.cv_header.clone());
            lines.extend(self.cv_rows.iter().cloned());
        }

        for line in lines {
            let result = if line.is_empty() {
                writer.write_record(&empty)
            } else {
                writer.write_record(&line)
            };
            result.wrap_err_with(|| format!("write {}", path.display()))?;
        }
        writer
            .flush()
            .wrap_err_with(|| format!("flush {}", path.display()))?;
        tracing::info!("exported {} data to {}", self.workload, path.display());
        Ok(path)
    }
}

/// Statistics columns shared by the workload reports.
pub const STATS_HEADER: [&str; 8] = [
    "Std Dev",
    "25th Percentile",
    "50th Percentile (Median)",
    "75th Percentile",
    "Min",
    "Max",
    "Count",
    "All Data Points",
];

/// Mean and [`STATS_HEADER`] cells of a summary; `values` are listed
/// separated by semicolons when given.
pub fn summary_cells(summary: &Summary, values: Option<&[f64]>) -> Vec<String> {
    let mut cells = vec![
        fixed2(summary.mean),
        fixed2(summary.stddev),
        fixed2(summary.p25),
        fixed2(summary.median),
        fixed2(summary.p75),
        fixed2(summary.min),
        fixed2(summary.max),
        summary.count.to_string(),
    ];
    if let Some(values) = values {
        let values: Vec<_> =
            values.iter().map(|value| fixed2(*value)).collect();
        cells.push(values.join(";"));
    }
    cells
}

pub fn fixed2(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
