use crate::db::rows::{aggregate_runs, BenchmarkRow, ProcessedRow, RawRow};
use crate::export;
use cachebench::folder::FolderInfo;
use cachebench::util;
use color_eyre::eyre::{self, WrapErr};
use color_eyre::Report;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Directory, inside the results directory, where the tables are written.
pub const ANALYSIS_DIR: &str = "analysis_results";
pub const RAW_FILE: &str = "raw_cache_performance_data.csv";
pub const PROCESSED_FILE: &str = "processed_cache_performance_data.csv";

// progress is reported every this many folders
const PROGRESS_EVERY: usize = 50;

/// Rows of every benchmark folder found in a results directory.
#[derive(Debug, Clone, Default)]
pub struct ProfilingDB {
    rows: Vec<RawRow>,
    processed: usize,
    skipped: usize,
}

enum FolderResult {
    Loaded(Vec<RawRow>),
    Skipped,
}

impl ProfilingDB {
    pub fn load(results_dir: impl AsRef<Path>) -> Result<Self, Report> {
        let results_dir = results_dir.as_ref();
        let read_dir = std::fs::read_dir(results_dir).wrap_err_with(|| {
            format!("read results directory {}", results_dir.display())
        })?;
        let mut folders = Vec::new();
        for entry in read_dir {
            let entry = entry.wrap_err("incorrect directory entry")?;
            let path = entry.path();
            // ignore files and previous outputs
            if !path.is_dir() || entry.file_name() == ANALYSIS_DIR {
                continue;
            }
            folders.push(path);
        }
        folders.sort();
        tracing::info!("found {} benchmark run directories", folders.len());

        // track the number of loaded folders
        let loaded = AtomicUsize::new(0);
        let results: Vec<_> = folders
            .into_par_iter()
            .map(|folder| {
                let result = Self::load_folder(&folder);
                let loaded = loaded.fetch_add(1, Ordering::Relaxed) + 1;
                if loaded % PROGRESS_EVERY == 0 {
                    tracing::info!("processed {} directories...", loaded);
                }
                result
            })
            .collect();

        let mut db = Self::default();
        for result in results {
            match result? {
                FolderResult::Loaded(rows) => {
                    db.rows.extend(rows);
                    db.processed += 1;
                }
                FolderResult::Skipped => db.skipped += 1,
            }
        }
        tracing::info!(
            "successfully processed {} directories, skipped {}",
            db.processed,
            db.skipped
        );
        tracing::info!("total data points: {}", db.rows.len());
        Ok(db)
    }

    fn load_folder(folder: &Path) -> Result<FolderResult, Report> {
        let name = folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let info = match FolderInfo::parse(&name) {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!("skipping directory {}: {}", name, e);
                return Ok(FolderResult::Skipped);
            }
        };

        let mut csv_files = csv_files(folder)?;
        if csv_files.is_empty() {
            tracing::warn!("no csv file found in {}", name);
            return Ok(FolderResult::Skipped);
        }
        if csv_files.len() > 1 {
            tracing::warn!(
                "multiple csv files found in {}, using first one",
                name
            );
        }
        let csv_file = csv_files.remove(0);

        let mut reader = match csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&csv_file)
        {
            Ok(reader) => reader,
            Err(e) => {
                tracing::warn!(
                    "error opening csv file {}: {}",
                    csv_file.display(),
                    e
                );
                return Ok(FolderResult::Skipped);
            }
        };
        let mut rows = Vec::new();
        for (index, row) in reader.deserialize().enumerate() {
            // a broken row is dropped, the rest of the folder is kept
            let row: BenchmarkRow = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(
                        "skipping row {} of {}: {}",
                        index + 1,
                        csv_file.display(),
                        e
                    );
                    continue;
                }
            };
            rows.push(RawRow::new(&info, row));
        }
        Ok(FolderResult::Loaded(rows))
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn aggregate(&self) -> Vec<ProcessedRow> {
        aggregate_runs(&self.rows)
    }

    /// Writes the raw and the aggregated tables into the analysis directory
    /// of `results_dir`, returning the aggregated rows.
    pub fn write(
        &self,
        results_dir: impl AsRef<Path>,
    ) -> Result<Vec<ProcessedRow>, Report> {
        if self.is_empty() {
            eyre::bail!("no data to process");
        }
        let analysis_dir = results_dir.as_ref().join(ANALYSIS_DIR);
        std::fs::create_dir_all(&analysis_dir).wrap_err_with(|| {
            format!("create directory {}", analysis_dir.display())
        })?;

        export::write_rows(analysis_dir.join(RAW_FILE), &self.rows)
            .wrap_err("write raw data")?;
        tracing::info!("aggregating test runs...");
        let processed = self.aggregate();
        export::write_rows(analysis_dir.join(PROCESSED_FILE), &processed)
            .wrap_err("write processed data")?;
        Ok(processed)
    }
}

/// Prints the distinct values of the main columns of the aggregated table.
pub fn print_summary(processed: &[ProcessedRow]) {
    let distinct = |column: fn(&ProcessedRow) -> String| {
        util::distinct(processed.iter().map(column).collect()).join(", ")
    };
    let sizes =
        util::distinct(processed.iter().map(|row| row.cache_size).collect());
    let threads =
        util::distinct(processed.iter().map(|row| row.threads).collect());

    println!("=== DATA SUMMARY ===");
    println!("Total configurations: {}", processed.len());
    println!("Cache policies: {}", distinct(|row| row.cache_policy.clone()));
    println!("Cache variants: {}", distinct(|row| row.cache_variant.clone()));
    println!("Storage types: {}", distinct(|row| row.storage_type.clone()));
    println!("Cache sizes: {:?}", sizes);
    println!("Operations: {}", distinct(|row| row.operation.clone()));
    println!("Thread counts: {:?}", threads);
}

// csv files of a folder, sorted by name
fn csv_files(folder: &Path) -> Result<Vec<PathBuf>, Report> {
    let read_dir = std::fs::read_dir(folder)
        .wrap_err_with(|| format!("read directory {}", folder.display()))?;
    let mut files = Vec::new();
    for entry in read_dir {
        let path = entry.wrap_err("incorrect directory entry")?.path();
        let is_csv = path
            .extension()
            .map(|extension| extension == "csv")
            .unwrap_or(false);
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
