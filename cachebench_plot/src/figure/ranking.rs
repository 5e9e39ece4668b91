use super::Grid;
use crate::fmt::PlotFmt;
use crate::plot::{Axes, Figure};
use crate::pydict;
use crate::report::{cache_size_rankings, OperationRankings};
use cachebench::rank::{self, RankTable};
use cachebench::{Dataset, StorageType};
use color_eyre::Report;
use pyo3::prelude::*;
use std::path::Path;

// the per-operation heatmap on top, then one summary per thread count
const HEIGHT_RATIOS: [f64; 4] = [6.0, 1.0, 1.0, 1.0];
const SUMMARY_PANELS: usize = 3;

/// Rank of every policy variant per operation and storage type on the lowest
/// thread count, followed by its rank across operations on up to three
/// thread counts. All heatmaps share one shade scale.
pub fn figure8(
    dataset: &Dataset,
    output_dir: impl AsRef<Path>,
) -> Result<(), Report> {
    let variants = dataset.policy_variants();
    let operations = dataset.operations();
    let storage_types = StorageType::all();
    tracing::info!(
        "{} policy variants, {} operations, thread counts {:?}",
        variants.len(),
        operations.len(),
        dataset.thread_counts()
    );

    let rankings = OperationRankings::new(
        dataset,
        &variants,
        &operations,
        &storage_types,
        SUMMARY_PANELS,
    );
    tracing::info!("global maximum rank: {}", rankings.max_rank);

    let heatmaps = OperationHeatmaps {
        rankings,
        operations,
        storage_types,
        variants,
    };
    super::render(
        output_dir.as_ref(),
        "plot_figure8",
        Grid::new(HEIGHT_RATIOS.len(), 1, (18.0, 28.0))
            .height_ratios(&HEIGHT_RATIOS),
        |py, fig, axes| heatmaps.draw(py, fig, axes),
    )
}

struct OperationHeatmaps {
    rankings: OperationRankings,
    operations: Vec<String>,
    storage_types: Vec<StorageType>,
    variants: Vec<String>,
}

impl OperationHeatmaps {
    fn draw(
        &self,
        py: Python<'_>,
        fig: &Figure<'_>,
        axes: &[Axes<'_>],
    ) -> PyResult<()> {
        let max_rank = self.rankings.max_rank;
        let (thread_count, detailed) = match &self.rankings.detailed {
            Some(detailed) => detailed,
            None => {
                for ax in &axes[1..] {
                    ax.axis_off()?;
                }
                return super::no_data(py, &axes[0]);
            }
        };

        let ax = &axes[0];
        heatmap(py, ax, detailed, max_rank, 22)?;
        let title = format!(
            "Per-Operation Rankings ({})",
            PlotFmt::thread_label(*thread_count)
        );
        let kwargs = pydict!(py, ("fontsize", 26), ("pad", 10))?;
        ax.set_title(&title, Some(kwargs))?;
        ax.set_ylabel("Storage Type", Some(pydict!(py, ("fontsize", 30))?))?;
        let storages = self.storage_types.len();
        let rows = (0..detailed.rows().len())
            .map(|row| self.storage_name(row % storages))
            .collect();
        self.ticks(py, ax, rows, false)?;
        self.operation_axis(py, ax)?;

        // the last summary shown carries the variant names
        let summaries = &self.rankings.summaries;
        for (index, ax) in axes[1..].iter().enumerate() {
            let (thread_count, summary) = match summaries.get(index) {
                Some(summary) => summary,
                None => {
                    ax.axis_off()?;
                    continue;
                }
            };
            heatmap(py, ax, summary, max_rank, 22)?;
            let title = format!(
                "Cross-Operation Rankings ({})",
                PlotFmt::thread_label(*thread_count)
            );
            let kwargs = pydict!(py, ("fontsize", 26), ("pad", 10))?;
            ax.set_title(&title, Some(kwargs))?;
            let rows = (0..summary.rows().len())
                .map(|row| self.storage_name(row))
                .collect();
            self.ticks(py, ax, rows, index + 1 == summaries.len())?;
        }

        fig.subplots_adjust(Some(pydict!(
            py,
            ("hspace", 0.12),
            ("left", 0.08),
            ("right", 0.88),
            ("top", 0.97),
            ("bottom", 0.03),
        )?))
    }

    fn storage_name(&self, index: usize) -> String {
        PlotFmt::storage_name(&self.storage_types[index]).to_string()
    }

    fn ticks(
        &self,
        py: Python<'_>,
        ax: &Axes<'_>,
        rows: Vec<String>,
        show_variants: bool,
    ) -> PyResult<()> {
        ax.set_yticks((0..rows.len()).collect())?;
        ax.set_yticklabels(rows, None)?;
        ax.set_xticks((0..self.variants.len()).collect())?;
        let names = self
            .variants
            .iter()
            .map(|variant| PlotFmt::policy_variant_name(variant))
            .collect();
        ax.set_xticklabels(names, None)?;
        ax.tick_params(Some(pydict!(
            py,
            ("axis", "x"),
            ("rotation", 90),
            ("labelsize", 26),
            ("labelbottom", show_variants),
        )?))?;
        ax.tick_params(Some(pydict!(
            py,
            ("axis", "y"),
            ("rotation", 0),
            ("labelsize", 26),
        )?))
    }

    // red lines between operations and their names on a twin axis
    fn operation_axis(&self, py: Python<'_>, ax: &Axes<'_>) -> PyResult<()> {
        let storages = self.storage_types.len();
        for operation in 1..self.operations.len() {
            let boundary = (operation * storages) as f64 - 0.5;
            let kwargs = pydict!(
                py,
                ("color", "red"),
                ("linewidth", 1.5),
                ("alpha", 0.7),
            )?;
            ax.axhline(boundary, Some(kwargs))?;
        }

        let twin = ax.twinx()?;
        let (bottom, top) = ax.get_ylim()?;
        twin.set_ylim(Some(pydict!(py, ("bottom", bottom), ("top", top))?))?;
        let centers = (0..self.operations.len())
            .map(|operation| {
                (operation * storages) as f64 + (storages as f64 - 1.0) / 2.0
            })
            .collect();
        twin.set_yticks(centers)?;
        let names = self
            .operations
            .iter()
            .map(|operation| PlotFmt::operation_axis_name(operation))
            .collect();
        twin.set_yticklabels(names, Some(pydict!(py, ("fontsize", 26))?))?;
        let kwargs = pydict!(py, ("fontsize", 30))?;
        twin.set_ylabel("Operation Type", Some(kwargs))?;
        twin.spines()?.set_all_visible(false)
    }
}

/// Rank of every policy variant within each cache size, one panel per
/// thread count and storage type.
pub fn figure9(
    dataset: &Dataset,
    output_dir: impl AsRef<Path>,
) -> Result<(), Report> {
    let variants = dataset.policy_variants();
    let storage_types = dataset.storage_types();
    let thread_counts = dataset.thread_counts();
    let tables = cache_size_rankings(
        dataset,
        &variants,
        &storage_types,
        &thread_counts,
    );
    let heatmaps = CacheSizeHeatmaps {
        variants,
        storage_types,
        thread_counts,
        tables,
    };

    let rows = heatmaps.thread_counts.len().max(1);
    let cols = heatmaps.storage_types.len().max(1);
    super::render(
        output_dir.as_ref(),
        "plot_figure9",
        Grid::new(rows, cols, (16.0, 12.5 * rows as f64)),
        |py, fig, axes| heatmaps.draw(py, fig, axes),
    )
}

struct CacheSizeHeatmaps {
    variants: Vec<String>,
    storage_types: Vec<StorageType>,
    thread_counts: Vec<usize>,
    // indexed by thread count and then by storage type
    tables: Vec<Vec<RankTable>>,
}

impl CacheSizeHeatmaps {
    fn draw(
        &self,
        py: Python<'_>,
        fig: &Figure<'_>,
        axes: &[Axes<'_>],
    ) -> PyResult<()> {
        if self.tables.is_empty() || self.storage_types.is_empty() {
            return super::no_data(py, &axes[0]);
        }
        let cols = self.storage_types.len();
        let last_row = self.thread_counts.len() - 1;

        for (row, tables) in self.tables.iter().enumerate() {
            for (col, table) in tables.iter().enumerate() {
                let ax = &axes[row * cols + col];
                let storage = PlotFmt::storage_name(&self.storage_types[col]);
                let thread_label =
                    PlotFmt::thread_label(self.thread_counts[row]);

                if table.max_rank().is_none() {
                    super::no_data(py, ax)?;
                    if row == 0 {
                        ax.set_title(storage, None)?;
                    }
                    if col == 0 {
                        let kwargs = pydict!(py, ("fontsize", 26))?;
                        ax.set_ylabel(&thread_label, Some(kwargs))?;
                    }
                    continue;
                }

                // missing entries get the lightest shade
                heatmap(py, ax, table, self.variants.len(), 22)?;
                if row == 0 {
                    let kwargs = pydict!(py, ("fontsize", 30))?;
                    ax.set_title(storage, Some(kwargs))?;
                }
                if col == 0 {
                    let kwargs = pydict!(py, ("fontsize", 30))?;
                    ax.set_ylabel("Replacement Policy Variants", Some(kwargs))?;
                }
                if row == last_row {
                    let kwargs = pydict!(py, ("fontsize", 30))?;
                    ax.set_xlabel("Cache Size (%)", Some(kwargs))?;
                }

                ax.set_yticks((0..self.variants.len()).collect())?;
                let names = self
                    .variants
                    .iter()
                    .map(|variant| PlotFmt::policy_variant_name(variant))
                    .collect();
                ax.set_yticklabels(names, None)?;
                ax.set_xticks((0..table.columns().len()).collect())?;
                ax.set_xticklabels(table.columns().to_vec(), None)?;
                ax.tick_params(Some(pydict!(
                    py,
                    ("axis", "y"),
                    ("rotation", 0),
                    ("labelsize", 26),
                    ("labelleft", col == 0),
                )?))?;
                ax.tick_params(Some(pydict!(
                    py,
                    ("axis", "x"),
                    ("rotation", 0),
                    ("labelsize", 26),
                    ("labelbottom", row == last_row),
                )?))?;

                if col == cols - 1 {
                    let kwargs = pydict!(
                        py,
                        ("transform", ax.trans_axes()?),
                        ("rotation", 270),
                        ("va", "center"),
                        ("ha", "left"),
                        ("fontsize", 30),
                    )?;
                    ax.text(1.02, 0.5, &thread_label, Some(kwargs))?;
                }
            }
        }
        fig.tight_layout(None)
    }
}

/// Draws the shades of `table` with its rank written in every cell.
fn heatmap(
    py: Python<'_>,
    ax: &Axes<'_>,
    table: &RankTable,
    max_rank: usize,
    fontsize: usize,
) -> PyResult<()> {
    let kwargs = pydict!(
        py,
        ("cmap", "Greys"),
        ("vmin", 0.0),
        ("vmax", 1.0),
        ("aspect", "auto"),
        ("interpolation", "nearest"),
    )?;
    ax.imshow(table.shades(max_rank), Some(kwargs))?;

    for (row, labels) in table.labels().iter().enumerate() {
        for (column, label) in labels.iter().enumerate() {
            let kwargs = pydict!(
                py,
                ("ha", "center"),
                ("va", "center"),
                ("fontsize", fontsize),
                ("fontweight", "bold"),
                ("color", rank::text_color(table.rank(row, column))),
            )?;
            ax.text(column as f64, row as f64, label, Some(kwargs))?;
        }
    }
    ax.spines()?.set_all_visible(false)
}
