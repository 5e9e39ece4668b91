use super::Grid;
use crate::export::{self, WORKLOAD_DATA_DIR};
use crate::fmt::PlotFmt;
use crate::layout::{padded_range, GroupedBoxes};
use crate::plot::{Axes, Figure};
use crate::pydict;
use crate::report::{self, StoragePanel, ThreadPanelRows};
use cachebench::analysis::sensitivity::Sensitivity;
use cachebench::{stats, Dataset, Search, StorageType};
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use pyo3::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

const THREAD_COUNTS: [usize; 3] = [1, 4, 8];
const YCSB_THREAD_COUNT: usize = 1;
// the workload panels are laid out in a 2x3 grid
const MAX_WORKLOADS: usize = 6;

const AGGREGATED_FILE: &str = "aggregated_throughput_data.csv";
const CV_METRICS_FILE: &str = "cv_metrics.csv";
const SUMMARY_FILE: &str = "summary_statistics.csv";

/// Throughput of each variant on each storage type at 1, 4 and 8 threads,
/// with the worst-case storage sensitivity of each variant. The plotted
/// values are exported next to the figure.
pub fn figure7(
    dataset: &Dataset,
    output_dir: impl AsRef<Path>,
) -> Result<(), Report> {
    let output_dir = output_dir.as_ref();
    let variants = dataset.policy_variants();
    let storage_types = StorageType::all();

    let panels: Vec<_> = THREAD_COUNTS
        .iter()
        .map(|&thread_count| {
            let mut base = Search::new();
            base.thread_count(thread_count);
            let panel =
                StoragePanel::new(dataset, &base, &variants, &storage_types);
            print_sensitivities(
                &format!("Thread count: {}", thread_count),
                &variants,
                &panel.sensitivities,
            );
            panel
        })
        .collect();

    super::render(
        output_dir,
        "plot_figure7",
        Grid::new(THREAD_COUNTS.len(), 1, (26.0, 28.0)),
        |py, fig, axes| {
            draw_thread_panels(
                py,
                fig,
                axes,
                &panels,
                &variants,
                &storage_types,
            )
        },
    )?;
    export_thread_panels(output_dir, &panels, &variants, &storage_types)
}

fn draw_thread_panels(
    py: Python<'_>,
    fig: &Figure<'_>,
    axes: &[Axes<'_>],
    panels: &[StoragePanel],
    variants: &[String],
    storage_types: &[StorageType],
) -> PyResult<()> {
    let panels = axes.iter().zip(panels).zip(THREAD_COUNTS);
    for ((ax, panel), thread_count) in panels {
        draw_storage_boxes(py, ax, &panel.placed, storage_types)?;

        for (group, variant) in variants.iter().enumerate() {
            let (sensitivity, max) = match (
                panel.sensitivities.get(variant),
                panel.placed.group_max(group),
            ) {
                (Some(sensitivity), Some(max)) => (sensitivity, max),
                _ => continue,
            };
            let kwargs = pydict!(
                py,
                ("ha", "left"),
                ("va", "bottom"),
                ("fontsize", 28),
                ("fontweight", "bold"),
                ("bbox", super::text_box(py, "gray", 0.4)?),
            )?;
            ax.text(
                panel.placed.centers()[group],
                max * 1.05,
                &format!("CV: {:.1}%", sensitivity.max_cv),
                Some(kwargs),
            )?;
        }

        let kwargs = pydict!(py, ("fontsize", 36))?;
        ax.set_ylabel("Throughput (ops/sec)", Some(kwargs))?;
        variant_ticks(py, ax, &panel.placed, variants, 32)?;
        super::scientific_y(py, ax, 32.0)?;
        ax.tick_params(Some(pydict!(py, ("axis", "y"), ("labelsize", 32))?))?;
        y_grid(py, ax)?;

        let kwargs = pydict!(
            py,
            ("transform", ax.trans_axes()?),
            ("fontsize", 36),
            ("rotation", 270),
            ("va", "center"),
            ("ha", "left"),
        )?;
        ax.text(1.02, 0.5, &PlotFmt::thread_label(thread_count), Some(kwargs))?;
    }

    if let Some(ax) = axes.first() {
        let kwargs = pydict!(
            py,
            ("bbox_to_anchor", (0.5, 1.0)),
            ("fontsize", 32),
            ("frameon", true),
            ("ncol", 1),
            ("framealpha", 0.9),
        )?;
        let entries = super::storage_legend(storage_types);
        super::box_legend(py, ax, &entries, 0.7, kwargs)?;
    }
    fig.tight_layout(Some(pydict!(py, ("rect", (0.0, 0.01, 0.98, 1.0)))?))
}

fn export_thread_panels(
    output_dir: &Path,
    panels: &[StoragePanel],
    variants: &[String],
    storage_types: &[StorageType],
) -> Result<(), Report> {
    let rows =
        ThreadPanelRows::new(panels, &THREAD_COUNTS, variants, storage_types);
    export::write_rows(output_dir.join(AGGREGATED_FILE), &rows.aggregated)?;
    export::write_rows(output_dir.join(CV_METRICS_FILE), &rows.cv_metrics)?;
    export::write_rows(output_dir.join(SUMMARY_FILE), &rows.summaries)?;
    Ok(())
}

/// Single-threaded throughput of each variant on each storage type, one panel
/// per YCSB workload. Each workload's data is exported to its own table.
pub fn figure10(
    dataset: &Dataset,
    output_dir: impl AsRef<Path>,
) -> Result<(), Report> {
    let output_dir = output_dir.as_ref();
    let dataset = dataset.filter(Search::new().thread_count(YCSB_THREAD_COUNT));
    tracing::info!(
        "{} data points after filtering for {} thread",
        dataset.len(),
        YCSB_THREAD_COUNT
    );
    let variants = dataset.policy_variants();
    let storage_types = StorageType::all();
    let mut workloads = dataset.operations();
    if workloads.len() > MAX_WORKLOADS {
        tracing::warn!(
            "only the first {} of {} workloads are plotted",
            MAX_WORKLOADS,
            workloads.len()
        );
        workloads.truncate(MAX_WORKLOADS);
    }

    let all: Vec<_> =
        dataset.records().iter().map(|r| r.throughput()).collect();
    let ylim = match (stats::min(&all), stats::max(&all)) {
        // extra room on top for the sensitivity labels
        (Some(min), Some(max)) => Some(padded_range((min, max), 0.05, 0.15)),
        _ => None,
    };

    let report_dir = output_dir.join(WORKLOAD_DATA_DIR);
    std::fs::create_dir_all(&report_dir).wrap_err_with(|| {
        format!("create directory {}", report_dir.display())
    })?;
    let mut panels = Vec::with_capacity(workloads.len());
    for workload in &workloads {
        let mut base = Search::new();
        base.operation(workload);
        let panel =
            StoragePanel::new(&dataset, &base, &variants, &storage_types);
        print_sensitivities(
            &format!("Workload: {}", workload),
            &variants,
            &panel.sensitivities,
        );
        let report = report::workload_report(
            &dataset,
            &base,
            workload,
            &variants,
            &storage_types,
            &panel.sensitivities,
        );
        report.write(&report_dir)?;
        panels.push(panel);
    }

    super::render(
        output_dir,
        "plot_figure10",
        Grid::new(2, 3, (36.0, 14.0)),
        |py, fig, axes| {
            draw_workload_panels(
                py,
                fig,
                axes,
                &panels,
                &workloads,
                &variants,
                &storage_types,
                ylim,
            )
        },
    )
}

#[allow(clippy::too_many_arguments)]
fn draw_workload_panels(
    py: Python<'_>,
    fig: &Figure<'_>,
    axes: &[Axes<'_>],
    panels: &[StoragePanel],
    workloads: &[String],
    variants: &[String],
    storage_types: &[StorageType],
    ylim: Option<(f64, f64)>,
) -> PyResult<()> {
    for (index, ax) in axes.iter().enumerate() {
        let panel = (panels.get(index), workloads.get(index));
        let (panel, workload) = match panel {
            (Some(panel), Some(workload)) => (panel, workload),
            _ => {
                ax.axis_off()?;
                continue;
            }
        };
        if panel.placed.is_empty() {
            super::no_data(py, ax)?;
        } else {
            draw_storage_boxes(py, ax, &panel.placed, storage_types)?;
        }
        if let Some((bottom, top)) = ylim {
            ax.set_ylim(Some(pydict!(py, ("bottom", bottom), ("top", top))?))?;

            // labels zigzag so that neighbours do not overlap
            for (group, variant) in variants.iter().enumerate() {
                let sensitivity = match panel.sensitivities.get(variant) {
                    Some(sensitivity) => sensitivity,
                    None => continue,
                };
                let height = if group % 2 == 0 { 0.90 } else { 0.83 };
                let kwargs = pydict!(
                    py,
                    ("ha", "center"),
                    ("va", "bottom"),
                    ("fontsize", 24),
                    ("fontweight", "bold"),
                    ("bbox", super::text_box(py, "gray", 0.8)?),
                )?;
                ax.text(
                    panel.placed.centers()[group],
                    bottom + (top - bottom) * height,
                    &format!("CV: {:.1}%", sensitivity.max_cv),
                    Some(kwargs),
                )?;
            }
        }

        let first_row = index < 3;
        let first_column = index % 3 == 0;
        if first_column {
            let kwargs = pydict!(py, ("fontsize", 30))?;
            ax.set_ylabel("Throughput (ops/sec)", Some(kwargs))?;
        }
        variant_ticks(py, ax, &panel.placed, variants, 26)?;
        super::scientific_y(py, ax, 24.0)?;
        ax.tick_params(Some(pydict!(py, ("axis", "y"), ("labelsize", 26))?))?;
        y_grid(py, ax)?;
        if let Some((min, max)) = stats::min(&panel.placed.positions())
            .zip(stats::max(&panel.placed.positions()))
        {
            let kwargs =
                pydict!(py, ("left", min - 0.8), ("right", max + 0.8))?;
            ax.set_xlim(Some(kwargs))?;
        }
        let kwargs = pydict!(py, ("fontsize", 30), ("pad", 10))?;
        ax.set_title(&PlotFmt::workload_name(workload), Some(kwargs))?;

        // only the outer panels keep their tick labels
        if first_row {
            ax.set_xticklabels(Vec::<String>::new(), None)?;
            ax.tick_params(Some(pydict!(
                py,
                ("axis", "x"),
                ("which", "both"),
                ("bottom", false),
                ("top", false),
            )?))?;
        }
        if !first_column {
            ax.set_yticklabels(Vec::<String>::new(), None)?;
            ax.tick_params(Some(pydict!(
                py,
                ("axis", "y"),
                ("which", "both"),
                ("left", false),
                ("right", false),
            )?))?;
        }
    }

    if let Some(ax) = axes.last() {
        let kwargs = pydict!(
            py,
            ("loc", "upper right"),
            ("fontsize", 26),
            ("frameon", true),
            ("ncol", 1),
            ("framealpha", 0.8),
            ("edgecolor", "grey"),
            ("bbox_to_anchor", (1.0, 0.68)),
        )?;
        let entries = super::storage_legend(storage_types);
        super::box_legend(py, ax, &entries, 0.7, kwargs)?;
    }
    fig.tight_layout(None)
}

/// Boxes with their points, and a dashed line through the best box of each
/// storage type.
fn draw_storage_boxes(
    py: Python<'_>,
    ax: &Axes<'_>,
    placed: &GroupedBoxes,
    storage_types: &[StorageType],
) -> PyResult<()> {
    if placed.is_empty() {
        return Ok(());
    }
    let styles: Vec<_> = placed
        .boxes()
        .iter()
        .map(|placed_box| {
            PlotFmt::storage_style(&storage_types[placed_box.member])
        })
        .collect();
    super::styled_boxplot(
        py,
        ax,
        placed.values(),
        placed.positions(),
        0.8,
        &styles,
    )?;
    for placed_box in placed.boxes() {
        super::overlay_points(
            py,
            ax,
            placed_box.position,
            &placed_box.values,
            0.6,
            20.0,
        )?;
    }
    for best in placed.best_per_member() {
        let kwargs = pydict!(
            py,
            ("color", "green"),
            ("linestyle", "--"),
            ("linewidth", 2.5),
            ("zorder", 10),
            ("alpha", 0.9),
        )?;
        ax.axvline(best.position, Some(kwargs))?;
    }
    Ok(())
}

fn variant_ticks(
    py: Python<'_>,
    ax: &Axes<'_>,
    placed: &GroupedBoxes,
    variants: &[String],
    fontsize: usize,
) -> PyResult<()> {
    ax.set_xticks(placed.centers().to_vec())?;
    let names: Vec<_> = variants
        .iter()
        .map(|variant| PlotFmt::policy_variant_name(variant))
        .collect();
    let kwargs =
        pydict!(py, ("fontsize", fontsize), ("rotation", 90), ("ha", "right"))?;
    ax.set_xticklabels(names, Some(kwargs))
}

fn y_grid(py: Python<'_>, ax: &Axes<'_>) -> PyResult<()> {
    ax.grid(Some(pydict!(
        py,
        ("alpha", 0.3),
        ("axis", "y"),
        ("color", "grey"),
    )?))?;
    ax.set_axisbelow(true)
}

fn print_sensitivities(
    title: &str,
    variants: &[String],
    sensitivities: &BTreeMap<String, Sensitivity>,
) {
    println!("\nMax CV, Range and Ratio across cache sizes ({}):", title);
    println!("{}", "─".repeat(100));
    println!(
        "{:<45} {:<15} {:<15} {:<15}",
        "Policy Variant", "Max CV", "Max Range", "Max Ratio"
    );
    println!("{}", "─".repeat(100));
    for variant in variants {
        let sensitivity = match sensitivities.get(variant) {
            Some(sensitivity) => sensitivity,
            None => continue,
        };
        let range = sensitivity
            .max_range
            .map_or(String::from("-"), |range| format!("{:.1}%", range));
        let ratio = sensitivity
            .max_ratio
            .map_or(String::from("-"), |ratio| format!("{:.2}x", ratio));
        println!(
            "{:<45} {:>10.1}%     {:>11}     {:>11}",
            variant, sensitivity.max_cv, range, ratio
        );
    }
}
