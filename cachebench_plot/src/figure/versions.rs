use super::Grid;
use crate::fmt::PlotFmt;
use crate::layout::GroupLayout;
use crate::plot::{Axes, Figure};
use crate::pydict;
use cachebench::analysis::runs::{cpi_points, run_throughputs};
use cachebench::analysis::versions::{
    compare_versions, max_value, StorageComparison, Version, VersionBox,
};
use cachebench::{stats, Dataset, StorageType};
use color_eyre::Report;
use pyo3::prelude::*;
use std::path::Path;

const THREAD_COUNTS: [usize; 2] = [1, 4];

/// Per-run throughput of two tree versions, with the V2 over V1 speedup of
/// each policy annotated.
pub fn figure3(
    v1: &Dataset,
    v2: &Dataset,
    output_dir: impl AsRef<Path>,
) -> Result<(), Report> {
    let comparisons = compare_versions(
        &run_throughputs(v1),
        &run_throughputs(v2),
        &storage_order(),
        &THREAD_COUNTS,
    );
    let y_max = max_value(&comparisons).map_or(1.0, |max| max * 1.1);
    tracing::info!("global y-scale: 0 to {:.2e}", y_max);

    let panel = Panel {
        ylabel: "Throughput (ops/sec)",
        ylim: Some((0.0, y_max)),
        label_y: -y_max * 0.16,
        speedups: Some(y_max * 0.05),
    };
    super::render(
        output_dir.as_ref(),
        "plog_figure3",
        Grid::new(1, 3, (28.0, 12.0)),
        |py, fig, axes| draw(py, fig, axes, &comparisons, &panel),
    )
}

/// Cycles per instruction of every operation of two tree versions.
pub fn figure4(
    v1: &Dataset,
    v2: &Dataset,
    output_dir: impl AsRef<Path>,
) -> Result<(), Report> {
    let comparisons = compare_versions(
        &cpi_points(v1),
        &cpi_points(v2),
        &storage_order(),
        &THREAD_COUNTS,
    );
    let values: Vec<_> = comparisons
        .iter()
        .flat_map(|storage| storage.policies.iter())
        .flat_map(|policy| policy.boxes.iter())
        .flat_map(|version_box| version_box.values.iter().copied())
        .collect();

    let panel = match (stats::min(&values), stats::max(&values)) {
        (Some(min), Some(max)) => {
            let range = max - min;
            Panel {
                ylabel: "Cycles Per Instruction",
                ylim: Some((min - range * 0.05, max + range * 0.05)),
                label_y: min - range * 0.2,
                speedups: None,
            }
        }
        _ => Panel {
            ylabel: "Cycles Per Instruction",
            ylim: None,
            label_y: -0.1,
            speedups: None,
        },
    };
    super::render(
        output_dir.as_ref(),
        "plog_figure4",
        Grid::new(1, 3, (28.0, 12.0)),
        |py, fig, axes| draw(py, fig, axes, &comparisons, &panel),
    )
}

struct Panel {
    ylabel: &'static str,
    ylim: Option<(f64, f64)>,
    // height of the policy names, below the version ticks
    label_y: f64,
    // offset of the speedup labels above the V2 mean, if shown
    speedups: Option<f64>,
}

// panels go from the slowest to the fastest storage
fn storage_order() -> Vec<StorageType> {
    vec![
        StorageType::FileStorage,
        StorageType::PMemStorage,
        StorageType::VolatileStorage,
    ]
}

fn short_label(version_box: &VersionBox) -> String {
    format!(
        "{}-{}T",
        version_box.version.short_name(),
        version_box.thread_count
    )
}

fn long_label(version: Version, thread_count: usize) -> String {
    let threads = if thread_count == 1 { "thread" } else { "threads" };
    format!("{} ({} {})", version.name(), thread_count, threads)
}

fn draw(
    py: Python<'_>,
    fig: &Figure<'_>,
    axes: &[Axes<'_>],
    comparisons: &[StorageComparison],
    panel: &Panel,
) -> PyResult<()> {
    let layout = GroupLayout::new(4.5).width(0.8);
    for (index, (ax, storage)) in axes.iter().zip(comparisons).enumerate() {
        let title = PlotFmt::storage_name(&storage.storage_type);
        if storage.policies.is_empty() {
            super::no_data(py, ax)?;
            ax.set_title(title, None)?;
            continue;
        }

        // a version without runs still gets its slot, as an empty box
        let groups = storage
            .policies
            .iter()
            .map(|policy| {
                policy
                    .boxes
                    .iter()
                    .map(|version_box| {
                        if version_box.values.is_empty() {
                            vec![0.0]
                        } else {
                            version_box.values.clone()
                        }
                    })
                    .collect()
            })
            .collect();
        let placed = layout.place(groups);

        let mut labels = Vec::new();
        for placed_box in placed.boxes() {
            let version_box =
                &storage.policies[placed_box.group].boxes[placed_box.member];
            labels.push(short_label(version_box));
            if !version_box.values.is_empty() {
                super::overlay_points(
                    py,
                    ax,
                    placed_box.position,
                    &version_box.values,
                    0.8,
                    25.0,
                )?;
            }
        }
        let styles: Vec<_> = placed
            .members()
            .into_iter()
            .map(PlotFmt::version_style)
            .collect();
        super::styled_boxplot(
            py,
            ax,
            placed.values(),
            placed.positions(),
            0.6,
            &styles,
        )?;

        if let Some(offset) = panel.speedups {
            for (group, policy) in storage.policies.iter().enumerate() {
                for improvement in &policy.improvements {
                    if improvement.ratio == 1.0 {
                        continue;
                    }
                    let color = if improvement.ratio > 1.0 {
                        "darkgreen"
                    } else {
                        "darkred"
                    };
                    let kwargs = pydict!(
                        py,
                        ("ha", "center"),
                        ("va", "bottom"),
                        ("fontsize", 27),
                        ("fontweight", "bold"),
                        ("color", color),
                        ("bbox", super::text_box(py, color, 0.8)?),
                    )?;
                    ax.text(
                        layout.position(group, improvement.box_index),
                        improvement.v2_mean + offset,
                        &format!("{:.1}x", improvement.ratio),
                        Some(kwargs),
                    )?;
                }
            }
        }

        let kwargs = pydict!(py, ("fontweight", "bold"), ("fontsize", 42))?;
        ax.set_title(title, Some(kwargs))?;
        if index == 0 {
            let kwargs = pydict!(py, ("fontsize", 36))?;
            ax.set_ylabel(panel.ylabel, Some(kwargs))?;
        }

        ax.set_xticks(placed.positions())?;
        let kwargs = pydict!(
            py,
            ("fontsize", 25),
            ("rotation", 90),
            ("ha", "center"),
            ("va", "top"),
        )?;
        ax.set_xticklabels(labels, Some(kwargs))?;
        for (center, policy) in placed.centers().iter().zip(&storage.policies) {
            let kwargs =
                pydict!(py, ("ha", "center"), ("va", "top"), ("fontsize", 36))?;
            ax.text(*center, panel.label_y, &policy.policy_name, Some(kwargs))?;
        }

        if panel.speedups.is_some() {
            super::scientific_y(py, ax, 24.0)?;
        }
        ax.tick_params(Some(pydict!(py, ("axis", "y"), ("labelsize", 30))?))?;
        ax.grid(Some(pydict!(py, ("alpha", 0.3), ("color", "grey"))?))?;
        if let Some((bottom, top)) = panel.ylim {
            ax.set_ylim(Some(pydict!(py, ("bottom", bottom), ("top", top))?))?;
        }

        if index == 0 {
            let entries: Vec<_> = THREAD_COUNTS
                .iter()
                .flat_map(|&thread_count| {
                    [Version::V1, Version::V2]
                        .into_iter()
                        .map(move |version| (version, thread_count))
                })
                .enumerate()
                .map(|(member, (version, thread_count))| {
                    let label = format!(
                        "{} | {}-{}T",
                        long_label(version, thread_count),
                        version.short_name(),
                        thread_count
                    );
                    (PlotFmt::version_style(member), label)
                })
                .collect();
            let kwargs = pydict!(
                py,
                ("loc", "upper left"),
                ("frameon", true),
                ("fancybox", true),
                ("shadow", true),
                ("fontsize", 27),
            )?;
            super::box_legend(py, ax, &entries, 0.8, kwargs)?;
        }
    }

    fig.tight_layout(None)?;
    fig.subplots_adjust(Some(pydict!(py, ("bottom", 0.15))?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_labels() {
        let version_box = VersionBox {
            version: Version::V2,
            thread_count: 4,
            values: Vec::new(),
        };
        assert_eq!(short_label(&version_box), "V2-4T");
        assert_eq!(long_label(Version::V1, 1), "Version 1 (1 thread)");
        assert_eq!(long_label(Version::V2, 4), "Version 2 (4 threads)");
    }
}
