use super::Grid;
use crate::fmt::PlotFmt;
use crate::layout::{padded_range, GroupLayout, GroupedBoxes};
use crate::plot::{Axes, Figure};
use crate::pydict;
use crate::report;
use cachebench::{stats, Dataset, Search, StorageType};
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use pyo3::prelude::*;
use std::path::{Path, PathBuf};

const THREAD_COUNT: usize = 1;
const POLICY_WORKLOADS: [&str; 3] = ["ycsb_a", "ycsb_c", "ycsb_e"];
const DEVICE_WORKLOADS: [&str; 3] = ["ycsb_a", "ycsb_c", "ycsb_d"];
const BAR_WIDTH: f64 = 0.3;

/// Median throughput of every policy variant on three YCSB workloads,
/// single-threaded, with the best variant of each workload marked.
pub fn figure12(
    dataset: &Dataset,
    output_dir: impl AsRef<Path>,
) -> Result<(), Report> {
    let output_dir = output_dir.as_ref();
    let dataset = dataset.filter(Search::new().thread_count(THREAD_COUNT));
    let variants = dataset.policy_variants();

    let report_dir = report_dir(output_dir, "figure12_data")?;
    for workload in POLICY_WORKLOADS {
        report::policy_report(&dataset, workload, &variants)
            .write(&report_dir)?;
    }

    let panels: Vec<_> = POLICY_WORKLOADS
        .iter()
        .map(|&workload| MedianBars::new(&dataset, workload, &variants))
        .collect();
    let ylim = value_range(&dataset, &POLICY_WORKLOADS)
        .map(|range| padded_range(range, 0.02, 0.02));

    super::render(
        output_dir,
        "plot_figure12",
        Grid::new(3, 1, (18.0, 14.0)),
        |py, fig, axes| draw_policy_panels(py, fig, axes, &panels, ylim),
    )
}

/// Median throughput of every policy variant, including the device-aware
/// one, on each storage type for three YCSB workloads. Every record of
/// `device_aware` counts as single-threaded.
pub fn figure13(
    original: &Dataset,
    device_aware: &Dataset,
    output_dir: impl AsRef<Path>,
) -> Result<(), Report> {
    let output_dir = output_dir.as_ref();
    let dataset =
        report::with_device_aware(original, device_aware, THREAD_COUNT);

    let variants = dataset.policy_variants();
    let storage_types = StorageType::all();
    let operations = dataset.operations();
    let workloads: Vec<_> = DEVICE_WORKLOADS
        .iter()
        .copied()
        .filter(|workload| operations.iter().any(|op| op == workload))
        .collect();
    tracing::info!(
        "{} policy variants, workloads {:?}",
        variants.len(),
        workloads
    );

    let report_dir = report_dir(output_dir, "figure13_data")?;
    for workload in &workloads {
        report::device_report(&dataset, workload, &variants, &storage_types)
            .write(&report_dir)?;
    }

    let layout = GroupLayout::new(5.0).width(1.25).shift(-1.0);
    let panels: Vec<_> = workloads
        .iter()
        .map(|&workload| {
            let groups = variants
                .iter()
                .map(|variant| {
                    storage_types
                        .iter()
                        .map(|storage_type| {
                            dataset.throughputs(
                                Search::new()
                                    .operation(workload)
                                    .policy_variant(variant)
                                    .storage_type(storage_type.clone()),
                            )
                        })
                        .collect()
                })
                .collect();
            (workload, layout.place(groups))
        })
        .collect();
    // extra room on top for the legend
    let ylim = value_range(&dataset, &workloads)
        .map(|range| padded_range(range, 0.05, 0.15));

    super::render(
        output_dir,
        "plot_figure13",
        Grid::new(1, 3, (46.0, 9.0)),
        |py, fig, axes| {
            draw_device_panels(
                py,
                fig,
                axes,
                &panels,
                &variants,
                &storage_types,
                ylim,
            )
        },
    )
}

fn report_dir(output_dir: &Path, name: &str) -> Result<PathBuf, Report> {
    let dir = output_dir.join(name);
    std::fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("create directory {}", dir.display()))?;
    Ok(dir)
}

// smallest and largest throughput over the given workloads
fn value_range(dataset: &Dataset, workloads: &[&str]) -> Option<(f64, f64)> {
    let values: Vec<_> = workloads
        .iter()
        .flat_map(|workload| {
            dataset.throughputs(Search::new().operation(workload))
        })
        .collect();
    Some((stats::min(&values)?, stats::max(&values)?))
}

/// One bar per variant with data, placed next to each other.
#[derive(Debug, Clone, PartialEq)]
struct MedianBars {
    workload: String,
    variants: Vec<String>,
    medians: Vec<f64>,
}

impl MedianBars {
    fn new(dataset: &Dataset, workload: &str, variants: &[String]) -> Self {
        let mut bars = Self {
            workload: workload.to_string(),
            variants: Vec::new(),
            medians: Vec::new(),
        };
        for variant in variants {
            let values = dataset.throughputs(
                Search::new().operation(workload).policy_variant(variant),
            );
            if let Some(median) = stats::median(&values) {
                bars.variants.push(variant.clone());
                bars.medians.push(median);
            }
        }
        bars
    }

    fn positions(&self) -> Vec<f64> {
        (0..self.medians.len()).map(|index| index as f64).collect()
    }

    // the first bar wins ties
    fn best(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (index, median) in self.medians.iter().enumerate() {
            match best {
                Some(current) if self.medians[current] >= *median => {}
                _ => best = Some(index),
            }
        }
        best
    }
}

fn draw_policy_panels(
    py: Python<'_>,
    fig: &Figure<'_>,
    axes: &[Axes<'_>],
    panels: &[MedianBars],
    ylim: Option<(f64, f64)>,
) -> PyResult<()> {
    let last = panels.len() - 1;
    for (index, (ax, bars)) in axes.iter().zip(panels).enumerate() {
        let title = PlotFmt::workload_name(&bars.workload);
        let title_kwargs = pydict!(py, ("fontsize", 30), ("pad", 2))?;
        if bars.medians.is_empty() {
            super::no_data(py, ax)?;
            ax.set_title(&title, Some(title_kwargs))?;
            continue;
        }

        let positions = bars.positions();
        let kwargs = pydict!(
            py,
            ("width", BAR_WIDTH),
            ("color", "grey"),
            ("edgecolor", "black"),
            ("linewidth", 1.5),
            ("alpha", 0.8),
            ("zorder", 2),
        )?;
        ax.bar(positions.clone(), bars.medians.clone(), Some(kwargs))?;
        if let Some(best) = bars.best() {
            best_line(py, ax, positions[best])?;
        }

        // the middle panel carries the y label, the bottom one the names
        if index == 1 {
            let kwargs = pydict!(py, ("fontsize", 30))?;
            ax.set_ylabel("Throughput (ops/sec)", Some(kwargs))?;
        }
        if index == last {
            ax.set_xticks(positions.clone())?;
            let names: Vec<_> = bars
                .variants
                .iter()
                .map(|variant| PlotFmt::policy_variant_name(variant))
                .collect();
            let kwargs = pydict!(
                py,
                ("fontsize", 26),
                ("rotation", 90),
                ("ha", "right"),
            )?;
            ax.set_xticklabels(names, Some(kwargs))?;
        } else {
            ax.set_xticks(Vec::<f64>::new())?;
        }
        super::scientific_y(py, ax, 22.0)?;
        ax.tick_params(Some(pydict!(py, ("axis", "y"), ("labelsize", 26))?))?;
        y_grid(py, ax)?;

        let first = positions[0];
        let end = positions[positions.len() - 1];
        ax.set_xlim(Some(pydict!(
            py,
            ("left", first - BAR_WIDTH),
            ("right", end + BAR_WIDTH),
        )?))?;
        ax.set_title(&title, Some(title_kwargs))?;
        if let Some((bottom, top)) = ylim {
            ax.set_ylim(Some(pydict!(py, ("bottom", bottom), ("top", top))?))?;
        }
    }

    fig.tight_layout(None)?;
    fig.subplots_adjust(Some(pydict!(py, ("hspace", 0.25))?))
}

fn draw_device_panels(
    py: Python<'_>,
    fig: &Figure<'_>,
    axes: &[Axes<'_>],
    panels: &[(&str, GroupedBoxes)],
    variants: &[String],
    storage_types: &[StorageType],
    ylim: Option<(f64, f64)>,
) -> PyResult<()> {
    if panels.is_empty() {
        for ax in &axes[1..] {
            ax.axis_off()?;
        }
        return super::no_data(py, &axes[0]);
    }
    for ax in axes.iter().skip(panels.len()) {
        ax.axis_off()?;
    }

    for (index, (ax, (workload, placed))) in axes.iter().zip(panels).enumerate()
    {
        for (member, storage_type) in storage_types.iter().enumerate() {
            let bars: Vec<_> = placed
                .boxes()
                .iter()
                .filter(|placed_box| placed_box.member == member)
                .collect();
            if bars.is_empty() {
                continue;
            }
            let style = PlotFmt::storage_style(storage_type);
            let kwargs = pydict!(
                py,
                ("width", 1.25),
                ("color", style.color),
                ("hatch", style.hatch),
                ("edgecolor", style.edge_color),
                ("linewidth", 1.5),
                ("alpha", 0.8),
                ("zorder", 2),
            )?;
            ax.bar(
                bars.iter().map(|bar| bar.position).collect(),
                bars.iter().map(|bar| bar.median()).collect(),
                Some(kwargs),
            )?;
        }
        for best in placed.best_per_member() {
            best_line(py, ax, best.position)?;
        }

        if index == 0 {
            let kwargs = pydict!(py, ("fontsize", 30))?;
            ax.set_ylabel("Throughput (ops/sec)", Some(kwargs))?;
        }
        if index == 1 {
            let kwargs = pydict!(py, ("fontsize", 30))?;
            ax.set_xlabel("Replacement Policy Variants", Some(kwargs))?;
        }
        ax.set_xticks(placed.centers().to_vec())?;
        let names: Vec<_> = variants
            .iter()
            .map(|variant| PlotFmt::policy_variant_name(variant))
            .collect();
        let kwargs =
            pydict!(py, ("fontsize", 26), ("rotation", 90), ("ha", "right"))?;
        ax.set_xticklabels(names, Some(kwargs))?;
        super::scientific_y(py, ax, 26.0)?;
        ax.tick_params(Some(pydict!(
            py,
            ("axis", "y"),
            ("labelsize", 26),
            ("labelleft", index == 0),
        )?))?;
        y_grid(py, ax)?;
        let kwargs = pydict!(py, ("fontsize", 30), ("pad", 10))?;
        ax.set_title(&PlotFmt::workload_name(workload), Some(kwargs))?;
        if let Some((bottom, top)) = ylim {
            ax.set_ylim(Some(pydict!(py, ("bottom", bottom), ("top", top))?))?;
        }
        ax.margins(0.01)?;
    }

    let ax = &axes[panels.len() - 1];
    let kwargs = pydict!(
        py,
        ("loc", "upper right"),
        ("fontsize", 26),
        ("frameon", true),
        ("ncol", 1),
        ("framealpha", 1.0),
    )?;
    let entries = super::storage_legend(storage_types);
    super::box_legend(py, ax, &entries, 0.7, kwargs)?;

    fig.tight_layout(None)?;
    fig.subplots_adjust(Some(pydict!(py, ("wspace", 0.02))?))
}

fn best_line(py: Python<'_>, ax: &Axes<'_>, position: f64) -> PyResult<()> {
    let kwargs = pydict!(
        py,
        ("color", "green"),
        ("linestyle", "--"),
        ("linewidth", 2.5),
        ("zorder", 10),
        ("alpha", 0.9),
    )?;
    ax.axvline(position, Some(kwargs))
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

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(medians: &[f64]) -> MedianBars {
        MedianBars {
            workload: String::from("ycsb_a"),
            variants: (0..medians.len()).map(|i| i.to_string()).collect(),
            medians: medians.to_vec(),
        }
    }

    #[test]
    fn best_bar() {
        assert_eq!(bars(&[]).best(), None);
        assert_eq!(bars(&[1.0, 3.0, 2.0]).best(), Some(1));
        // ties go to the first one
        assert_eq!(bars(&[3.0, 1.0, 3.0]).best(), Some(0));
        assert_eq!(bars(&[1.0, 2.0]).positions(), vec![0.0, 1.0]);
    }
}
