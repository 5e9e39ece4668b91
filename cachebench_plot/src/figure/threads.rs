use super::Grid;
use crate::fmt::PlotFmt;
use crate::layout::GroupedBoxes;
use crate::plot::{Axes, Figure};
use crate::pydict;
use crate::report;
use cachebench::{Dataset, Summary};
use color_eyre::Report;
use pyo3::prelude::*;
use std::path::Path;

/// Throughput of each policy variant per thread count, across every other
/// dimension.
pub fn figure5(
    dataset: &Dataset,
    output_dir: impl AsRef<Path>,
) -> Result<(), Report> {
    let variants = dataset.policy_variants();
    let thread_counts = dataset.thread_counts();
    let placed = report::thread_boxes(dataset, &variants, &thread_counts);

    super::render(
        output_dir.as_ref(),
        "plot_figure5",
        Grid::new(1, 1, (24.0, 10.0)),
        |py, fig, axes| {
            draw(py, fig, &axes[0], &placed, &variants, &thread_counts)
        },
    )?;
    print_summary(&placed, &variants, &thread_counts);
    Ok(())
}

fn draw(
    py: Python<'_>,
    fig: &Figure<'_>,
    ax: &Axes<'_>,
    placed: &GroupedBoxes,
    variants: &[String],
    thread_counts: &[usize],
) -> PyResult<()> {
    if placed.is_empty() {
        return super::no_data(py, ax);
    }

    let styles: Vec<_> = placed
        .members()
        .into_iter()
        .map(PlotFmt::thread_style)
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

    let entries: Vec<_> = thread_counts
        .iter()
        .enumerate()
        .map(|(member, &thread_count)| {
            (
                PlotFmt::thread_style(member),
                PlotFmt::thread_label(thread_count),
            )
        })
        .collect();
    let kwargs = pydict!(
        py,
        ("loc", "upper right"),
        ("fontsize", 32),
        ("frameon", true),
        ("fancybox", true),
        ("framealpha", 0.8),
    )?;
    super::box_legend(py, ax, &entries, 1.0, kwargs)?;

    let kwargs = pydict!(py, ("fontsize", 36))?;
    ax.set_ylabel("Throughput (ops/sec)", Some(kwargs))?;
    ax.set_xticks(placed.centers().to_vec())?;
    let labels: Vec<_> = variants
        .iter()
        .map(|variant| PlotFmt::policy_variant_name(variant))
        .collect();
    let kwargs =
        pydict!(py, ("fontsize", 32), ("rotation", 90), ("ha", "right"))?;
    ax.set_xticklabels(labels, Some(kwargs))?;
    super::scientific_y(py, ax, 28.0)?;
    ax.tick_params(Some(pydict!(py, ("axis", "y"), ("labelsize", 32))?))?;
    ax.grid(Some(pydict!(
        py,
        ("alpha", 0.3),
        ("axis", "y"),
        ("color", "grey"),
    )?))?;
    ax.set_axisbelow(true)?;
    fig.tight_layout(None)
}

fn print_summary(
    placed: &GroupedBoxes,
    variants: &[String],
    thread_counts: &[usize],
) {
    println!("{}", "=".repeat(80));
    println!("SUMMARY STATISTICS");
    println!("{}", "=".repeat(80));
    for (group, variant) in variants.iter().enumerate() {
        println!("\n{}:", variant);
        for placed_box in placed.boxes().iter().filter(|b| b.group == group) {
            let summary = match Summary::new(&placed_box.values) {
                Some(summary) => summary,
                None => continue,
            };
            println!("  {} threads:", thread_counts[placed_box.member]);
            println!("    Count: {}", summary.count);
            println!("    Mean:  {:.2} ops/sec", summary.mean);
            println!("    Median: {:.2} ops/sec", summary.median);
            println!("    Std:   {:.2} ops/sec", summary.stddev);
            println!("    Min:   {:.2} ops/sec", summary.min);
            println!("    Max:   {:.2} ops/sec", summary.max);
        }
    }
}
