use super::Grid;
use crate::fmt::PlotFmt;
use crate::plot::{Axes, Figure};
use crate::pydict;
use cachebench::analysis::series::{scalability, ScalabilityPoint};
use cachebench::{util, Dataset, Search};
use color_eyre::Report;
use pyo3::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

const THREAD_COUNTS: [usize; 4] = [1, 5, 20, 40];
// lines of different variants are spread over this width around each
// thread count so that their error bars don't overlap
const SPREAD: f64 = 1.0;
const ERROR_WIDTHS: [f64; 3] = [2.5, 3.0, 3.5];
const ERROR_CAPS: [usize; 3] = [10, 12, 14];

type Points = BTreeMap<String, BTreeMap<usize, ScalabilityPoint>>;

/// Mean throughput of each policy variant as the number of threads grows,
/// with standard deviation bars and the coefficient of variation of every
/// variant boxed at each thread count.
pub fn figure11(
    dataset: &Dataset,
    output_dir: impl AsRef<Path>,
) -> Result<(), Report> {
    let points = scalability(dataset, &Search::new(), &THREAD_COUNTS);
    let thread_counts = util::distinct(
        points
            .values()
            .flat_map(|by_threads| by_threads.keys().copied())
            .collect(),
    );
    tracing::info!(
        "{} policy variants over thread counts {:?}",
        points.len(),
        thread_counts
    );

    super::render(
        output_dir.as_ref(),
        "plot_figure11",
        Grid::new(1, 1, (22.0, 12.0)),
        |py, fig, axes| draw(py, fig, &axes[0], &points, &thread_counts),
    )?;
    print_summary(&points);
    Ok(())
}

fn offset(index: usize, variants: usize) -> f64 {
    if variants > 1 {
        index as f64 * SPREAD / (variants - 1) as f64 - SPREAD / 2.0
    } else {
        0.0
    }
}

fn draw(
    py: Python<'_>,
    fig: &Figure<'_>,
    ax: &Axes<'_>,
    points: &Points,
    thread_counts: &[usize],
) -> PyResult<()> {
    if points.is_empty() {
        return super::no_data(py, ax);
    }

    for (index, (variant, by_threads)) in points.iter().enumerate() {
        let style = PlotFmt::scalability_line(index);
        let offset = offset(index, points.len());
        let x: Vec<_> = by_threads
            .keys()
            .map(|&thread_count| thread_count as f64 + offset)
            .collect();
        let means: Vec<_> =
            by_threads.values().map(|point| point.summary.mean).collect();
        let stddevs: Vec<_> =
            by_threads.values().map(|point| point.summary.stddev).collect();

        let kwargs = pydict!(
            py,
            ("color", style.color),
            ("linestyle", style.linestyle),
            ("marker", style.marker),
            ("markersize", style.markersize),
            ("linewidth", 2.5),
            ("label", PlotFmt::policy_config_label(variant)),
            ("markerfacecolor", "white"),
            ("markeredgecolor", style.color),
            ("markeredgewidth", 2),
            ("zorder", 3),
        )?;
        ax.plot(x.clone(), means.clone(), None, Some(kwargs))?;

        let width = ERROR_WIDTHS[index % ERROR_WIDTHS.len()];
        let kwargs = pydict!(
            py,
            ("yerr", stddevs),
            ("fmt", "none"),
            ("ecolor", style.color),
            ("elinewidth", width),
            ("capsize", ERROR_CAPS[index % ERROR_CAPS.len()]),
            ("capthick", width),
            ("alpha", 0.8),
            ("zorder", 2),
        )?;
        ax.errorbar(x, means, Some(kwargs))?;
    }

    let (bottom, top) = ax.get_ylim()?;
    let box_y = bottom + (top - bottom) * 0.15;
    for &thread_count in thread_counts {
        let lines: Vec<_> = points
            .values()
            .enumerate()
            .filter_map(|(index, by_threads)| {
                let cv = by_threads.get(&thread_count)?.cv?;
                let marker = PlotFmt::scalability_line(index).marker;
                Some(format!("{} {:.1}%", PlotFmt::marker_symbol(marker), cv))
            })
            .collect();
        if lines.is_empty() {
            continue;
        }
        let kwargs = pydict!(
            py,
            ("fontsize", 24),
            ("ha", "center"),
            ("va", "bottom"),
            (
                "bbox",
                pydict!(
                    py,
                    ("boxstyle", "round,pad=0.4"),
                    ("facecolor", "white"),
                    ("edgecolor", "gray"),
                    ("alpha", 0.85),
                    ("linewidth", 1),
                )?
            ),
            ("color", "black"),
            ("zorder", 5),
            ("linespacing", 1.5),
        )?;
        let text = format!("CV:\n{}", lines.join("\n"));
        ax.text(thread_count as f64, box_y, &text, Some(kwargs))?;
    }

    ax.set_xlabel("Thread Count", Some(pydict!(py, ("fontsize", 33))?))?;
    let kwargs = pydict!(py, ("fontsize", 32))?;
    ax.set_ylabel("Throughput (ops/sec)", Some(kwargs))?;
    super::scientific_y(py, ax, 28.0)?;
    ax.tick_params(Some(pydict!(py, ("axis", "both"), ("labelsize", 28))?))?;
    ax.set_xticks(thread_counts.to_vec())?;
    ax.grid(Some(pydict!(
        py,
        ("alpha", 0.3),
        ("linestyle", "--"),
        ("linewidth", 1),
        ("which", "both"),
    )?))?;
    ax.set_axisbelow(true)?;
    ax.legend(Some(pydict!(
        py,
        ("loc", "upper left"),
        ("fontsize", 28),
        ("frameon", true),
        ("framealpha", 0.9),
    )?))?;
    fig.tight_layout(None)
}

fn print_summary(points: &Points) {
    for (variant, by_threads) in points {
        println!("\n{}:", variant);
        for (thread_count, point) in by_threads {
            let summary = &point.summary;
            match summary.cv() {
                Some(cv) => println!(
                    "  Thread {}: {:.2} ± {:.2} ops/sec (CV: {:.1}%)",
                    thread_count, summary.mean, summary.stddev, cv
                ),
                None => println!(
                    "  Thread {}: {:.2} ± {:.2} ops/sec",
                    thread_count, summary.mean, summary.stddev
                ),
            }
        }
    }
}
