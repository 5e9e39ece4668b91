use super::Grid;
use crate::fmt::{LineStyle, PlotFmt};
use crate::plot::{Axes, Figure};
use crate::pydict;
use cachebench::analysis::series::{hit_rate_series, OperationSeries};
use cachebench::{util, CacheSize, Dataset, Search, Summary};
use color_eyre::Report;
use pyo3::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

const THREAD_COUNT: usize = 1;
const CACHE_SIZE: f64 = 0.15;

type Series = BTreeMap<(String, String), OperationSeries>;

/// Hit rate (top) and throughput (bottom) of each policy variant, one line
/// per operation, single-threaded with the cache at 15% of the data set.
pub fn figure6(
    dataset: &Dataset,
    output_dir: impl AsRef<Path>,
) -> Result<(), Report> {
    let series = hit_rate_series(
        dataset,
        Search::new()
            .thread_count(THREAD_COUNT)
            .cache_size(CacheSize::from_fraction(CACHE_SIZE)),
    );
    let variants = util::distinct(
        series.keys().map(|(variant, _)| variant.clone()).collect(),
    );
    let operations = util::distinct(
        series.keys().map(|(_, operation)| operation.clone()).collect(),
    );
    tracing::info!(
        "{} policy variants and {} operations",
        variants.len(),
        operations.len()
    );

    super::render(
        output_dir.as_ref(),
        "plot_figure6",
        Grid::new(2, 1, (20.0, 16.0)),
        |py, fig, axes| draw(py, fig, axes, &series, &variants, &operations),
    )?;
    print_summary(&series, &variants, &operations);
    Ok(())
}

fn draw(
    py: Python<'_>,
    fig: &Figure<'_>,
    axes: &[Axes<'_>],
    series: &Series,
    variants: &[String],
    operations: &[String],
) -> PyResult<()> {
    let (hit_rate_ax, throughput_ax) = (&axes[0], &axes[1]);
    if series.is_empty() {
        super::no_data(py, hit_rate_ax)?;
        return super::no_data(py, throughput_ax);
    }
    let x: Vec<_> = (0..variants.len()).collect();

    for (index, operation) in operations.iter().enumerate() {
        let style = PlotFmt::operation_line(index);
        let hit_rates = summaries(series, variants, operation, |series| {
            series.hit_rate
        });
        error_line(py, hit_rate_ax, &x, &hit_rates, style, operation)?;
        let throughputs = summaries(series, variants, operation, |series| {
            Some(series.throughput)
        });
        error_line(py, throughput_ax, &x, &throughputs, style, operation)?;
    }

    // hit rate
    let label = pydict!(py, ("fontsize", 32), ("color", "black"))?;
    hit_rate_ax.set_ylabel("Hit Rate (%)", Some(label))?;
    hit_rate_ax.set_xticks(Vec::<f64>::new())?;
    hit_rate_ax.tick_params(Some(pydict!(
        py,
        ("axis", "y"),
        ("labelsize", 26),
        ("colors", "black"),
    )?))?;
    let lowest = series
        .values()
        .filter_map(|series| series.hit_rate.map(|summary| summary.mean))
        .reduce(f64::min);
    if let Some(lowest) = lowest {
        let bottom = (lowest - 2.0).max(0.0);
        let kwargs = pydict!(py, ("bottom", bottom), ("top", 100.0))?;
        hit_rate_ax.set_ylim(Some(kwargs))?;
    }
    frame(py, hit_rate_ax)?;
    hit_rate_ax.legend(Some(pydict!(
        py,
        ("loc", "best"),
        ("fontsize", 26),
        ("frameon", true),
        ("fancybox", false),
        ("shadow", false),
        ("framealpha", 0.7),
        ("edgecolor", "black"),
        ("facecolor", "white"),
        ("ncol", 2),
    )?))?;

    // throughput
    let label = pydict!(py, ("fontsize", 32), ("color", "black"))?;
    throughput_ax.set_ylabel("Throughput (ops/sec)", Some(label))?;
    throughput_ax.set_xticks(x.clone())?;
    let names: Vec<_> = variants
        .iter()
        .map(|variant| PlotFmt::policy_variant_name(variant))
        .collect();
    throughput_ax.set_xticklabels(
        names,
        Some(pydict!(
            py,
            ("fontsize", 26),
            ("rotation", 90),
            ("ha", "right"),
            ("color", "black"),
        )?),
    )?;
    throughput_ax.tick_params(Some(pydict!(
        py,
        ("axis", "y"),
        ("labelsize", 26),
        ("colors", "black"),
    )?))?;
    throughput_ax.set_offset_text_fontsize(24.0)?;
    frame(py, throughput_ax)?;

    fig.tight_layout(Some(pydict!(py, ("rect", (0.0, 0.0, 1.0, 0.985)))?))
}

// summary of each variant for one operation, if any
fn summaries<F>(
    series: &Series,
    variants: &[String],
    operation: &str,
    metric: F,
) -> Vec<Option<Summary>>
where
    F: Fn(&OperationSeries) -> Option<Summary>,
{
    variants
        .iter()
        .map(|variant| {
            series
                .get(&(variant.clone(), operation.to_string()))
                .and_then(&metric)
        })
        .collect()
}

// mean line with standard-error bars; gaps where a variant has no data
fn error_line(
    py: Python<'_>,
    ax: &Axes<'_>,
    x: &[usize],
    summaries: &[Option<Summary>],
    style: LineStyle,
    operation: &str,
) -> PyResult<()> {
    let means: Vec<_> = summaries
        .iter()
        .map(|summary| summary.map_or(f64::NAN, |summary| summary.mean))
        .collect();
    let errors: Vec<_> = summaries
        .iter()
        .map(|summary| summary.map_or(f64::NAN, |summary| summary.sem()))
        .collect();
    let kwargs = pydict!(
        py,
        ("yerr", errors),
        ("fmt", format!("{}{}", style.marker, style.linestyle)),
        ("linewidth", 3.0),
        ("markersize", style.markersize),
        ("color", style.color),
        ("ecolor", style.color),
        ("elinewidth", 2.0),
        ("capsize", 5),
        ("capthick", 2.0),
        ("label", PlotFmt::operation_name(operation)),
        ("markerfacecolor", "white"),
        ("markeredgewidth", 2.0),
        ("markeredgecolor", style.color),
    )?;
    ax.errorbar(x.to_vec(), means, Some(kwargs))
}

fn frame(py: Python<'_>, ax: &Axes<'_>) -> PyResult<()> {
    ax.grid(Some(pydict!(
        py,
        ("alpha", 0.4),
        ("axis", "both"),
        ("color", "#cccccc"),
        ("linestyle", "-"),
        ("linewidth", 0.8),
    )?))?;
    ax.set_axisbelow(true)?;
    ax.spines()?.set_all_edges("black", 1.5)
}

fn print_summary(series: &Series, variants: &[String], operations: &[String]) {
    println!("{}", "=".repeat(80));
    println!("HIT RATE SUMMARY STATISTICS (BY OPERATION)");
    println!("{}", "=".repeat(80));
    for variant in variants {
        println!(
            "\n{} ({}):",
            PlotFmt::policy_variant_label(variant),
            variant
        );
        for operation in operations {
            let key = (variant.clone(), operation.clone());
            let hit_rate = match series.get(&key).and_then(|s| s.hit_rate) {
                Some(hit_rate) => hit_rate,
                None => continue,
            };
            println!("  {}:", operation);
            println!("    Hit Rate Mean: {:.2}%", hit_rate.mean);
            println!("    Hit Rate Std: {:.2}%", hit_rate.stddev);
            println!("    Hit Rate SEM: {:.2}%", hit_rate.sem());
            println!("    Data Points: {}", hit_rate.count);
        }
    }
}
