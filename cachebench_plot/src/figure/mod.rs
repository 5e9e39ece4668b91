// This module contains the tree version comparisons (figures 3 and 4).
mod versions;

// This module contains the thread-count box plot (figure 5).
mod threads;

// This module contains the hit rate line plots (figure 6).
mod hit_rate;

// This module contains the storage box plots (figures 7 and 10).
mod storage;

// This module contains the ranking heatmaps (figures 8 and 9).
mod ranking;

// This module contains the thread scalability plot (figure 11).
mod scalability;

// This module contains the median throughput bars (figures 12 and 13).
mod medians;

// Re-exports.
pub use hit_rate::figure6;
pub use medians::{figure12, figure13};
pub use ranking::{figure8, figure9};
pub use scalability::figure11;
pub use storage::{figure10, figure7};
pub use threads::figure5;
pub use versions::{figure3, figure4};

use crate::fmt::{BoxStyle, PlotFmt};
use crate::plot::{Axes, Figure, Patches, PyPlot};
use crate::{pydict, pytry};
use cachebench::StorageType;
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::Path;

const DPI: usize = 300;
const OUTPUT_FORMATS: [&str; 2] = ["png", "pdf"];

/// Grid of axes of a figure and its size in inches.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub size: (f64, f64),
    pub height_ratios: Option<&'static [f64]>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, size: (f64, f64)) -> Self {
        Self {
            rows,
            cols,
            size,
            height_ratios: None,
        }
    }

    /// Relative heights of the rows; needs one entry per row.
    pub fn height_ratios(mut self, height_ratios: &'static [f64]) -> Self {
        self.height_ratios = Some(height_ratios);
        self
    }
}

/// Creates a figure, lets `draw` fill its axes and saves it as
/// `<output_dir>/<name>.png` and `<output_dir>/<name>.pdf`.
pub(crate) fn render<F>(
    output_dir: &Path,
    name: &str,
    grid: Grid,
    draw: F,
) -> Result<(), Report>
where
    F: for<'p> FnOnce(Python<'p>, &Figure<'p>, &[Axes<'p>]) -> PyResult<()>,
{
    std::fs::create_dir_all(output_dir).wrap_err_with(|| {
        format!("create output directory {}", output_dir.display())
    })?;

    Python::with_gil(|py| {
        let plt = pytry!(py, PyPlot::new(py));
        let kwargs = pytry!(py, pydict!(py, ("figsize", grid.size)));
        if let Some(height_ratios) = grid.height_ratios {
            let gridspec =
                pytry!(py, pydict!(py, ("height_ratios", height_ratios)));
            pytry!(py, kwargs.set_item("gridspec_kw", gridspec));
        }
        let (fig, axes) =
            pytry!(py, plt.subplots(grid.rows, grid.cols, Some(kwargs)));
        pytry!(py, draw(py, &fig, &axes));

        for format in OUTPUT_FORMATS {
            let path = output_dir.join(format!("{}.{}", name, format));
            let kwargs = pytry!(
                py,
                pydict!(py, ("dpi", DPI), ("bbox_inches", "tight"))
            );
            pytry!(py, plt.savefig(&path.to_string_lossy(), Some(kwargs)));
            tracing::info!("saved {}", path.display());
        }
        pytry!(py, plt.close(fig));
        Ok(())
    })
}

/// Centered "No Data" text for panels without anything to show.
pub(crate) fn no_data(py: Python<'_>, ax: &Axes<'_>) -> PyResult<()> {
    let kwargs = pydict!(
        py,
        ("ha", "center"),
        ("va", "center"),
        ("fontsize", 20),
        ("transform", ax.trans_axes()?),
    )?;
    ax.text(0.5, 0.5, "No Data", Some(kwargs))
}

/// Legend made of filled rectangles, one per `(style, label)` pair.
pub(crate) fn box_legend(
    py: Python<'_>,
    ax: &Axes<'_>,
    entries: &[(BoxStyle, String)],
    alpha: f64,
    kwargs: &PyDict,
) -> PyResult<()> {
    let patches = Patches::new(py)?;
    let handles = entries
        .iter()
        .map(|(style, label)| patches.legend_handle(*style, alpha, label))
        .collect::<PyResult<Vec<_>>>()?;
    kwargs.set_item("handles", handles)?;
    ax.legend(Some(kwargs))
}

/// Legend entries of the storage types, in the order given.
pub(crate) fn storage_legend(
    storage_types: &[StorageType],
) -> Vec<(BoxStyle, String)> {
    storage_types
        .iter()
        .map(|storage_type| {
            (
                PlotFmt::storage_style(storage_type),
                PlotFmt::storage_name(storage_type).to_string(),
            )
        })
        .collect()
}

/// Box plot drawn with the black whiskers and red medians used everywhere.
pub(crate) fn styled_boxplot(
    py: Python<'_>,
    ax: &Axes<'_>,
    values: Vec<Vec<f64>>,
    positions: Vec<f64>,
    width: f64,
    styles: &[BoxStyle],
) -> PyResult<()> {
    let lines = pydict!(py, ("color", "black"), ("linewidth", 1.5))?;
    let kwargs = pydict!(
        py,
        ("positions", positions),
        ("widths", width),
        ("patch_artist", true),
        ("showfliers", false),
        ("whiskerprops", lines),
        ("capprops", lines),
    )?;
    let boxplot = ax.boxplot(values, Some(kwargs))?;
    boxplot.style_boxes(styles, 0.8, 1.5)?;
    boxplot.style_medians("red", 2.0)
}

/// Black points over a box, one per value.
pub(crate) fn overlay_points(
    py: Python<'_>,
    ax: &Axes<'_>,
    position: f64,
    values: &[f64],
    alpha: f64,
    size: f64,
) -> PyResult<()> {
    let kwargs = pydict!(
        py,
        ("alpha", alpha),
        ("s", size),
        ("color", "black"),
        ("zorder", 3),
        ("marker", "o"),
    )?;
    ax.scatter(vec![position; values.len()], values.to_vec(), Some(kwargs))
}

/// Scientific notation on the y axis, with the multiplier at `fontsize`.
pub(crate) fn scientific_y(
    py: Python<'_>,
    ax: &Axes<'_>,
    fontsize: f64,
) -> PyResult<()> {
    let kwargs = pydict!(
        py,
        ("style", "scientific"),
        ("axis", "y"),
        ("scilimits", (0, 0)),
    )?;
    ax.ticklabel_format(Some(kwargs))?;
    ax.set_offset_text_fontsize(fontsize)
}

/// White text box with a colored frame, used for annotations.
pub(crate) fn text_box<'p>(
    py: Python<'p>,
    edge_color: &str,
    alpha: f64,
) -> PyResult<&'p PyDict> {
    pydict!(
        py,
        ("boxstyle", "round,pad=0.3"),
        ("facecolor", "white"),
        ("edgecolor", edge_color),
        ("alpha", alpha),
    )
}
