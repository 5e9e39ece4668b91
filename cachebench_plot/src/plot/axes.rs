use crate::fmt::BoxStyle;
use crate::plot::spines::Spines;
use pyo3::prelude::*;
use pyo3::types::PyDict;

pub struct Axes<'a> {
    ax: &'a PyAny,
}

impl<'a> Axes<'a> {
    pub fn new(ax: &'a PyAny) -> Self {
        Self { ax }
    }

    pub fn ax(&self) -> &'a PyAny {
        self.ax
    }

    pub fn set_title(
        &self,
        title: &str,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()> {
        self.ax.call_method("set_title", (title,), kwargs)?;
        Ok(())
    }

    pub fn set_xlabel(
        &self,
        label: &str,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()> {
        self.ax.call_method("set_xlabel", (label,), kwargs)?;
        Ok(())
    }

    pub fn set_ylabel(
        &self,
        label: &str,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()> {
        self.ax.call_method("set_ylabel", (label,), kwargs)?;
        Ok(())
    }

    pub fn set_xticks<T>(&self, ticks: Vec<T>) -> PyResult<()>
    where
        T: IntoPy<PyObject>,
    {
        self.ax.call_method1("set_xticks", (ticks,))?;
        Ok(())
    }

    pub fn set_xticklabels<L>(
        &self,
        labels: Vec<L>,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()>
    where
        L: IntoPy<PyObject>,
    {
        self.ax.call_method("set_xticklabels", (labels,), kwargs)?;
        Ok(())
    }

    pub fn set_yticks<T>(&self, ticks: Vec<T>) -> PyResult<()>
    where
        T: IntoPy<PyObject>,
    {
        self.ax.call_method1("set_yticks", (ticks,))?;
        Ok(())
    }

    pub fn set_yticklabels<L>(
        &self,
        labels: Vec<L>,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()>
    where
        L: IntoPy<PyObject>,
    {
        self.ax.call_method("set_yticklabels", (labels,), kwargs)?;
        Ok(())
    }

    pub fn tick_params(&self, kwargs: Option<&PyDict>) -> PyResult<()> {
        self.ax.call_method("tick_params", (), kwargs)?;
        Ok(())
    }

    pub fn ticklabel_format(&self, kwargs: Option<&PyDict>) -> PyResult<()> {
        self.ax.call_method("ticklabel_format", (), kwargs)?;
        Ok(())
    }

    /// Font size of the scientific-notation multiplier of the y axis.
    pub fn set_offset_text_fontsize(&self, fontsize: f64) -> PyResult<()> {
        self.ax
            .getattr("yaxis")?
            .call_method0("get_offset_text")?
            .call_method1("set_fontsize", (fontsize,))?;
        Ok(())
    }

    pub fn set_xlim(&self, kwargs: Option<&PyDict>) -> PyResult<()> {
        self.ax.call_method("set_xlim", (), kwargs)?;
        Ok(())
    }

    pub fn set_ylim(&self, kwargs: Option<&PyDict>) -> PyResult<()> {
        self.ax.call_method("set_ylim", (), kwargs)?;
        Ok(())
    }

    pub fn margins(&self, margin: f64) -> PyResult<()> {
        self.ax.call_method1("margins", (margin,))?;
        Ok(())
    }

    pub fn get_ylim(&self) -> PyResult<(f64, f64)> {
        self.ax.call_method0("get_ylim")?.extract()
    }

    pub fn grid(&self, kwargs: Option<&PyDict>) -> PyResult<()> {
        self.ax.call_method("grid", (), kwargs)?;
        Ok(())
    }

    pub fn set_axisbelow(&self, below: bool) -> PyResult<()> {
        self.ax.call_method1("set_axisbelow", (below,))?;
        Ok(())
    }

    pub fn legend(&self, kwargs: Option<&PyDict>) -> PyResult<()> {
        self.ax.call_method("legend", (), kwargs)?;
        Ok(())
    }

    /// Axes sharing the x axis, with its y axis on the right.
    pub fn twinx(&self) -> PyResult<Axes<'a>> {
        let ax = self.ax.call_method0("twinx")?;
        Ok(Axes::new(ax))
    }

    /// Transform for coordinates relative to the axes, from (0, 0) at the
    /// bottom left to (1, 1) at the top right.
    pub fn trans_axes(&self) -> PyResult<&'a PyAny> {
        self.ax.getattr("transAxes")
    }

    pub fn spines(&self) -> PyResult<Spines<'a>> {
        let spines = self.ax.getattr("spines")?;
        Ok(Spines::new(spines))
    }

    pub fn plot<X, Y>(
        &self,
        x: Vec<X>,
        y: Vec<Y>,
        fmt: Option<&str>,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()>
    where
        X: IntoPy<PyObject>,
        Y: IntoPy<PyObject>,
    {
        if let Some(fmt) = fmt {
            self.ax.call_method("plot", (x, y, fmt), kwargs)?;
        } else {
            self.ax.call_method("plot", (x, y), kwargs)?;
        };
        Ok(())
    }

    pub fn errorbar<X, Y>(
        &self,
        x: Vec<X>,
        y: Vec<Y>,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()>
    where
        X: IntoPy<PyObject>,
        Y: IntoPy<PyObject>,
    {
        self.ax.call_method("errorbar", (x, y), kwargs)?;
        Ok(())
    }

    pub fn scatter<X, Y>(
        &self,
        x: Vec<X>,
        y: Vec<Y>,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()>
    where
        X: IntoPy<PyObject>,
        Y: IntoPy<PyObject>,
    {
        self.ax.call_method("scatter", (x, y), kwargs)?;
        Ok(())
    }

    pub fn bar<X, H>(
        &self,
        x: Vec<X>,
        height: Vec<H>,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()>
    where
        X: IntoPy<PyObject>,
        H: IntoPy<PyObject>,
    {
        self.ax.call_method("bar", (x, height), kwargs)?;
        Ok(())
    }

    pub fn boxplot(
        &self,
        values: Vec<Vec<f64>>,
        kwargs: Option<&PyDict>,
    ) -> PyResult<BoxPlot<'a>> {
        let artists = self.ax.call_method("boxplot", (values,), kwargs)?;
        Ok(BoxPlot { artists })
    }

    pub fn hlines(
        &self,
        y: f64,
        xmin: f64,
        xmax: f64,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()> {
        self.ax.call_method("hlines", (y, xmin, xmax), kwargs)?;
        Ok(())
    }

    pub fn axhline(&self, y: f64, kwargs: Option<&PyDict>) -> PyResult<()> {
        self.ax.call_method("axhline", (y,), kwargs)?;
        Ok(())
    }

    pub fn axvline(&self, x: f64, kwargs: Option<&PyDict>) -> PyResult<()> {
        self.ax.call_method("axvline", (x,), kwargs)?;
        Ok(())
    }

    pub fn text(
        &self,
        x: f64,
        y: f64,
        text: &str,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()> {
        self.ax.call_method("text", (x, y, text), kwargs)?;
        Ok(())
    }

    pub fn imshow(
        &self,
        data: Vec<Vec<f64>>,
        kwargs: Option<&PyDict>,
    ) -> PyResult<()> {
        self.ax.call_method("imshow", (data,), kwargs)?;
        Ok(())
    }

    /// Hides the frame, the ticks and the labels.
    pub fn axis_off(&self) -> PyResult<()> {
        self.ax.call_method1("axis", ("off",))?;
        Ok(())
    }
}

/// Artists returned by [`Axes::boxplot`] (drawn with `patch_artist=True`).
pub struct BoxPlot<'a> {
    artists: &'a PyAny,
}

impl<'a> BoxPlot<'a> {
    /// Fills each box with the style given for it.
    pub fn style_boxes(
        &self,
        styles: &[BoxStyle],
        alpha: f64,
        linewidth: f64,
    ) -> PyResult<()> {
        let boxes = self.artists.get_item("boxes")?;
        for (patch, style) in boxes.iter()?.zip(styles) {
            let patch = patch?;
            patch.call_method1("set_facecolor", (style.color,))?;
            patch.call_method1("set_hatch", (style.hatch,))?;
            patch.call_method1("set_edgecolor", (style.edge_color,))?;
            patch.call_method1("set_linewidth", (linewidth,))?;
            patch.call_method1("set_alpha", (alpha,))?;
        }
        Ok(())
    }

    pub fn style_medians(&self, color: &str, linewidth: f64) -> PyResult<()> {
        for line in self.artists.get_item("medians")?.iter()? {
            let line = line?;
            line.call_method1("set_color", (color,))?;
            line.call_method1("set_linewidth", (linewidth,))?;
        }
        Ok(())
    }
}
