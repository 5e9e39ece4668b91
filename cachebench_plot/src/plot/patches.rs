use crate::fmt::BoxStyle;
use pyo3::prelude::*;
use pyo3::PyNativeType;

// https://matplotlib.org/stable/api/patches_api.html
pub struct Patches<'p> {
    patches: &'p PyModule,
}

impl<'p> Patches<'p> {
    pub fn new(py: Python<'p>) -> PyResult<Self> {
        let patches = PyModule::import(py, "matplotlib.patches")?;
        Ok(Self { patches })
    }

    /// Legend handle showing the fill of a box.
    pub fn legend_handle(
        &self,
        style: BoxStyle,
        alpha: f64,
        label: &str,
    ) -> PyResult<&'p PyAny> {
        let py = self.patches.py();
        let kwargs = crate::pydict!(
            py,
            ("facecolor", style.color),
            ("hatch", style.hatch),
            ("edgecolor", style.edge_color),
            ("linewidth", 1.5),
            ("alpha", alpha),
            ("label", label),
        )?;
        self.patches
            .getattr("Rectangle")?
            .call(((0, 0), 1, 1), Some(kwargs))
    }
}
