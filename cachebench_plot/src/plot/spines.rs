use pyo3::prelude::*;

// https://matplotlib.org/stable/api/spines_api.html
pub struct Spines<'a> {
    spines: &'a PyAny,
}

impl<'a> Spines<'a> {
    pub fn new(spines: &'a PyAny) -> Self {
        Self { spines }
    }

    pub fn set_all_visible(&self, visible: bool) -> PyResult<()> {
        for spine in self.values()? {
            spine.call_method1("set_visible", (visible,))?;
        }
        Ok(())
    }

    /// Draws every spine with the given color and width.
    pub fn set_all_edges(&self, color: &str, width: f64) -> PyResult<()> {
        for spine in self.values()? {
            spine.call_method1("set_edgecolor", (color,))?;
            spine.call_method1("set_linewidth", (width,))?;
        }
        Ok(())
    }

    fn values(&self) -> PyResult<Vec<&'a PyAny>> {
        self.spines
            .call_method0("values")?
            .iter()?
            .collect::<PyResult<Vec<_>>>()
    }
}
