use crate::plot::axes::Axes;
use crate::plot::figure::Figure;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyTuple};
use pyo3::PyNativeType;

pub struct PyPlot<'p> {
    plt: &'p PyModule,
}

impl<'p> PyPlot<'p> {
    pub fn new(py: Python<'p>) -> PyResult<Self> {
        let plt = PyModule::import(py, "matplotlib.pyplot")?;
        Ok(Self { plt })
    }

    /// Creates a figure with a `nrows` x `ncols` grid of axes, returned in
    /// row-major order.
    pub fn subplots(
        &self,
        nrows: usize,
        ncols: usize,
        kwargs: Option<&PyDict>,
    ) -> PyResult<(Figure<'p>, Vec<Axes<'p>>)> {
        let py = self.plt.py();
        let kwargs = match kwargs {
            Some(kwargs) => kwargs,
            None => PyDict::new(py),
        };
        // always get a 2d array back, even for a single axes
        kwargs.set_item("squeeze", false)?;
        let result = self
            .plt
            .getattr("subplots")?
            .call((nrows, ncols), Some(kwargs))?;
        let tuple = result.downcast::<PyTuple>()?;
        let fig = Figure::new(tuple.get_item(0)?);
        let axes = tuple
            .get_item(1)?
            .call_method0("flatten")?
            .iter()?
            .map(|ax| ax.map(Axes::new))
            .collect::<PyResult<Vec<_>>>()?;
        Ok((fig, axes))
    }

    pub fn set_rc_param<V>(&self, key: &str, value: V) -> PyResult<()>
    where
        V: ToPyObject,
    {
        self.plt.getattr("rcParams")?.set_item(key, value)?;
        Ok(())
    }

    pub fn savefig(&self, path: &str, kwargs: Option<&PyDict>) -> PyResult<()> {
        self.plt.getattr("savefig")?.call((path,), kwargs)?;
        Ok(())
    }

    pub fn close(&self, figure: Figure<'_>) -> PyResult<()> {
        self.plt.getattr("close")?.call1((figure.fig(),))?;
        Ok(())
    }
}
