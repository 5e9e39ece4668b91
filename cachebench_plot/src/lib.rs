#![deny(rust_2018_idioms)]

// This module contains the display names and styles used across plots.
pub mod fmt;

// This module contains the placement of grouped boxes and bars.
pub mod layout;

// This module contains the csv exports written next to some figures.
pub mod export;

// This module contains the processing of benchmark output folders.
pub mod db;

// This module contains the tables behind each figure.
pub mod report;

#[cfg(feature = "pyo3")]
pub mod plot;

#[cfg(feature = "pyo3")]
pub mod figure;

// Re-exports.
pub use db::{ProcessedRow, ProfilingDB, RawRow};
pub use fmt::PlotFmt;
pub use layout::{GroupLayout, GroupedBoxes};

#[cfg(feature = "pyo3")]
pub use figure::*;

#[cfg(feature = "pyo3")]
use color_eyre::Report;
#[cfg(feature = "pyo3")]
use plot::pyplot::PyPlot;
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[macro_export]
macro_rules! pytry {
    ($py:expr, $e:expr) => {{
        match $e {
            Ok(value) => value,
            Err(e) => {
                e.print($py);
                return Err(::color_eyre::eyre::eyre!("python error: {}", e));
            }
        }
    }};
}

#[macro_export]
macro_rules! pydict {
    ($py:expr, $($tup:expr),* $(,)?) => {{
        let dict = ::pyo3::types::PyDict::new($py);
        let set: ::pyo3::PyResult<()> = (|| {
            $(
                let (key, value) = $tup;
                dict.set_item(key, value)?;
            )*
            Ok(())
        })();
        set.map(|()| dict)
    }};
}

/// Selects the non-interactive backend and the white background shared by
/// every figure.
#[cfg(feature = "pyo3")]
pub fn set_global_style() -> Result<(), Report> {
    Python::with_gil(|py| {
        let matplotlib = pytry!(py, PyModule::import(py, "matplotlib"));
        pytry!(py, matplotlib.call_method1("use", ("Agg",)));
        let plt = pytry!(py, PyPlot::new(py));
        pytry!(py, plt.set_rc_param("axes.facecolor", "white"));
        pytry!(py, plt.set_rc_param("figure.facecolor", "white"));
        Ok(())
    })
}
