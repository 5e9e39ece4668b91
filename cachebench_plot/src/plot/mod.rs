pub mod axes;
pub mod figure;
pub mod patches;
pub mod pyplot;
pub mod spines;

// Re-exports.
pub use axes::{Axes, BoxPlot};
pub use figure::Figure;
pub use patches::Patches;
pub use pyplot::PyPlot;
pub use spines::Spines;
