//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, PlotError};
pub use renderer::{ChartDir, ChartKind, ChartOutcome, ChartRenderer};
