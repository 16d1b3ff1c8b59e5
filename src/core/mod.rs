pub mod candlestick;
pub mod stats;
pub mod types;

pub use candlestick::{OhlcSample, date_number_label};
pub use stats::{BoxStats, KDE_GRID_POINTS, gaussian_kde};
pub use types::{AxisId, ElementId, FigureId, GridPosition, Orientation, PlotType, sample};
