//! chart-a11y: capture pipeline for accessible charts.
//!
//! Plotting calls are observed through an [`Interceptor`]. Each outermost
//! call snapshots the axis it drew on, extracts a normalized plot record and
//! attaches it to the figure's aggregate in the [`FigureRegistry`], from
//! which a renderer-facing [`FigureDocument`] can be built.

pub mod api;
pub mod context;
pub mod core;
pub mod error;
pub mod extract;
pub mod host;
pub mod plot;
pub mod scene;
pub mod telemetry;

pub use api::{
    CallSite, CallTarget, CaptureConfig, FigureDocument, FigureRegistry, Interceptor, Library,
};
pub use context::{ReentrancyContext, Scope};
pub use crate::core::{AxisId, ElementId, FigureId, PlotType};
pub use error::{CaptureError, CaptureResult};
pub use host::{HeadlessHost, LocatesAxis, PlottingObservable};
pub use plot::{PlotDataModel, PlotFactory, PlotRecord};
