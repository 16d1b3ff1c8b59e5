//! Plot-type data models.
//!
//! One model per supported chart kind. A model owns the axis snapshot it was
//! built from and turns it into a [`PlotRecord`] by composing the extractors
//! it needs.

pub mod bar;
pub mod box_plot;
pub mod candlestick;
pub mod factory;
pub mod grouped_bar;
pub mod heatmap;
pub mod histogram;
pub mod line;
pub mod record;
pub mod scatter;
pub mod smooth;

use crate::api::CaptureConfig;
use crate::core::{AxisId, ElementId, Orientation, PlotType};
use crate::extract::FormatHints;
use crate::scene::{AxisScene, ElementPath};

pub use factory::{PlotConstructor, PlotFactory};
pub use record::{
    AxisLabels, BarPoint, BoxSummary, CandlePoint, CaptureKey, GroupedBarPoint, HeatGrid, HistBin,
    LinePoint, PlotData, PlotRecord, ScatterPoint, SmoothPoint,
};

/// A chart kind bound to one rendered axis.
pub trait PlotDataModel: Send + Sync {
    fn plot_type(&self) -> PlotType;

    /// Builds the normalized record. Never fails: fields that cannot be
    /// extracted degrade to empty values and are logged.
    fn extract(&self) -> PlotRecord;
}

/// Axis labels with the x-label fallback chain applied: own label, then the
/// figure's shared bottom label, then the configured default.
pub(crate) fn axis_labels(axis: &AxisScene, config: &CaptureConfig) -> AxisLabels {
    let x = if !axis.x_label.trim().is_empty() {
        axis.x_label.clone()
    } else if let Some(shared) = axis
        .shared_x_label
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty())
    {
        shared.to_owned()
    } else {
        config.default_x_label.clone()
    };

    AxisLabels {
        title: axis.title.clone(),
        x,
        y: axis.y_label.clone(),
        fill: None,
    }
}

/// Collects element ids in payload order.
pub(crate) struct ElementLedger {
    axis: AxisId,
    plot_type: PlotType,
    ids: Vec<ElementId>,
    paths: Vec<ElementPath>,
}

impl ElementLedger {
    pub(crate) fn new(axis: AxisId, plot_type: PlotType) -> Self {
        Self {
            axis,
            plot_type,
            ids: Vec::new(),
            paths: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, path: ElementPath) {
        self.ids.push(ElementId::for_element(
            self.axis,
            self.plot_type,
            self.ids.len(),
        ));
        self.paths.push(path);
    }

    pub(crate) fn into_record(
        self,
        axis: &AxisScene,
        orientation: Option<Orientation>,
        data: PlotData,
        labels: AxisLabels,
        format: FormatHints,
    ) -> PlotRecord {
        PlotRecord {
            plot_type: self.plot_type,
            axis: axis.id,
            grid: axis.grid,
            orientation,
            data,
            labels,
            format,
            element_ids: self.ids,
            element_paths: self.paths,
        }
    }
}
