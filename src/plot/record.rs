use serde::{Deserialize, Serialize};

use crate::core::{AxisId, ElementId, GridPosition, Orientation, PlotType};
use crate::error::{CaptureError, CaptureResult};
use crate::extract::FormatHints;
use crate::scene::ElementPath;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPoint {
    pub category: String,
    pub value: Option<f64>,
}

/// Five-number summary of one box, plus the outliers beyond each whisker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxSummary {
    pub fill: String,
    pub lower_outliers: Vec<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub q2: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
    pub upper_outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedBarPoint {
    pub x: String,
    pub fill: String,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatGrid {
    pub points: Vec<Vec<Option<f64>>>,
    pub x: Vec<String>,
    pub y: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistBin {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlePoint {
    pub value: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Type-specific payload of a plot record.
///
/// Serialized without a tag: the panel's `plotType` names the schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlotData {
    Bar(Vec<BarPoint>),
    Box(Vec<BoxSummary>),
    Grouped(Vec<Vec<GroupedBarPoint>>),
    Heat(HeatGrid),
    Hist(Vec<HistBin>),
    Line(Vec<Vec<LinePoint>>),
    Scatter(Vec<ScatterPoint>),
    Smooth(Vec<Vec<SmoothPoint>>),
    Candlestick(Vec<CandlePoint>),
}

impl PlotData {
    /// Zero-length payload of the schema `plot_type` uses.
    #[must_use]
    pub fn empty(plot_type: PlotType) -> Self {
        match plot_type {
            PlotType::Bar | PlotType::Count => PlotData::Bar(Vec::new()),
            PlotType::Box => PlotData::Box(Vec::new()),
            PlotType::Dodged | PlotType::Stacked => PlotData::Grouped(Vec::new()),
            PlotType::Heat => PlotData::Heat(HeatGrid::default()),
            PlotType::Hist => PlotData::Hist(Vec::new()),
            PlotType::Line => PlotData::Line(Vec::new()),
            PlotType::Scatter => PlotData::Scatter(Vec::new()),
            PlotType::Smooth => PlotData::Smooth(Vec::new()),
            PlotType::Candlestick => PlotData::Candlestick(Vec::new()),
        }
    }

    /// Number of data points across all series.
    #[must_use]
    pub fn point_count(&self) -> usize {
        match self {
            PlotData::Bar(points) => points.len(),
            PlotData::Box(boxes) => boxes.len(),
            PlotData::Grouped(series) => series.iter().map(Vec::len).sum(),
            PlotData::Heat(grid) => grid.points.iter().map(Vec::len).sum(),
            PlotData::Hist(bins) => bins.len(),
            PlotData::Line(series) => series.iter().map(Vec::len).sum(),
            PlotData::Scatter(points) => points.len(),
            PlotData::Smooth(series) => series.iter().map(Vec::len).sum(),
            PlotData::Candlestick(candles) => candles.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    /// Decodes a payload using the schema selected by `plot_type`.
    pub fn from_json_value(plot_type: PlotType, value: serde_json::Value) -> CaptureResult<Self> {
        fn decode<T: serde::de::DeserializeOwned>(
            plot_type: PlotType,
            value: serde_json::Value,
        ) -> CaptureResult<T> {
            serde_json::from_value(value).map_err(|e| {
                CaptureError::InvalidData(format!("failed to parse {plot_type} payload: {e}"))
            })
        }

        Ok(match plot_type {
            PlotType::Bar | PlotType::Count => PlotData::Bar(decode(plot_type, value)?),
            PlotType::Box => PlotData::Box(decode(plot_type, value)?),
            PlotType::Dodged | PlotType::Stacked => PlotData::Grouped(decode(plot_type, value)?),
            PlotType::Heat => PlotData::Heat(decode(plot_type, value)?),
            PlotType::Hist => PlotData::Hist(decode(plot_type, value)?),
            PlotType::Line => PlotData::Line(decode(plot_type, value)?),
            PlotType::Scatter => PlotData::Scatter(decode(plot_type, value)?),
            PlotType::Smooth => PlotData::Smooth(decode(plot_type, value)?),
            PlotType::Candlestick => PlotData::Candlestick(decode(plot_type, value)?),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisLabels {
    pub title: String,
    pub x: String,
    pub y: String,
    pub fill: Option<String>,
}

/// Identity of a record inside a figure aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaptureKey {
    pub axis: AxisId,
    pub plot_type: PlotType,
}

impl CaptureKey {
    #[must_use]
    pub const fn new(axis: AxisId, plot_type: PlotType) -> Self {
        Self { axis, plot_type }
    }
}

/// Normalized capture of one chart axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRecord {
    pub plot_type: PlotType,
    pub axis: AxisId,
    pub grid: GridPosition,
    pub orientation: Option<Orientation>,
    pub data: PlotData,
    pub labels: AxisLabels,
    pub format: FormatHints,
    /// Element ids in rendering order; unique within the record.
    pub element_ids: Vec<ElementId>,
    /// Scene address of each id, parallel to `element_ids`.
    pub element_paths: Vec<ElementPath>,
}

impl PlotRecord {
    #[must_use]
    pub const fn capture_key(&self) -> CaptureKey {
        CaptureKey::new(self.axis, self.plot_type)
    }

    /// Pairs each element id with the scene primitive it tags.
    pub fn element_tags(&self) -> impl Iterator<Item = crate::scene::ElementTag> + '_ {
        self.element_paths
            .iter()
            .zip(&self.element_ids)
            .map(|(path, id)| crate::scene::ElementTag {
                path: *path,
                id: id.clone(),
            })
    }
}
