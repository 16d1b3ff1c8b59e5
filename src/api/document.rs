//! Renderer-facing document built from a figure aggregate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::{AxisId, ElementId, Orientation, PlotType};
use crate::error::CaptureError;
use crate::extract::FormatHints;
use crate::plot::{AxisLabels, PlotData, PlotRecord};

pub const FIGURE_DOCUMENT_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub rows: usize,
    pub cols: usize,
    pub multi_panel: bool,
    pub multi_layer: bool,
}

/// One captured chart inside a [`FigureDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPanelDocument")]
pub struct PanelDocument {
    pub plot_type: PlotType,
    pub version: u32,
    pub row: usize,
    pub col: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    pub data: PlotData,
    pub labels: AxisLabels,
    pub format: FormatHints,
    pub element_ids: Vec<ElementId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPanelDocument {
    plot_type: PlotType,
    #[serde(default = "default_panel_version")]
    version: u32,
    row: usize,
    col: usize,
    #[serde(default)]
    orientation: Option<Orientation>,
    data: serde_json::Value,
    #[serde(default)]
    labels: AxisLabels,
    #[serde(default)]
    format: FormatHints,
    #[serde(default)]
    element_ids: Vec<ElementId>,
}

fn default_panel_version() -> u32 {
    1
}

impl TryFrom<RawPanelDocument> for PanelDocument {
    type Error = CaptureError;

    fn try_from(raw: RawPanelDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            data: PlotData::from_json_value(raw.plot_type, raw.data)?,
            plot_type: raw.plot_type,
            version: raw.version,
            row: raw.row,
            col: raw.col,
            orientation: raw.orientation,
            labels: raw.labels,
            format: raw.format,
            element_ids: raw.element_ids,
        })
    }
}

impl From<&PlotRecord> for PanelDocument {
    fn from(record: &PlotRecord) -> Self {
        Self {
            plot_type: record.plot_type,
            version: record.plot_type.schema_version(),
            row: record.grid.row,
            col: record.grid.col,
            orientation: record.orientation,
            data: record.data.clone(),
            labels: record.labels.clone(),
            format: record.format.clone(),
            element_ids: record.element_ids.clone(),
        }
    }
}

/// Everything the external renderer needs to present one figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureDocument {
    pub schema_version: u32,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub layout: LayoutDocument,
    pub panels: Vec<PanelDocument>,
}

impl FigureDocument {
    /// Builds a document from records in capture order.
    ///
    /// With `dedupe_smooth_lines`, line records on an axis that also carries
    /// a smooth record are dropped: the smooth record already describes the
    /// fitted curve.
    pub fn from_records<'a>(
        id: impl Into<String>,
        title: Option<String>,
        records: impl IntoIterator<Item = &'a PlotRecord>,
        dedupe_smooth_lines: bool,
    ) -> Self {
        let records: Vec<&PlotRecord> = records.into_iter().collect();
        let smooth_axes: HashSet<AxisId> = records
            .iter()
            .filter(|record| record.plot_type == PlotType::Smooth)
            .map(|record| record.axis)
            .collect();
        let kept: Vec<&PlotRecord> = records
            .into_iter()
            .filter(|record| {
                !(dedupe_smooth_lines
                    && record.plot_type == PlotType::Line
                    && smooth_axes.contains(&record.axis))
            })
            .collect();

        Self {
            schema_version: FIGURE_DOCUMENT_JSON_SCHEMA_V1,
            id: id.into(),
            title,
            layout: layout_of(&kept),
            panels: kept.into_iter().map(PanelDocument::from).collect(),
        }
    }

    /// Panels that belong to the subplot cell `(row, col)`.
    pub fn panels_at(&self, row: usize, col: usize) -> impl Iterator<Item = &PanelDocument> {
        self.panels
            .iter()
            .filter(move |panel| panel.row == row && panel.col == col)
    }
}

fn layout_of(records: &[&PlotRecord]) -> LayoutDocument {
    if records.is_empty() {
        return LayoutDocument::default();
    }
    let rows = records.iter().map(|r| r.grid.row).max().unwrap_or(0) + 1;
    let cols = records.iter().map(|r| r.grid.col).max().unwrap_or(0) + 1;

    let mut axes: Vec<AxisId> = records.iter().map(|r| r.axis).collect();
    let total = axes.len();
    axes.sort_unstable();
    axes.dedup();

    LayoutDocument {
        rows,
        cols,
        multi_panel: axes.len() > 1,
        multi_layer: axes.len() < total,
    }
}
