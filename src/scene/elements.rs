use serde::{Deserialize, Serialize};

use crate::core::Orientation;
use crate::error::{CaptureError, CaptureResult};

/// One rectangle of a bar container, in data coordinates.
///
/// `(x, y)` is the lower-left corner; `height` is the vertical extent and
/// `width` the horizontal one regardless of orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarPatch {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BarPatch {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Position of the patch centre along the category axis.
    #[must_use]
    pub fn center(self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.x + self.width / 2.0,
            Orientation::Horizontal => self.y + self.height / 2.0,
        }
    }

    /// Extent of the patch along the value axis.
    #[must_use]
    pub fn value(self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.height,
            Orientation::Horizontal => self.width,
        }
    }

    /// Half of the patch thickness along the category axis.
    #[must_use]
    pub fn half_thickness(self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.width.abs() / 2.0,
            Orientation::Horizontal => self.height.abs() / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarContainer {
    pub label: Option<String>,
    pub orientation: Orientation,
    pub patches: Vec<BarPatch>,
}

impl BarContainer {
    #[must_use]
    pub fn new(orientation: Orientation, patches: Vec<BarPatch>) -> Self {
        Self {
            label: None,
            orientation,
            patches,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line2D {
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
}

impl Line2D {
    #[must_use]
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self {
            label: None,
            points,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label as shown in a legend. Native placeholder labels starting with `_`
    /// count as unlabeled.
    #[must_use]
    pub fn legend_label(&self) -> Option<&str> {
        self.label
            .as_deref()
            .filter(|label| !label.is_empty() && !label.starts_with('_'))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCollection {
    pub label: Option<String>,
    pub offsets: Vec<(f64, f64)>,
}

/// Color-mapped surface. `values[row][col]`, rows in native order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorMesh {
    pub values: Vec<Vec<f64>>,
    pub colorbar_label: Option<String>,
    pub colorbar_formatter: Option<AxisFormatter>,
}

impl ColorMesh {
    #[must_use]
    pub fn new(values: Vec<Vec<f64>>) -> Self {
        Self {
            values,
            colorbar_label: None,
            colorbar_formatter: None,
        }
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    pub fn validate(&self) -> CaptureResult<()> {
        let columns = self.columns();
        if self.values.iter().any(|row| row.len() != columns) {
            return Err(CaptureError::InvalidData(
                "color mesh rows must all have the same length".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Artists of one box-and-whisker group.
///
/// Whiskers run from the box edge to the cap: `whisker_low = (q1, low cap)`,
/// `whisker_high = (q3, high cap)`. Values are along the value axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxArtists {
    pub position: f64,
    pub orientation: Orientation,
    pub whisker_low: (f64, f64),
    pub whisker_high: (f64, f64),
    pub caps: (f64, f64),
    pub median: f64,
    pub fliers: Vec<f64>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleGlyph {
    pub x: f64,
    pub body_bottom: f64,
    pub body_top: f64,
    pub wick_low: f64,
    pub wick_high: f64,
    pub bullish: bool,
    pub volume: Option<f64>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleCollection {
    pub candles: Vec<CandleGlyph>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickLabel {
    pub position: f64,
    pub text: String,
}

impl TickLabel {
    #[must_use]
    pub fn new(position: f64, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// Tick formatter attached to an axis by the host library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisFormatter {
    /// New-style format string, e.g. `"${x:,.2f}"`.
    StrMethod(String),
    /// Old-style `%` format string, e.g. `"%.2f"`.
    FormatStr(String),
    Percent { decimals: Option<u32> },
    /// strftime pattern of a date axis.
    Date(String),
    Scalar { math_text: bool },
    /// Arbitrary callable, known only by name.
    Func { name: String },
}

/// Closed set of rendered primitives an axis can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneElement {
    Bars(BarContainer),
    Line(Line2D),
    Points(PointCollection),
    ColorMesh(ColorMesh),
    BoxGroup(BoxArtists),
    Candles(CandleCollection),
}

impl SceneElement {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SceneElement::Bars(_) => "bars",
            SceneElement::Line(_) => "line",
            SceneElement::Points(_) => "points",
            SceneElement::ColorMesh(_) => "color_mesh",
            SceneElement::BoxGroup(_) => "box_group",
            SceneElement::Candles(_) => "candles",
        }
    }

    /// Number of addressable sub-primitives (patches, points, cells, candles).
    #[must_use]
    pub fn part_count(&self) -> usize {
        match self {
            SceneElement::Bars(container) => container.patches.len(),
            SceneElement::Line(_) | SceneElement::BoxGroup(_) => 1,
            SceneElement::Points(points) => points.offsets.len(),
            SceneElement::ColorMesh(mesh) => mesh.values.iter().map(Vec::len).sum(),
            SceneElement::Candles(candles) => candles.candles.len(),
        }
    }
}
