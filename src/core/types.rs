use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

static NEXT_FIGURE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_AXIS_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying one rendered canvas.
///
/// Handles come from a process-wide monotonic counter and are never reused,
/// so an evicted figure cannot be confused with a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FigureId(u64);

impl FigureId {
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_FIGURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fig-{}", self.0)
    }
}

/// Opaque handle identifying one rendered axis (panel) inside a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisId(u64);

impl AxisId {
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_AXIS_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ax-{}", self.0)
    }
}

/// Stable tag correlating one data point with one rendered primitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Builds the id for the `index`-th element of one record.
    ///
    /// Ids are derived from the axis, the plot type and the element's rank in
    /// rendering order, so re-capturing an unchanged axis yields the same ids.
    #[must_use]
    pub fn for_element(axis: AxisId, plot_type: PlotType, index: usize) -> Self {
        Self(format!(
            "{axis}-{}-{index}",
            plot_type.as_str().to_ascii_lowercase()
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of chart kinds a plot record can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlotType {
    Bar,
    Box,
    Count,
    Dodged,
    Heat,
    Hist,
    Line,
    Scatter,
    Stacked,
    Smooth,
    Candlestick,
}

impl PlotType {
    pub const ALL: [PlotType; 11] = [
        PlotType::Bar,
        PlotType::Box,
        PlotType::Count,
        PlotType::Dodged,
        PlotType::Heat,
        PlotType::Hist,
        PlotType::Line,
        PlotType::Scatter,
        PlotType::Stacked,
        PlotType::Smooth,
        PlotType::Candlestick,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PlotType::Bar => "BAR",
            PlotType::Box => "BOX",
            PlotType::Count => "COUNT",
            PlotType::Dodged => "DODGED",
            PlotType::Heat => "HEAT",
            PlotType::Hist => "HIST",
            PlotType::Line => "LINE",
            PlotType::Scatter => "SCATTER",
            PlotType::Stacked => "STACKED",
            PlotType::Smooth => "SMOOTH",
            PlotType::Candlestick => "CANDLESTICK",
        }
    }

    /// Version of the payload schema the renderer should expect for this type.
    #[must_use]
    pub const fn schema_version(self) -> u32 {
        1
    }

    /// Priority used when two bar-family captures target the same axis.
    ///
    /// Grouped layouts outrank the plain bar capture issued by their first
    /// underlying bar call.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            PlotType::Dodged | PlotType::Stacked => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub const fn is_bar_family(self) -> bool {
        matches!(
            self,
            PlotType::Bar | PlotType::Count | PlotType::Dodged | PlotType::Stacked
        )
    }
}

impl fmt::Display for PlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotType {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlotType::ALL
            .into_iter()
            .find(|plot_type| plot_type.as_str() == s)
            .ok_or_else(|| CaptureError::UnsupportedPlotType(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Zero-based subplot cell occupied by an axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

impl GridPosition {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Converts a native sample into the payload representation.
///
/// NaN becomes the explicit absent marker; every other value passes through
/// bit-for-bit.
#[must_use]
pub fn sample(value: f64) -> Option<f64> {
    if value.is_nan() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_type_tags_round_trip_through_strings() {
        for plot_type in PlotType::ALL {
            let parsed: PlotType = plot_type.as_str().parse().expect("known tag");
            assert_eq!(parsed, plot_type);
            let json = serde_json::to_string(&plot_type).expect("serialize");
            assert_eq!(json, format!("\"{}\"", plot_type.as_str()));
        }
        assert!("VIOLIN".parse::<PlotType>().is_err());
    }

    #[test]
    fn sample_keeps_values_and_marks_nan_absent() {
        assert_eq!(sample(0.1 + 0.2), Some(0.1 + 0.2));
        assert_eq!(sample(f64::NAN), None);
        assert_eq!(sample(f64::INFINITY), Some(f64::INFINITY));
    }

    #[test]
    fn figure_ids_are_never_reused() {
        let first = FigureId::next();
        let second = FigureId::next();
        assert!(second > first);
    }
}
