//! Closed, tagged representation of a rendered chart.
//!
//! Host adapters translate their native scene objects into these variants so
//! extractors can pattern-match instead of probing opaque objects.

mod axis;
mod elements;

pub use axis::{AxisScene, ElementPath, ElementTag};
pub use elements::{
    AxisFormatter, BarContainer, BarPatch, BoxArtists, CandleCollection, CandleGlyph, ColorMesh,
    Line2D, PointCollection, SceneElement, TickLabel,
};
