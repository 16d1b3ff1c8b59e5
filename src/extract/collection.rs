use crate::core::PlotType;
use crate::error::{CaptureError, CaptureResult};
use crate::scene::{AxisScene, PointCollection, SceneElement};

/// First point collection of an axis.
///
/// Only one collection per axis is read; overlaid scatter layers are
/// expected on separate axes.
pub fn extract_collection(
    axis: &AxisScene,
    plot_type: PlotType,
) -> CaptureResult<(usize, &PointCollection)> {
    axis.elements_of(|element| match element {
        SceneElement::Points(points) => Some(points),
        _ => None,
    })
    .next()
    .ok_or_else(|| CaptureError::extraction(plot_type, "data", "axis holds no point collection"))
}
