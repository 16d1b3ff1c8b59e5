use crate::core::PlotType;
use crate::error::{CaptureError, CaptureResult};
use crate::scene::{AxisScene, ColorMesh, SceneElement};

/// First color-mapped surface of an axis, validated for a rectangular shape.
pub fn extract_scalar_mappable(
    axis: &AxisScene,
    plot_type: PlotType,
) -> CaptureResult<(usize, &ColorMesh)> {
    let (index, mesh) = axis
        .elements_of(|element| match element {
            SceneElement::ColorMesh(mesh) => Some(mesh),
            _ => None,
        })
        .next()
        .ok_or_else(|| {
            CaptureError::extraction(plot_type, "data", "axis holds no color-mapped surface")
        })?;
    mesh.validate()
        .map_err(|err| CaptureError::extraction(plot_type, "data", err.to_string()))?;
    Ok((index, mesh))
}
