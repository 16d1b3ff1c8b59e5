use crate::core::PlotType;
use crate::error::{CaptureError, CaptureResult};
use crate::scene::{AxisScene, Line2D, SceneElement};

/// All lines of an axis in native draw order.
pub fn extract_lines(axis: &AxisScene) -> Vec<(usize, &Line2D)> {
    axis.elements_of(|element| match element {
        SceneElement::Line(line) => Some(line),
        _ => None,
    })
    .collect()
}

/// Like [`extract_lines`], but an axis without lines is an extraction failure.
pub fn require_lines(
    axis: &AxisScene,
    plot_type: PlotType,
) -> CaptureResult<Vec<(usize, &Line2D)>> {
    let lines = extract_lines(axis);
    if lines.is_empty() {
        return Err(CaptureError::extraction(
            plot_type,
            "data",
            "axis holds no lines",
        ));
    }
    Ok(lines)
}

/// The most recently drawn line, if any.
pub fn extract_line(axis: &AxisScene) -> Option<(usize, &Line2D)> {
    extract_lines(axis).into_iter().last()
}

/// Whether a line label names a smoothing/regression curve.
pub fn is_smooth_label(label: Option<&str>, keywords: &[String]) -> bool {
    let Some(label) = label else {
        return false;
    };
    let label = label.to_lowercase();
    keywords
        .iter()
        .any(|keyword| label.contains(&keyword.to_lowercase()))
}
