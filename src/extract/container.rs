use crate::core::PlotType;
use crate::error::{CaptureError, CaptureResult};
use crate::scene::{AxisScene, BarContainer, BoxArtists, CandleCollection, SceneElement};

/// All bar containers in native order, with their element index.
pub fn bar_containers(axis: &AxisScene) -> Vec<(usize, &BarContainer)> {
    axis.elements_of(|element| match element {
        SceneElement::Bars(container) => Some(container),
        _ => None,
    })
    .collect()
}

pub fn first_bar_container(
    axis: &AxisScene,
    plot_type: PlotType,
) -> CaptureResult<(usize, &BarContainer)> {
    bar_containers(axis)
        .into_iter()
        .next()
        .ok_or_else(|| CaptureError::extraction(plot_type, "data", "axis holds no bar container"))
}

/// Box groups in native order. At least one group is required.
pub fn box_groups(
    axis: &AxisScene,
    plot_type: PlotType,
) -> CaptureResult<Vec<(usize, &BoxArtists)>> {
    let groups: Vec<_> = axis
        .elements_of(|element| match element {
            SceneElement::BoxGroup(group) => Some(group),
            _ => None,
        })
        .collect();
    if groups.is_empty() {
        return Err(CaptureError::extraction(
            plot_type,
            "data",
            "axis holds no box groups",
        ));
    }
    Ok(groups)
}

pub fn candle_collection(
    axis: &AxisScene,
    plot_type: PlotType,
) -> CaptureResult<(usize, &CandleCollection)> {
    axis.elements_of(|element| match element {
        SceneElement::Candles(candles) => Some(candles),
        _ => None,
    })
    .next()
    .ok_or_else(|| CaptureError::extraction(plot_type, "data", "axis holds no candle collection"))
}
