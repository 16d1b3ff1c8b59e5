use ordered_float::OrderedFloat;

use crate::core::Orientation;
use crate::scene::{AxisScene, TickLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKey {
    X,
    Y,
}

/// Tick labels of an axis, ordered by tick position.
pub fn extract_level(axis: &AxisScene, key: LevelKey) -> Vec<String> {
    match key {
        LevelKey::X => sorted_ticks(&axis.x_ticks)
            .into_iter()
            .map(|tick| tick.text.clone())
            .collect(),
        LevelKey::Y => sorted_ticks(&axis.y_ticks)
            .into_iter()
            .map(|tick| tick.text.clone())
            .collect(),
    }
}

/// Ticks along the category axis for bar-like elements of `orientation`.
pub fn category_ticks(axis: &AxisScene, orientation: Orientation) -> Vec<&TickLabel> {
    match orientation {
        Orientation::Vertical => sorted_ticks(&axis.x_ticks),
        Orientation::Horizontal => sorted_ticks(&axis.y_ticks),
    }
}

pub fn sorted_ticks(ticks: &[TickLabel]) -> Vec<&TickLabel> {
    let mut sorted: Vec<&TickLabel> = ticks.iter().collect();
    sorted.sort_by_key(|tick| OrderedFloat(tick.position));
    sorted
}

/// Resolves the category label of an element centred at `position`.
///
/// The nearest tick within `tolerance` wins; otherwise the tick at the same
/// rank is used; otherwise the formatted position.
pub fn category_at(ticks: &[&TickLabel], position: f64, tolerance: f64, rank: usize) -> String {
    let nearest = ticks
        .iter()
        .filter(|tick| (tick.position - position).abs() <= tolerance)
        .min_by_key(|tick| OrderedFloat((tick.position - position).abs()));
    if let Some(tick) = nearest {
        return tick.text.clone();
    }
    if let Some(tick) = ticks.get(rank) {
        return tick.text.clone();
    }
    format_number(position)
}

/// Compact decimal rendering used for fallback labels.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefers_tick_at_position() {
        let a = TickLabel::new(0.0, "a");
        let b = TickLabel::new(1.0, "b");
        let ticks = vec![&a, &b];
        assert_eq!(category_at(&ticks, 1.0, 0.4, 0), "b");
        assert_eq!(category_at(&ticks, 7.0, 0.4, 1), "b");
        assert_eq!(category_at(&ticks, 7.5, 0.4, 5), "7.5");
        assert_eq!(format_number(3.0), "3");
    }
}
