use ordered_float::OrderedFloat;

use crate::api::CaptureConfig;
use crate::core::{Orientation, PlotType, sample};
use crate::extract::container::{bar_containers, first_bar_container};
use crate::extract::level::{category_at, category_ticks};
use crate::extract::{degrade, extract_format};
use crate::scene::{AxisScene, ElementPath};

use super::{
    AxisLabels, ElementLedger, GroupedBarPoint, PlotData, PlotDataModel, PlotRecord, axis_labels,
};

/// Dodged and stacked bars: one series per bar container, each series
/// ordered along the category axis.
#[derive(Debug, Clone)]
pub struct GroupedBarPlot {
    plot_type: PlotType,
    axis: AxisScene,
    labels: AxisLabels,
    default_fill: String,
}

impl GroupedBarPlot {
    #[must_use]
    pub fn new(plot_type: PlotType, axis: AxisScene, config: &CaptureConfig) -> Self {
        let mut labels = axis_labels(&axis, config);
        labels.fill = Some(
            axis.legend_title
                .clone()
                .unwrap_or_else(|| config.default_fill_label.clone()),
        );
        Self {
            plot_type,
            axis,
            labels,
            default_fill: config.default_fill_label.clone(),
        }
    }
}

impl PlotDataModel for GroupedBarPlot {
    fn plot_type(&self) -> PlotType {
        self.plot_type
    }

    fn extract(&self) -> PlotRecord {
        let orientation: Orientation = degrade(
            first_bar_container(&self.axis, self.plot_type).map(|(_, c)| c.orientation),
            self.plot_type,
            "data",
        );
        let ticks = category_ticks(&self.axis, orientation);

        let mut ledger = ElementLedger::new(self.axis.id, self.plot_type);
        let mut series = Vec::new();
        for (element, container) in bar_containers(&self.axis) {
            let fill = container
                .label
                .clone()
                .unwrap_or_else(|| self.default_fill.clone());
            let mut patches: Vec<_> = container.patches.iter().enumerate().collect();
            patches.sort_by_key(|(_, patch)| OrderedFloat(patch.center(orientation)));

            let mut points = Vec::with_capacity(patches.len());
            for (rank, (part, patch)) in patches.into_iter().enumerate() {
                points.push(GroupedBarPoint {
                    x: category_at(
                        &ticks,
                        patch.center(orientation),
                        patch.half_thickness(orientation),
                        rank,
                    ),
                    fill: fill.clone(),
                    y: sample(patch.value(orientation)),
                });
                ledger.push(ElementPath::part(element, part));
            }
            series.push(points);
        }

        ledger.into_record(
            &self.axis,
            Some(orientation),
            PlotData::Grouped(series),
            self.labels.clone(),
            extract_format(&self.axis),
        )
    }
}

pub(crate) fn construct(
    plot_type: PlotType,
    axis: AxisScene,
    config: &CaptureConfig,
) -> Box<dyn PlotDataModel> {
    Box::new(GroupedBarPlot::new(plot_type, axis, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AxisId, FigureId};
    use crate::scene::{BarContainer, BarPatch, SceneElement, TickLabel};

    #[test]
    fn dodged_bars_keep_one_series_per_container() {
        let mut axis = AxisScene::new(AxisId::from_raw(3), FigureId::from_raw(1))
            .with_element(SceneElement::Bars(
                BarContainer::new(
                    Orientation::Vertical,
                    vec![
                        BarPatch::new(-0.4, 0.0, 0.4, 1.0),
                        BarPatch::new(0.6, 0.0, 0.4, 2.0),
                    ],
                )
                .with_label("men"),
            ))
            .with_element(SceneElement::Bars(
                BarContainer::new(
                    Orientation::Vertical,
                    vec![
                        BarPatch::new(0.0, 0.0, 0.4, 3.0),
                        BarPatch::new(1.0, 0.0, 0.4, 4.0),
                    ],
                )
                .with_label("women"),
            ));
        axis.x_ticks = vec![TickLabel::new(0.0, "G1"), TickLabel::new(1.0, "G2")];

        let record =
            GroupedBarPlot::new(PlotType::Dodged, axis, &CaptureConfig::default()).extract();
        let PlotData::Grouped(series) = &record.data else {
            panic!("grouped payload expected");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(series[0][0].fill, "men");
        assert_eq!(series[1][1].x, "G2");
        assert_eq!(series[1][1].y, Some(4.0));
        assert_eq!(record.element_ids.len(), 4);
        assert_eq!(record.labels.fill.as_deref(), Some("Fill"));
    }
}
