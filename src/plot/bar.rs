use ordered_float::OrderedFloat;

use crate::api::CaptureConfig;
use crate::core::{Orientation, PlotType, sample};
use crate::extract::container::{bar_containers, first_bar_container};
use crate::extract::level::{category_at, category_ticks};
use crate::extract::{degrade, extract_format};
use crate::scene::{AxisScene, BarPatch, ElementPath};

use super::{AxisLabels, BarPoint, ElementLedger, PlotData, PlotDataModel, PlotRecord, axis_labels};

/// Bar and count charts: every patch of every bar container on the axis,
/// flattened and ordered along the category axis.
#[derive(Debug, Clone)]
pub struct BarPlot {
    plot_type: PlotType,
    axis: AxisScene,
    labels: AxisLabels,
}

impl BarPlot {
    #[must_use]
    pub fn new(plot_type: PlotType, axis: AxisScene, config: &CaptureConfig) -> Self {
        let labels = axis_labels(&axis, config);
        Self {
            plot_type,
            axis,
            labels,
        }
    }

    fn patches(&self) -> (Orientation, Vec<(ElementPath, BarPatch)>) {
        let orientation = degrade(
            first_bar_container(&self.axis, self.plot_type).map(|(_, c)| c.orientation),
            self.plot_type,
            "data",
        );
        let mut patches: Vec<(ElementPath, BarPatch)> = bar_containers(&self.axis)
            .into_iter()
            .flat_map(|(element, container)| {
                container
                    .patches
                    .iter()
                    .enumerate()
                    .map(move |(part, patch)| (ElementPath::part(element, part), *patch))
            })
            .collect();
        patches.sort_by_key(|(_, patch)| OrderedFloat(patch.center(orientation)));
        (orientation, patches)
    }
}

impl PlotDataModel for BarPlot {
    fn plot_type(&self) -> PlotType {
        self.plot_type
    }

    fn extract(&self) -> PlotRecord {
        let (orientation, patches) = self.patches();
        let ticks = category_ticks(&self.axis, orientation);

        let mut ledger = ElementLedger::new(self.axis.id, self.plot_type);
        let mut points = Vec::with_capacity(patches.len());
        for (rank, (path, patch)) in patches.into_iter().enumerate() {
            points.push(BarPoint {
                category: category_at(
                    &ticks,
                    patch.center(orientation),
                    patch.half_thickness(orientation),
                    rank,
                ),
                value: sample(patch.value(orientation)),
            });
            ledger.push(path);
        }

        ledger.into_record(
            &self.axis,
            Some(orientation),
            PlotData::Bar(points),
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
    Box::new(BarPlot::new(plot_type, axis, config))
}
