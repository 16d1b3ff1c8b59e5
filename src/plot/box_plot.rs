use ordered_float::OrderedFloat;

use crate::api::CaptureConfig;
use crate::core::{Orientation, PlotType, sample};
use crate::extract::container::box_groups;
use crate::extract::level::{category_at, category_ticks};
use crate::extract::{degrade, extract_format};
use crate::scene::{AxisScene, BoxArtists, ElementPath};

use super::{AxisLabels, BoxSummary, ElementLedger, PlotData, PlotDataModel, PlotRecord, axis_labels};

/// Box-and-whisker charts. Reads back the statistics the artists encode;
/// nothing is recomputed from raw samples.
#[derive(Debug, Clone)]
pub struct BoxPlot {
    axis: AxisScene,
    labels: AxisLabels,
}

impl BoxPlot {
    #[must_use]
    pub fn new(axis: AxisScene, config: &CaptureConfig) -> Self {
        let labels = axis_labels(&axis, config);
        Self { axis, labels }
    }

    fn summarize(group: &BoxArtists, fill: String) -> BoxSummary {
        let min = group.caps.0;
        let max = group.caps.1;
        let mut lower: Vec<f64> = group.fliers.iter().copied().filter(|v| *v < min).collect();
        let mut upper: Vec<f64> = group.fliers.iter().copied().filter(|v| *v > max).collect();
        lower.sort_by_key(|v| OrderedFloat(*v));
        upper.sort_by_key(|v| OrderedFloat(*v));

        BoxSummary {
            fill,
            lower_outliers: lower,
            min: sample(min),
            q1: sample(group.whisker_low.0),
            q2: sample(group.median),
            q3: sample(group.whisker_high.0),
            max: sample(max),
            upper_outliers: upper,
        }
    }
}

impl PlotDataModel for BoxPlot {
    fn plot_type(&self) -> PlotType {
        PlotType::Box
    }

    fn extract(&self) -> PlotRecord {
        let mut groups = degrade(box_groups(&self.axis, PlotType::Box), PlotType::Box, "data");
        groups.sort_by_key(|(_, group)| OrderedFloat(group.position));

        let orientation = groups
            .first()
            .map_or(Orientation::Vertical, |(_, group)| group.orientation);
        let ticks = category_ticks(&self.axis, orientation);

        let mut ledger = ElementLedger::new(self.axis.id, PlotType::Box);
        let mut boxes = Vec::with_capacity(groups.len());
        for (rank, (element, group)) in groups.into_iter().enumerate() {
            let fill = group
                .label
                .clone()
                .unwrap_or_else(|| category_at(&ticks, group.position, 0.5, rank));
            boxes.push(Self::summarize(group, fill));
            ledger.push(ElementPath::whole(element));
        }

        ledger.into_record(
            &self.axis,
            Some(orientation),
            PlotData::Box(boxes),
            self.labels.clone(),
            extract_format(&self.axis),
        )
    }
}

pub(crate) fn construct(
    _plot_type: PlotType,
    axis: AxisScene,
    config: &CaptureConfig,
) -> Box<dyn PlotDataModel> {
    Box::new(BoxPlot::new(axis, config))
}
