use ordered_float::OrderedFloat;

use crate::api::CaptureConfig;
use crate::core::{PlotType, sample};
use crate::extract::collection::extract_collection;
use crate::extract::{degrade, extract_format};
use crate::scene::{AxisScene, ElementPath};

use super::{AxisLabels, ElementLedger, PlotData, PlotDataModel, PlotRecord, ScatterPoint, axis_labels};

#[derive(Debug, Clone)]
pub struct ScatterPlot {
    axis: AxisScene,
    labels: AxisLabels,
}

impl ScatterPlot {
    #[must_use]
    pub fn new(axis: AxisScene, config: &CaptureConfig) -> Self {
        let labels = axis_labels(&axis, config);
        Self { axis, labels }
    }
}

impl PlotDataModel for ScatterPlot {
    fn plot_type(&self) -> PlotType {
        PlotType::Scatter
    }

    fn extract(&self) -> PlotRecord {
        let collection = degrade(
            extract_collection(&self.axis, PlotType::Scatter).map(Some),
            PlotType::Scatter,
            "data",
        );

        let mut ledger = ElementLedger::new(self.axis.id, PlotType::Scatter);
        let mut points = Vec::new();
        if let Some((element, collection)) = collection {
            let mut offsets: Vec<_> = collection.offsets.iter().enumerate().collect();
            offsets.sort_by_key(|(_, (x, _))| OrderedFloat(*x));
            for (part, (x, y)) in offsets {
                points.push(ScatterPoint {
                    x: sample(*x),
                    y: sample(*y),
                });
                ledger.push(ElementPath::part(element, part));
            }
        }

        ledger.into_record(
            &self.axis,
            None,
            PlotData::Scatter(points),
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
    Box::new(ScatterPlot::new(axis, config))
}
