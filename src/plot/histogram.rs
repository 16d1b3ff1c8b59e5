use ordered_float::OrderedFloat;

use crate::api::CaptureConfig;
use crate::core::{PlotType, sample};
use crate::extract::container::first_bar_container;
use crate::extract::{degrade, extract_format};
use crate::scene::{AxisScene, ElementPath};

use super::{AxisLabels, ElementLedger, HistBin, PlotData, PlotDataModel, PlotRecord, axis_labels};

/// Histograms read the bins of the first bar container on the axis.
#[derive(Debug, Clone)]
pub struct HistogramPlot {
    axis: AxisScene,
    labels: AxisLabels,
}

impl HistogramPlot {
    #[must_use]
    pub fn new(axis: AxisScene, config: &CaptureConfig) -> Self {
        let labels = axis_labels(&axis, config);
        Self { axis, labels }
    }
}

impl PlotDataModel for HistogramPlot {
    fn plot_type(&self) -> PlotType {
        PlotType::Hist
    }

    fn extract(&self) -> PlotRecord {
        let container = degrade(
            first_bar_container(&self.axis, PlotType::Hist).map(Some),
            PlotType::Hist,
            "data",
        );

        let mut ledger = ElementLedger::new(self.axis.id, PlotType::Hist);
        let mut bins = Vec::new();
        if let Some((element, container)) = container {
            let mut patches: Vec<_> = container.patches.iter().enumerate().collect();
            patches.sort_by_key(|(_, patch)| OrderedFloat(patch.x));
            for (part, patch) in patches {
                bins.push(HistBin {
                    x: sample(patch.x + patch.width / 2.0),
                    y: sample(patch.height),
                    x_min: sample(patch.x),
                    x_max: sample(patch.x + patch.width),
                    y_min: sample(patch.y),
                    y_max: sample(patch.y + patch.height),
                });
                ledger.push(ElementPath::part(element, part));
            }
        }

        ledger.into_record(
            &self.axis,
            None,
            PlotData::Hist(bins),
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
    Box::new(HistogramPlot::new(axis, config))
}
