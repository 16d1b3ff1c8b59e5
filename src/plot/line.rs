use crate::api::CaptureConfig;
use crate::core::{PlotType, sample};
use crate::extract::line::{is_smooth_label, require_lines};
use crate::extract::{degrade, extract_format};
use crate::scene::{AxisScene, ElementPath};

use super::{AxisLabels, ElementLedger, LinePoint, PlotData, PlotDataModel, PlotRecord, axis_labels};

/// Line and multiline charts.
///
/// Lines labeled as smoothing curves belong to the smooth model and are
/// skipped, unless they are the only lines on the axis.
#[derive(Debug, Clone)]
pub struct LinePlot {
    axis: AxisScene,
    labels: AxisLabels,
    smooth_keywords: Vec<String>,
}

impl LinePlot {
    #[must_use]
    pub fn new(axis: AxisScene, config: &CaptureConfig) -> Self {
        let mut labels = axis_labels(&axis, config);
        labels.fill = axis.legend_title.clone();
        Self {
            axis,
            labels,
            smooth_keywords: config.smooth_keywords.clone(),
        }
    }
}

impl PlotDataModel for LinePlot {
    fn plot_type(&self) -> PlotType {
        PlotType::Line
    }

    fn extract(&self) -> PlotRecord {
        let all = degrade(require_lines(&self.axis, PlotType::Line), PlotType::Line, "data");
        let plain: Vec<_> = all
            .iter()
            .copied()
            .filter(|(_, line)| !is_smooth_label(line.legend_label(), &self.smooth_keywords))
            .collect();
        let lines = if plain.is_empty() { all } else { plain };

        let mut ledger = ElementLedger::new(self.axis.id, PlotType::Line);
        let mut series = Vec::with_capacity(lines.len());
        for (element, line) in lines {
            let fill = line.legend_label().map(str::to_owned);
            series.push(
                line.points
                    .iter()
                    .map(|(x, y)| LinePoint {
                        x: sample(*x),
                        y: sample(*y),
                        fill: fill.clone(),
                    })
                    .collect(),
            );
            ledger.push(ElementPath::whole(element));
        }

        ledger.into_record(
            &self.axis,
            None,
            PlotData::Line(series),
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
    Box::new(LinePlot::new(axis, config))
}
