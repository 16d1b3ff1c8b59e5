use crate::api::{CaptureConfig, DENSITY_KEYWORDS};
use crate::core::{PlotType, sample};
use crate::extract::line::{extract_line, is_smooth_label, require_lines};
use crate::extract::{degrade, extract_format};
use crate::scene::{AxisScene, ElementPath, Line2D};

use super::{AxisLabels, ElementLedger, PlotData, PlotDataModel, PlotRecord, SmoothPoint, axis_labels};

/// Regression and smoothing curves.
///
/// Every line whose label carries a smoothing keyword is a series. Without
/// any such label the most recently drawn line stands in, since statistical
/// layers often draw the fitted curve unlabeled and last.
#[derive(Debug, Clone)]
pub struct SmoothPlot {
    axis: AxisScene,
    labels: AxisLabels,
    smooth_keywords: Vec<String>,
}

impl SmoothPlot {
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

    fn series(line: &Line2D) -> Vec<SmoothPoint> {
        let density = line.legend_label().is_some_and(|label| {
            let label = label.to_lowercase();
            DENSITY_KEYWORDS.iter().any(|keyword| label.contains(keyword))
        });
        line.points
            .iter()
            .map(|(x, y)| SmoothPoint {
                x: sample(*x),
                y: sample(*y),
                density: if density { sample(*y) } else { None },
            })
            .collect()
    }
}

impl PlotDataModel for SmoothPlot {
    fn plot_type(&self) -> PlotType {
        PlotType::Smooth
    }

    fn extract(&self) -> PlotRecord {
        let all = degrade(
            require_lines(&self.axis, PlotType::Smooth),
            PlotType::Smooth,
            "data",
        );
        let mut lines: Vec<_> = all
            .into_iter()
            .filter(|(_, line)| is_smooth_label(line.legend_label(), &self.smooth_keywords))
            .collect();
        if lines.is_empty() {
            lines.extend(extract_line(&self.axis));
        }

        let mut ledger = ElementLedger::new(self.axis.id, PlotType::Smooth);
        let mut series = Vec::with_capacity(lines.len());
        for (element, line) in lines {
            series.push(Self::series(line));
            ledger.push(ElementPath::whole(element));
        }

        ledger.into_record(
            &self.axis,
            None,
            PlotData::Smooth(series),
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
    Box::new(SmoothPlot::new(axis, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AxisId, FigureId};
    use crate::scene::SceneElement;

    fn axis(lines: Vec<Line2D>) -> AxisScene {
        lines.into_iter().fold(
            AxisScene::new(AxisId::from_raw(6), FigureId::from_raw(1)),
            |axis, line| axis.with_element(SceneElement::Line(line)),
        )
    }

    #[test]
    fn keyword_lines_become_series_and_kde_carries_density() {
        let record = SmoothPlot::new(
            axis(vec![
                Line2D::new(vec![(0.0, 0.2)]).with_label("Gaussian KDE"),
                Line2D::new(vec![(0.0, 9.0)]).with_label("raw"),
                Line2D::new(vec![(0.0, 1.0)]).with_label("linear fit"),
            ]),
            &CaptureConfig::default(),
        )
        .extract();
        let PlotData::Smooth(series) = &record.data else {
            panic!("smooth payload expected");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(series[0][0].density, Some(0.2));
        assert_eq!(series[1][0].density, None);
        assert_eq!(
            record.element_paths,
            vec![ElementPath::whole(0), ElementPath::whole(2)]
        );
    }

    #[test]
    fn last_line_stands_in_without_keywords() {
        let record = SmoothPlot::new(
            axis(vec![
                Line2D::new(vec![(0.0, 1.0)]),
                Line2D::new(vec![(0.0, 2.0)]),
            ]),
            &CaptureConfig::default(),
        )
        .extract();
        assert_eq!(record.element_paths, vec![ElementPath::whole(1)]);
    }
}
