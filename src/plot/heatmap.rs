use crate::api::CaptureConfig;
use crate::core::{PlotType, sample};
use crate::extract::level::{LevelKey, extract_level, format_number};
use crate::extract::mappable::extract_scalar_mappable;
use crate::extract::{degrade, extract_format, format_config};
use crate::scene::{AxisScene, ElementPath};

use super::{AxisLabels, ElementLedger, HeatGrid, PlotData, PlotDataModel, PlotRecord, axis_labels};

#[derive(Debug, Clone)]
pub struct HeatmapPlot {
    axis: AxisScene,
    labels: AxisLabels,
    default_fill: String,
}

impl HeatmapPlot {
    #[must_use]
    pub fn new(axis: AxisScene, config: &CaptureConfig) -> Self {
        let labels = axis_labels(&axis, config);
        Self {
            axis,
            labels,
            default_fill: config.default_fill_label.clone(),
        }
    }
}

/// Tick labels when they cover every row or column, index labels otherwise.
fn levels(axis: &AxisScene, key: LevelKey, count: usize) -> Vec<String> {
    let ticks = extract_level(axis, key);
    if ticks.len() == count {
        ticks
    } else {
        (0..count).map(|index| format_number(index as f64)).collect()
    }
}

impl PlotDataModel for HeatmapPlot {
    fn plot_type(&self) -> PlotType {
        PlotType::Heat
    }

    fn extract(&self) -> PlotRecord {
        let mut ledger = ElementLedger::new(self.axis.id, PlotType::Heat);
        let mut labels = self.labels.clone();
        let mut format = extract_format(&self.axis);

        let mesh = degrade(
            extract_scalar_mappable(&self.axis, PlotType::Heat).map(Some),
            PlotType::Heat,
            "data",
        );
        let grid = match mesh {
            Some((element, mesh)) => {
                let columns = mesh.columns();
                let points: Vec<Vec<Option<f64>>> = mesh
                    .values
                    .iter()
                    .map(|row| row.iter().copied().map(sample).collect())
                    .collect();
                for cell in 0..mesh.values.len() * columns {
                    ledger.push(ElementPath::part(element, cell));
                }
                labels.fill = Some(
                    mesh.colorbar_label
                        .clone()
                        .filter(|label| !label.trim().is_empty())
                        .unwrap_or_else(|| self.default_fill.clone()),
                );
                format.fill = mesh.colorbar_formatter.as_ref().and_then(format_config);
                HeatGrid {
                    x: levels(&self.axis, LevelKey::X, columns),
                    y: levels(&self.axis, LevelKey::Y, points.len()),
                    points,
                }
            }
            None => {
                labels.fill = Some(self.default_fill.clone());
                HeatGrid::default()
            }
        };

        ledger.into_record(&self.axis, None, PlotData::Heat(grid), labels, format)
    }
}

pub(crate) fn construct(
    _plot_type: PlotType,
    axis: AxisScene,
    config: &CaptureConfig,
) -> Box<dyn PlotDataModel> {
    Box::new(HeatmapPlot::new(axis, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AxisId, FigureId};
    use crate::scene::{ColorMesh, SceneElement, TickLabel};

    #[test]
    fn cells_are_tagged_row_major_and_nan_is_null() {
        let mut axis = AxisScene::new(AxisId::from_raw(5), FigureId::from_raw(1)).with_element(
            SceneElement::ColorMesh(ColorMesh::new(vec![vec![1.0, f64::NAN], vec![3.0, 4.0]])),
        );
        axis.x_ticks = vec![TickLabel::new(0.5, "a"), TickLabel::new(1.5, "b")];

        let record = HeatmapPlot::new(axis, &CaptureConfig::default()).extract();
        let PlotData::Heat(grid) = &record.data else {
            panic!("heat payload expected");
        };
        assert_eq!(grid.points[0], vec![Some(1.0), None]);
        assert_eq!(grid.x, vec!["a", "b"]);
        assert_eq!(grid.y, vec!["0", "1"]);
        assert_eq!(record.element_ids.len(), 4);
        assert_eq!(record.element_paths[3], ElementPath::part(0, 3));
        assert_eq!(record.labels.fill.as_deref(), Some("Fill"));
    }
}
