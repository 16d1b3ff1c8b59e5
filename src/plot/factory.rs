use std::fmt;

use indexmap::IndexMap;

use crate::api::CaptureConfig;
use crate::core::PlotType;
use crate::error::{CaptureError, CaptureResult};
use crate::scene::AxisScene;

use super::{
    PlotDataModel, bar, box_plot, candlestick, grouped_bar, heatmap, histogram, line, scatter,
    smooth,
};

pub type PlotConstructor =
    fn(PlotType, AxisScene, &CaptureConfig) -> Box<dyn PlotDataModel>;

/// Dispatch table from plot-type tag to data-model constructor.
#[derive(Clone, Default)]
pub struct PlotFactory {
    constructors: IndexMap<PlotType, PlotConstructor>,
}

impl fmt::Debug for PlotFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

impl PlotFactory {
    /// A factory with no registered plot types.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A factory covering every supported plot type.
    #[must_use]
    pub fn standard() -> Self {
        let mut factory = Self::empty();
        for plot_type in PlotType::ALL {
            let constructor: PlotConstructor = match plot_type {
                PlotType::Bar | PlotType::Count => bar::construct,
                PlotType::Box => box_plot::construct,
                PlotType::Dodged | PlotType::Stacked => grouped_bar::construct,
                PlotType::Heat => heatmap::construct,
                PlotType::Hist => histogram::construct,
                PlotType::Line => line::construct,
                PlotType::Scatter => scatter::construct,
                PlotType::Smooth => smooth::construct,
                PlotType::Candlestick => candlestick::construct,
            };
            factory.constructors.insert(plot_type, constructor);
        }
        factory
    }

    /// Registers or replaces the constructor for `plot_type`. Returns the
    /// previous constructor, if any.
    pub fn register(
        &mut self,
        plot_type: PlotType,
        constructor: PlotConstructor,
    ) -> Option<PlotConstructor> {
        self.constructors.insert(plot_type, constructor)
    }

    /// Removes a plot type. Returns `true` when it was registered.
    pub fn unregister(&mut self, plot_type: PlotType) -> bool {
        self.constructors.shift_remove(&plot_type).is_some()
    }

    pub fn create(
        &self,
        plot_type: PlotType,
        axis: AxisScene,
        config: &CaptureConfig,
    ) -> CaptureResult<Box<dyn PlotDataModel>> {
        let constructor = self
            .constructors
            .get(&plot_type)
            .ok_or_else(|| CaptureError::UnsupportedPlotType(plot_type.to_string()))?;
        Ok(constructor(plot_type, axis, config))
    }

    /// Like [`PlotFactory::create`], for a tag given as text.
    pub fn create_from_tag(
        &self,
        tag: &str,
        axis: AxisScene,
        config: &CaptureConfig,
    ) -> CaptureResult<Box<dyn PlotDataModel>> {
        self.create(tag.parse()?, axis, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AxisId, FigureId};

    fn axis() -> AxisScene {
        AxisScene::new(AxisId::from_raw(1), FigureId::from_raw(1))
    }

    #[test]
    fn standard_factory_builds_every_type() {
        let factory = PlotFactory::standard();
        let config = CaptureConfig::default();
        for plot_type in PlotType::ALL {
            let model = factory.create(plot_type, axis(), &config).expect("model");
            assert_eq!(model.plot_type(), plot_type);
        }
    }

    #[test]
    fn unregistered_and_unknown_tags_fail() {
        let mut factory = PlotFactory::standard();
        assert!(factory.unregister(PlotType::Heat));
        assert!(!factory.unregister(PlotType::Heat));
        let config = CaptureConfig::default();
        assert!(matches!(
            factory.create(PlotType::Heat, axis(), &config),
            Err(CaptureError::UnsupportedPlotType(_))
        ));
        assert!(matches!(
            factory.create_from_tag("VIOLIN", axis(), &config),
            Err(CaptureError::UnsupportedPlotType(_))
        ));
    }
}
