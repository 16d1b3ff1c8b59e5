//! In-memory plotting surface.
//!
//! `HeadlessHost` keeps figures and axes as [`AxisScene`] values and routes
//! every drawing method through an [`Interceptor`]. Statistical-layer methods
//! are built from the base methods, the same way a statistical library draws
//! through its base plotting library.

use std::collections::HashMap;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use tracing::debug;

use crate::api::{CallSite, CallTarget, CaptureConfig, CaptureLayer, FigureRegistry, Interceptor};
use crate::core::{
    AxisId, BoxStats, FigureId, GridPosition, KDE_GRID_POINTS, Orientation, PlotType,
    date_number_label, gaussian_kde,
};
use crate::error::{CaptureError, CaptureResult};
use crate::extract::level::format_number;
use crate::plot::PlotFactory;
use crate::scene::{
    AxisFormatter, AxisScene, BarContainer, BarPatch, BoxArtists, CandleCollection, CandleGlyph,
    ColorMesh, ElementTag, Line2D, PointCollection, SceneElement, TickLabel,
};

use super::{LocatesAxis, PlottingObservable};

/// Call target names declared by the headless host.
pub mod targets {
    pub const BAR: &str = "Axes.bar";
    pub const BARH: &str = "Axes.barh";
    pub const STACKED_BAR: &str = "Axes.stacked_bar";
    pub const PLOT: &str = "Axes.plot";
    pub const SCATTER: &str = "Axes.scatter";
    pub const HIST: &str = "Axes.hist";
    pub const BXP: &str = "Axes.bxp";
    pub const BOXPLOT: &str = "Axes.boxplot";
    pub const PCOLORMESH: &str = "Axes.pcolormesh";
    pub const CANDLESTICK: &str = "mplfinance.plot";
    pub const STAT_BARPLOT: &str = "seaborn.barplot";
    pub const STAT_COUNTPLOT: &str = "seaborn.countplot";
    pub const STAT_BOXPLOT: &str = "seaborn.boxplot";
    pub const STAT_LINEPLOT: &str = "seaborn.lineplot";
    pub const STAT_REGPLOT: &str = "seaborn.regplot";
    pub const STAT_HEATMAP: &str = "seaborn.heatmap";
    pub const STAT_VIOLINPLOT: &str = "seaborn.violinplot";
    pub const STAT_KDEPLOT: &str = "seaborn.kdeplot";
}

/// Every call target the headless host draws through.
#[must_use]
pub fn standard_targets() -> Vec<CallTarget> {
    vec![
        CallTarget::base(targets::BAR, PlotType::Bar),
        CallTarget::base(targets::BARH, PlotType::Bar),
        CallTarget::base(targets::STACKED_BAR, PlotType::Stacked),
        CallTarget::base(targets::PLOT, PlotType::Line),
        CallTarget::base(targets::SCATTER, PlotType::Scatter),
        CallTarget::base(targets::HIST, PlotType::Hist),
        CallTarget::base(targets::BXP, PlotType::Box),
        CallTarget::base(targets::BOXPLOT, PlotType::Box),
        CallTarget::base(targets::PCOLORMESH, PlotType::Heat),
        CallTarget::base(targets::CANDLESTICK, PlotType::Candlestick),
        CallTarget::statistical(targets::STAT_BARPLOT, PlotType::Bar),
        CallTarget::statistical(targets::STAT_COUNTPLOT, PlotType::Count),
        CallTarget::statistical(targets::STAT_BOXPLOT, PlotType::Box),
        CallTarget::statistical(targets::STAT_LINEPLOT, PlotType::Line),
        CallTarget::statistical(targets::STAT_REGPLOT, PlotType::Smooth),
        CallTarget::statistical(targets::STAT_HEATMAP, PlotType::Heat),
        CallTarget::statistical(targets::STAT_VIOLINPLOT, PlotType::Smooth),
        CallTarget::statistical(targets::STAT_KDEPLOT, PlotType::Smooth),
    ]
}

/// Result of a drawing call: the element it added to an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotHandle {
    pub axis: AxisId,
    pub element: usize,
}

impl LocatesAxis for PlotHandle {
    fn locate_axis(&self) -> Option<AxisId> {
        Some(self.axis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureHandle {
    pub figure: FigureId,
    /// Axes in row-major grid order.
    pub axes: Vec<AxisId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSide {
    X,
    Y,
}

/// Layout knobs of one bar call.
#[derive(Debug, Clone, PartialEq)]
pub struct BarOptions {
    pub width: f64,
    /// Shift of every bar from its category position.
    pub offset: f64,
    /// Baseline per bar; zero when empty.
    pub bottom: Vec<f64>,
    pub label: Option<String>,
}

impl Default for BarOptions {
    fn default() -> Self {
        Self {
            width: 0.8,
            offset: 0.0,
            bottom: Vec::new(),
            label: None,
        }
    }
}

/// One OHLC input row of a candlestick call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub x: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

/// Extra panels of a financial chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinanceOptions {
    /// Axis that receives one volume bar per candle.
    pub volume_axis: Option<AxisId>,
    /// Moving-average windows over close prices, in candles.
    pub moving_averages: Vec<usize>,
}

#[derive(Debug)]
struct FigureState {
    title: Option<String>,
    shared_x_label: Option<String>,
    axes: Vec<AxisId>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    figures: HashMap<FigureId, FigureState>,
    axes: HashMap<AxisId, AxisScene>,
}

#[derive(Debug)]
pub struct HeadlessHost {
    interceptor: Arc<Interceptor>,
    state: RwLock<HeadlessState>,
}

impl HeadlessHost {
    /// Host drawing through `interceptor`. Targets the interceptor does not
    /// know yet are declared.
    pub fn new(interceptor: Arc<Interceptor>) -> CaptureResult<Self> {
        for target in standard_targets() {
            if !interceptor.is_declared(&target.name) {
                interceptor.declare(target)?;
            }
        }
        Ok(Self {
            interceptor,
            state: RwLock::new(HeadlessState::default()),
        })
    }

    /// Host with its own registry and the standard plot factory. Fails when
    /// `config` does not validate.
    pub fn standalone(config: CaptureConfig) -> CaptureResult<Self> {
        let interceptor = Interceptor::new(
            Arc::new(FigureRegistry::new()),
            PlotFactory::standard(),
            config,
        )?;
        Self::new(Arc::new(interceptor))
    }

    #[must_use]
    pub fn interceptor(&self) -> &Arc<Interceptor> {
        &self.interceptor
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<FigureRegistry> {
        self.interceptor.registry()
    }

    /// New figure with a `rows x cols` grid of axes.
    pub fn subplots(&self, rows: usize, cols: usize) -> CaptureResult<FigureHandle> {
        if rows == 0 || cols == 0 {
            return Err(CaptureError::InvalidData(format!(
                "subplot grid must be at least 1x1, got {rows}x{cols}"
            )));
        }
        let figure = FigureId::next();
        let mut state = self.state.write();
        let mut axes = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let axis = AxisId::next();
                state.axes.insert(
                    axis,
                    AxisScene::new(axis, figure).with_grid(GridPosition::new(row, col)),
                );
                axes.push(axis);
            }
        }
        state.figures.insert(
            figure,
            FigureState {
                title: None,
                shared_x_label: None,
                axes: axes.clone(),
            },
        );
        debug!(%figure, rows, cols, "created figure");
        Ok(FigureHandle { figure, axes })
    }

    /// New figure holding a single axis.
    pub fn figure(&self) -> CaptureResult<(FigureId, AxisId)> {
        let handle = self.subplots(1, 1)?;
        let axis = handle
            .axes
            .first()
            .copied()
            .ok_or_else(|| CaptureError::InvalidData("figure created without axes".to_owned()))?;
        Ok((handle.figure, axis))
    }

    /// Closes the figure and evicts its aggregate. Returns `true` when the
    /// host knew the figure.
    pub fn close(&self, figure: FigureId) -> bool {
        let known = {
            let mut state = self.state.write();
            match state.figures.remove(&figure) {
                Some(closed) => {
                    for axis in closed.axes {
                        state.axes.remove(&axis);
                    }
                    true
                }
                None => false,
            }
        };
        self.registry().evict(figure);
        known
    }

    pub fn set_title(&self, axis: AxisId, title: &str) -> CaptureResult<()> {
        self.with_axis_mut(axis, |scene| scene.title = title.to_owned())
    }

    pub fn set_xlabel(&self, axis: AxisId, label: &str) -> CaptureResult<()> {
        self.with_axis_mut(axis, |scene| scene.x_label = label.to_owned())
    }

    pub fn set_ylabel(&self, axis: AxisId, label: &str) -> CaptureResult<()> {
        self.with_axis_mut(axis, |scene| scene.y_label = label.to_owned())
    }

    /// Places `labels` on ticks at 0, 1, 2, ... along the x axis.
    pub fn set_xticklabels(&self, axis: AxisId, labels: &[&str]) -> CaptureResult<()> {
        self.with_axis_mut(axis, |scene| scene.x_ticks = index_ticks(labels, 0.0))
    }

    pub fn set_formatter(
        &self,
        axis: AxisId,
        side: AxisSide,
        formatter: AxisFormatter,
    ) -> CaptureResult<()> {
        self.with_axis_mut(axis, |scene| match side {
            AxisSide::X => scene.x_formatter = Some(formatter),
            AxisSide::Y => scene.y_formatter = Some(formatter),
        })
    }

    pub fn set_legend_title(&self, axis: AxisId, title: &str) -> CaptureResult<()> {
        self.with_axis_mut(axis, |scene| scene.legend_title = Some(title.to_owned()))
    }

    pub fn suptitle(&self, figure: FigureId, title: &str) -> CaptureResult<()> {
        self.with_figure_mut(figure, |state| state.title = Some(title.to_owned()))
    }

    /// Figure-wide x label, used by axes that have none of their own.
    pub fn supxlabel(&self, figure: FigureId, label: &str) -> CaptureResult<()> {
        self.with_figure_mut(figure, |state| state.shared_x_label = Some(label.to_owned()))
    }

    pub fn bar(&self, axis: AxisId, categories: &[&str], heights: &[f64]) -> CaptureResult<PlotHandle> {
        self.bar_with(axis, categories, heights, BarOptions::default())
    }

    pub fn bar_with(
        &self,
        axis: AxisId,
        categories: &[&str],
        heights: &[f64],
        options: BarOptions,
    ) -> CaptureResult<PlotHandle> {
        self.interceptor.call(self, CallSite::new(targets::BAR), || {
            self.draw_bars(axis, Orientation::Vertical, categories, heights, &options)
        })
    }

    pub fn barh(&self, axis: AxisId, categories: &[&str], widths: &[f64]) -> CaptureResult<PlotHandle> {
        let options = BarOptions::default();
        self.interceptor.call(self, CallSite::new(targets::BARH), || {
            self.draw_bars(axis, Orientation::Horizontal, categories, widths, &options)
        })
    }

    /// Stacks one bar layer per entry of `layers`, each on top of the
    /// previous ones.
    pub fn stacked_bar(
        &self,
        axis: AxisId,
        categories: &[&str],
        layers: &[(&str, Vec<f64>)],
    ) -> CaptureResult<PlotHandle> {
        self.interceptor
            .call(self, CallSite::new(targets::STACKED_BAR), || {
                let mut bottom = vec![0.0; categories.len()];
                let mut first = None;
                for (label, heights) in layers {
                    let options = BarOptions {
                        bottom: bottom.clone(),
                        label: Some((*label).to_owned()),
                        ..BarOptions::default()
                    };
                    let handle = self.bar_with(axis, categories, heights, options)?;
                    first.get_or_insert(handle);
                    for (base, height) in bottom.iter_mut().zip(heights) {
                        *base += height;
                    }
                }
                first.ok_or_else(|| {
                    CaptureError::InvalidData("stacked bar needs at least one layer".to_owned())
                })
            })
    }

    pub fn plot(
        &self,
        axis: AxisId,
        xs: &[f64],
        ys: &[f64],
        label: Option<&str>,
    ) -> CaptureResult<PlotHandle> {
        self.interceptor.call(self, CallSite::new(targets::PLOT), || {
            let points = zip_exact(xs, ys)?;
            let line = Line2D {
                label: label.map(str::to_owned),
                points,
            };
            self.push_element(axis, SceneElement::Line(line))
        })
    }

    pub fn scatter(&self, axis: AxisId, xs: &[f64], ys: &[f64]) -> CaptureResult<PlotHandle> {
        self.interceptor.call(self, CallSite::new(targets::SCATTER), || {
            let offsets = zip_exact(xs, ys)?;
            self.push_element(
                axis,
                SceneElement::Points(PointCollection {
                    label: None,
                    offsets,
                }),
            )
        })
    }

    /// Equal-width histogram over the finite range of `samples`.
    pub fn hist(&self, axis: AxisId, samples: &[f64], bins: usize) -> CaptureResult<PlotHandle> {
        self.interceptor.call(self, CallSite::new(targets::HIST), || {
            if bins == 0 {
                return Err(CaptureError::InvalidData(
                    "histogram needs at least one bin".to_owned(),
                ));
            }
            let patches = histogram_patches(samples, bins);
            self.push_element(
                axis,
                SceneElement::Bars(BarContainer::new(Orientation::Vertical, patches)),
            )
        })
    }

    /// Draws precomputed box statistics at positions 1, 2, 3, ...
    pub fn bxp(&self, axis: AxisId, stats: &[BoxStats], labels: &[&str]) -> CaptureResult<PlotHandle> {
        self.interceptor.call(self, CallSite::new(targets::BXP), || {
            let mut first = None;
            for (index, stat) in stats.iter().enumerate() {
                let group = BoxArtists {
                    position: (index + 1) as f64,
                    orientation: Orientation::Vertical,
                    whisker_low: (stat.q1, stat.whisker_low),
                    whisker_high: (stat.q3, stat.whisker_high),
                    caps: (stat.whisker_low, stat.whisker_high),
                    median: stat.median,
                    fliers: stat.fliers.clone(),
                    label: None,
                };
                let handle = self.push_element(axis, SceneElement::BoxGroup(group))?;
                first.get_or_insert(handle);
            }
            if !labels.is_empty() {
                self.with_axis_mut(axis, |scene| scene.x_ticks = index_ticks(labels, 1.0))?;
            }
            first.ok_or_else(|| CaptureError::InvalidData("bxp needs at least one box".to_owned()))
        })
    }

    /// Computes box statistics with the configured whisker factor and draws
    /// them through [`HeadlessHost::bxp`].
    pub fn boxplot(
        &self,
        axis: AxisId,
        datasets: &[Vec<f64>],
        labels: &[&str],
    ) -> CaptureResult<PlotHandle> {
        let whis = self.interceptor.config().box_whisker_factor;
        self.interceptor.call(self, CallSite::new(targets::BOXPLOT), || {
            let stats = datasets
                .iter()
                .map(|samples| {
                    BoxStats::from_samples(samples, whis).ok_or_else(|| {
                        CaptureError::InvalidData("box dataset has no samples".to_owned())
                    })
                })
                .collect::<CaptureResult<Vec<_>>>()?;
            self.bxp(axis, &stats, labels)
        })
    }

    pub fn pcolormesh(&self, axis: AxisId, values: Vec<Vec<f64>>) -> CaptureResult<PlotHandle> {
        self.interceptor.call(self, CallSite::new(targets::PCOLORMESH), || {
            let mesh = ColorMesh::new(values);
            mesh.validate()?;
            self.push_element(axis, SceneElement::ColorMesh(mesh))
        })
    }

    /// Draws OHLC candles. Bodies span open to close; wicks span low to high.
    pub fn candlestick(&self, axis: AxisId, candles: &[Candle]) -> CaptureResult<PlotHandle> {
        self.candlestick_with(axis, candles, &FinanceOptions::default())
    }

    /// Candles plus the optional volume panel and moving-average lines.
    ///
    /// Volume bars land on `options.volume_axis` and are captured there as a
    /// bar layer; moving averages are drawn on the price axis and captured as
    /// one line layer.
    pub fn candlestick_with(
        &self,
        axis: AxisId,
        candles: &[Candle],
        options: &FinanceOptions,
    ) -> CaptureResult<PlotHandle> {
        let mut layers = vec![CaptureLayer::of(PlotType::Candlestick)];
        if let Some(volume_axis) = options.volume_axis {
            layers.push(CaptureLayer::on(volume_axis, PlotType::Bar));
        }
        if !options.moving_averages.is_empty() {
            layers.push(CaptureLayer::of(PlotType::Line));
        }
        let site = CallSite::new(targets::CANDLESTICK).with_layers(&layers);

        self.interceptor.call(self, site, || {
            if options.moving_averages.contains(&0) {
                return Err(CaptureError::InvalidData(
                    "moving average window must span at least one candle".to_owned(),
                ));
            }
            let glyphs = candles
                .iter()
                .map(|candle| CandleGlyph {
                    x: candle.x,
                    body_bottom: candle.open.min(candle.close),
                    body_top: candle.open.max(candle.close),
                    wick_low: candle.low,
                    wick_high: candle.high,
                    bullish: candle.close >= candle.open,
                    volume: candle.volume,
                    label: None,
                })
                .collect();
            let handle =
                self.push_element(axis, SceneElement::Candles(CandleCollection { candles: glyphs }))?;

            let mut ordered: Vec<&Candle> = candles.iter().collect();
            ordered.sort_by_key(|candle| OrderedFloat(candle.x));
            if let Some(volume_axis) = options.volume_axis {
                self.draw_volume(axis, volume_axis, &ordered)?;
            }
            for window in &options.moving_averages {
                let line = Line2D::new(moving_average(&ordered, *window))
                    .with_label(format!("Moving Average {window} days"));
                self.push_element(axis, SceneElement::Line(line))?;
            }
            Ok(handle)
        })
    }

    /// Statistical bar chart. With more than one series the bars are dodged
    /// within each category and labeled by series name.
    pub fn stat_barplot(
        &self,
        axis: AxisId,
        categories: &[&str],
        series: &[(&str, Vec<f64>)],
    ) -> CaptureResult<PlotHandle> {
        let mut site = CallSite::new(targets::STAT_BARPLOT);
        if series.len() > 1 {
            site = site.with_plot_type(PlotType::Dodged);
        }
        self.interceptor.call(self, site, || {
            let width = 0.8 / series.len().max(1) as f64;
            let mut first = None;
            for (index, (label, values)) in series.iter().enumerate() {
                let options = BarOptions {
                    width,
                    offset: -0.4 + width * (index as f64 + 0.5),
                    bottom: Vec::new(),
                    label: (series.len() > 1).then(|| (*label).to_owned()),
                };
                let handle = self.bar_with(axis, categories, values, options)?;
                first.get_or_insert(handle);
            }
            first.ok_or_else(|| CaptureError::InvalidData("barplot needs a series".to_owned()))
        })
    }

    /// Counts observations per category, in order of first appearance.
    pub fn stat_countplot(&self, axis: AxisId, observations: &[&str]) -> CaptureResult<PlotHandle> {
        self.interceptor
            .call(self, CallSite::new(targets::STAT_COUNTPLOT), || {
                let mut categories: Vec<&str> = Vec::new();
                let mut counts: Vec<f64> = Vec::new();
                for observation in observations {
                    match categories.iter().position(|c| c == observation) {
                        Some(index) => counts[index] += 1.0,
                        None => {
                            categories.push(*observation);
                            counts.push(1.0);
                        }
                    }
                }
                self.bar(axis, &categories, &counts)
            })
    }

    pub fn stat_boxplot(&self, axis: AxisId, groups: &[(&str, Vec<f64>)]) -> CaptureResult<PlotHandle> {
        self.interceptor
            .call(self, CallSite::new(targets::STAT_BOXPLOT), || {
                let labels: Vec<&str> = groups.iter().map(|(label, _)| *label).collect();
                let datasets: Vec<Vec<f64>> =
                    groups.iter().map(|(_, values)| values.clone()).collect();
                self.boxplot(axis, &datasets, &labels)
            })
    }

    pub fn stat_lineplot(
        &self,
        axis: AxisId,
        xs: &[f64],
        ys: &[f64],
        label: Option<&str>,
    ) -> CaptureResult<PlotHandle> {
        self.interceptor
            .call(self, CallSite::new(targets::STAT_LINEPLOT), || {
                self.plot(axis, xs, ys, label)
            })
    }

    /// Scatter of the samples plus an unlabeled least-squares line.
    pub fn stat_regplot(&self, axis: AxisId, xs: &[f64], ys: &[f64]) -> CaptureResult<PlotHandle> {
        self.stat_regplot_with(axis, xs, ys, true)
    }

    /// Regression plot. The samples become a scatter layer when `scatter` is
    /// set; the fitted line is always a smooth layer.
    pub fn stat_regplot_with(
        &self,
        axis: AxisId,
        xs: &[f64],
        ys: &[f64],
        scatter: bool,
    ) -> CaptureResult<PlotHandle> {
        const POINTS_AND_FIT: [CaptureLayer; 2] = [
            CaptureLayer::of(PlotType::Scatter),
            CaptureLayer::of(PlotType::Smooth),
        ];
        const FIT_ONLY: [CaptureLayer; 1] = [CaptureLayer::of(PlotType::Smooth)];
        let layers: &[CaptureLayer] = if scatter { &POINTS_AND_FIT } else { &FIT_ONLY };

        self.interceptor
            .call(self, CallSite::new(targets::STAT_REGPLOT).with_layers(layers), || {
                if scatter {
                    self.scatter(axis, xs, ys)?;
                } else {
                    zip_exact(xs, ys)?;
                }
                let (slope, intercept) = least_squares(xs, ys).ok_or_else(|| {
                    CaptureError::InvalidData("regression needs two distinct x values".to_owned())
                })?;
                let mut grid: Vec<f64> = xs.iter().copied().filter(|x| x.is_finite()).collect();
                grid.sort_by_key(|x| OrderedFloat(*x));
                grid.dedup();
                let fitted: Vec<f64> = grid.iter().map(|x| slope * x + intercept).collect();
                self.plot(axis, &grid, &fitted, None)
            })
    }

    /// Color-mapped matrix with category labels centred on each cell.
    pub fn stat_heatmap(
        &self,
        axis: AxisId,
        values: Vec<Vec<f64>>,
        x_labels: &[&str],
        y_labels: &[&str],
        colorbar_label: Option<&str>,
    ) -> CaptureResult<PlotHandle> {
        self.interceptor
            .call(self, CallSite::new(targets::STAT_HEATMAP), || {
                let handle = self.pcolormesh(axis, values)?;
                self.with_axis_mut(axis, |scene| {
                    scene.x_ticks = index_ticks(x_labels, 0.5);
                    scene.y_ticks = index_ticks(y_labels, 0.5);
                    if let Some(SceneElement::ColorMesh(mesh)) =
                        scene.elements.get_mut(handle.element)
                    {
                        mesh.colorbar_label = colorbar_label.map(str::to_owned);
                    }
                })?;
                Ok(handle)
            })
    }

    /// Violin plot: one density curve per group, plus the group's box
    /// statistics when `inner_box` is set.
    pub fn stat_violinplot(
        &self,
        axis: AxisId,
        groups: &[(&str, Vec<f64>)],
        inner_box: bool,
    ) -> CaptureResult<PlotHandle> {
        const BOX_AND_DENSITY: [CaptureLayer; 2] = [
            CaptureLayer::of(PlotType::Box),
            CaptureLayer::of(PlotType::Smooth),
        ];
        const DENSITY_ONLY: [CaptureLayer; 1] = [CaptureLayer::of(PlotType::Smooth)];
        let layers: &[CaptureLayer] = if inner_box {
            &BOX_AND_DENSITY
        } else {
            &DENSITY_ONLY
        };

        self.interceptor
            .call(self, CallSite::new(targets::STAT_VIOLINPLOT).with_layers(layers), || {
                let mut first = None;
                for (label, samples) in groups {
                    let curve = gaussian_kde(samples, KDE_GRID_POINTS).ok_or_else(|| {
                        CaptureError::InvalidData(format!(
                            "violin group {label} needs two samples with spread"
                        ))
                    })?;
                    let line = Line2D::new(curve).with_label(format!("{label} kde"));
                    let handle = self.push_element(axis, SceneElement::Line(line))?;
                    first.get_or_insert(handle);
                }
                if inner_box && !groups.is_empty() {
                    let labels: Vec<&str> = groups.iter().map(|(label, _)| *label).collect();
                    let datasets: Vec<Vec<f64>> =
                        groups.iter().map(|(_, values)| values.clone()).collect();
                    self.boxplot(axis, &datasets, &labels)?;
                }
                first.ok_or_else(|| {
                    CaptureError::InvalidData("violin plot needs at least one group".to_owned())
                })
            })
    }

    /// Kernel density curve of `samples`, drawn as a line labeled as a KDE.
    pub fn stat_kdeplot(
        &self,
        axis: AxisId,
        samples: &[f64],
        label: Option<&str>,
    ) -> CaptureResult<PlotHandle> {
        self.interceptor
            .call(self, CallSite::new(targets::STAT_KDEPLOT), || {
                let curve = gaussian_kde(samples, KDE_GRID_POINTS).ok_or_else(|| {
                    CaptureError::InvalidData("kde needs two samples with spread".to_owned())
                })?;
                let (xs, ys): (Vec<f64>, Vec<f64>) = curve.into_iter().unzip();
                let label = label.map_or_else(|| "kde".to_owned(), |label| format!("{label} kde"));
                self.plot(axis, &xs, &ys, Some(&label))
            })
    }

    /// One bar per candle on `volume_axis`, labeled like the candles on the
    /// price axis. Missing volumes are drawn as NaN bars.
    fn draw_volume(
        &self,
        price_axis: AxisId,
        volume_axis: AxisId,
        candles: &[&Candle],
    ) -> CaptureResult<()> {
        let dated = self
            .state
            .read()
            .axes
            .get(&price_axis)
            .is_some_and(|scene| matches!(scene.x_formatter, Some(AxisFormatter::Date(_))));
        let labels: Vec<String> = candles
            .iter()
            .map(|candle| {
                dated
                    .then(|| date_number_label(candle.x))
                    .flatten()
                    .unwrap_or_else(|| format_number(candle.x))
            })
            .collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        let volumes: Vec<f64> = candles
            .iter()
            .map(|candle| candle.volume.unwrap_or(f64::NAN))
            .collect();

        self.draw_bars(
            volume_axis,
            Orientation::Vertical,
            &labels,
            &volumes,
            &BarOptions::default(),
        )?;
        self.with_axis_mut(volume_axis, |scene| {
            if scene.y_label.trim().is_empty() {
                scene.y_label = "Volume".to_owned();
            }
        })
    }

    fn draw_bars(
        &self,
        axis: AxisId,
        orientation: Orientation,
        categories: &[&str],
        values: &[f64],
        options: &BarOptions,
    ) -> CaptureResult<PlotHandle> {
        if !categories.is_empty() && categories.len() != values.len() {
            return Err(CaptureError::InvalidData(format!(
                "{} categories for {} bar values",
                categories.len(),
                values.len()
            )));
        }
        let patches = values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let base = options.bottom.get(index).copied().unwrap_or(0.0);
                let start = index as f64 + options.offset - options.width / 2.0;
                match orientation {
                    Orientation::Vertical => BarPatch::new(start, base, options.width, *value),
                    Orientation::Horizontal => BarPatch::new(base, start, *value, options.width),
                }
            })
            .collect();
        let mut container = BarContainer::new(orientation, patches);
        container.label = options.label.clone();

        self.with_axis_mut(axis, |scene| {
            if !categories.is_empty() {
                let ticks = index_ticks(categories, 0.0);
                match orientation {
                    Orientation::Vertical => scene.x_ticks = ticks,
                    Orientation::Horizontal => scene.y_ticks = ticks,
                }
            }
            scene.elements.push(SceneElement::Bars(container));
            PlotHandle {
                axis,
                element: scene.elements.len() - 1,
            }
        })
    }

    fn push_element(&self, axis: AxisId, element: SceneElement) -> CaptureResult<PlotHandle> {
        self.with_axis_mut(axis, |scene| {
            scene.elements.push(element);
            PlotHandle {
                axis,
                element: scene.elements.len() - 1,
            }
        })
    }

    fn with_axis_mut<T>(
        &self,
        axis: AxisId,
        apply: impl FnOnce(&mut AxisScene) -> T,
    ) -> CaptureResult<T> {
        let mut state = self.state.write();
        let scene = state
            .axes
            .get_mut(&axis)
            .ok_or(CaptureError::AxisNotFound(axis))?;
        Ok(apply(scene))
    }

    fn with_figure_mut(
        &self,
        figure: FigureId,
        apply: impl FnOnce(&mut FigureState),
    ) -> CaptureResult<()> {
        let mut state = self.state.write();
        let figure_state = state.figures.get_mut(&figure).ok_or_else(|| {
            CaptureError::InvalidData(format!("figure {figure} is not open"))
        })?;
        apply(figure_state);
        Ok(())
    }
}

impl PlottingObservable for HeadlessHost {
    fn figure_of(&self, axis: AxisId) -> CaptureResult<FigureId> {
        self.state
            .read()
            .axes
            .get(&axis)
            .map(|scene| scene.figure)
            .ok_or(CaptureError::AxisNotFound(axis))
    }

    fn axis_scene(&self, axis: AxisId) -> CaptureResult<AxisScene> {
        let state = self.state.read();
        let mut scene = state
            .axes
            .get(&axis)
            .cloned()
            .ok_or(CaptureError::AxisNotFound(axis))?;
        scene.shared_x_label = state
            .figures
            .get(&scene.figure)
            .and_then(|figure| figure.shared_x_label.clone());
        Ok(scene)
    }

    fn figure_title(&self, figure: FigureId) -> Option<String> {
        self.state
            .read()
            .figures
            .get(&figure)
            .and_then(|state| state.title.clone())
    }

    fn apply_highlight(&self, axis: AxisId, tags: &[ElementTag]) -> CaptureResult<()> {
        let mut state = self.state.write();
        let scene = state
            .axes
            .get_mut(&axis)
            .ok_or(CaptureError::AxisNotFound(axis))?;
        scene.apply_tags(tags)
    }
}

fn index_ticks(labels: &[&str], start: f64) -> Vec<TickLabel> {
    labels
        .iter()
        .enumerate()
        .map(|(index, label)| TickLabel::new(start + index as f64, *label))
        .collect()
}

fn zip_exact(xs: &[f64], ys: &[f64]) -> CaptureResult<Vec<(f64, f64)>> {
    if xs.len() != ys.len() {
        return Err(CaptureError::InvalidData(format!(
            "x and y must have equal length, got {} and {}",
            xs.len(),
            ys.len()
        )));
    }
    Ok(xs.iter().copied().zip(ys.iter().copied()).collect())
}

fn histogram_patches(samples: &[f64], bins: usize) -> Vec<BarPatch> {
    let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().min_by_key(|v| OrderedFloat(*v)),
        finite.iter().copied().max_by_key(|v| OrderedFloat(*v)),
    ) else {
        return Vec::new();
    };
    let (start, width) = if max > min {
        (min, (max - min) / bins as f64)
    } else {
        (min - 0.5, 1.0 / bins as f64)
    };

    let mut counts = vec![0.0; bins];
    for value in finite {
        let slot = (((value - start) / width).floor() as usize).min(bins - 1);
        counts[slot] += 1.0;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| BarPatch::new(start + index as f64 * width, 0.0, width, count))
        .collect()
}

/// Trailing mean of close prices, starting at the first full window.
fn moving_average(candles: &[&Candle], window: usize) -> Vec<(f64, f64)> {
    candles
        .windows(window)
        .filter_map(|run| {
            let last = run.last()?;
            let mean = run.iter().map(|candle| candle.close).sum::<f64>() / window as f64;
            Some((last.x, mean))
        })
        .collect()
}

fn least_squares(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .copied()
        .zip(ys.iter().copied())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let sxx: f64 = pairs.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = pairs
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}
