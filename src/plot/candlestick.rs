use ordered_float::OrderedFloat;
use tracing::warn;

use crate::api::CaptureConfig;
use crate::core::{OhlcSample, PlotType, date_number_label, sample};
use crate::extract::container::candle_collection;
use crate::extract::level::format_number;
use crate::extract::{degrade, extract_format};
use crate::scene::{AxisFormatter, AxisScene, CandleGlyph, ElementPath};

use super::{AxisLabels, CandlePoint, ElementLedger, PlotData, PlotDataModel, PlotRecord, axis_labels};

/// Financial OHLC charts.
#[derive(Debug, Clone)]
pub struct CandlestickPlot {
    axis: AxisScene,
    labels: AxisLabels,
}

impl CandlestickPlot {
    #[must_use]
    pub fn new(axis: AxisScene, config: &CaptureConfig) -> Self {
        let labels = axis_labels(&axis, config);
        Self { axis, labels }
    }

    fn value_label(&self, candle: &CandleGlyph) -> String {
        if let Some(label) = candle.label.as_ref().filter(|label| !label.is_empty()) {
            return label.clone();
        }
        if matches!(self.axis.x_formatter, Some(AxisFormatter::Date(_))) {
            if let Some(date) = date_number_label(candle.x) {
                return date;
            }
        }
        format_number(candle.x)
    }

    fn ohlc(candle: &CandleGlyph) -> OhlcSample {
        let ohlc = OhlcSample::from_geometry(
            candle.body_bottom,
            candle.body_top,
            candle.wick_low,
            candle.wick_high,
            candle.bullish,
        );
        match ohlc.validate() {
            Ok(ohlc) => ohlc,
            Err(err) => {
                warn!(x = candle.x, error = %err, "inconsistent candle geometry kept as drawn");
                ohlc
            }
        }
    }
}

impl PlotDataModel for CandlestickPlot {
    fn plot_type(&self) -> PlotType {
        PlotType::Candlestick
    }

    fn extract(&self) -> PlotRecord {
        let collection = degrade(
            candle_collection(&self.axis, PlotType::Candlestick).map(Some),
            PlotType::Candlestick,
            "data",
        );

        let mut ledger = ElementLedger::new(self.axis.id, PlotType::Candlestick);
        let mut candles = Vec::new();
        if let Some((element, collection)) = collection {
            let mut glyphs: Vec<_> = collection.candles.iter().enumerate().collect();
            glyphs.sort_by_key(|(_, candle)| OrderedFloat(candle.x));
            for (part, candle) in glyphs {
                let ohlc = Self::ohlc(candle);
                candles.push(CandlePoint {
                    value: self.value_label(candle),
                    open: ohlc.open,
                    high: ohlc.high,
                    low: ohlc.low,
                    close: ohlc.close,
                    volume: candle.volume.and_then(sample),
                });
                ledger.push(ElementPath::part(element, part));
            }
        }

        ledger.into_record(
            &self.axis,
            None,
            PlotData::Candlestick(candles),
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
    Box::new(CandlestickPlot::new(axis, config))
}
