use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::sample;
use crate::error::{CaptureError, CaptureResult};

/// Seconds in one matplotlib date unit (one day since the Unix epoch).
const SECONDS_PER_DATE_UNIT: f64 = 86_400.0;

/// Canonical OHLC candle recovered from rendered candle geometry.
///
/// Each field is `None` when the underlying native value was NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcSample {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
}

impl OhlcSample {
    /// Recovers open/close from the body edges and the candle direction.
    ///
    /// A bullish body opens at its bottom edge and closes at its top edge;
    /// a bearish body the other way around. The wick spans low to high.
    #[must_use]
    pub fn from_geometry(
        body_bottom: f64,
        body_top: f64,
        wick_low: f64,
        wick_high: f64,
        bullish: bool,
    ) -> Self {
        let (open, close) = if bullish {
            (body_bottom, body_top)
        } else {
            (body_top, body_bottom)
        };
        Self {
            open: sample(open),
            high: sample(wick_high),
            low: sample(wick_low),
            close: sample(close),
        }
    }

    /// Checks OHLC consistency without altering any value.
    ///
    /// Invariants, checked only when all four values are present:
    /// - `low <= high`
    /// - `open` and `close` are within `[low, high]`
    pub fn validate(self) -> CaptureResult<Self> {
        let (Some(open), Some(high), Some(low), Some(close)) =
            (self.open, self.high, self.low, self.close)
        else {
            return Ok(self);
        };

        if low > high {
            return Err(CaptureError::InvalidData(
                "ohlc low must be <= high".to_owned(),
            ));
        }
        if open < low || open > high || close < low || close > high {
            return Err(CaptureError::InvalidData(
                "ohlc open/close must be within low/high range".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Returns `true` when close price is greater than or equal to open price.
    #[must_use]
    pub fn is_bullish(self) -> bool {
        matches!((self.open, self.close), (Some(open), Some(close)) if close >= open)
    }
}

/// Formats a matplotlib-style date number (days since the Unix epoch) as
/// `%Y-%m-%d`. Returns `None` for non-finite or out-of-range inputs.
#[must_use]
pub fn date_number_label(date_number: f64) -> Option<String> {
    if !date_number.is_finite() {
        return None;
    }
    let seconds = (date_number * SECONDS_PER_DATE_UNIT).round();
    if seconds > (i64::MAX as f64) || seconds < (i64::MIN as f64) {
        return None;
    }
    let dt = DateTime::<Utc>::from_timestamp(seconds as i64, 0)?;
    Some(dt.format("%Y-%m-%d").to_string())
}
