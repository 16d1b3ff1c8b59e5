//! Axis number-format detection.
//!
//! Formatters are translated into renderer-neutral hints. Hints are metadata
//! only: the values in a payload are never rescaled or rounded.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::scene::{AxisFormatter, AxisScene};

static DECIMALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(\d+)[fFeE%]").expect("valid decimals regex"));
static PERCENT_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*%\}").expect("valid percent regex"));
static SCIENTIFIC_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*[eE]\}").expect("valid scientific regex"));
static GROUPED_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*,").expect("valid grouping regex"));
static FIXED_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\.(\d+)f\}").expect("valid fixed regex"));
static PRINTF_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)%\.?(\d*)([efg])").expect("valid printf regex"));

/// Symbol or code found in a format string, and the ISO code it maps to.
/// Checked in order.
const CURRENCY_MARKERS: [(&str, &str); 8] = [
    ("$", "USD"),
    ("USD", "USD"),
    ("€", "EUR"),
    ("EUR", "EUR"),
    ("£", "GBP"),
    ("GBP", "GBP"),
    ("¥", "JPY"),
    ("JPY", "JPY"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Currency,
    Percent,
    Date,
    Number,
    Scientific,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatConfig {
    #[serde(rename = "type")]
    pub kind: FormatKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

impl FormatConfig {
    #[must_use]
    pub const fn new(kind: FormatKind) -> Self {
        Self {
            kind,
            decimals: None,
            currency: None,
            date_format: None,
        }
    }

    #[must_use]
    pub fn with_decimals(mut self, decimals: Option<u32>) -> Self {
        self.decimals = decimals;
        self
    }

    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    #[must_use]
    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = Some(date_format.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<FormatConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<FormatConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<FormatConfig>,
}

impl FormatHints {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.fill.is_none()
    }
}

/// Format hints for both axes of a scene. The fill hint is left to plot
/// models that own a color scale.
pub fn extract_format(axis: &AxisScene) -> FormatHints {
    FormatHints {
        x: axis.x_formatter.as_ref().and_then(format_config),
        y: axis.y_formatter.as_ref().and_then(format_config),
        fill: None,
    }
}

/// Translates one formatter. Returns `None` when no explicit format is
/// recognizable (e.g. the library's default scalar formatter).
pub fn format_config(formatter: &AxisFormatter) -> Option<FormatConfig> {
    match formatter {
        AxisFormatter::Date(pattern) => {
            Some(FormatConfig::new(FormatKind::Date).with_date_format(pattern.clone()))
        }
        AxisFormatter::Percent { decimals } => {
            Some(FormatConfig::new(FormatKind::Percent).with_decimals(*decimals))
        }
        AxisFormatter::StrMethod(pattern) => parse_format_string(pattern),
        AxisFormatter::FormatStr(pattern) => parse_printf_string(pattern),
        AxisFormatter::Scalar { math_text } => {
            math_text.then(|| FormatConfig::new(FormatKind::Scientific))
        }
        AxisFormatter::Func { name } => parse_func_name(name),
    }
}

fn parse_format_string(pattern: &str) -> Option<FormatConfig> {
    if pattern.is_empty() {
        return None;
    }
    let decimals = DECIMALS
        .captures(pattern)
        .and_then(|caps| caps[1].parse::<u32>().ok());

    if let Some((_, code)) = CURRENCY_MARKERS
        .iter()
        .find(|(marker, _)| pattern.contains(marker))
    {
        return Some(
            FormatConfig::new(FormatKind::Currency)
                .with_decimals(decimals)
                .with_currency(*code),
        );
    }
    if PERCENT_FIELD.is_match(pattern) {
        return Some(FormatConfig::new(FormatKind::Percent).with_decimals(decimals));
    }
    if SCIENTIFIC_FIELD.is_match(pattern) {
        return Some(FormatConfig::new(FormatKind::Scientific).with_decimals(decimals));
    }
    if GROUPED_FIELD.is_match(pattern) {
        return Some(FormatConfig::new(FormatKind::Number).with_decimals(decimals));
    }
    FIXED_FIELD
        .captures(pattern)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(|decimals| FormatConfig::new(FormatKind::Fixed).with_decimals(Some(decimals)))
}

fn parse_printf_string(pattern: &str) -> Option<FormatConfig> {
    let caps = PRINTF_FIELD.captures(pattern)?;
    let decimals = caps[1].parse::<u32>().ok();
    let kind = match caps[2].to_ascii_lowercase().as_str() {
        "e" => FormatKind::Scientific,
        _ => FormatKind::Fixed,
    };
    Some(FormatConfig::new(kind).with_decimals(decimals))
}

fn parse_func_name(name: &str) -> Option<FormatConfig> {
    let name = name.to_lowercase();
    if name.contains("percent") {
        Some(FormatConfig::new(FormatKind::Percent).with_decimals(Some(1)))
    } else if name.contains("currency") || name.contains("dollar") {
        Some(
            FormatConfig::new(FormatKind::Currency)
                .with_decimals(Some(2))
                .with_currency("USD"),
        )
    } else if name.contains("date") || name.contains("time") {
        Some(FormatConfig::new(FormatKind::Date))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(formatter: AxisFormatter) -> Option<FormatConfig> {
        format_config(&formatter)
    }

    #[test]
    fn currency_pattern_keeps_decimals_and_code() {
        let config = detect(AxisFormatter::StrMethod("${x:,.2f}".to_owned())).expect("currency");
        assert_eq!(config.kind, FormatKind::Currency);
        assert_eq!(config.decimals, Some(2));
        assert_eq!(config.currency.as_deref(), Some("USD"));

        let euro = detect(AxisFormatter::StrMethod("{x:.0f} €".to_owned())).expect("euro");
        assert_eq!(euro.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn str_method_variants_are_classified() {
        let percent = detect(AxisFormatter::StrMethod("{x:.1%}".to_owned())).expect("percent");
        assert_eq!(percent.kind, FormatKind::Percent);
        assert_eq!(percent.decimals, Some(1));

        let sci = detect(AxisFormatter::StrMethod("{x:.2e}".to_owned())).expect("scientific");
        assert_eq!(sci.kind, FormatKind::Scientific);

        let number = detect(AxisFormatter::StrMethod("{x:,}".to_owned())).expect("number");
        assert_eq!(number.kind, FormatKind::Number);
        assert_eq!(number.decimals, None);

        let fixed = detect(AxisFormatter::StrMethod("{x:.3f}".to_owned())).expect("fixed");
        assert_eq!(fixed.kind, FormatKind::Fixed);
        assert_eq!(fixed.decimals, Some(3));

        assert!(detect(AxisFormatter::StrMethod("{x}".to_owned())).is_none());
    }

    #[test]
    fn printf_and_scalar_formatters() {
        let fixed = detect(AxisFormatter::FormatStr("%.2f".to_owned())).expect("fixed");
        assert_eq!(fixed.kind, FormatKind::Fixed);
        assert_eq!(fixed.decimals, Some(2));

        let sci = detect(AxisFormatter::FormatStr("%.1E".to_owned())).expect("scientific");
        assert_eq!(sci.kind, FormatKind::Scientific);

        assert!(detect(AxisFormatter::Scalar { math_text: false }).is_none());
        assert_eq!(
            detect(AxisFormatter::Scalar { math_text: true }).map(|c| c.kind),
            Some(FormatKind::Scientific)
        );
    }

    #[test]
    fn func_formatter_is_guessed_from_name() {
        let currency = detect(AxisFormatter::Func {
            name: "dollar_fmt".to_owned(),
        })
        .expect("currency");
        assert_eq!(currency.kind, FormatKind::Currency);
        assert!(
            detect(AxisFormatter::Func {
                name: "mystery".to_owned()
            })
            .is_none()
        );
    }

    #[test]
    fn date_hint_serializes_camel_case() {
        let config = detect(AxisFormatter::Date("%b %d".to_owned())).expect("date");
        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["type"], "date");
        assert_eq!(json["dateFormat"], "%b %d");
        assert!(json.get("decimals").is_none());
    }
}
