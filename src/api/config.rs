use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, CaptureResult};

/// Label fragments that mark a line as a smoothing or regression curve.
pub const DEFAULT_SMOOTH_KEYWORDS: [&str; 10] = [
    "smooth",
    "lowess",
    "loess",
    "regression",
    "linear regression",
    "linear fit",
    "fit",
    "kde",
    "density",
    "gaussian",
];

/// Smoothing keywords whose curve values are densities.
pub const DENSITY_KEYWORDS: [&str; 3] = ["kde", "density", "gaussian"];

/// Capture pipeline configuration.
///
/// Serializable so embedding hosts can keep it next to their own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub highlight: bool,
    #[serde(default = "default_true")]
    pub dedupe_smooth_lines: bool,
    #[serde(default = "default_x_label")]
    pub default_x_label: String,
    #[serde(default = "default_fill_label")]
    pub default_fill_label: String,
    #[serde(default = "default_smooth_keywords")]
    pub smooth_keywords: Vec<String>,
    #[serde(default = "default_box_whisker_factor")]
    pub box_whisker_factor: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            highlight: true,
            dedupe_smooth_lines: true,
            default_x_label: default_x_label(),
            default_fill_label: default_fill_label(),
            smooth_keywords: default_smooth_keywords(),
            box_whisker_factor: default_box_whisker_factor(),
        }
    }
}

impl CaptureConfig {
    /// Turns capture on or off. Intercepted calls still run when disabled.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    #[must_use]
    pub fn with_dedupe_smooth_lines(mut self, dedupe: bool) -> Self {
        self.dedupe_smooth_lines = dedupe;
        self
    }

    #[must_use]
    pub fn with_default_x_label(mut self, label: impl Into<String>) -> Self {
        self.default_x_label = label.into();
        self
    }

    #[must_use]
    pub fn with_default_fill_label(mut self, label: impl Into<String>) -> Self {
        self.default_fill_label = label.into();
        self
    }

    #[must_use]
    pub fn with_smooth_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.smooth_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_box_whisker_factor(mut self, factor: f64) -> Self {
        self.box_whisker_factor = factor;
        self
    }

    pub fn validate(&self) -> CaptureResult<()> {
        if !self.box_whisker_factor.is_finite() || self.box_whisker_factor < 0.0 {
            return Err(CaptureError::InvalidData(format!(
                "box whisker factor must be finite and >= 0, got {}",
                self.box_whisker_factor
            )));
        }
        if self.smooth_keywords.iter().any(|keyword| keyword.trim().is_empty()) {
            return Err(CaptureError::InvalidData(
                "smooth keywords must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> CaptureResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CaptureError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes and validates config from JSON. Missing fields take their
    /// defaults.
    pub fn from_json_str(input: &str) -> CaptureResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| CaptureError::InvalidData(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_true() -> bool {
    true
}

fn default_x_label() -> String {
    "X".to_owned()
}

fn default_fill_label() -> String {
    "Fill".to_owned()
}

fn default_smooth_keywords() -> Vec<String> {
    DEFAULT_SMOOTH_KEYWORDS
        .iter()
        .map(|keyword| (*keyword).to_owned())
        .collect()
}

fn default_box_whisker_factor() -> f64 {
    1.5
}
