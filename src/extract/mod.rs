//! Scene-graph extractors.
//!
//! Each extractor pulls one category of structural element out of an
//! [`AxisScene`](crate::scene::AxisScene). Plot models compose the ones they
//! need and degrade per field when an extractor comes back empty-handed.

pub mod collection;
pub mod container;
pub mod format;
pub mod level;
pub mod line;
pub mod mappable;

use tracing::warn;

use crate::core::PlotType;
use crate::error::{CaptureError, CaptureResult};

pub use format::{FormatConfig, FormatHints, FormatKind, extract_format, format_config};
pub use level::LevelKey;

/// Unwraps an extractor result, degrading to `T::default()` on failure.
///
/// Extraction failures are logged and never abort the enclosing record.
pub(crate) fn degrade<T: Default>(
    result: CaptureResult<T>,
    plot_type: PlotType,
    field: &'static str,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            let err = match err {
                failure @ CaptureError::ExtractionFailure { .. } => failure,
                other => CaptureError::extraction(plot_type, field, other.to_string()),
            };
            warn!(
                plot_type = %plot_type,
                field,
                error = %err,
                "degrading to empty payload"
            );
            T::default()
        }
    }
}
