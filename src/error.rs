use thiserror::Error;

use crate::context::Scope;
use crate::core::{AxisId, FigureId, PlotType};

pub type CaptureResult<T> = Result<T, CaptureError>;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("unsupported plot type: {0}")]
    UnsupportedPlotType(String),

    #[error("failed to extract `{field}` for {plot_type} plot: {reason}")]
    ExtractionFailure {
        plot_type: PlotType,
        field: &'static str,
        reason: String,
    },

    #[error("figure registry corrupted: {0}")]
    RegistryCorruption(String),

    #[error("re-entrancy imbalance: exit without matching enter for {scope:?} scope")]
    ReentrancyImbalance { scope: Scope },

    #[error("figure {0} was evicted and cannot accept new captures")]
    FigureEvicted(FigureId),

    #[error("axis {0} could not be located by the host")]
    AxisNotFound(AxisId),

    #[error("call target `{0}` is already declared")]
    DuplicateTarget(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl CaptureError {
    pub(crate) fn extraction(
        plot_type: PlotType,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::ExtractionFailure {
            plot_type,
            field,
            reason: reason.into(),
        }
    }
}
