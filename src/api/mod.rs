//! Capture services: configuration, interception, the figure registry and
//! the renderer-facing document contract.

mod config;
mod document;
mod highlight;
mod interceptor;
mod json_contract;
mod registry;

pub use config::{CaptureConfig, DEFAULT_SMOOTH_KEYWORDS, DENSITY_KEYWORDS};
pub use document::{FIGURE_DOCUMENT_JSON_SCHEMA_V1, FigureDocument, LayoutDocument, PanelDocument};
pub use highlight::HighlightPass;
pub use interceptor::{CallSite, CallTarget, CaptureLayer, Interceptor, InterceptorDiagnostics, Library};
pub use json_contract::{
    FigureDocumentJsonContractV1, INTERCEPTOR_DIAGNOSTICS_JSON_SCHEMA_V1,
    InterceptorDiagnosticsJsonContractV1,
};
pub use registry::{AttachOutcome, DEFAULT_TOMBSTONE_CAPACITY, FigureAggregate, FigureRegistry};
