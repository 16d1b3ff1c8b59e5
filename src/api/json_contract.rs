use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, CaptureResult};

use super::document::{FIGURE_DOCUMENT_JSON_SCHEMA_V1, FigureDocument};
use super::interceptor::InterceptorDiagnostics;

pub const INTERCEPTOR_DIAGNOSTICS_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureDocumentJsonContractV1 {
    pub schema_version: u32,
    pub document: FigureDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorDiagnosticsJsonContractV1 {
    pub schema_version: u32,
    pub diagnostics: InterceptorDiagnostics,
}

impl FigureDocument {
    pub fn to_json_pretty(&self) -> CaptureResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            CaptureError::InvalidData(format!("failed to serialize figure document: {e}"))
        })
    }

    pub fn to_json_contract_v1_pretty(&self) -> CaptureResult<String> {
        let payload = FigureDocumentJsonContractV1 {
            schema_version: FIGURE_DOCUMENT_JSON_SCHEMA_V1,
            document: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            CaptureError::InvalidData(format!("failed to serialize figure document contract v1: {e}"))
        })
    }

    /// Accepts either a bare document or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> CaptureResult<Self> {
        let document = match serde_json::from_str::<FigureDocument>(input) {
            Ok(document) => document,
            Err(_) => {
                let payload: FigureDocumentJsonContractV1 =
                    serde_json::from_str(input).map_err(|e| {
                        CaptureError::InvalidData(format!(
                            "failed to parse figure document json payload: {e}"
                        ))
                    })?;
                if payload.schema_version != FIGURE_DOCUMENT_JSON_SCHEMA_V1 {
                    return Err(CaptureError::InvalidData(format!(
                        "unsupported figure document schema version: {}",
                        payload.schema_version
                    )));
                }
                payload.document
            }
        };
        if document.schema_version != FIGURE_DOCUMENT_JSON_SCHEMA_V1 {
            return Err(CaptureError::InvalidData(format!(
                "unsupported figure document schema version: {}",
                document.schema_version
            )));
        }
        Ok(document)
    }
}

impl InterceptorDiagnostics {
    pub fn to_json_contract_v1_pretty(self) -> CaptureResult<String> {
        let payload = InterceptorDiagnosticsJsonContractV1 {
            schema_version: INTERCEPTOR_DIAGNOSTICS_JSON_SCHEMA_V1,
            diagnostics: self,
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            CaptureError::InvalidData(format!(
                "failed to serialize interceptor diagnostics contract v1: {e}"
            ))
        })
    }

    pub fn from_json_compat_str(input: &str) -> CaptureResult<Self> {
        if let Ok(diagnostics) = serde_json::from_str::<InterceptorDiagnostics>(input) {
            return Ok(diagnostics);
        }
        let payload: InterceptorDiagnosticsJsonContractV1 = serde_json::from_str(input)
            .map_err(|e| {
                CaptureError::InvalidData(format!("failed to parse diagnostics json payload: {e}"))
            })?;
        if payload.schema_version != INTERCEPTOR_DIAGNOSTICS_JSON_SCHEMA_V1 {
            return Err(CaptureError::InvalidData(format!(
                "unsupported interceptor diagnostics schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.diagnostics)
    }
}
