use tracing::trace;

use crate::context::{ReentrancyContext, Scope};
use crate::core::AxisId;
use crate::error::CaptureResult;
use crate::host::PlottingObservable;
use crate::scene::ElementTag;

/// Tags rendered primitives with their element ids.
///
/// Runs inside the highlight scope, so plotting calls the host issues while
/// tagging are never captured.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightPass;

impl HighlightPass {
    /// Returns the number of tags handed to the host.
    pub fn run<H>(host: &H, axis: AxisId, tags: &[ElementTag]) -> CaptureResult<usize>
    where
        H: PlottingObservable + ?Sized,
    {
        if tags.is_empty() {
            return Ok(0);
        }
        let _scope = ReentrancyContext::enter(Scope::Highlight);
        host.apply_highlight(axis, tags)?;
        trace!(%axis, tags = tags.len(), "applied highlight tags");
        Ok(tags.len())
    }
}
