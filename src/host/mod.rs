//! Boundary to the plotting library being observed.
//!
//! The capture pipeline never touches native objects directly. A host
//! adapter implements [`PlottingObservable`] to hand out scene snapshots and
//! accept highlight tags, and native call results implement [`LocatesAxis`]
//! so the interceptor can tell which axis a call drew on.

pub mod headless;

use crate::core::{AxisId, FigureId};
use crate::error::CaptureResult;
use crate::scene::{AxisScene, ElementTag};

pub use headless::{FigureHandle, HeadlessHost, PlotHandle};

pub trait PlottingObservable: Send + Sync {
    /// Figure owning `axis`.
    fn figure_of(&self, axis: AxisId) -> CaptureResult<FigureId>;

    /// Snapshot of everything currently rendered on `axis`.
    fn axis_scene(&self, axis: AxisId) -> CaptureResult<AxisScene>;

    /// Figure-level title, if the host knows one.
    fn figure_title(&self, _figure: FigureId) -> Option<String> {
        None
    }

    /// Stores element ids on rendered primitives. Must not alter geometry
    /// or style.
    fn apply_highlight(&self, _axis: AxisId, _tags: &[ElementTag]) -> CaptureResult<()> {
        Ok(())
    }
}

/// Native call results that can name the axis they were drawn on.
pub trait LocatesAxis {
    fn locate_axis(&self) -> Option<AxisId>;

    /// Whether the native call reported failure. Failed calls are never
    /// captured.
    fn failed(&self) -> bool {
        false
    }
}

impl LocatesAxis for AxisId {
    fn locate_axis(&self) -> Option<AxisId> {
        Some(*self)
    }
}

impl LocatesAxis for () {
    fn locate_axis(&self) -> Option<AxisId> {
        None
    }
}

impl<T: LocatesAxis + ?Sized> LocatesAxis for &T {
    fn locate_axis(&self) -> Option<AxisId> {
        (**self).locate_axis()
    }

    fn failed(&self) -> bool {
        (**self).failed()
    }
}

impl<T: LocatesAxis> LocatesAxis for Option<T> {
    fn locate_axis(&self) -> Option<AxisId> {
        self.as_ref().and_then(LocatesAxis::locate_axis)
    }

    fn failed(&self) -> bool {
        self.as_ref().is_some_and(LocatesAxis::failed)
    }
}

impl<T: LocatesAxis, E> LocatesAxis for Result<T, E> {
    fn locate_axis(&self) -> Option<AxisId> {
        self.as_ref().ok().and_then(LocatesAxis::locate_axis)
    }

    fn failed(&self) -> bool {
        match self {
            Ok(value) => value.failed(),
            Err(_) => true,
        }
    }
}

impl<T: LocatesAxis> LocatesAxis for Vec<T> {
    fn locate_axis(&self) -> Option<AxisId> {
        self.iter().find_map(LocatesAxis::locate_axis)
    }

    fn failed(&self) -> bool {
        self.iter().any(LocatesAxis::failed)
    }
}

impl<A: LocatesAxis, B> LocatesAxis for (A, B) {
    fn locate_axis(&self) -> Option<AxisId> {
        self.0.locate_axis()
    }

    fn failed(&self) -> bool {
        self.0.failed()
    }
}
