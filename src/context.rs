//! Thread-local re-entrancy tracking.
//!
//! Plotting functions call each other internally. Each scope keeps a depth
//! counter per thread; only the call that moves a scope from depth 0 to 1 is
//! outermost. Scopes are independent of each other.

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::core::AxisId;
use crate::error::{CaptureError, CaptureResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Any intercepted plotting call.
    General,
    /// A statistical-layer call, which issues base primitives underneath.
    Sublayer,
    /// The element-tagging pass that runs after a capture.
    Highlight,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::General, Scope::Sublayer, Scope::Highlight];

    const fn slot(self) -> usize {
        match self {
            Scope::General => 0,
            Scope::Sublayer => 1,
            Scope::Highlight => 2,
        }
    }
}

pub type SublayerAxes = SmallVec<[AxisId; 4]>;

thread_local! {
    static DEPTHS: Cell<[u32; 3]> = const { Cell::new([0; 3]) };
    static SUBLAYER_AXES: RefCell<SublayerAxes> = RefCell::new(SmallVec::new());
}

fn depth_of(scope: Scope) -> u32 {
    DEPTHS.with(|depths| depths.get()[scope.slot()])
}

fn increment(scope: Scope) -> u32 {
    DEPTHS.with(|depths| {
        let mut current = depths.get();
        current[scope.slot()] = current[scope.slot()].saturating_add(1);
        depths.set(current);
        current[scope.slot()]
    })
}

fn decrement(scope: Scope) -> CaptureResult<u32> {
    let remaining = DEPTHS.with(|depths| {
        let mut current = depths.get();
        let slot = &mut current[scope.slot()];
        if *slot == 0 {
            return None;
        }
        *slot -= 1;
        let remaining = *slot;
        depths.set(current);
        Some(remaining)
    });

    match remaining {
        Some(0) => {
            if scope == Scope::Sublayer {
                SUBLAYER_AXES.with(|axes| axes.borrow_mut().clear());
            }
            Ok(0)
        }
        Some(depth) => Ok(depth),
        None => {
            warn!(?scope, "exit without matching enter; scope stays inactive");
            Err(CaptureError::ReentrancyImbalance { scope })
        }
    }
}

/// Entry point for scope bookkeeping on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReentrancyContext;

impl ReentrancyContext {
    /// Enters `scope` and returns a guard that exits it on drop, including
    /// during unwinding.
    #[must_use = "the scope is exited as soon as the guard is dropped"]
    pub fn enter(scope: Scope) -> ScopeGuard {
        let depth = increment(scope);
        trace!(?scope, depth, "entered scope");
        ScopeGuard {
            scope,
            outermost: depth == 1,
            _thread_bound: PhantomData,
        }
    }

    #[must_use]
    pub fn depth(scope: Scope) -> u32 {
        depth_of(scope)
    }

    #[must_use]
    pub fn is_active(scope: Scope) -> bool {
        depth_of(scope) > 0
    }

    /// Guard-less enter for hosts that cannot keep a guard alive across the
    /// call. Returns whether this entry is outermost.
    pub fn enter_raw(scope: Scope) -> bool {
        increment(scope) == 1
    }

    /// Counterpart of [`ReentrancyContext::enter_raw`].
    ///
    /// At depth 0 this reports [`CaptureError::ReentrancyImbalance`] and the
    /// scope remains inactive.
    pub fn exit_raw(scope: Scope) -> CaptureResult<()> {
        decrement(scope).map(|_| ())
    }

    /// Forces every scope on this thread back to inactive.
    pub fn reset_all() {
        DEPTHS.with(|depths| depths.set([0; 3]));
        SUBLAYER_AXES.with(|axes| axes.borrow_mut().clear());
    }

    /// Records the axis located by a call suppressed under an active sublayer
    /// scope. Ignored when no sublayer scope is active.
    pub fn record_sublayer_axis(axis: AxisId) {
        if !Self::is_active(Scope::Sublayer) {
            return;
        }
        SUBLAYER_AXES.with(|axes| {
            let mut axes = axes.borrow_mut();
            if !axes.contains(&axis) {
                axes.push(axis);
            }
        });
    }

    /// Drains the axes recorded since the sublayer scope became active.
    #[must_use]
    pub fn take_sublayer_axes() -> SublayerAxes {
        SUBLAYER_AXES.with(|axes| std::mem::take(&mut *axes.borrow_mut()))
    }
}

/// RAII handle for one entry into a [`Scope`].
#[derive(Debug)]
pub struct ScopeGuard {
    scope: Scope,
    outermost: bool,
    _thread_bound: PhantomData<*const ()>,
}

impl ScopeGuard {
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// True when this entry moved the scope from inactive to active.
    #[must_use]
    pub fn is_outermost(&self) -> bool {
        self.outermost
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if let Ok(depth) = decrement(self.scope) {
            trace!(scope = ?self.scope, depth, "exited scope");
        }
    }
}
