//! Observation of plotting calls.
//!
//! [`Interceptor::call`] wraps one native call. The call always runs exactly
//! once and its result is handed back untouched; the capture that follows an
//! outermost call is best-effort and can never fail the user's call.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::context::{ReentrancyContext, Scope, ScopeGuard};
use crate::core::{AxisId, FigureId, PlotType};
use crate::error::{CaptureError, CaptureResult};
use crate::host::{LocatesAxis, PlottingObservable};
use crate::plot::PlotFactory;
use crate::scene::ElementTag;

use super::config::CaptureConfig;
use super::document::FigureDocument;
use super::highlight::HighlightPass;
use super::registry::{AttachOutcome, FigureRegistry};

/// Which layer of the plotting stack a call target belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Library {
    Base,
    /// Statistical layer built on the base library; its calls issue base
    /// primitives internally.
    Statistical,
}

/// Declared entry point of the plotting surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTarget {
    pub name: String,
    pub library: Library,
    pub plot_type: PlotType,
}

impl CallTarget {
    #[must_use]
    pub fn new(name: impl Into<String>, library: Library, plot_type: PlotType) -> Self {
        Self {
            name: name.into(),
            library,
            plot_type,
        }
    }

    #[must_use]
    pub fn base(name: impl Into<String>, plot_type: PlotType) -> Self {
        Self::new(name, Library::Base, plot_type)
    }

    #[must_use]
    pub fn statistical(name: impl Into<String>, plot_type: PlotType) -> Self {
        Self::new(name, Library::Statistical, plot_type)
    }
}

/// One record an outermost call attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLayer {
    pub plot_type: PlotType,
    /// Axis the layer lives on. `None` means the axis the call located.
    pub axis: Option<AxisId>,
}

impl CaptureLayer {
    #[must_use]
    pub const fn of(plot_type: PlotType) -> Self {
        Self {
            plot_type,
            axis: None,
        }
    }

    /// Layer drawn on an axis other than the one the call returns, e.g. a
    /// volume panel under a price chart.
    #[must_use]
    pub const fn on(axis: AxisId, plot_type: PlotType) -> Self {
        Self {
            plot_type,
            axis: Some(axis),
        }
    }
}

/// One invocation of a declared target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite<'a> {
    pub target: &'a str,
    /// Overrides the target's default plot type, e.g. a stacked bar call.
    pub plot_type: Option<PlotType>,
    /// Axis the call draws on, when known before the call returns.
    pub axis: Option<AxisId>,
    /// Records to capture, in order. Empty means a single layer of the
    /// site's plot type.
    pub layers: &'a [CaptureLayer],
}

impl<'a> CallSite<'a> {
    #[must_use]
    pub const fn new(target: &'a str) -> Self {
        Self {
            target,
            plot_type: None,
            axis: None,
            layers: &[],
        }
    }

    #[must_use]
    pub const fn with_plot_type(mut self, plot_type: PlotType) -> Self {
        self.plot_type = Some(plot_type);
        self
    }

    #[must_use]
    pub const fn with_axis(mut self, axis: AxisId) -> Self {
        self.axis = Some(axis);
        self
    }

    #[must_use]
    pub const fn with_layers(mut self, layers: &'a [CaptureLayer]) -> Self {
        self.layers = layers;
        self
    }
}

/// Counters describing what the interceptor did with the calls it saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorDiagnostics {
    /// Calls to declared targets.
    pub calls: u64,
    /// Records attached to a figure.
    pub captures: u64,
    /// Nested calls that did not capture.
    pub suppressed: u64,
    /// Captures that ended in an error.
    pub failures: u64,
    /// Captures that panicked.
    pub panics: u64,
}

#[derive(Debug, Default)]
struct DiagnosticsCounters {
    calls: AtomicU64,
    captures: AtomicU64,
    suppressed: AtomicU64,
    failures: AtomicU64,
    panics: AtomicU64,
}

impl DiagnosticsCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> InterceptorDiagnostics {
        InterceptorDiagnostics {
            calls: self.calls.load(Ordering::Relaxed),
            captures: self.captures.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            panics: self.panics.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
pub struct Interceptor {
    registry: Arc<FigureRegistry>,
    factory: PlotFactory,
    config: CaptureConfig,
    targets: RwLock<HashMap<String, CallTarget>>,
    counters: DiagnosticsCounters,
}

impl Interceptor {
    /// Fails with [`CaptureError::InvalidData`] when `config` does not
    /// validate.
    pub fn new(
        registry: Arc<FigureRegistry>,
        factory: PlotFactory,
        config: CaptureConfig,
    ) -> CaptureResult<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            factory,
            config,
            targets: RwLock::new(HashMap::new()),
            counters: DiagnosticsCounters::default(),
        })
    }

    /// Interceptor over the process-wide registry with every plot type.
    pub fn with_shared_registry(config: CaptureConfig) -> CaptureResult<Self> {
        Self::new(FigureRegistry::shared(), PlotFactory::standard(), config)
    }

    pub fn declare(&self, target: CallTarget) -> CaptureResult<()> {
        if target.name.is_empty() {
            return Err(CaptureError::InvalidData(
                "call target name must not be empty".to_owned(),
            ));
        }
        let mut targets = self.targets.write();
        if targets.contains_key(&target.name) {
            return Err(CaptureError::DuplicateTarget(target.name));
        }
        debug!(name = %target.name, library = ?target.library, plot_type = %target.plot_type, "declared call target");
        targets.insert(target.name.clone(), target);
        Ok(())
    }

    pub fn declare_all(&self, targets: impl IntoIterator<Item = CallTarget>) -> CaptureResult<()> {
        for target in targets {
            self.declare(target)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.targets.read().contains_key(name)
    }

    #[must_use]
    pub fn target(&self, name: &str) -> Option<CallTarget> {
        self.targets.read().get(name).cloned()
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<FigureRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn factory(&self) -> &PlotFactory {
        &self.factory
    }

    #[must_use]
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    #[must_use]
    pub fn diagnostics(&self) -> InterceptorDiagnostics {
        self.counters.snapshot()
    }

    /// Renderer document for `figure`, honoring the configured dedup.
    pub fn document(&self, figure: FigureId) -> CaptureResult<FigureDocument> {
        self.registry
            .document_with(figure, self.config.dedupe_smooth_lines)
    }

    /// Runs `f` for the call site and captures the chart it drew when the
    /// call is outermost.
    ///
    /// `f` runs exactly once and its value is returned unchanged. A result
    /// that reports failure is never captured, so a statistical call that
    /// fails halfway leaves no record of its partial drawing. Capture errors
    /// and panics are logged and counted, never propagated. A panic raised by
    /// `f` itself unwinds to the caller as usual.
    pub fn call<H, R, F>(&self, host: &H, site: CallSite<'_>, f: F) -> R
    where
        H: PlottingObservable + ?Sized,
        R: LocatesAxis,
        F: FnOnce() -> R,
    {
        let target = self.targets.read().get(site.target).cloned();
        let Some(target) = target else {
            return f();
        };
        if !self.config.enabled {
            return f();
        }
        DiagnosticsCounters::bump(&self.counters.calls);

        let sublayer = (target.library == Library::Statistical)
            .then(|| ReentrancyContext::enter(Scope::Sublayer));
        let general = ReentrancyContext::enter(Scope::General);

        let result = f();

        let outermost = general.is_outermost()
            && sublayer.as_ref().is_none_or(ScopeGuard::is_outermost)
            && !ReentrancyContext::is_active(Scope::Highlight);
        if !outermost {
            DiagnosticsCounters::bump(&self.counters.suppressed);
            if let Some(axis) = site.axis.or_else(|| result.locate_axis()) {
                ReentrancyContext::record_sublayer_axis(axis);
            }
            trace!(call = %target.name, "suppressed nested call");
            return result;
        }

        let fallback = if sublayer.is_some() {
            ReentrancyContext::take_sublayer_axes().first().copied()
        } else {
            None
        };
        if result.failed() {
            debug!(call = %target.name, "call failed; nothing captured");
            drop(general);
            drop(sublayer);
            return result;
        }

        let axis = site
            .axis
            .or_else(|| result.locate_axis())
            .or(fallback);
        let single = [CaptureLayer::of(site.plot_type.unwrap_or(target.plot_type))];
        let layers = if site.layers.is_empty() {
            &single[..]
        } else {
            site.layers
        };

        for layer in layers {
            match layer.axis.or(axis) {
                Some(axis) => self.guarded_capture(host, &target, axis, layer.plot_type),
                None => {
                    DiagnosticsCounters::bump(&self.counters.failures);
                    warn!(call = %target.name, plot_type = %layer.plot_type, "call did not locate an axis; skipping capture");
                }
            }
        }

        drop(general);
        drop(sublayer);
        result
    }

    fn guarded_capture<H>(&self, host: &H, target: &CallTarget, axis: AxisId, plot_type: PlotType)
    where
        H: PlottingObservable + ?Sized,
    {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.capture(host, axis, plot_type)));
        match outcome {
            Ok(Ok(AttachOutcome::Skipped)) => {
                debug!(call = %target.name, %axis, %plot_type, "capture outranked by existing record");
            }
            Ok(Ok(outcome)) => {
                DiagnosticsCounters::bump(&self.counters.captures);
                debug!(call = %target.name, %axis, %plot_type, ?outcome, "captured plot");
            }
            Ok(Err(err)) => {
                DiagnosticsCounters::bump(&self.counters.failures);
                warn!(call = %target.name, %axis, %plot_type, error = %err, "capture failed");
            }
            Err(payload) => {
                DiagnosticsCounters::bump(&self.counters.panics);
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_owned())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_owned());
                warn!(call = %target.name, %axis, %plot_type, panic = %message, "capture panicked");
            }
        }
    }

    fn capture<H>(&self, host: &H, axis: AxisId, plot_type: PlotType) -> CaptureResult<AttachOutcome>
    where
        H: PlottingObservable + ?Sized,
    {
        let figure = host.figure_of(axis)?;
        let scene = host.axis_scene(axis)?;
        scene.validate()?;
        let model = self.factory.create(plot_type, scene, &self.config)?;
        let record = model.extract();
        let tags: Vec<ElementTag> = record.element_tags().collect();

        let outcome = self.registry.attach(figure, record)?;
        if let Some(title) = host.figure_title(figure) {
            self.registry.set_title(figure, Some(title))?;
        }
        if self.config.highlight && outcome != AttachOutcome::Skipped {
            if let Err(err) = HighlightPass::run(host, axis, &tags) {
                warn!(%axis, %plot_type, error = %err, "highlight tagging failed");
            }
        }
        Ok(outcome)
    }
}
