use std::sync::Arc;

use chart_a11y::api::{CallSite, CallTarget, CaptureConfig, FigureRegistry, Interceptor};
use chart_a11y::core::{AxisId, FigureId, PlotType};
use chart_a11y::error::{CaptureError, CaptureResult};
use chart_a11y::host::headless::PlotHandle;
use chart_a11y::host::{HeadlessHost, PlottingObservable};
use chart_a11y::plot::PlotFactory;
use chart_a11y::scene::{AxisScene, BarContainer, BarPatch, SceneElement};
use chart_a11y::{ReentrancyContext, Scope};

struct FixedHost {
    figure: FigureId,
    scene: AxisScene,
    panic_on_snapshot: bool,
}

impl FixedHost {
    fn new(panic_on_snapshot: bool) -> Self {
        let figure = FigureId::next();
        let scene = AxisScene::new(AxisId::next(), figure).with_element(SceneElement::Bars(
            BarContainer::new(Default::default(), vec![BarPatch::new(-0.4, 0.0, 0.8, 1.0)]),
        ));
        Self {
            figure,
            scene,
            panic_on_snapshot,
        }
    }
}

impl PlottingObservable for FixedHost {
    fn figure_of(&self, axis: AxisId) -> CaptureResult<FigureId> {
        if axis == self.scene.id {
            Ok(self.figure)
        } else {
            Err(CaptureError::AxisNotFound(axis))
        }
    }

    fn axis_scene(&self, axis: AxisId) -> CaptureResult<AxisScene> {
        if self.panic_on_snapshot {
            panic!("snapshot exploded");
        }
        self.figure_of(axis)?;
        Ok(self.scene.clone())
    }
}

fn interceptor(factory: PlotFactory, config: CaptureConfig) -> Interceptor {
    let interceptor = Interceptor::new(Arc::new(FigureRegistry::new()), factory, config)
        .expect("interceptor");
    interceptor
        .declare(CallTarget::base("draw", PlotType::Bar))
        .expect("declare");
    interceptor
}

#[test]
fn host_calls_return_exactly_what_the_native_call_returns() {
    let host = HeadlessHost::standalone(CaptureConfig::default()).expect("host");
    let (_, axis) = host.figure().expect("figure");

    let handle = host.bar(axis, &["a", "b"], &[1.0, 2.0]).expect("bar");
    assert_eq!(handle, PlotHandle { axis, element: 0 });

    let err = host
        .plot(axis, &[0.0, 1.0], &[1.0], None)
        .expect_err("length mismatch propagates");
    assert!(matches!(err, CaptureError::InvalidData(_)));
    assert_eq!(host.interceptor().diagnostics().captures, 1);
}

#[test]
fn failing_capture_never_changes_the_result() {
    let host = FixedHost::new(false);
    let interceptor = interceptor(PlotFactory::empty(), CaptureConfig::default());

    let mut runs = 0;
    let result = interceptor.call(&host, CallSite::new("draw"), || {
        runs += 1;
        host.scene.id
    });

    assert_eq!(result, host.scene.id);
    assert_eq!(runs, 1);
    let diagnostics = interceptor.diagnostics();
    assert_eq!(diagnostics.failures, 1);
    assert_eq!(diagnostics.captures, 0);
    assert!(interceptor.registry().lookup(host.figure).is_none());
}

#[test]
fn panicking_capture_is_contained() {
    let host = FixedHost::new(true);
    let interceptor = interceptor(PlotFactory::standard(), CaptureConfig::default());

    let result = interceptor.call(&host, CallSite::new("draw"), || Some(host.scene.id));

    assert_eq!(result, Some(host.scene.id));
    assert_eq!(interceptor.diagnostics().panics, 1);
    assert!(!ReentrancyContext::is_active(Scope::General));
}

#[test]
fn undeclared_targets_and_disabled_capture_only_run_the_call() {
    let host = FixedHost::new(false);
    let interceptor = interceptor(PlotFactory::standard(), CaptureConfig::default());
    let result = interceptor.call(&host, CallSite::new("not-declared"), || host.scene.id);
    assert_eq!(result, host.scene.id);
    assert_eq!(interceptor.diagnostics().calls, 0);
    assert!(interceptor.registry().is_empty());

    let disabled = self::interceptor(
        PlotFactory::standard(),
        CaptureConfig::default().with_enabled(false),
    );
    let axis = disabled.call(&host, CallSite::new("draw"), || host.scene.id);
    assert_eq!(axis, host.scene.id);
    assert!(disabled.registry().is_empty());
}

#[test]
fn duplicate_declarations_are_rejected() {
    let interceptor = interceptor(PlotFactory::standard(), CaptureConfig::default());
    let err = interceptor
        .declare(CallTarget::statistical("draw", PlotType::Line))
        .expect_err("duplicate");
    assert!(matches!(err, CaptureError::DuplicateTarget(name) if name == "draw"));
}

#[test]
fn invalid_config_is_refused_up_front() {
    let config = CaptureConfig::default().with_box_whisker_factor(f64::NAN);
    let refused = Interceptor::new(
        Arc::new(FigureRegistry::new()),
        PlotFactory::standard(),
        config.clone(),
    );
    assert!(matches!(refused, Err(CaptureError::InvalidData(_))));
    assert!(HeadlessHost::standalone(config).is_err());

    let negative = CaptureConfig::default().with_box_whisker_factor(-1.0);
    assert!(HeadlessHost::standalone(negative).is_err());
}
