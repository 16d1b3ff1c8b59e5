use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use chart_a11y::api::{CallSite, CallTarget, CaptureConfig, FigureRegistry, Interceptor};
use chart_a11y::core::{AxisId, FigureId, PlotType};
use chart_a11y::error::{CaptureError, CaptureResult};
use chart_a11y::host::{HeadlessHost, PlottingObservable};
use chart_a11y::plot::{PlotData, PlotFactory};
use chart_a11y::scene::{AxisScene, Line2D, SceneElement};
use chart_a11y::{ReentrancyContext, Scope};

struct LineHost {
    figure: FigureId,
    scene: AxisScene,
}

impl LineHost {
    fn new() -> Self {
        let figure = FigureId::next();
        let scene = AxisScene::new(AxisId::next(), figure).with_element(SceneElement::Line(
            Line2D::new(vec![(0.0, 1.0), (1.0, 2.0)]),
        ));
        Self { figure, scene }
    }
}

impl PlottingObservable for LineHost {
    fn figure_of(&self, _axis: AxisId) -> CaptureResult<FigureId> {
        Ok(self.figure)
    }

    fn axis_scene(&self, _axis: AxisId) -> CaptureResult<AxisScene> {
        Ok(self.scene.clone())
    }
}

fn line_interceptor() -> Interceptor {
    let interceptor = Interceptor::new(
        Arc::new(FigureRegistry::new()),
        PlotFactory::standard(),
        CaptureConfig::default(),
    )
    .expect("interceptor");
    interceptor
        .declare_all([
            CallTarget::base("plot", PlotType::Line),
            CallTarget::statistical("lineplot", PlotType::Line),
        ])
        .expect("declare");
    interceptor
}

fn nested(interceptor: &Interceptor, host: &LineHost, depth: usize) -> AxisId {
    interceptor.call(host, CallSite::new("plot"), || {
        if depth == 0 {
            host.scene.id
        } else {
            nested(interceptor, host, depth - 1)
        }
    })
}

#[test]
fn statistical_box_plot_is_captured_once() {
    let host = HeadlessHost::standalone(CaptureConfig::default()).expect("host");
    let (figure, axis) = host.figure().expect("figure");

    host.stat_boxplot(axis, &[("a", vec![1.0, 2.0, 3.0]), ("b", vec![2.0, 4.0, 6.0])])
        .expect("stat boxplot");

    let diagnostics = host.interceptor().diagnostics();
    assert_eq!(diagnostics.calls, 3);
    assert_eq!(diagnostics.captures, 1);
    assert_eq!(diagnostics.suppressed, 2);

    let document = host.interceptor().document(figure).expect("document");
    assert_eq!(document.panels.len(), 1);
    assert_eq!(document.panels[0].plot_type, PlotType::Box);
    let PlotData::Box(boxes) = &document.panels[0].data else {
        panic!("expected box payload");
    };
    let fills: Vec<&str> = boxes.iter().map(|b| b.fill.as_str()).collect();
    assert_eq!(fills, vec!["a", "b"]);
}

#[test]
fn nested_base_calls_produce_a_single_capture() {
    let host = LineHost::new();
    let interceptor = line_interceptor();

    let axis = nested(&interceptor, &host, 5);

    assert_eq!(axis, host.scene.id);
    let diagnostics = interceptor.diagnostics();
    assert_eq!(diagnostics.calls, 6);
    assert_eq!(diagnostics.captures, 1);
    assert_eq!(diagnostics.suppressed, 5);
    assert_eq!(ReentrancyContext::depth(Scope::General), 0);
}

#[test]
fn statistical_call_falls_back_to_axis_reported_by_inner_calls() {
    let host = LineHost::new();
    let interceptor = line_interceptor();

    interceptor.call(&host, CallSite::new("lineplot"), || {
        nested(&interceptor, &host, 0);
    });

    assert_eq!(interceptor.diagnostics().captures, 1);
    let aggregate = interceptor.registry().lookup(host.figure).expect("aggregate");
    assert_eq!(aggregate.records_for_axis(host.scene.id).count(), 1);
    assert!(ReentrancyContext::take_sublayer_axes().is_empty());
}

#[test]
fn context_unwinds_after_error_results() {
    let host = LineHost::new();
    let interceptor = line_interceptor();

    let result: CaptureResult<AxisId> = interceptor.call(&host, CallSite::new("lineplot"), || {
        Err(CaptureError::InvalidData("bad input".to_owned()))
    });

    assert!(result.is_err());
    let diagnostics = interceptor.diagnostics();
    assert_eq!(diagnostics.calls, 1);
    assert_eq!(diagnostics.captures, 0);
    assert_eq!(diagnostics.failures, 0);
    assert!(interceptor.registry().lookup(host.figure).is_none());
    for scope in Scope::ALL {
        assert!(!ReentrancyContext::is_active(scope));
    }
}

#[test]
fn failing_inner_call_unwinds_and_leaves_no_partial_record() {
    let host = HeadlessHost::standalone(CaptureConfig::default()).expect("host");
    let (figure, axis) = host.figure().expect("figure");
    host.interceptor()
        .declare(CallTarget::statistical("two_bars", PlotType::Bar))
        .expect("declare");

    let result = host.interceptor().call(&host, CallSite::new("two_bars"), || {
        host.bar(axis, &["a"], &[1.0])?;
        host.bar(axis, &["a", "b"], &[1.0])
    });

    assert!(matches!(result, Err(CaptureError::InvalidData(_))));
    for scope in Scope::ALL {
        assert_eq!(ReentrancyContext::depth(scope), 0);
    }
    assert!(ReentrancyContext::take_sublayer_axes().is_empty());
    let diagnostics = host.interceptor().diagnostics();
    assert_eq!(diagnostics.calls, 3);
    assert_eq!(diagnostics.suppressed, 2);
    assert_eq!(diagnostics.captures, 0);
    assert_eq!(diagnostics.failures, 0);
    assert!(host.registry().lookup(figure).is_none());

    host.bar(axis, &["c"], &[2.0]).expect("bar after failure");
    assert_eq!(host.interceptor().diagnostics().captures, 1);
    assert_eq!(host.registry().lookup(figure).map(|a| a.len()), Some(1));
}

#[test]
fn context_unwinds_after_panicking_native_call() {
    let host = LineHost::new();
    let interceptor = line_interceptor();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        interceptor.call(&host, CallSite::new("lineplot"), || -> AxisId {
            panic!("native call failed")
        })
    }));

    assert!(outcome.is_err());
    for scope in Scope::ALL {
        assert_eq!(ReentrancyContext::depth(scope), 0);
    }

    let axis = nested(&interceptor, &host, 1);
    assert_eq!(axis, host.scene.id);
    assert_eq!(interceptor.diagnostics().captures, 1);
}

#[test]
fn calls_inside_highlight_scope_are_not_captured() {
    let host = LineHost::new();
    let interceptor = line_interceptor();

    {
        let _highlight = ReentrancyContext::enter(Scope::Highlight);
        nested(&interceptor, &host, 0);
    }

    let diagnostics = interceptor.diagnostics();
    assert_eq!(diagnostics.captures, 0);
    assert_eq!(diagnostics.suppressed, 1);
    assert!(interceptor.registry().lookup(host.figure).is_none());
}

#[test]
fn raw_exit_without_enter_is_reported() {
    let err = ReentrancyContext::exit_raw(Scope::Sublayer).expect_err("imbalance");
    assert!(matches!(
        err,
        CaptureError::ReentrancyImbalance {
            scope: Scope::Sublayer
        }
    ));

    assert!(ReentrancyContext::enter_raw(Scope::Sublayer));
    assert!(!ReentrancyContext::enter_raw(Scope::Sublayer));
    ReentrancyContext::exit_raw(Scope::Sublayer).expect("inner exit");
    ReentrancyContext::exit_raw(Scope::Sublayer).expect("outer exit");
    assert!(!ReentrancyContext::is_active(Scope::Sublayer));
}
