use std::collections::HashSet;
use std::sync::Arc;

use approx::assert_relative_eq;
use chart_a11y::api::{CallSite, CallTarget, CaptureConfig, FigureRegistry, Interceptor};
use chart_a11y::core::{AxisId, BoxStats, FigureId, PlotType};
use chart_a11y::error::CaptureResult;
use chart_a11y::host::headless::PlotHandle;
use chart_a11y::host::{HeadlessHost, PlottingObservable};
use chart_a11y::plot::{PlotData, PlotFactory};
use chart_a11y::scene::{AxisScene, PointCollection, SceneElement};
use proptest::prelude::*;

struct PointsHost {
    figure: FigureId,
    scene: AxisScene,
}

impl PlottingObservable for PointsHost {
    fn figure_of(&self, _axis: AxisId) -> CaptureResult<FigureId> {
        Ok(self.figure)
    }

    fn axis_scene(&self, _axis: AxisId) -> CaptureResult<AxisScene> {
        Ok(self.scene.clone())
    }
}

proptest! {
    #[test]
    fn bar_capture_ids_are_unique_and_cover_every_bar(
        heights in prop::collection::vec(-1.0e6f64..1.0e6, 0..24)
    ) {
        let host = HeadlessHost::standalone(CaptureConfig::default()).expect("host");
        let (figure, axis) = host.figure().expect("figure");

        let handle = host.bar_with(axis, &[], &heights, Default::default()).expect("bar");
        prop_assert_eq!(handle, PlotHandle { axis, element: 0 });

        let document = host.interceptor().document(figure).expect("document");
        let panel = &document.panels[0];
        prop_assert_eq!(panel.element_ids.len(), heights.len());
        let unique: HashSet<&str> = panel.element_ids.iter().map(|id| id.as_str()).collect();
        prop_assert_eq!(unique.len(), heights.len());

        let PlotData::Bar(points) = &panel.data else {
            panic!("expected bar payload");
        };
        for (point, height) in points.iter().zip(&heights) {
            prop_assert_eq!(point.value, Some(*height));
        }
    }

    #[test]
    fn nested_calls_capture_exactly_once(depth in 0usize..12, statistical in any::<bool>()) {
        let figure = FigureId::next();
        let host = PointsHost {
            figure,
            scene: AxisScene::new(AxisId::next(), figure).with_element(SceneElement::Points(
                PointCollection { label: None, offsets: vec![(1.0, 1.0)] },
            )),
        };
        let interceptor = Interceptor::new(
            Arc::new(FigureRegistry::new()),
            PlotFactory::standard(),
            CaptureConfig::default(),
        )
        .expect("interceptor");
        interceptor.declare(CallTarget::base("scatter", PlotType::Scatter)).expect("declare");
        interceptor
            .declare(CallTarget::statistical("stat", PlotType::Scatter))
            .expect("declare");

        fn descend(interceptor: &Interceptor, host: &PointsHost, depth: usize, name: &str) -> AxisId {
            interceptor.call(host, CallSite::new(name), || {
                if depth == 0 {
                    host.scene.id
                } else {
                    descend(interceptor, host, depth - 1, "scatter")
                }
            })
        }

        let outer = if statistical { "stat" } else { "scatter" };
        let axis = descend(&interceptor, &host, depth, outer);

        prop_assert_eq!(axis, host.scene.id);
        let diagnostics = interceptor.diagnostics();
        prop_assert_eq!(diagnostics.captures, 1);
        prop_assert_eq!(diagnostics.suppressed, depth as u64);
        prop_assert_eq!(diagnostics.calls, depth as u64 + 1);
    }

    #[test]
    fn scatter_payload_is_sorted_by_x(
        points in prop::collection::vec((-1.0e3f64..1.0e3, -1.0e3f64..1.0e3), 1..32)
    ) {
        let host = HeadlessHost::standalone(CaptureConfig::default()).expect("host");
        let (figure, axis) = host.figure().expect("figure");
        let xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
        let ys: Vec<f64> = points.iter().map(|(_, y)| *y).collect();
        host.scatter(axis, &xs, &ys).expect("scatter");

        let document = host.interceptor().document(figure).expect("document");
        let PlotData::Scatter(captured) = &document.panels[0].data else {
            panic!("expected scatter payload");
        };
        prop_assert_eq!(captured.len(), points.len());
        for pair in captured.windows(2) {
            prop_assert!(pair[0].x <= pair[1].x);
        }
    }

    #[test]
    fn box_stats_are_ordered(samples in prop::collection::vec(-1.0e4f64..1.0e4, 1..64)) {
        let stats = BoxStats::from_samples(&samples, 1.5).expect("stats");
        prop_assert!(stats.whisker_low <= stats.q1);
        prop_assert!(stats.q1 <= stats.median + 1e-9);
        prop_assert!(stats.median <= stats.q3 + 1e-9);
        prop_assert!(stats.q3 <= stats.whisker_high);
        for flier in &stats.fliers {
            prop_assert!(*flier < stats.whisker_low || *flier > stats.whisker_high);
        }
        let inside = samples
            .iter()
            .filter(|v| **v >= stats.whisker_low && **v <= stats.whisker_high)
            .count();
        prop_assert_eq!(inside + stats.fliers.len(), samples.len());
    }
}

#[test]
fn zero_whisker_factor_pins_whiskers_to_the_box() {
    let stats = BoxStats::from_samples(&[5.0, 1.0, 3.0, 2.0, 4.0], 0.0).expect("stats");
    assert_relative_eq!(stats.whisker_low, stats.q1);
    assert_relative_eq!(stats.whisker_high, stats.q3);
    assert_eq!(stats.fliers, vec![1.0, 5.0]);
}
