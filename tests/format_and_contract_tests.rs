use chart_a11y::api::{
    CaptureConfig, DEFAULT_SMOOTH_KEYWORDS, FIGURE_DOCUMENT_JSON_SCHEMA_V1, FigureDocument,
    InterceptorDiagnostics,
};
use chart_a11y::core::PlotType;
use chart_a11y::error::CaptureError;
use chart_a11y::extract::{FormatKind, format_config};
use chart_a11y::host::HeadlessHost;
use chart_a11y::host::headless::AxisSide;
use chart_a11y::scene::AxisFormatter;

fn sample_document() -> FigureDocument {
    let host = HeadlessHost::standalone(CaptureConfig::default()).expect("host");
    let grid = host.subplots(1, 2).expect("subplots");
    host.suptitle(grid.figure, "Sales").expect("suptitle");
    host.set_formatter(
        grid.axes[0],
        AxisSide::Y,
        AxisFormatter::Percent { decimals: Some(1) },
    )
    .expect("formatter");
    host.bar(grid.axes[0], &["a", "b"], &[0.25, f64::NAN]).expect("bar");
    host.boxplot(grid.axes[1], &[vec![1.0, 2.0, 3.0, 4.0, 100.0]], &["x"])
        .expect("boxplot");
    host.plot(grid.axes[1], &[0.0, 1.0], &[2.0, 3.0], Some("trend"))
        .expect("line");
    host.interceptor().document(grid.figure).expect("document")
}

#[test]
fn figure_document_contract_round_trip() {
    let document = sample_document();
    let json = document.to_json_contract_v1_pretty().expect("serialize");

    let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
    assert_eq!(value["schema_version"], FIGURE_DOCUMENT_JSON_SCHEMA_V1);
    assert_eq!(value["document"]["title"], "Sales");
    assert_eq!(value["document"]["layout"]["multiLayer"], true);

    let restored = FigureDocument::from_json_compat_str(&json).expect("restore");
    assert_eq!(restored, document);
}

#[test]
fn bare_document_json_is_accepted() {
    let document = sample_document();
    let json = document.to_json_pretty().expect("serialize");
    let restored = FigureDocument::from_json_compat_str(&json).expect("restore");
    assert_eq!(restored.panels.len(), 3);
    assert_eq!(restored.panels[1].plot_type, PlotType::Box);
    assert_eq!(restored, document);
}

#[test]
fn missing_values_serialize_as_null() {
    let document = sample_document();
    let value: serde_json::Value =
        serde_json::from_str(&document.to_json_pretty().expect("serialize")).expect("parse");
    let bars = &value["panels"][0]["data"];
    assert_eq!(bars[0]["value"], 0.25);
    assert!(bars[1]["value"].is_null());
    assert_eq!(value["panels"][0]["format"]["y"]["type"], "percent");
    assert_eq!(value["panels"][0]["format"]["y"]["decimals"], 1);
    assert_eq!(value["panels"][1]["data"][0]["upperOutliers"][0], 100.0);
}

#[test]
fn unsupported_schema_versions_are_rejected() {
    let document = sample_document();
    let mut value: serde_json::Value =
        serde_json::from_str(&document.to_json_contract_v1_pretty().expect("serialize"))
            .expect("parse");
    value["schema_version"] = serde_json::json!(99);
    let err = FigureDocument::from_json_compat_str(&value.to_string()).expect_err("version");
    assert!(matches!(err, CaptureError::InvalidData(message) if message.contains("99")));

    let err = FigureDocument::from_json_compat_str("{\"panels\": 3}").expect_err("garbage");
    assert!(matches!(err, CaptureError::InvalidData(_)));
}

#[test]
fn panel_payload_must_match_its_plot_type() {
    let input = serde_json::json!({
        "schemaVersion": 1,
        "id": "doc",
        "layout": {"rows": 1, "cols": 1, "multiPanel": false, "multiLayer": false},
        "panels": [{
            "plotType": "BOX",
            "row": 0,
            "col": 0,
            "data": [{"category": "a", "value": 1.0}]
        }]
    });
    assert!(FigureDocument::from_json_compat_str(&input.to_string()).is_err());

    let ok = serde_json::json!({
        "schemaVersion": 1,
        "id": "doc",
        "layout": {"rows": 1, "cols": 1, "multiPanel": false, "multiLayer": false},
        "panels": [{
            "plotType": "COUNT",
            "row": 0,
            "col": 0,
            "data": [{"category": "a", "value": 1.0}]
        }]
    });
    let document = FigureDocument::from_json_compat_str(&ok.to_string()).expect("count panel");
    assert_eq!(document.panels[0].version, 1);
    assert!(document.panels[0].element_ids.is_empty());
}

#[test]
fn diagnostics_contract_round_trip() {
    let diagnostics = InterceptorDiagnostics {
        calls: 5,
        captures: 3,
        suppressed: 2,
        failures: 1,
        panics: 0,
    };
    let json = diagnostics.to_json_contract_v1_pretty().expect("serialize");
    let restored = InterceptorDiagnostics::from_json_compat_str(&json).expect("restore");
    assert_eq!(restored, diagnostics);
}

#[test]
fn plot_type_tags_parse_and_print() {
    for plot_type in PlotType::ALL {
        let tag = plot_type.as_str();
        assert_eq!(tag.parse::<PlotType>().expect("known tag"), plot_type);
        assert_eq!(
            serde_json::to_value(plot_type).expect("serialize"),
            serde_json::json!(tag)
        );
    }
    let err = "VIOLIN".parse::<PlotType>().expect_err("unknown tag");
    assert!(matches!(err, CaptureError::UnsupportedPlotType(tag) if tag == "VIOLIN"));
}

#[test]
fn config_parses_with_defaults_and_validates() {
    let config = CaptureConfig::from_json_str(r#"{"highlight": false}"#).expect("config");
    assert!(!config.highlight);
    assert!(config.enabled);
    assert_eq!(config.default_x_label, "X");
    assert_eq!(config.smooth_keywords.len(), DEFAULT_SMOOTH_KEYWORDS.len());

    let err = CaptureConfig::from_json_str(r#"{"box_whisker_factor": -1.0}"#).expect_err("factor");
    assert!(matches!(err, CaptureError::InvalidData(_)));
    assert!(CaptureConfig::from_json_str(r#"{"smooth_keywords": [" "]}"#).is_err());

    let custom = CaptureConfig::default()
        .with_default_fill_label("Group")
        .with_smooth_keywords(["trend"]);
    let restored =
        CaptureConfig::from_json_str(&custom.to_json_pretty().expect("serialize")).expect("parse");
    assert_eq!(restored, custom);
}

#[test]
fn formatter_detection_covers_common_patterns() {
    let currency = format_config(&AxisFormatter::StrMethod("£{x:,.0f}".to_owned()))
        .expect("currency");
    assert_eq!(currency.kind, FormatKind::Currency);
    assert_eq!(currency.currency.as_deref(), Some("GBP"));
    assert_eq!(currency.decimals, Some(0));

    let date = format_config(&AxisFormatter::Date("%b %Y".to_owned())).expect("date");
    assert_eq!(date.kind, FormatKind::Date);
    assert_eq!(date.date_format.as_deref(), Some("%b %Y"));

    assert!(format_config(&AxisFormatter::Func {
        name: "lambda".to_owned()
    })
    .is_none());
}
