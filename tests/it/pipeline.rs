use insight_hub::chart::{ChartBody, ChartKind, ChartRequest, XyFields};
use insight_hub::data::aggregate::{AggOp, GroupBySpec};
use insight_hub::data::impute::FillPolicy;
use insight_hub::data::model::Value;
use insight_hub::session::{Action, ChartSource, Output};
use insight_hub::InsightError;

use crate::helpers::{session_with, CITY_SALES};

#[test]
fn city_sales_scenario() {
    let session = session_with(CITY_SALES);

    let (session, output) = session.apply(Action::Fill(FillPolicy::Mean)).unwrap();
    let Output::Summary(report) = output else {
        panic!("fill reports a summary");
    };
    assert_eq!(report.missing_cells, 0);
    assert_eq!(
        session.dataset().unwrap().column("sales").unwrap().values,
        vec![Value::Number(10.0), Value::Number(20.0), Value::Number(30.0)]
    );

    let (session, output) = session
        .apply(Action::ValueCounts {
            column: "city".into(),
            top_n: 5,
        })
        .unwrap();
    let Output::Frequency(table) = output else {
        panic!("expected a frequency table");
    };
    assert_eq!(table.count_of(&Value::Text("A".into())), Some(2));
    assert_eq!(table.count_of(&Value::Text("B".into())), Some(1));

    let (session, output) = session
        .apply(Action::GroupBy(GroupBySpec {
            keys: vec!["city".into()],
            target: "sales".into(),
            op: AggOp::Sum,
        }))
        .unwrap();
    let Output::Aggregation(result) = output else {
        panic!("expected an aggregation");
    };
    assert_eq!(result.get(&[Value::Text("A".into())]), Some(&Value::Number(40.0)));
    assert_eq!(result.get(&[Value::Text("B".into())]), Some(&Value::Number(20.0)));

    let (session, output) = session
        .apply(Action::BuildChart {
            source: ChartSource::Aggregation,
            request: ChartRequest::Pie {
                names: "city".into(),
                values: "sales_sum".into(),
            },
        })
        .unwrap();
    let Output::Chart(chart) = output else {
        panic!("expected a chart");
    };
    assert_eq!(chart.kind, ChartKind::Pie);
    let ChartBody::Pie(slices) = &chart.body else {
        panic!("expected pie slices");
    };
    assert_eq!(slices.len(), 2);

    let mut session = session;
    session.settings.chart_width = 400;
    session.settings.chart_height = 300;
    let (_, output) = session.apply(Action::ExportChart).unwrap();
    let Output::Download(png) = output else {
        panic!("expected a download");
    };
    assert_eq!(png.file_name, "pie_chart.png");
    assert!(png.bytes.starts_with(b"\x89PNG"));
}

#[test]
fn csv_download_has_fixed_name() {
    let session = session_with(CITY_SALES);
    let (_, output) = session.apply(Action::ExportCsv).unwrap();
    let Output::Download(artifact) = output else {
        panic!("expected a download");
    };
    assert_eq!(artifact.file_name, "dataset.csv");
    assert_eq!(artifact.mime, "text/csv");
    assert_eq!(artifact.bytes, CITY_SALES);
}

#[test]
fn chart_from_frequency_table() {
    let session = session_with(CITY_SALES);
    let (session, _) = session
        .apply(Action::ValueCounts {
            column: "city".into(),
            top_n: 1,
        })
        .unwrap();
    let (_, output) = session
        .apply(Action::BuildChart {
            source: ChartSource::Frequency,
            request: ChartRequest::Line(XyFields {
                x: "city".into(),
                y: "count".into(),
                color: None,
            }),
        })
        .unwrap();
    let Output::Chart(chart) = output else {
        panic!("expected a chart");
    };
    let ChartBody::Cartesian(c) = &chart.body else {
        panic!("expected a cartesian chart");
    };
    assert_eq!(c.series[0].points, vec![(0.0, 2.0)]);
}

#[test]
fn errors_leave_the_session_usable() {
    let session = session_with(CITY_SALES);

    let err = session
        .apply(Action::GroupBy(GroupBySpec {
            keys: vec!["city".into()],
            target: "city".into(),
            op: AggOp::Mean,
        }))
        .unwrap_err();
    assert!(matches!(err, InsightError::Type(_)));

    let err = session
        .apply(Action::ValueCounts {
            column: "country".into(),
            top_n: 3,
        })
        .unwrap_err();
    assert!(matches!(err, InsightError::ColumnNotFound(_)));

    let err = session
        .apply(Action::Load {
            file_name: "broken.csv".into(),
            bytes: b"a,b\n1\n".to_vec(),
        })
        .unwrap_err();
    assert!(matches!(err, InsightError::Format(_)));

    // still the original dataset, and still usable
    assert_eq!(session.dataset().unwrap().n_rows(), 3);
    assert!(session.apply(Action::Fill(FillPolicy::Zero)).is_ok());
}

#[test]
fn chart_requires_a_source_table() {
    let session = session_with(CITY_SALES);
    let err = session
        .apply(Action::BuildChart {
            source: ChartSource::Aggregation,
            request: ChartRequest::Bar(XyFields {
                x: "city".into(),
                y: "sales".into(),
                color: None,
            }),
        })
        .unwrap_err();
    assert!(matches!(err, InsightError::Validation(_)));
}
