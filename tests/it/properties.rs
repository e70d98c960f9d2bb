use insight_hub::chart::{build_chart, ChartRequest, XyFields};
use insight_hub::data::aggregate::{group_by, value_counts, AggOp, GroupBySpec};
use insight_hub::data::export::to_csv_bytes;
use insight_hub::data::impute::{impute, FillPolicy};
use insight_hub::data::loader::{load_bytes, SourceFormat};
use insight_hub::data::model::Value;

use crate::helpers::{csv, fixtures};

fn policies() -> Vec<FillPolicy> {
    vec![
        FillPolicy::Zero,
        FillPolicy::Blank,
        FillPolicy::Mean,
        FillPolicy::Median,
        FillPolicy::Custom("filled".into()),
    ]
}

#[test]
fn zero_fill_leaves_nothing_missing() {
    for ds in fixtures() {
        assert_eq!(impute(&ds, &FillPolicy::Zero).unwrap().missing_count(), 0);
    }
}

#[test]
fn imputation_is_idempotent() {
    for ds in fixtures() {
        for policy in policies() {
            let once = impute(&ds, &policy).unwrap();
            let twice = impute(&once, &policy).unwrap();
            assert_eq!(once, twice, "{policy}");
        }
    }
}

#[test]
fn value_counts_are_bounded_and_sorted() {
    for ds in fixtures() {
        for name in ds.column_names() {
            for n in [1, 2, 10] {
                let table = value_counts(&ds, &name, n).unwrap();
                assert!(table.len() <= n);
                assert!(table.entries.iter().all(|(_, c)| *c > 0));
                let total: usize = table.entries.iter().map(|(_, c)| c).sum();
                assert!(total <= ds.n_rows());
                assert!(table.entries.windows(2).all(|w| w[0].1 >= w[1].1));
            }
        }
    }
}

#[test]
fn group_counts_add_up_to_row_count() {
    for ds in fixtures() {
        let names = ds.column_names();
        for key in &names {
            let spec = GroupBySpec {
                keys: vec![key.clone()],
                target: names[names.len() - 1].clone(),
                op: AggOp::Count,
            };
            let result = group_by(&ds, &spec).unwrap();
            let total: f64 = result.rows.iter().filter_map(|(_, v)| v.as_f64()).sum();
            assert_eq!(total as usize, ds.n_rows());
            let keys: Vec<_> = result.rows.iter().map(|(k, _)| k.clone()).collect();
            assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys ascend");
        }
    }
}

#[test]
fn csv_export_round_trips() {
    for ds in fixtures() {
        let bytes = to_csv_bytes(&ds).unwrap();
        let reloaded = load_bytes(&bytes, SourceFormat::Csv).unwrap();
        assert_eq!(reloaded, ds);
    }
}

#[test]
fn empty_aggregation_still_charts() {
    let ds = fixtures().pop().unwrap();
    let spec = GroupBySpec {
        keys: vec!["empty".into()],
        target: "table".into(),
        op: AggOp::Sum,
    };
    let result = group_by(&ds, &spec).unwrap();
    assert!(result.is_empty());
    let chart = build_chart(
        &result.to_dataset(),
        &ChartRequest::Bar(XyFields {
            x: "empty".into(),
            y: "table_sum".into(),
            color: None,
        }),
    )
    .unwrap();
    assert!(chart.is_empty());
}

#[test]
fn exported_fills_reload_as_text_fields() {
    let ds = csv("name,score\na,1\n,\nc,3\n");
    let reload = |policy: FillPolicy| {
        let filled = impute(&ds, &policy).unwrap();
        let reloaded = load_bytes(&to_csv_bytes(&filled).unwrap(), SourceFormat::Csv).unwrap();
        (filled, reloaded)
    };

    // numeric fills on numeric columns survive the round trip
    let (filled, reloaded) = reload(FillPolicy::Mean);
    assert_eq!(reloaded, filled);

    // a zero written into a text column comes back as the text "0"
    let (filled, reloaded) = reload(FillPolicy::Zero);
    assert_eq!(filled.column("name").unwrap().values[1], Value::Number(0.0));
    assert_eq!(reloaded.column("name").unwrap().values[1], Value::Text("0".into()));
    assert_eq!(reloaded.column("score").unwrap(), filled.column("score").unwrap());

    // blanks are empty fields, which read back as missing
    let (filled, reloaded) = reload(FillPolicy::Blank);
    assert_eq!(filled.missing_count(), 0);
    assert_eq!(reloaded.missing_count(), ds.missing_count());
}
