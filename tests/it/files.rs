use std::io::Write;

use insight_hub::data::export::to_csv_bytes;
use insight_hub::data::loader::{load_bytes, load_file, SourceFormat};
use insight_hub::data::model::{DType, Value};
use insight_hub::session::{Action, Session};

/// Five columns, four orders, and a few empty or `NA` cells.
const ORDERS_XLSX: &[u8] = include_bytes!("fixtures/orders.xlsx");

#[test]
fn loads_csv_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"region,units\nN,3\nS,\nN,4\n").unwrap();
    drop(file);

    let ds = load_file(&path).unwrap();
    assert_eq!(ds.n_rows(), 3);
    assert_eq!(ds.missing_count(), 1);

    let exported = to_csv_bytes(&ds).unwrap();
    let out = dir.path().join("dataset.csv");
    std::fs::write(&out, &exported).unwrap();
    assert_eq!(load_file(&out).unwrap(), ds);
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.json");
    std::fs::write(&path, "[]").unwrap();
    let err = load_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("unsupported file extension"));
}

#[test]
fn missing_file_reports_path() {
    let err = load_file(std::path::Path::new("/no/such/dir/data.csv")).unwrap_err();
    assert!(format!("{err:#}").contains("data.csv"));
}

#[test]
fn reads_first_worksheet_of_a_workbook() {
    let ds = load_bytes(ORDERS_XLSX, SourceFormat::Xlsx).unwrap();
    assert_eq!(ds.column_names(), vec!["order", "region", "units", "price", "note"]);
    assert_eq!(ds.n_rows(), 4);

    let dtypes: Vec<DType> = ds.dtypes().into_iter().map(|(_, t)| t).collect();
    assert_eq!(
        dtypes,
        vec![DType::Int64, DType::Object, DType::Float64, DType::Float64, DType::Object]
    );

    assert_eq!(ds.column("units").unwrap().missing_count(), 1);
    assert_eq!(ds.column("price").unwrap().missing_count(), 1);
    // the literal NA string is a missing marker too
    assert_eq!(ds.column("note").unwrap().missing_count(), 2);
    assert_eq!(ds.missing_count(), 4);

    assert_eq!(ds.column("price").unwrap().numbers(), vec![9.5, 12.0, 4.25]);
    assert_eq!(ds.column("region").unwrap().values[2], Value::Text("East".into()));
}

#[test]
fn workbook_upload_through_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Orders.XLSX");
    std::fs::write(&path, ORDERS_XLSX).unwrap();
    assert_eq!(load_file(&path).unwrap().n_rows(), 4);

    let (session, _) = Session::default()
        .apply(Action::Load {
            file_name: "orders.xlsx".into(),
            bytes: ORDERS_XLSX.to_vec(),
        })
        .unwrap();
    let report = session.summary().unwrap();
    assert_eq!(report.missing_cells, 4);
    assert_eq!(report.stats.len(), 3);
}
