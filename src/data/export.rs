use super::model::Dataset;
use crate::error::Result;

pub const DATASET_FILE_NAME: &str = "dataset.csv";

/// Encode the dataset as UTF-8 CSV: one header row, missing cells as empty
/// fields.
pub fn to_csv_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(dataset.columns().iter().map(|c| c.name.as_str()))?;
    for row in 0..dataset.n_rows() {
        writer.write_record(dataset.row(row).into_iter().map(|v| v.to_field()))?;
    }
    writer
        .into_inner()
        .map_err(|e| crate::error::InsightError::Io(e.into_error()))
}
