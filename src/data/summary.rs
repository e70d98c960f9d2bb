use super::model::{DType, Dataset};

/// Descriptive statistics for one numeric column.
///
/// Every statistic is `None` when it is undefined for the observed values
/// (no observations, or fewer than two for `std`).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Immutable snapshot describing a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub rows: usize,
    pub columns: usize,
    pub missing_cells: usize,
    pub missing_per_column: Vec<(String, usize)>,
    pub stats: Vec<ColumnStats>,
    pub dtypes: Vec<(String, DType)>,
}

impl SummaryReport {
    pub fn column_names(&self) -> Vec<&str> {
        self.dtypes.iter().map(|(name, _)| name.as_str()).collect()
    }
}

/// Compute the summary report of a dataset.
pub fn summarize(dataset: &Dataset) -> SummaryReport {
    let stats = dataset
        .columns()
        .iter()
        .filter(|c| c.dtype().is_numeric())
        .map(|c| describe(&c.name, c.numbers()))
        .collect();

    SummaryReport {
        rows: dataset.n_rows(),
        columns: dataset.n_cols(),
        missing_cells: dataset.missing_count(),
        missing_per_column: dataset
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.missing_count()))
            .collect(),
        stats,
        dtypes: dataset.dtypes(),
    }
}

/// Statistics over observed values of one column.
pub fn describe(column: &str, mut values: Vec<f64>) -> ColumnStats {
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let mean = mean(&values);
    let std = match (mean, count) {
        (Some(m), n) if n > 1 => {
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            Some((ss / (n - 1) as f64).sqrt())
        }
        _ => None,
    };

    ColumnStats {
        column: column.to_string(),
        count,
        mean,
        std,
        min: values.first().copied(),
        q25: quantile_sorted(&values, 0.25),
        median: quantile_sorted(&values, 0.5),
        q75: quantile_sorted(&values, 0.75),
        max: values.last().copied(),
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, 0.5)
}

/// Linear interpolation between closest ranks over already-sorted values.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let rank = p * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        Some(sorted[lo])
    } else {
        let weight = rank - lo as f64;
        Some(sorted[lo] * (1.0 - weight) + sorted[hi] * weight)
    }
}
