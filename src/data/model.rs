use std::cmp::Ordering;
use std::fmt;

use crate::error::{InsightError, Result};

/// Cell tokens read as "no value", following the usual dataframe defaults.
pub const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
///
/// Ordering is total so values can key a `BTreeMap`: numbers sort before
/// text, and missing sorts last.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    fn rank(&self) -> u8 {
        match self {
            Value::Number(_) => 0,
            Value::Text(_) => 1,
            Value::Missing => 2,
        }
    }

    /// Interpret a single literal on its own: missing marker, number, or text.
    pub fn from_literal(s: &str) -> Value {
        if is_missing_token(s) {
            Value::Missing
        } else if let Some(n) = parse_number(s) {
            Value::Number(n)
        } else {
            Value::Text(s.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// The text written to a CSV field; missing cells become empty fields.
    pub fn to_field(&self) -> String {
        match self {
            Value::Missing => String::new(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                unsigned_zero(*a).total_cmp(&unsigned_zero(*b))
            }
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Missing, Value::Missing) => Ordering::Equal,
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Number(v) => unsigned_zero(*v).to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", unsigned_zero(*v)),
            Value::Text(s) => write!(f, "{s}"),
            Value::Missing => write!(f, "<NA>"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}

pub fn is_missing_token(s: &str) -> bool {
    MISSING_MARKERS.contains(&s.trim())
}

pub fn parse_number(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .map(unsigned_zero)
}

/// `-0.0` and `0.0` are the same cell value.
fn unsigned_zero(v: f64) -> f64 {
    v + 0.0
}

// ---------------------------------------------------------------------------
// DType – column type as reported to the user
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Int64,
    Float64,
    Object,
}

impl DType {
    pub fn is_numeric(self) -> bool {
        !matches!(self, DType::Object)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Object => "object",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Infer a column from raw cell text: numeric when every present cell
    /// parses as a number, text otherwise.
    pub fn infer(name: impl Into<String>, raw: Vec<Option<String>>) -> Self {
        let numeric = raw
            .iter()
            .flatten()
            .all(|cell| parse_number(cell).is_some());

        let values = raw
            .into_iter()
            .map(|cell| match cell {
                None => Value::Missing,
                Some(s) if numeric => parse_number(&s).map_or(Value::Missing, Value::Number),
                Some(s) => Value::Text(s),
            })
            .collect();
        Column::new(name, values)
    }

    /// Derived from the current cells, so it follows imputation.
    pub fn dtype(&self) -> DType {
        let mut all_integral = true;
        let mut any_missing = false;
        for value in &self.values {
            match value {
                Value::Number(v) => all_integral &= v.fract() == 0.0 && v.is_finite(),
                Value::Text(_) => return DType::Object,
                Value::Missing => any_missing = true,
            }
        }
        if all_integral && !any_missing && !self.values.is_empty() {
            DType::Int64
        } else {
            DType::Float64
        }
    }

    /// Observed numeric values, in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Ordered named columns of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Build a dataset, rejecting columns of unequal length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            if let Some(bad) = columns.iter().find(|c| c.len() != first.len()) {
                return Err(InsightError::format(format!(
                    "column '{}' has {} rows but '{}' has {}",
                    bad.name,
                    bad.len(),
                    first.name,
                    first.len()
                )));
            }
        }
        Ok(Dataset { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn dtypes(&self) -> Vec<(String, DType)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.dtype()))
            .collect()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| InsightError::ColumnNotFound(name.to_string()))
    }

    /// Total number of missing cells across all columns.
    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    /// The cells of row `idx`, in column order.
    pub fn row(&self, idx: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values[idx]).collect()
    }

    /// First `n` rows; `n` is clamped to `[1, n_rows]`.
    pub fn head(&self, n: usize) -> Dataset {
        let n = n.clamp(1, self.n_rows().max(1)).min(self.n_rows());
        self.slice(0, n)
    }

    /// Last `n` rows; `n` is clamped to `[1, n_rows]`.
    pub fn tail(&self, n: usize) -> Dataset {
        let rows = self.n_rows();
        let n = n.clamp(1, rows.max(1)).min(rows);
        self.slice(rows - n, rows)
    }

    fn slice(&self, start: usize, end: usize) -> Dataset {
        Dataset {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.values[start..end].to_vec()))
                .collect(),
        }
    }
}
