use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::model::{Column, DType, Dataset, Value};
use super::summary::{mean, median};
use crate::error::{InsightError, Result};

// ---------------------------------------------------------------------------
// Value counts
// ---------------------------------------------------------------------------

/// Distinct values of one column with their occurrence counts, most frequent
/// first.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    pub column: String,
    pub entries: Vec<(Value, usize)>,
}

impl FrequencyTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_of(&self, value: &Value) -> Option<usize> {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, n)| *n)
    }

    /// Two-column table: `<column>` and `count`.
    pub fn to_dataset(&self) -> Dataset {
        let count_name = if self.column == "count" { "count.1" } else { "count" };
        Dataset::new(vec![
            Column::new(
                self.column.clone(),
                self.entries.iter().map(|(v, _)| v.clone()).collect(),
            ),
            Column::new(
                count_name,
                self.entries
                    .iter()
                    .map(|(_, n)| Value::Number(*n as f64))
                    .collect(),
            ),
        ])
        .unwrap_or_default()
    }
}

/// Count occurrences of each observed value of `column`, keeping the `top_n`
/// most frequent. Ties keep first-seen order.
pub fn value_counts(dataset: &Dataset, column: &str, top_n: usize) -> Result<FrequencyTable> {
    let col = dataset.column(column)?;
    let top_n = top_n.max(1);

    let mut order: Vec<Value> = Vec::new();
    let mut counts: HashMap<&Value, usize> = HashMap::new();
    for value in col.values.iter().filter(|v| !v.is_missing()) {
        let n = counts.entry(value).or_insert(0);
        if *n == 0 {
            order.push(value.clone());
        }
        *n += 1;
    }

    let mut entries: Vec<(Value, usize)> = order
        .into_iter()
        .map(|v| {
            let n = counts[&v];
            (v, n)
        })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(top_n);

    Ok(FrequencyTable {
        column: column.to_string(),
        entries,
    })
}

// ---------------------------------------------------------------------------
// Groupby aggregation
// ---------------------------------------------------------------------------

/// Reduction applied to the target column of each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggOp {
    Max,
    Sum,
    Min,
    Mean,
    Median,
    Count,
}

impl AggOp {
    pub const ALL: [AggOp; 6] = [
        AggOp::Max,
        AggOp::Sum,
        AggOp::Min,
        AggOp::Mean,
        AggOp::Median,
        AggOp::Count,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AggOp::Max => "max",
            AggOp::Sum => "sum",
            AggOp::Min => "min",
            AggOp::Mean => "mean",
            AggOp::Median => "median",
            AggOp::Count => "count",
        }
    }

    fn needs_numeric(self) -> bool {
        matches!(self, AggOp::Sum | AggOp::Mean | AggOp::Median)
    }

    fn reduce(self, cells: &[&Value]) -> Value {
        let observed = || cells.iter().filter(|v| !v.is_missing());
        let numbers = || cells.iter().filter_map(|v| v.as_f64()).collect::<Vec<_>>();
        match self {
            AggOp::Count => Value::Number(cells.len() as f64),
            AggOp::Max => observed().max().map_or(Value::Missing, |v| (*v).clone()),
            AggOp::Min => observed().min().map_or(Value::Missing, |v| (*v).clone()),
            AggOp::Sum => Value::Number(numbers().iter().fold(0.0, |acc, v| acc + v)),
            AggOp::Mean => mean(&numbers()).into(),
            AggOp::Median => median(&numbers()).into(),
        }
    }
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which columns to group by, which to reduce, and how.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBySpec {
    pub keys: Vec<String>,
    pub target: String,
    pub op: AggOp,
}

/// One row per distinct key tuple, ascending by key.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub key_columns: Vec<String>,
    pub value_column: String,
    pub rows: Vec<(Vec<Value>, Value)>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reduced value for an exact key tuple.
    pub fn get(&self, key: &[Value]) -> Option<&Value> {
        self.rows
            .iter()
            .find(|(k, _)| k.as_slice() == key)
            .map(|(_, v)| v)
    }

    pub fn to_dataset(&self) -> Dataset {
        let mut columns: Vec<Column> = self
            .key_columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Column::new(
                    name.clone(),
                    self.rows.iter().map(|(k, _)| k[i].clone()).collect(),
                )
            })
            .collect();
        columns.push(Column::new(
            self.value_column.clone(),
            self.rows.iter().map(|(_, v)| v.clone()).collect(),
        ));
        Dataset::new(columns).unwrap_or_default()
    }
}

/// Group rows by `spec.keys` and reduce `spec.target` with `spec.op`.
///
/// Missing key cells form their own group, so `count` always adds up to the
/// dataset's row count.
pub fn group_by(dataset: &Dataset, spec: &GroupBySpec) -> Result<AggregationResult> {
    if spec.keys.is_empty() {
        return Err(InsightError::validation("choose at least one column to group by"));
    }
    let key_cols: Vec<&Column> = spec
        .keys
        .iter()
        .map(|k| dataset.column(k))
        .collect::<Result<_>>()?;
    let target = dataset.column(&spec.target)?;

    if spec.op.needs_numeric() && target.dtype() == DType::Object {
        return Err(InsightError::Type(format!(
            "'{}' is not numeric; cannot compute {}",
            spec.target, spec.op
        )));
    }

    let mut groups: BTreeMap<Vec<Value>, Vec<&Value>> = BTreeMap::new();
    for row in 0..dataset.n_rows() {
        let key: Vec<Value> = key_cols.iter().map(|c| c.values[row].clone()).collect();
        groups.entry(key).or_default().push(&target.values[row]);
    }

    let rows: Vec<(Vec<Value>, Value)> = groups
        .into_iter()
        .map(|(key, cells)| {
            let reduced = spec.op.reduce(&cells);
            (key, reduced)
        })
        .collect();

    log::info!(
        "grouped by {:?}: {} groups, {}({})",
        spec.keys,
        rows.len(),
        spec.op,
        spec.target
    );

    Ok(AggregationResult {
        key_columns: spec.keys.clone(),
        value_column: format!("{}_{}", spec.target, spec.op),
        rows,
    })
}
