use std::fmt;

use super::model::{Column, Dataset, Value};
use super::summary::{mean, median};
use crate::error::{InsightError, Result};

/// How missing cells are filled.
#[derive(Debug, Clone, PartialEq)]
pub enum FillPolicy {
    /// Numeric zero everywhere.
    Zero,
    /// Empty text everywhere.
    Blank,
    /// Column mean; text columns are left alone.
    Mean,
    /// Column median; text columns are left alone.
    Median,
    /// A user-supplied literal, inferred like an uploaded cell.
    Custom(String),
}

impl FillPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            FillPolicy::Zero => "Zero",
            FillPolicy::Blank => "Blank",
            FillPolicy::Mean => "Mean",
            FillPolicy::Median => "Median",
            FillPolicy::Custom(_) => "Custom",
        }
    }
}

impl fmt::Display for FillPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillPolicy::Custom(v) => write!(f, "Custom({v})"),
            other => f.write_str(other.label()),
        }
    }
}

/// Return a copy of `dataset` with missing cells filled per `policy`.
///
/// Re-applying the same policy to the result changes nothing.
pub fn impute(dataset: &Dataset, policy: &FillPolicy) -> Result<Dataset> {
    let custom = match policy {
        FillPolicy::Custom(literal) if literal.trim().is_empty() => {
            return Err(InsightError::validation("custom fill value is empty"));
        }
        FillPolicy::Custom(literal) => match Value::from_literal(literal) {
            // A literal that spells a missing marker is kept verbatim.
            Value::Missing => Some(Value::Text(literal.clone())),
            v => Some(v),
        },
        _ => None,
    };

    let mut filled = dataset.clone();
    let mut changed = 0;
    for column in filled.columns_mut() {
        if column.missing_count() == 0 {
            continue;
        }
        let Some(replacement) = replacement_for(column, policy, custom.as_ref()) else {
            log::debug!("'{}': no {} fill value, left as is", column.name, policy.label());
            continue;
        };
        for cell in column.values.iter_mut().filter(|v| v.is_missing()) {
            *cell = replacement.clone();
            changed += 1;
        }
    }

    log::info!("filled {changed} missing cells with policy {policy}");
    Ok(filled)
}

fn replacement_for(column: &Column, policy: &FillPolicy, custom: Option<&Value>) -> Option<Value> {
    match policy {
        FillPolicy::Zero => Some(Value::Number(0.0)),
        FillPolicy::Blank => Some(Value::Text(String::new())),
        FillPolicy::Mean if column.dtype().is_numeric() => mean(&column.numbers()).map(Value::Number),
        FillPolicy::Median if column.dtype().is_numeric() => {
            median(&column.numbers()).map(Value::Number)
        }
        FillPolicy::Mean | FillPolicy::Median => None,
        FillPolicy::Custom(_) => custom.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new("city", vec!["A".into(), Value::Missing, "A".into()]),
            Column::new(
                "sales",
                vec![Value::Number(10.0), Value::Missing, Value::Number(30.0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn zero_clears_every_missing_cell() {
        let filled = impute(&sample(), &FillPolicy::Zero).unwrap();
        assert_eq!(filled.missing_count(), 0);
        assert_eq!(filled.column("city").unwrap().values[1], Value::Number(0.0));
    }

    #[test]
    fn blank_fills_with_empty_text() {
        let filled = impute(&sample(), &FillPolicy::Blank).unwrap();
        assert_eq!(filled.missing_count(), 0);
        assert_eq!(filled.column("sales").unwrap().values[1], Value::Text(String::new()));
    }

    #[test]
    fn mean_skips_text_columns() {
        let filled = impute(&sample(), &FillPolicy::Mean).unwrap();
        assert_eq!(
            filled.column("sales").unwrap().values,
            vec![Value::Number(10.0), Value::Number(20.0), Value::Number(30.0)]
        );
        assert_eq!(filled.column("city").unwrap().missing_count(), 1);
    }

    #[test]
    fn median_uses_observed_values() {
        let ds = Dataset::new(vec![Column::new(
            "x",
            vec![1.0.into(), Value::Missing, 2.0.into(), 9.0.into()],
        )])
        .unwrap();
        let filled = impute(&ds, &FillPolicy::Median).unwrap();
        assert_eq!(filled.column("x").unwrap().values[1], Value::Number(2.0));
    }

    #[test]
    fn custom_literal_is_inferred() {
        let filled = impute(&sample(), &FillPolicy::Custom("7".into())).unwrap();
        assert_eq!(filled.column("sales").unwrap().values[1], Value::Number(7.0));

        let filled = impute(&sample(), &FillPolicy::Custom("unknown".into())).unwrap();
        assert_eq!(filled.column("city").unwrap().values[1], Value::Text("unknown".into()));
    }

    #[test]
    fn empty_custom_value_is_rejected() {
        let err = impute(&sample(), &FillPolicy::Custom("  ".into())).unwrap_err();
        assert!(matches!(err, InsightError::Validation(_)));
    }

    #[test]
    fn imputation_is_idempotent() {
        for policy in [
            FillPolicy::Zero,
            FillPolicy::Blank,
            FillPolicy::Mean,
            FillPolicy::Median,
            FillPolicy::Custom("x".into()),
        ] {
            let once = impute(&sample(), &policy).unwrap();
            let twice = impute(&once, &policy).unwrap();
            assert_eq!(once, twice, "policy {policy}");
        }
    }

    #[test]
    fn input_is_left_untouched() {
        let ds = sample();
        let _ = impute(&ds, &FillPolicy::Zero).unwrap();
        assert_eq!(ds.missing_count(), 2);
    }
}
