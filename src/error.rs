use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy for every pipeline stage
// ---------------------------------------------------------------------------

/// Errors raised by the loader, the aggregators and the chart builder.
///
/// None of these are fatal to a session: the action that raised one is
/// simply not applied.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Upload content is not rectangular tabular data.
    #[error("format error: {0}")]
    Format(String),

    /// A selection references a column that does not exist.
    #[error("column not found: '{0}'")]
    ColumnNotFound(String),

    /// A required input is missing or invalid.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A numeric operator was applied to a non-numeric column.
    #[error("type error: {0}")]
    Type(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Chart rasterisation or PNG encoding failed.
    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, InsightError>;

impl InsightError {
    pub fn format(msg: impl Into<String>) -> Self {
        InsightError::Format(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        InsightError::Validation(msg.into())
    }
}
