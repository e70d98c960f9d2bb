use std::sync::Arc;

use crate::chart::{build_chart, render_png, Chart, ChartRequest};
use crate::config::Settings;
use crate::data::aggregate::{group_by, value_counts, AggregationResult, FrequencyTable, GroupBySpec};
use crate::data::export::{to_csv_bytes, DATASET_FILE_NAME};
use crate::data::impute::{impute, FillPolicy};
use crate::data::loader::{load_bytes, SourceFormat};
use crate::data::model::Dataset;
use crate::data::summary::{summarize, SummaryReport};
use crate::error::{InsightError, Result};

/// Undo depth kept for imputation.
pub const MAX_HISTORY: usize = 16;

// ---------------------------------------------------------------------------
// Actions and their outputs
// ---------------------------------------------------------------------------

/// Which derived table a chart is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSource {
    Frequency,
    Aggregation,
}

/// One user interaction.
#[derive(Debug, Clone)]
pub enum Action {
    Load { file_name: String, bytes: Vec<u8> },
    Fill(FillPolicy),
    Undo,
    ValueCounts { column: String, top_n: usize },
    GroupBy(GroupBySpec),
    BuildChart { source: ChartSource, request: ChartRequest },
    ExportCsv,
    ExportChart,
}

/// A downloadable file.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum Output {
    Summary(SummaryReport),
    Frequency(FrequencyTable),
    Aggregation(AggregationResult),
    Chart(Chart),
    Download(Artifact),
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Everything one user works with: the dataset, its undo history and the
/// latest derived tables.
///
/// Sessions are values. [`Session::apply`] never mutates `self`; a failed
/// action leaves the caller holding the previous session unchanged.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub settings: Settings,
    source_name: Option<String>,
    dataset: Option<Arc<Dataset>>,
    history: Vec<Arc<Dataset>>,
    frequency: Option<FrequencyTable>,
    aggregation: Option<AggregationResult>,
    chart: Option<Chart>,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_deref()
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn frequency(&self) -> Option<&FrequencyTable> {
        self.frequency.as_ref()
    }

    pub fn aggregation(&self) -> Option<&AggregationResult> {
        self.aggregation.as_ref()
    }

    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn summary(&self) -> Option<SummaryReport> {
        self.dataset().map(summarize)
    }

    fn require_dataset(&self) -> Result<&Dataset> {
        self.dataset()
            .ok_or_else(|| InsightError::validation("no dataset loaded"))
    }

    /// Replace the dataset; derived tables no longer describe it.
    fn with_dataset(&self, dataset: Arc<Dataset>, history: Vec<Arc<Dataset>>) -> Session {
        Session {
            settings: self.settings.clone(),
            source_name: self.source_name.clone(),
            dataset: Some(dataset),
            history,
            frequency: None,
            aggregation: None,
            chart: None,
        }
    }

    /// Apply one action, returning the next session and what to show.
    pub fn apply(&self, action: Action) -> Result<(Session, Output)> {
        match action {
            Action::Load { file_name, bytes } => {
                let format = SourceFormat::from_file_name(&file_name)?;
                let dataset = load_bytes(&bytes, format)?;
                log::info!(
                    "loaded '{file_name}': {} rows x {} columns",
                    dataset.n_rows(),
                    dataset.n_cols()
                );
                let report = summarize(&dataset);
                let mut next = self.with_dataset(Arc::new(dataset), Vec::new());
                next.source_name = Some(file_name);
                Ok((next, Output::Summary(report)))
            }
            Action::Fill(policy) => {
                let current = self.require_dataset()?;
                let filled = impute(current, &policy)?;
                let report = summarize(&filled);
                let mut history = self.history.clone();
                if let Some(prev) = &self.dataset {
                    history.push(Arc::clone(prev));
                }
                if history.len() > MAX_HISTORY {
                    history.remove(0);
                }
                Ok((self.with_dataset(Arc::new(filled), history), Output::Summary(report)))
            }
            Action::Undo => {
                let mut history = self.history.clone();
                let previous = history
                    .pop()
                    .ok_or_else(|| InsightError::validation("nothing to undo"))?;
                let report = summarize(&previous);
                Ok((self.with_dataset(previous, history), Output::Summary(report)))
            }
            Action::ValueCounts { column, top_n } => {
                let table = value_counts(self.require_dataset()?, &column, top_n)?;
                let mut next = self.clone();
                next.frequency = Some(table.clone());
                next.chart = None;
                Ok((next, Output::Frequency(table)))
            }
            Action::GroupBy(spec) => {
                let result = group_by(self.require_dataset()?, &spec)?;
                let mut next = self.clone();
                next.aggregation = Some(result.clone());
                next.chart = None;
                Ok((next, Output::Aggregation(result)))
            }
            Action::BuildChart { source, request } => {
                let table = match source {
                    ChartSource::Frequency => self
                        .frequency
                        .as_ref()
                        .map(FrequencyTable::to_dataset)
                        .ok_or_else(|| InsightError::validation("compute value counts first"))?,
                    ChartSource::Aggregation => self
                        .aggregation
                        .as_ref()
                        .map(AggregationResult::to_dataset)
                        .ok_or_else(|| InsightError::validation("run a groupby first"))?,
                };
                let chart = build_chart(&table, &request)?;
                let mut next = self.clone();
                next.chart = Some(chart.clone());
                Ok((next, Output::Chart(chart)))
            }
            Action::ExportCsv => {
                let bytes = to_csv_bytes(self.require_dataset()?)?;
                log::info!("exported {DATASET_FILE_NAME} ({} bytes)", bytes.len());
                let artifact = Artifact {
                    file_name: DATASET_FILE_NAME.to_string(),
                    mime: "text/csv",
                    bytes,
                };
                Ok((self.clone(), Output::Download(artifact)))
            }
            Action::ExportChart => {
                let chart = self
                    .chart
                    .as_ref()
                    .ok_or_else(|| InsightError::validation("build a chart first"))?;
                let bytes = render_png(chart, self.settings.chart_width, self.settings.chart_height)?;
                let artifact = Artifact {
                    file_name: chart.file_name(),
                    mime: "image/png",
                    bytes,
                };
                Ok((self.clone(), Output::Download(artifact)))
            }
        }
    }
}
