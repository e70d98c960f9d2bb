use eframe::egui::TextureHandle;

use crate::chart::{ChartKind, ChartRequest, XyFields};
use crate::config::Settings;
use crate::data::aggregate::{AggOp, GroupBySpec};
use crate::data::impute::FillPolicy;
use crate::session::{Action, ChartSource, Output, Session};

// ---------------------------------------------------------------------------
// Selections made in the UI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Data,
    Summary,
    Rows,
    Types,
    Columns,
    Insights,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Data,
        Tab::Summary,
        Tab::Rows,
        Tab::Types,
        Tab::Columns,
        Tab::Insights,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Data => "Data",
            Tab::Summary => "Summary",
            Tab::Rows => "Top and Bottom Rows",
            Tab::Types => "Data Types",
            Tab::Columns => "Columns",
            Tab::Insights => "Insights",
        }
    }
}

/// Fill policy picked in the combo box; `Custom` takes its value from a
/// separate text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillChoice {
    Zero,
    Blank,
    Mean,
    Median,
    Custom,
}

impl FillChoice {
    pub const ALL: [FillChoice; 5] = [
        FillChoice::Zero,
        FillChoice::Blank,
        FillChoice::Mean,
        FillChoice::Median,
        FillChoice::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FillChoice::Zero => "Zero",
            FillChoice::Blank => "Blank",
            FillChoice::Mean => "Mean",
            FillChoice::Median => "Median",
            FillChoice::Custom => "Custom",
        }
    }

    pub fn policy(self, custom_value: &str) -> FillPolicy {
        match self {
            FillChoice::Zero => FillPolicy::Zero,
            FillChoice::Blank => FillPolicy::Blank,
            FillChoice::Mean => FillPolicy::Mean,
            FillChoice::Median => FillPolicy::Median,
            FillChoice::Custom => FillPolicy::Custom(custom_value.to_string()),
        }
    }
}

/// Field selections for the chart builder, for every kind at once so
/// switching kinds keeps earlier picks.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartForm {
    pub kind: ChartKind,
    pub source: ChartSource,
    pub x: String,
    pub y: String,
    pub color: Option<String>,
    pub names: String,
    pub values: String,
    pub path: Vec<String>,
}

impl Default for ChartForm {
    fn default() -> Self {
        Self {
            kind: ChartKind::Bar,
            source: ChartSource::Aggregation,
            x: String::new(),
            y: String::new(),
            color: None,
            names: String::new(),
            values: String::new(),
            path: Vec::new(),
        }
    }
}

impl ChartForm {
    pub fn request(&self) -> ChartRequest {
        let xy = || XyFields {
            x: self.x.clone(),
            y: self.y.clone(),
            color: self.color.clone(),
        };
        match self.kind {
            ChartKind::Line => ChartRequest::Line(xy()),
            ChartKind::Bar => ChartRequest::Bar(xy()),
            ChartKind::Scatter => ChartRequest::Scatter(xy()),
            ChartKind::Pie => ChartRequest::Pie {
                names: self.names.clone(),
                values: self.values.clone(),
            },
            ChartKind::Sunburst => ChartRequest::Sunburst {
                path: self.path.clone(),
                values: self.values.clone(),
            },
        }
    }

    /// Point every field at a result table: first column as label, last as
    /// value.
    pub fn target_table(&mut self, source: ChartSource, columns: &[String]) {
        let (Some(first), Some(last)) = (columns.first(), columns.last()) else {
            return;
        };
        self.source = source;
        self.x = first.clone();
        self.names = first.clone();
        self.y = last.clone();
        self.values = last.clone();
        self.color = None;
        self.path = columns[..columns.len() - 1].to_vec();
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Dataset, history and derived tables.
    pub session: Session,

    pub tab: Tab,

    pub fill_choice: FillChoice,
    pub custom_value: String,

    pub count_column: Option<String>,
    pub top_n: usize,

    pub group_keys: Vec<String>,
    pub target_column: Option<String>,
    pub op: AggOp,

    pub chart_form: ChartForm,

    pub head_rows: usize,
    pub tail_rows: usize,

    /// Raster preview of the current chart (pie / sunburst).
    pub chart_texture: Option<TextureHandle>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
    /// Confirmation of the last successful action.
    pub info_message: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            top_n: settings.default_top_n,
            session: Session::new(settings),
            tab: Tab::Data,
            fill_choice: FillChoice::Zero,
            custom_value: String::new(),
            count_column: None,
            group_keys: Vec::new(),
            target_column: None,
            op: AggOp::Sum,
            chart_form: ChartForm::default(),
            head_rows: 5,
            tail_rows: 5,
            chart_texture: None,
            status_message: None,
            info_message: None,
        }
    }

    /// Run an action against the session. On failure the session is kept and
    /// the error becomes the status message.
    pub fn dispatch(&mut self, action: Action) -> Option<Output> {
        match self.session.apply(action) {
            Ok((next, output)) => {
                self.session = next;
                self.status_message = None;
                self.chart_texture = None;
                self.after(&output);
                Some(output)
            }
            Err(e) => {
                log::error!("action failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                None
            }
        }
    }

    fn after(&mut self, output: &Output) {
        match output {
            Output::Summary(report) => {
                let columns: Vec<String> =
                    report.column_names().iter().map(|c| c.to_string()).collect();
                let keep = |sel: &Option<String>| sel.as_ref().filter(|c| columns.contains(c)).cloned();
                self.count_column = keep(&self.count_column).or_else(|| columns.first().cloned());
                self.target_column = keep(&self.target_column).or_else(|| columns.last().cloned());
                self.group_keys.retain(|k| columns.contains(k));
                self.info_message = Some(format!(
                    "{} rows, {} columns, {} missing values",
                    report.rows, report.columns, report.missing_cells
                ));
            }
            Output::Frequency(table) => {
                let columns = table.to_dataset().column_names();
                self.chart_form.target_table(ChartSource::Frequency, &columns);
                self.tab = Tab::Insights;
                self.info_message = Some(format!("{} distinct values shown", table.len()));
            }
            Output::Aggregation(result) => {
                let columns = result.to_dataset().column_names();
                self.chart_form.target_table(ChartSource::Aggregation, &columns);
                self.tab = Tab::Insights;
                self.info_message = Some(format!("{} groups", result.len()));
            }
            Output::Chart(chart) => {
                self.info_message = Some(format!("{} chart ready", chart.kind));
            }
            Output::Download(artifact) => {
                self.info_message = Some(format!("{} ready", artifact.file_name));
            }
        }
    }

    pub fn fill_missing(&mut self) {
        let policy = self.fill_choice.policy(&self.custom_value);
        if self.dispatch(Action::Fill(policy)).is_some() {
            self.info_message = Some("Missing values filled successfully!".into());
        }
    }

    pub fn count_values(&mut self) {
        let Some(column) = self.count_column.clone() else {
            return;
        };
        self.dispatch(Action::ValueCounts {
            column,
            top_n: self.top_n,
        });
    }

    pub fn run_group_by(&mut self) {
        let Some(target) = self.target_column.clone() else {
            return;
        };
        self.dispatch(Action::GroupBy(GroupBySpec {
            keys: self.group_keys.clone(),
            target,
            op: self.op,
        }));
    }

    pub fn build_chart(&mut self) {
        self.dispatch(Action::BuildChart {
            source: self.chart_form.source,
            request: self.chart_form.request(),
        });
    }

    /// Toggle a column in the groupby key list, keeping selection order.
    pub fn toggle_group_key(&mut self, column: &str) {
        if let Some(pos) = self.group_keys.iter().position(|k| k == column) {
            self.group_keys.remove(pos);
        } else {
            self.group_keys.push(column.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> AppState {
        let mut state = AppState::new(Settings::default());
        state.dispatch(Action::Load {
            file_name: "sales.csv".into(),
            bytes: b"city,sales\nA,10\nB,\nA,30\n".to_vec(),
        });
        state
    }

    #[test]
    fn load_picks_default_columns() {
        let state = loaded();
        assert_eq!(state.count_column.as_deref(), Some("city"));
        assert_eq!(state.target_column.as_deref(), Some("sales"));
        assert!(state.status_message.is_none());
    }

    #[test]
    fn failed_fill_sets_status_and_keeps_data() {
        let mut state = loaded();
        state.fill_choice = FillChoice::Custom;
        state.fill_missing();
        assert!(state.status_message.as_deref().unwrap_or("").contains("custom fill value"));
        assert_eq!(state.session.dataset().unwrap().missing_count(), 1);
    }

    #[test]
    fn groupby_prepares_chart_form() {
        let mut state = loaded();
        state.toggle_group_key("city");
        state.op = AggOp::Sum;
        state.run_group_by();
        assert_eq!(state.tab, Tab::Insights);
        assert_eq!(state.chart_form.x, "city");
        assert_eq!(state.chart_form.y, "sales_sum");
        assert_eq!(state.chart_form.path, vec!["city".to_string()]);

        state.chart_form.kind = ChartKind::Pie;
        state.build_chart();
        assert!(state.session.chart().is_some());
    }

    #[test]
    fn toggling_group_keys_keeps_order() {
        let mut state = loaded();
        state.toggle_group_key("sales");
        state.toggle_group_key("city");
        state.toggle_group_key("sales");
        assert_eq!(state.group_keys, vec!["city".to_string()]);
    }
}
