use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Dataset;
use crate::data::summary::SummaryReport;

const ROW_HEIGHT: f32 = 18.0;

fn cell_text(v: Option<f64>) -> String {
    v.map_or_else(|| "NaN".to_string(), |v| format!("{v:.4}"))
}

/// A generic string grid with a header row.
pub fn grid(ui: &mut Ui, id: &str, header: &[String], rows: &[Vec<String>], max_height: f32) {
    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(max_height)
                .columns(TableColumn::auto().at_least(60.0), header.len())
                .header(ROW_HEIGHT + 4.0, |mut head| {
                    for name in header {
                        head.col(|ui: &mut Ui| {
                            ui.strong(name.as_str());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let cells = &rows[row.index()];
                        for cell in cells {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell.as_str());
                            });
                        }
                    });
                });
        });
    });
}

/// Show the first `limit` rows of a dataset.
pub fn dataset_table(ui: &mut Ui, id: &str, dataset: &Dataset, limit: usize, max_height: f32) {
    let rows: Vec<Vec<String>> = (0..dataset.n_rows().min(limit))
        .map(|r| dataset.row(r).into_iter().map(|v| v.to_string()).collect())
        .collect();
    grid(ui, id, &dataset.column_names(), &rows, max_height);
}

/// `describe()`-style table: one row per statistic, one column per numeric
/// column.
pub fn stats_table(ui: &mut Ui, report: &SummaryReport) {
    if report.stats.is_empty() {
        ui.label("No numeric columns to describe.");
        return;
    }
    let mut header = vec![String::new()];
    header.extend(report.stats.iter().map(|s| s.column.clone()));

    let stat_rows: [(&str, fn(&crate::data::summary::ColumnStats) -> String); 8] = [
        ("count", |s| s.count.to_string()),
        ("mean", |s| cell_text(s.mean)),
        ("std", |s| cell_text(s.std)),
        ("min", |s| cell_text(s.min)),
        ("25%", |s| cell_text(s.q25)),
        ("50%", |s| cell_text(s.median)),
        ("75%", |s| cell_text(s.q75)),
        ("max", |s| cell_text(s.max)),
    ];
    let rows: Vec<Vec<String>> = stat_rows
        .iter()
        .map(|(label, f)| {
            let mut row = vec![label.to_string()];
            row.extend(report.stats.iter().map(f));
            row
        })
        .collect();
    grid(ui, "describe", &header, &rows, 260.0);
}
