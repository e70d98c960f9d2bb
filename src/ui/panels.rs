use std::path::Path;

use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart::ChartKind;
use crate::data::aggregate::AggOp;
use crate::session::{Action, ChartSource, Output};
use crate::state::{AppState, FillChoice, Tab};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_data = state.session.dataset().is_some();
            if ui
                .add_enabled(has_data, egui::Button::new("Download dataset as CSV…"))
                .clicked()
            {
                export(state, Action::ExportCsv);
                ui.close_menu();
            }
            let has_chart = state.session.chart().is_some();
            if ui
                .add_enabled(has_chart, egui::Button::new("Download chart as PNG…"))
                .clicked()
            {
                export(state, Action::ExportChart);
                ui.close_menu();
            }
        });

        if ui
            .add_enabled(state.session.can_undo(), egui::Button::new("Undo fill"))
            .clicked()
        {
            state.dispatch(Action::Undo);
        }

        ui.separator();

        if let Some(ds) = state.session.dataset() {
            let name = state.session.source_name().unwrap_or("dataset");
            ui.label(format!("{name}: {} rows × {} columns", ds.n_rows(), ds.n_cols()));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        } else if let Some(msg) = &state.info_message {
            ui.label(RichText::new(msg).color(Color32::from_rgb(0, 180, 216)));
        }
    });
}

/// Tab selector above the central view.
pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.label());
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – pipeline controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.session.dataset() else {
        ui.heading("Data Insights Junction");
        ui.separator();
        ui.label("Open a CSV or Excel file to begin  (File → Open…)");
        return;
    };
    let columns = dataset.column_names();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            fill_section(ui, state);
            ui.separator();
            value_count_section(ui, state, &columns);
            ui.separator();
            group_by_section(ui, state, &columns);
            ui.separator();
            chart_section(ui, state);
        });
}

fn fill_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Filling Missing Values");
    egui::ComboBox::from_id_salt("fill_policy")
        .selected_text(state.fill_choice.label())
        .show_ui(ui, |ui: &mut Ui| {
            for choice in FillChoice::ALL {
                ui.selectable_value(&mut state.fill_choice, choice, choice.label());
            }
        });
    if state.fill_choice == FillChoice::Custom {
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Custom value:");
            ui.text_edit_singleline(&mut state.custom_value);
        });
    }
    if ui.button("Fill Missing Values").clicked() {
        state.fill_missing();
    }
}

fn column_combo(ui: &mut Ui, id: &str, selected: &mut Option<String>, columns: &[String]) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected.clone().unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for col in columns {
                ui.selectable_value(selected, Some(col.clone()), col.as_str());
            }
        });
}

fn value_count_section(ui: &mut Ui, state: &mut AppState, columns: &[String]) {
    egui::CollapsingHeader::new(RichText::new("Value Count").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Column");
                column_combo(ui, "count_column", &mut state.count_column, columns);
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Top rows");
                ui.add(egui::DragValue::new(&mut state.top_n).range(1..=10_000));
            });
            if ui.button("Count").clicked() {
                state.count_values();
            }
        });
}

fn group_by_section(ui: &mut Ui, state: &mut AppState, columns: &[String]) {
    egui::CollapsingHeader::new(RichText::new("Groupby Insights").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.label("Group by columns");
            for col in columns {
                let mut checked = state.group_keys.contains(col);
                if ui.checkbox(&mut checked, col.as_str()).changed() {
                    state.toggle_group_key(col);
                }
            }
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Operation column");
                column_combo(ui, "target_column", &mut state.target_column, columns);
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Operation");
                egui::ComboBox::from_id_salt("agg_op")
                    .selected_text(state.op.name())
                    .show_ui(ui, |ui: &mut Ui| {
                        for op in AggOp::ALL {
                            ui.selectable_value(&mut state.op, op, op.name());
                        }
                    });
            });
            let ready = !state.group_keys.is_empty();
            if ui.add_enabled(ready, egui::Button::new("Group")).clicked() {
                state.run_group_by();
            }
        });
}

fn chart_section(ui: &mut Ui, state: &mut AppState) {
    let table = match state.chart_form.source {
        ChartSource::Frequency => state.session.frequency().map(|t| t.to_dataset()),
        ChartSource::Aggregation => state.session.aggregation().map(|r| r.to_dataset()),
    };
    let Some(table) = table else {
        ui.weak("Run a value count or groupby to chart it.");
        return;
    };
    let columns = table.column_names();
    let form = &mut state.chart_form;

    ui.strong("Data Visualization");
    egui::ComboBox::from_id_salt("chart_kind")
        .selected_text(form.kind.name())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in ChartKind::ALL {
                ui.selectable_value(&mut form.kind, kind, kind.name());
            }
        });

    match form.kind {
        ChartKind::Line | ChartKind::Bar | ChartKind::Scatter => {
            field_combo(ui, "X-axis", "chart_x", &mut form.x, &columns);
            field_combo(ui, "Y-axis", "chart_y", &mut form.y, &columns);
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Color");
                egui::ComboBox::from_id_salt("chart_color")
                    .selected_text(form.color.clone().unwrap_or_else(|| "None".into()))
                    .show_ui(ui, |ui: &mut Ui| {
                        ui.selectable_value(&mut form.color, None, "None");
                        for col in &columns {
                            ui.selectable_value(&mut form.color, Some(col.clone()), col.as_str());
                        }
                    });
            });
        }
        ChartKind::Pie => {
            field_combo(ui, "Names", "chart_names", &mut form.names, &columns);
            field_combo(ui, "Values", "chart_values", &mut form.values, &columns);
        }
        ChartKind::Sunburst => {
            ui.label("Path (in order)");
            for col in &columns {
                let mut checked = form.path.contains(col);
                if ui.checkbox(&mut checked, col.as_str()).changed() {
                    if checked {
                        form.path.push(col.clone());
                    } else {
                        form.path.retain(|p| p != col);
                    }
                }
            }
            field_combo(ui, "Values", "chart_values", &mut form.values, &columns);
        }
    }

    if ui.button("Build chart").clicked() {
        state.build_chart();
    }
}

fn field_combo(ui: &mut Ui, label: &str, id: &str, selected: &mut String, columns: &[String]) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(selected.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for col in columns {
                    ui.selectable_value(selected, col.clone(), col.as_str());
                }
            });
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn read_upload(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("file name is not valid UTF-8")?
        .to_string();
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok((name, bytes))
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Drop CSV or Excel File")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_file();

    let Some(path) = file else {
        return;
    };
    match read_upload(&path) {
        Ok((file_name, bytes)) => {
            if state.dispatch(Action::Load { file_name, bytes }).is_some() {
                state.info_message = Some("Uploaded Successfully".into());
            }
        }
        Err(e) => {
            log::error!("Failed to open file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

/// Run an export action and save the artifact where the user chooses.
fn export(state: &mut AppState, action: Action) {
    let Some(Output::Download(artifact)) = state.dispatch(action) else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_file_name(&artifact.file_name)
        .save_file()
    else {
        return;
    };
    let written = std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("writing {}", path.display()));
    match written {
        Ok(()) => {
            log::info!("saved {} to {}", artifact.file_name, path.display());
            state.info_message = Some(format!("Saved {}", path.display()));
        }
        Err(e) => {
            log::error!("Failed to save: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
