use eframe::egui::{self, ColorImage, TextureOptions, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use super::tables;
use crate::chart::{render_rgb, Chart, ChartBody, ChartKind};
use crate::chart::build::{category_label, Cartesian};
use crate::color::to_color32;
use crate::state::{AppState, Tab};

const PREVIEW_SIZE: (u32, u32) = (720, 480);

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the active tab in the central panel.
pub fn central_view(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.session.dataset() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore it  (File → Open…)");
        });
        return;
    };
    let preview_rows = state.session.settings.preview_rows;

    match state.tab {
        Tab::Data => {
            tables::dataset_table(ui, "data", dataset, preview_rows, f32::INFINITY);
        }
        Tab::Summary => {
            if let Some(report) = state.session.summary() {
                ui.label(format!(
                    "There are {} rows and {} columns in the dataset.",
                    report.rows, report.columns
                ));
                ui.label(format!(
                    "There are a total of {} missing values in the dataset.",
                    report.missing_cells
                ));
                ui.add_space(6.0);
                ui.strong("Statistical Summary of Dataset");
                tables::stats_table(ui, &report);
            }
        }
        Tab::Rows => {
            let max = dataset.n_rows().max(1);
            ui.strong("Top Rows");
            ui.add(egui::Slider::new(&mut state.head_rows, 1..=max).text("rows"));
            tables::dataset_table(ui, "head", &dataset.head(state.head_rows), usize::MAX, 220.0);
            ui.add_space(8.0);
            ui.strong("Bottom Rows");
            ui.add(egui::Slider::new(&mut state.tail_rows, 1..=max).text("rows"));
            tables::dataset_table(ui, "tail", &dataset.tail(state.tail_rows), usize::MAX, 220.0);
        }
        Tab::Types => {
            let rows: Vec<Vec<String>> = dataset
                .dtypes()
                .into_iter()
                .map(|(name, dtype)| vec![name, dtype.to_string()])
                .collect();
            tables::grid(ui, "dtypes", &["column".into(), "dtype".into()], &rows, f32::INFINITY);
        }
        Tab::Columns => {
            ui.strong("Columns Information");
            ui.label(format!("{:?}", dataset.column_names()));
        }
        Tab::Insights => insights(ui, state),
    }
}

fn insights(ui: &mut Ui, state: &mut AppState) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(table) = state.session.frequency() {
                ui.strong(format!("Value counts of '{}'", table.column));
                tables::dataset_table(ui, "frequency", &table.to_dataset(), usize::MAX, 200.0);
                ui.separator();
            }
            if let Some(result) = state.session.aggregation() {
                ui.strong(format!("Groupby {:?} → {}", result.key_columns, result.value_column));
                tables::dataset_table(ui, "aggregation", &result.to_dataset(), usize::MAX, 240.0);
                ui.separator();
            }
            let Some(chart) = state.session.chart().cloned() else {
                return;
            };
            ui.strong(chart.title.as_str());
            match &chart.body {
                ChartBody::Cartesian(c) => cartesian_plot(ui, chart.kind, c),
                ChartBody::Pie(_) | ChartBody::Sunburst(_) => raster_preview(ui, state, &chart),
            }
        });
}

// ---------------------------------------------------------------------------
// Interactive line / bar / scatter
// ---------------------------------------------------------------------------

fn cartesian_plot(ui: &mut Ui, kind: ChartKind, c: &Cartesian) {
    let mut plot = Plot::new("insight_plot")
        .legend(Legend::default())
        .height(420.0)
        .x_axis_label(c.x_label.as_str())
        .y_axis_label(c.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if let Some(cats) = c.x_categories.clone() {
        plot = plot.x_axis_formatter(move |mark, _range| category_label(&cats, mark.value));
    }
    if let Some(cats) = c.y_categories.clone() {
        plot = plot.y_axis_formatter(move |mark, _range| category_label(&cats, mark.value));
    }

    let n_series = c.series.len().max(1) as f64;
    plot.show(ui, |plot_ui| {
        for (i, series) in c.series.iter().enumerate() {
            let color = to_color32(series.color);
            let points: Vec<[f64; 2]> = series.points.iter().map(|&(x, y)| [x, y]).collect();
            match kind {
                ChartKind::Bar => {
                    let width = 0.8 / n_series;
                    let offset = -0.4 + width * (i as f64 + 0.5);
                    let bars = points
                        .iter()
                        .map(|p| Bar::new(p[0] + offset, p[1]).width(width))
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).name(&series.name).color(color));
                }
                ChartKind::Line => {
                    plot_ui.line(
                        Line::new(PlotPoints::from(points.clone()))
                            .name(&series.name)
                            .color(color)
                            .width(2.0),
                    );
                    plot_ui.points(Points::new(PlotPoints::from(points)).radius(3.0).color(color));
                }
                _ => {
                    plot_ui.points(
                        Points::new(PlotPoints::from(points))
                            .name(&series.name)
                            .radius(4.0)
                            .color(color),
                    );
                }
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Pie / sunburst preview (rasterised)
// ---------------------------------------------------------------------------

fn raster_preview(ui: &mut Ui, state: &mut AppState, chart: &Chart) {
    if state.chart_texture.is_none() {
        let (w, h) = PREVIEW_SIZE;
        match render_rgb(chart, w, h) {
            Ok(rgb) => {
                let image = ColorImage::from_rgb([w as usize, h as usize], &rgb);
                state.chart_texture =
                    Some(ui.ctx().load_texture("chart_preview", image, TextureOptions::LINEAR));
            }
            Err(e) => {
                log::error!("chart preview failed: {e}");
                state.status_message = Some(format!("Error: {e}"));
                return;
            }
        }
    }
    if let Some(texture) = &state.chart_texture {
        ui.add(egui::Image::new(texture).max_width(ui.available_width()));
    }
}
