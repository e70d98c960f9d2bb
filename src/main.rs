use eframe::egui;
use insight_hub::app::InsightHubApp;
use insight_hub::config::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Insight Hub – Data Insights Junction",
        options,
        Box::new(|_cc| Ok(Box::new(InsightHubApp::new(settings)))),
    )
}
