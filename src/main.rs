use job_doodle::gateway::GeminiGateway;
use job_doodle::gui::DoodleApp;
use job_doodle::logging;
use job_doodle::settings::{Settings, SETTINGS_FILE};

use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    logging::init(settings.debug_logging, settings.log_file.as_ref().map(PathBuf::from));
    tracing::info!(model = %settings.model, "starting");

    let gateway = Arc::new(GeminiGateway::new(&settings)?);
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Future Job Doodle")
            .with_inner_size(settings.window_size())
            .with_min_inner_size([360.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Future Job Doodle",
        native_options,
        Box::new(move |cc| Box::new(DoodleApp::new(cc, gateway))),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}
