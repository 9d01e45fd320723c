mod app;
mod preview;

pub use app::TahdiriApp;

use crate::settings::Settings;
use eframe::egui;
use std::path::PathBuf;

pub fn launch_gui(base_path: PathBuf, settings: Settings) -> eframe::Result<()> {
    let (width, height) = settings.ui.window_size.unwrap_or((1180.0, 760.0));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("تحضير الدروس - Tahdiri")
            .with_inner_size([width, height])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tahdiri",
        native_options,
        Box::new(move |cc| Box::new(TahdiriApp::new(cc, base_path, settings))),
    )
}
