// main.rs
mod app;
mod utils;

use app::App;
use eframe::NativeOptions;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let native_options = NativeOptions {
        initial_window_size: Some(egui::Vec2::new(1280.0, 800.0)),
        resizable: true,
        drag_and_drop_support: true,
        ..Default::default()
    };
    eframe::run_native(
        "Image Converter",
        native_options,
        Box::new(|_cc| Box::new(App::default())),
    );
}
