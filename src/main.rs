mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::HotelDashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_env();
    log::info!("Starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Hotel Bookings – Group Type Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(HotelDashboardApp::new(config)))),
    )
}
