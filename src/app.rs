use eframe::egui;

use crate::color::SeriesColors;
use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HotelDashboardApp {
    pub state: AppState,
    colors: SeriesColors,
}

impl HotelDashboardApp {
    /// Build the app and open the configured dataset, if any.
    pub fn new(config: DashboardConfig) -> Self {
        let startup_path = config.dataset_path.clone();
        let mut state = AppState::new(config);
        if let Some(path) = startup_path {
            state.open(&path);
        }
        Self {
            state,
            colors: SeriesColors::default(),
        }
    }
}

impl eframe::App for HotelDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::dashboard(ui, &self.state, &self.colors);
        });
    }
}
