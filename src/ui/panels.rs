use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::config::COUNTRY_CAP_RANGE;
use crate::data::export;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Each widget change triggers one pipeline
/// pass through the `AppState` setters.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let (Some(dataset), Some(filters)) = (state.dataset.clone(), state.filters.clone()) else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Arrival date range ----
            ui.strong("Arrival date range");
            if let Some((lo, hi)) = dataset.date_bounds {
                let (mut start, mut end) = filters.date_range;
                let mut changed = false;
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("From");
                    changed |= ui
                        .add(DatePickerButton::new(&mut start).id_salt("date_from"))
                        .changed();
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("To");
                    changed |= ui
                        .add(DatePickerButton::new(&mut end).id_salt("date_to"))
                        .changed();
                });
                if changed {
                    state.set_date_range(start.clamp(lo, hi), end.clamp(lo, hi));
                }
            } else {
                ui.label(RichText::new("No dated bookings").italics());
            }
            ui.separator();

            // ---- Hotel types ----
            let n_selected = filters.hotels.len();
            let n_total = dataset.hotels.len();
            ui.strong(format!("Hotel type  ({n_selected}/{n_total})"));
            for hotel in &dataset.hotels {
                let mut checked = filters.hotels.contains(hotel);
                if ui.checkbox(&mut checked, hotel.label()).changed() {
                    state.set_hotel(*hotel, checked);
                }
            }
            ui.separator();

            // ---- Country cap ----
            ui.strong("Countries to show");
            let mut cap = filters.max_countries;
            if ui
                .add(egui::Slider::new(&mut cap, COUNTRY_CAP_RANGE))
                .changed()
            {
                state.set_max_countries(cap);
            }
            ui.separator();

            if ui.button("Reset filters").clicked() {
                state.set_dataset(dataset.clone());
            }

            ui.add_space(8.0);
            ui.label(
                RichText::new(format!(
                    "{} bookings, {} dropped for missing party size",
                    dataset.len(),
                    dataset.dropped_rows
                ))
                .small(),
            );
        });
}

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
            if ui
                .add_enabled(state.tables.is_some(), egui::Button::new("Export tables…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} bookings loaded, {} visible",
                ds.len(),
                state.visible_records()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open hotel bookings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let Some(tables) = &state.tables else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export aggregate tables")
        .add_filter("JSON", &["json"])
        .set_file_name("dashboard_tables.json")
        .save_file()
    else {
        return;
    };

    let result = export::write_json(tables, &path)
        .with_context(|| format!("exporting to {}", path.display()));
    if let Err(e) = result {
        log::error!("{e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}
