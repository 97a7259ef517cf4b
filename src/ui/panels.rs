use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::filter::{PRICE_STEP, RATING_STEP};
use crate::data::loader::load_file;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – constraint widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All regions").clicked() {
            state.select_all();
        }
        if ui.small_button("No regions").clicked() {
            state.select_none();
        }
        if ui.small_button("Reset").clicked() {
            state.reset_constraints();
        }
    });
    ui.separator();

    // Split borrows: widgets write into `constraints` while reading the rest.
    let AppState {
        dataset: Some(dataset),
        constraints: Some(constraints),
        color_map,
        ..
    } = state
    else {
        return;
    };
    let bounds = dataset.bounds;
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Price ceiling ----
            ui.strong("Max price per person (yen)");
            changed |= ui
                .add(
                    Slider::new(&mut constraints.price_ceiling, bounds.price.min..=bounds.price.max)
                        .step_by(PRICE_STEP),
                )
                .changed();
            ui.add_space(6.0);

            // ---- Rating floor ----
            ui.strong("Min rating");
            match (&mut constraints.rating_floor, bounds.rating) {
                (Some(floor), Some(span)) => {
                    changed |= ui
                        .add(Slider::new(floor, span.min..=span.max).step_by(RATING_STEP))
                        .changed();
                }
                _ => {
                    ui.label(
                        RichText::new("No 'rating' column: rating filter disabled.")
                            .color(Color32::YELLOW),
                    );
                }
            }
            ui.add_space(6.0);

            // ---- Walk ceiling ----
            ui.strong("Max walk to station (min)");
            match (&mut constraints.walk_ceiling, bounds.walk_time) {
                (Some(ceiling), Some(span)) => {
                    changed |= ui
                        .add(Slider::new(ceiling, span.min..=span.max).step_by(1.0))
                        .changed();
                }
                _ => {
                    ui.label(RichText::new("No walk times recorded.").weak());
                }
            }
            ui.separator();

            // ---- Regions ----
            let n_selected = constraints.selected_regions.len();
            let n_total = dataset.regions.len();
            egui::CollapsingHeader::new(
                RichText::new(format!("Prefecture  ({n_selected}/{n_total})")).strong(),
            )
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                for region in &dataset.regions {
                    let mut checked = constraints.selected_regions.contains(region);
                    let mut text = RichText::new(region);
                    if let Some(cm) = color_map.as_ref() {
                        text = text.color(cm.color_for(Some(region)));
                    }
                    if ui.checkbox(&mut checked, text).changed() {
                        if checked {
                            constraints.selected_regions.insert(region.clone());
                        } else {
                            constraints.selected_regions.remove(region);
                        }
                        changed = true;
                    }
                }
            });
        });

    if changed {
        state.refresh();
    }
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
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} hotels loaded, {} matching",
                ds.len(),
                state.matched()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Matched count, scatter plots and rankings.
pub fn results_panel(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a hotel table to begin  (File → Open…)");
        });
        return;
    }

    ui.heading(format!("Matching hotels: {}", state.matched()));
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            super::plot::scatter_plots(ui, state);
            super::tables::ranked_tables(ui, state);
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open hotel listings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        open_path(state, &path);
    }
}

/// Load `path` into the state, or record the failure in the status bar.
pub fn open_path(state: &mut AppState, path: &std::path::Path) {
    match load_file(path) {
        Ok(dataset) => state.set_dataset(dataset),
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
