use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct HotelScopeApp {
    pub state: AppState,
}

impl HotelScopeApp {
    /// Start with `path` already loaded, if given.
    pub fn with_initial_file(path: Option<&std::path::Path>) -> Self {
        let mut app = Self::default();
        if let Some(path) = path {
            panels::open_path(&mut app.state, path);
        }
        app
    }
}

impl eframe::App for HotelScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: constraints ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: count, plots, rankings ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::results_panel(ui, &self.state);
        });
    }
}
