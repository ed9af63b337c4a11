use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct SievePandaApp {
    pub state: AppState,
}

impl eframe::App for SievePandaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + density ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: statistics + results table ----
        egui::SidePanel::left("results_panel")
            .default_width(520.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state);
            });

        // ---- Central panel: passing curves ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::passing_plots(ui, &self.state);
        });
    }
}
