use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use sieve_panda::analysis::DISPLAY_DECIMALS;
use sieve_panda::data::writer::{ResultLayout, write_results_csv};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – statistics and results table
// ---------------------------------------------------------------------------

/// Render the left results panel.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Statistics");
    ui.separator();

    let Some(analysis) = &state.analysis else {
        if state.table.is_none() {
            ui.label("No sieve table loaded.");
        } else {
            ui.label("No valid analysis for this table.");
        }
        return;
    };

    egui::Grid::new("statistics")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for (label, value) in analysis.result.entries() {
                ui.label(label);
                ui.monospace(format!("{:.*}", DISPLAY_DECIMALS as usize, value));
                ui.end_row();
            }
            ui.label("total retained mass (g)");
            ui.monospace(format!(
                "{:.*}",
                DISPLAY_DECIMALS as usize, analysis.total_retained_mass
            ));
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.heading("Results");
    ui.separator();

    let rounded = analysis.rounded();
    let layout = ResultLayout::new(state.columns());
    let headers = layout.header();

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto().at_least(60.0), headers.len())
            .header(20.0, |mut header| {
                for name in &headers {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*name);
                    });
                }
            })
            .body(|mut body| {
                for rec in &rounded.records {
                    body.row(18.0, |mut row| {
                        for cell in layout.row(rec) {
                            row.col(|ui: &mut Ui| {
                                ui.monospace(cell);
                            });
                        }
                    });
                }
            });
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
            let has_result = state.analysis.is_some();
            if ui
                .add_enabled(has_result, egui::Button::new("Save results…"))
                .clicked()
            {
                save_results_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_result, egui::Button::new("Export plots…"))
                .clicked()
            {
                export_plots_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let mut density = state.density;
        ui.label("Density");
        ui.add(
            egui::DragValue::new(&mut density)
                .speed(0.01)
                .range(0.01..=25.0)
                .suffix(" g/cm³"),
        );
        state.set_density(density);

        ui.separator();

        if let (Some(table), Some(path)) = (&state.table, &state.source) {
            ui.label(format!(
                "{}: {} sieves, {} used",
                path.display(),
                table.len(),
                table.used_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sieve data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match sieve_panda::data::loader::load_file(&path) {
            Ok(table) => state.set_table(table, path),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn save_results_dialog(state: &mut AppState) {
    let Some(analysis) = &state.analysis else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save sieve results")
        .set_file_name("sieve_results.csv")
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    if let Err(e) = write_results_csv(&path, analysis, state.columns()) {
        log::error!("Failed to save results: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}

fn export_plots_dialog(state: &mut AppState) {
    let Some(analysis) = &state.analysis else {
        return;
    };
    let Some(dir) = rfd::FileDialog::new()
        .set_title("Export plots to folder")
        .pick_folder()
    else {
        return;
    };

    if let Err(e) = sieve_panda::chart::export_plots(&dir, analysis) {
        log::error!("Failed to export plots: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}
