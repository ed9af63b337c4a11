use eframe::egui::{Color32, Ui};
use egui_plot::{GridMark, Line, Plot, PlotPoints, Points, log_grid_spacer};

use sieve_panda::chart::{DiameterScale, X_LABEL, Y_LABEL};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Percent passing plots (central panel)
// ---------------------------------------------------------------------------

/// Render the log-diameter and linear-diameter passing curves, stacked.
pub fn passing_plots(ui: &mut Ui, state: &AppState) {
    let analysis = match &state.analysis {
        Some(a) => a,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a sieve table to view results  (File → Open…)");
            });
            return;
        }
    };

    let curve = analysis.passing_curve();
    let height = (ui.available_height() / 2.0 - 24.0).max(120.0);

    for scale in DiameterScale::ALL {
        ui.strong(scale.title());
        passing_plot(ui, scale, &curve, height);
    }
}

fn passing_plot(ui: &mut Ui, scale: DiameterScale, curve: &[[f64; 2]], height: f32) {
    let c = scale.color();
    let color = Color32::from_rgb(c.red, c.green, c.blue);

    // egui_plot has no log axis: plot log10(d) and label ticks with 10^x.
    let to_x = |d: f64| match scale {
        DiameterScale::Logarithmic => d.log10(),
        DiameterScale::Linear => d,
    };
    let points: Vec<[f64; 2]> = curve.iter().map(|&[d, p]| [to_x(d), p]).collect();

    let mut plot = Plot::new(scale.file_name())
        .height(height)
        .x_axis_label(X_LABEL)
        .y_axis_label(Y_LABEL)
        .include_y(0.0)
        .include_y(100.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if scale == DiameterScale::Logarithmic {
        plot = plot
            .x_grid_spacer(log_grid_spacer(10))
            .x_axis_formatter(|mark: GridMark, _range| {
                // only whole decades get a label
                if (mark.value - mark.value.round()).abs() < 1e-9 {
                    format!("{:.0}", 10f64.powf(mark.value))
                } else {
                    String::new()
                }
            })
            .label_formatter(|_name, point| {
                format!("d = {:.1} µm\npassing = {:.3} %", 10f64.powf(point.x), point.y)
            });
    }

    plot.show(ui, |plot_ui| {
        plot_ui.line(
            Line::new(PlotPoints::from(points.clone()))
                .name(scale.title())
                .color(color)
                .width(1.5),
        );
        plot_ui.points(Points::new(PlotPoints::from(points)).radius(3.0).color(color));
    });
}
