//! Percent-passing charts, shared by the viewer and the SVG exporter.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use palette::Srgb;
use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::prelude::*;

use crate::analysis::SieveAnalysis;
use crate::color::{paired_palette, tint};

pub const X_LABEL: &str = "Particle diameter (micron)";
pub const Y_LABEL: &str = "Percent passing";

const SVG_SIZE: (u32, u32) = (800, 600);

/// How the particle-diameter axis is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiameterScale {
    Logarithmic,
    Linear,
}

impl DiameterScale {
    pub const ALL: [DiameterScale; 2] = [DiameterScale::Logarithmic, DiameterScale::Linear];

    pub fn title(self) -> &'static str {
        match self {
            DiameterScale::Logarithmic => "Percent passing versus log particle diameter (%)",
            DiameterScale::Linear => "Percent passing versus particle diameter (%)",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DiameterScale::Logarithmic => "sieve_percent_passing_vs_logdiameter.svg",
            DiameterScale::Linear => "sieve_percent_passing_vs_diameter.svg",
        }
    }

    pub fn color(self) -> Srgb<u8> {
        let [light_blue, dark_blue, ..] = paired_palette();
        match self {
            DiameterScale::Logarithmic => light_blue,
            DiameterScale::Linear => dark_blue,
        }
    }
}

// ---------------------------------------------------------------------------
// SVG export
// ---------------------------------------------------------------------------

/// Write both passing charts into `dir`, returning the created paths.
pub fn export_plots(dir: &Path, analysis: &SieveAnalysis) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let curve: Vec<(f64, f64)> = analysis
        .passing_curve()
        .into_iter()
        .map(|[d, p]| (d, p))
        .collect();
    let (d_min, d_max) = curve
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(d, _)| {
            (lo.min(d), hi.max(d))
        });
    if !(d_min.is_finite() && d_max.is_finite()) {
        bail!("no points to plot");
    }

    let mut written = Vec::with_capacity(DiameterScale::ALL.len());
    for scale in DiameterScale::ALL {
        let path = dir.join(scale.file_name());
        let drawn = match scale {
            DiameterScale::Logarithmic => {
                render(&path, scale, &curve, (d_min * 0.8..d_max * 1.25).log_scale())
            }
            DiameterScale::Linear => render(&path, scale, &curve, 0.0..d_max * 1.05),
        };
        drawn.with_context(|| format!("drawing {}", path.display()))?;
        log::info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn rgb(c: Srgb<u8>) -> RGBColor {
    RGBColor(c.red, c.green, c.blue)
}

fn render<X>(path: &Path, scale: DiameterScale, curve: &[(f64, f64)], x_range: X) -> Result<()>
where
    X: AsRangedCoord<Value = f64>,
    X::CoordDescType: ValueFormatter<f64>,
{
    let color = rgb(scale.color());
    let root = SVGBackend::new(path, SVG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(scale.title(), ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, 0.0..100.0)?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .light_line_style(rgb(tint(scale.color(), 0.7)))
        .draw()?;

    chart.draw_series(LineSeries::new(curve.iter().copied(), color.stroke_width(2)))?;
    chart.draw_series(curve.iter().map(|&p| Circle::new(p, 4, color.filled())))?;

    root.present()?;
    Ok(())
}
