//! Sieve analysis: mass readings → percentages → geometric statistics.
//!
//! Pipeline:
//! ```text
//!   &[SieveRecord]
//!        │  drop unused sieves, retained = loaded − empty
//!        ▼
//!   retained mass ──► retained % ──► cumulative % ──► passing %
//!        │
//!        ▼
//!   ln gmps ──► gmps, gsd ──► surface area, particles per gram
//! ```
//!
//! All values stay at full precision; [`SieveAnalysis::rounded`] produces the
//! three-decimal copy used for presentation.

pub mod error;

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

pub use error::AnalysisError;

use crate::data::model::SieveRecord;

/// Decimals used whenever a number leaves the crate for display or export.
pub const DISPLAY_DECIMALS: i32 = 3;

/// Micrometers per centimeter; the surface formulas work in g/cm³.
const MICRONS_PER_CM: f64 = 10_000.0;

/// Round `value` to [`DISPLAY_DECIMALS`] places.
pub fn round_display(value: f64) -> f64 {
    let scale = 10f64.powi(DISPLAY_DECIMALS);
    // `+ 0.0` folds a negative zero into 0.0
    (value * scale).round() / scale + 0.0
}

// ---------------------------------------------------------------------------
// AnalyzedRecord – one included sieve plus its derived columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedRecord {
    pub row: usize,
    pub labels: Vec<String>,
    pub particle_diameter: f64,
    pub empty_sieve_mass: f64,
    pub loaded_sieve_mass: f64,
    pub retained_mass: f64,
    pub retained_pct: f64,
    pub cumulative_retained_pct: f64,
    pub passing_pct: f64,
}

impl AnalyzedRecord {
    /// Copy with every numeric column rounded for display.
    pub fn rounded(&self) -> Self {
        Self {
            row: self.row,
            labels: self.labels.clone(),
            particle_diameter: round_display(self.particle_diameter),
            empty_sieve_mass: round_display(self.empty_sieve_mass),
            loaded_sieve_mass: round_display(self.loaded_sieve_mass),
            retained_mass: round_display(self.retained_mass),
            retained_pct: round_display(self.retained_pct),
            cumulative_retained_pct: round_display(self.cumulative_retained_pct),
            passing_pct: round_display(self.passing_pct),
        }
    }

    /// The input record this row was derived from.
    pub fn to_sieve_record(&self) -> SieveRecord {
        SieveRecord {
            row: self.row,
            labels: self.labels.clone(),
            particle_diameter: self.particle_diameter,
            empty_sieve_mass: Some(self.empty_sieve_mass),
            loaded_sieve_mass: Some(self.loaded_sieve_mass),
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisResult – the four geometric statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Mass-weighted geometric mean diameter (µm).
    pub geometric_mean_particle_size: f64,
    /// Mass-weighted geometric standard deviation (dimensionless).
    pub geometric_standard_deviation: f64,
    /// Surface area per unit mass (cm²/g for a density in g/cm³).
    pub specific_surface_area: f64,
    /// Number of particles per gram.
    pub particles_per_gram: f64,
}

impl AnalysisResult {
    pub fn rounded(&self) -> Self {
        Self {
            geometric_mean_particle_size: round_display(self.geometric_mean_particle_size),
            geometric_standard_deviation: round_display(self.geometric_standard_deviation),
            specific_surface_area: round_display(self.specific_surface_area),
            particles_per_gram: round_display(self.particles_per_gram),
        }
    }

    /// Label / value pairs in report order.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("geometric mean particle size", self.geometric_mean_particle_size),
            ("geometric standard deviation", self.geometric_standard_deviation),
            ("surface area", self.specific_surface_area),
            ("number parts per g", self.particles_per_gram),
        ]
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.entries() {
            writeln!(f, "{label} = {:.*}", DISPLAY_DECIMALS as usize, value)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SieveAnalysis – full output of one run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SieveAnalysis {
    /// Material density the statistics were computed with.
    pub density: f64,
    /// Sum of retained masses over the included sieves.
    pub total_retained_mass: f64,
    /// Included sieves in input order.
    pub records: Vec<AnalyzedRecord>,
    pub result: AnalysisResult,
}

impl SieveAnalysis {
    /// `(particle_diameter, passing_pct)` pairs in input order, for plotting.
    pub fn passing_curve(&self) -> Vec<[f64; 2]> {
        self.records
            .iter()
            .map(|r| [r.particle_diameter, r.passing_pct])
            .collect()
    }

    /// Copy with all records and statistics rounded for display.
    pub fn rounded(&self) -> Self {
        Self {
            density: self.density,
            total_retained_mass: round_display(self.total_retained_mass),
            records: self.records.iter().map(AnalyzedRecord::rounded).collect(),
            result: self.result.rounded(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Run the sieve analysis over `records` (coarsest sieve first).
///
/// Sieves missing either mass are skipped. Fails with
/// * [`AnalysisError::InvalidDensity`] if `density` is not a positive number,
/// * [`AnalysisError::InsufficientData`] if fewer than two sieves remain,
/// * [`AnalysisError::InvalidMeasurement`] for a negative retained mass, a
///   non-positive diameter or a repeated diameter,
/// * [`AnalysisError::DivisionByZero`] if nothing was retained at all.
pub fn analyze(records: &[SieveRecord], density: f64) -> Result<SieveAnalysis, AnalysisError> {
    if !(density.is_finite() && density > 0.0) {
        return Err(AnalysisError::InvalidDensity(density));
    }

    let used: Vec<(&SieveRecord, f64, f64)> = records
        .iter()
        .filter_map(|r| Some((r, r.empty_sieve_mass?, r.loaded_sieve_mass?)))
        .collect();

    for rec in records.iter().filter(|r| !r.is_used()) {
        log::debug!("skipping {rec}: no mass readings");
    }
    if used.len() < 2 {
        return Err(AnalysisError::InsufficientData { usable: used.len() });
    }

    let mut retained = Vec::with_capacity(used.len());
    for &(rec, empty, loaded) in &used {
        let mass = loaded - empty;
        if !mass.is_finite() {
            return Err(AnalysisError::invalid(
                rec.row,
                rec.particle_diameter,
                "sieve masses must be finite numbers",
            ));
        }
        if mass < 0.0 {
            return Err(AnalysisError::invalid(
                rec.row,
                rec.particle_diameter,
                format!("loaded mass {loaded} is below empty sieve mass {empty}"),
            ));
        }
        retained.push(mass);
    }

    // rmt = retained mass total
    let rmt: f64 = retained.iter().sum();
    if rmt == 0.0 {
        return Err(AnalysisError::DivisionByZero);
    }

    let mut cumulative = 0.0;
    let analyzed: Vec<AnalyzedRecord> = used
        .iter()
        .zip(&retained)
        .map(|(&(rec, empty, loaded), &mass)| {
            let retained_pct = mass / rmt * 100.0;
            cumulative += retained_pct;
            AnalyzedRecord {
                row: rec.row,
                labels: rec.labels.clone(),
                particle_diameter: rec.particle_diameter,
                empty_sieve_mass: empty,
                loaded_sieve_mass: loaded,
                retained_mass: mass,
                retained_pct,
                cumulative_retained_pct: cumulative,
                passing_pct: 100.0 - cumulative,
            }
        })
        .collect();

    let result = geometric_statistics(&analyzed, rmt, density)?;
    log::info!(
        "analysed {} sieves: gmps = {:.3} µm, gsd = {:.3}",
        analyzed.len(),
        result.geometric_mean_particle_size,
        result.geometric_standard_deviation
    );

    Ok(SieveAnalysis {
        density,
        total_retained_mass: rmt,
        records: analyzed,
        result,
    })
}

fn geometric_statistics(
    records: &[AnalyzedRecord],
    rmt: f64,
    density: f64,
) -> Result<AnalysisResult, AnalysisError> {
    let mut seen = HashSet::with_capacity(records.len());
    for rec in records {
        let d = rec.particle_diameter;
        if !(d.is_finite() && d > 0.0) {
            return Err(AnalysisError::invalid(
                rec.row,
                d,
                "particle diameter must be positive",
            ));
        }
        if !seen.insert(d.to_bits()) {
            return Err(AnalysisError::invalid(
                rec.row,
                d,
                "particle diameter appears more than once",
            ));
        }
    }

    // The same ln(gmps) feeds the spread term below.
    let ln_gmps = records
        .iter()
        .map(|r| r.retained_mass * r.particle_diameter.ln())
        .sum::<f64>()
        / rmt;
    let gmps = ln_gmps.exp();

    let variance = records
        .iter()
        .map(|r| r.retained_mass * (r.particle_diameter.ln() - ln_gmps).powi(2))
        .sum::<f64>()
        / rmt;
    let gsd = variance.sqrt().exp();

    let ln_gsd_sq = gsd.ln().powi(2);
    let ln_gmps_cm = (gmps / MICRONS_PER_CM).ln();
    let specific_surface_area = 6.0 / density * (0.5 * ln_gsd_sq - ln_gmps_cm).exp();
    let particles_per_gram = 1.0 / density * (4.5 * ln_gsd_sq - 3.0 * ln_gmps_cm).exp();

    Ok(AnalysisResult {
        geometric_mean_particle_size: gmps,
        geometric_standard_deviation: gsd,
        specific_surface_area,
        particles_per_gram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIAMETERS: [f64; 7] = [4760.0, 2000.0, 841.0, 420.0, 250.0, 74.0, 10.0];
    const EMPTY: [f64; 7] = [1.0, 1.0, 208.0, 191.4, 72.3, 23.1, 0.9];
    const LOADED: [f64; 7] = [1.6, 1.6, 416.0, 382.8, 144.6, 46.2, 1.8];

    fn scenario() -> Vec<SieveRecord> {
        DIAMETERS
            .iter()
            .zip(EMPTY.iter().zip(LOADED.iter()))
            .enumerate()
            .map(|(i, (&d, (&e, &l)))| SieveRecord::new(i, d, Some(e), Some(l)))
            .collect()
    }

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn scenario_statistics() {
        let analysis = analyze(&scenario(), 1.32).unwrap();
        assert_close(analysis.total_retained_mass, 496.9, 1e-9);

        let r = analysis.result.rounded();
        assert_eq!(r.geometric_mean_particle_size, 479.502);
        assert_eq!(r.geometric_standard_deviation, 1.881);
        assert_eq!(r.specific_surface_area, 115.72);
        assert_eq!(r.particles_per_gram, 41366.213);
    }

    #[test]
    fn scenario_columns() {
        let analysis = analyze(&scenario(), 1.32).unwrap().rounded();
        let retained: Vec<f64> = analysis.records.iter().map(|r| r.retained_mass).collect();
        assert_eq!(retained, vec![0.6, 0.6, 208.0, 191.4, 72.3, 23.1, 0.9]);

        let passing: Vec<f64> = analysis.records.iter().map(|r| r.passing_pct).collect();
        assert_eq!(
            passing,
            vec![99.879, 99.759, 57.899, 19.38, 4.83, 0.181, 0.0]
        );
        assert!(passing.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn unused_sieves_are_dropped() {
        let mut records = scenario();
        records.insert(1, SieveRecord::new(99, 3360.0, Some(1.0), None));
        records.push(SieveRecord::new(100, 5.0, None, None));

        let analysis = analyze(&records, 1.32).unwrap();
        assert_eq!(analysis.records.len(), 7);
        assert!(analysis.records.iter().all(|r| r.row != 99 && r.row != 100));
        assert_eq!(analysis.result, analyze(&scenario(), 1.32).unwrap().result);
    }

    #[test]
    fn display_prints_three_decimals() {
        let text = analyze(&scenario(), 1.32).unwrap().result.to_string();
        assert!(text.contains("geometric mean particle size = 479.502\n"));
        assert!(text.contains("geometric standard deviation = 1.881\n"));
        assert!(text.contains("surface area = 115.720\n"));
        assert!(text.contains("number parts per g = 41366.213\n"));
    }

    #[test]
    fn negative_retained_mass_names_the_row() {
        let mut records = scenario();
        records[3].loaded_sieve_mass = Some(100.0);
        match analyze(&records, 1.32) {
            Err(AnalysisError::InvalidMeasurement {
                row,
                particle_diameter,
                ..
            }) => {
                assert_eq!(row, 3);
                assert_eq!(particle_diameter, 420.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_finite_mass_names_the_row() {
        let mut records = scenario();
        records[2].loaded_sieve_mass = Some(f64::NAN);
        assert!(matches!(
            analyze(&records, 1.32),
            Err(AnalysisError::InvalidMeasurement { row: 2, .. })
        ));

        let mut records = scenario();
        records[4].loaded_sieve_mass = Some(f64::INFINITY);
        match analyze(&records, 1.32) {
            Err(AnalysisError::InvalidMeasurement {
                row,
                particle_diameter,
                reason,
            }) => {
                assert_eq!(row, 4);
                assert_eq!(particle_diameter, 250.0);
                assert!(reason.contains("finite"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn zero_total_is_division_by_zero() {
        let records: Vec<_> = DIAMETERS
            .iter()
            .enumerate()
            .map(|(i, &d)| SieveRecord::new(i, d, Some(5.0), Some(5.0)))
            .collect();
        assert_eq!(analyze(&records, 1.32), Err(AnalysisError::DivisionByZero));
    }

    #[test]
    fn single_usable_record_is_insufficient() {
        let mut records = scenario();
        for r in records.iter_mut().skip(1) {
            r.loaded_sieve_mass = None;
        }
        assert_eq!(
            analyze(&records, 1.32),
            Err(AnalysisError::InsufficientData { usable: 1 })
        );
        assert_eq!(
            analyze(&[], 1.32),
            Err(AnalysisError::InsufficientData { usable: 0 })
        );
    }

    #[test]
    fn non_positive_diameter_is_rejected() {
        let mut records = scenario();
        records[6].particle_diameter = 0.0;
        assert!(matches!(
            analyze(&records, 1.32),
            Err(AnalysisError::InvalidMeasurement { row: 6, .. })
        ));
    }

    #[test]
    fn duplicate_diameter_is_rejected() {
        let mut records = scenario();
        records[5].particle_diameter = 250.0;
        assert!(matches!(
            analyze(&records, 1.32),
            Err(AnalysisError::InvalidMeasurement { row: 5, .. })
        ));
    }

    #[test]
    fn density_must_be_positive() {
        assert_eq!(
            analyze(&scenario(), 0.0),
            Err(AnalysisError::InvalidDensity(0.0))
        );
        assert!(matches!(
            analyze(&scenario(), f64::NAN),
            Err(AnalysisError::InvalidDensity(_))
        ));
    }

    #[test]
    fn density_scales_surface_statistics_only() {
        let a = analyze(&scenario(), 1.0).unwrap().result;
        let b = analyze(&scenario(), 2.0).unwrap().result;
        assert_eq!(a.geometric_mean_particle_size, b.geometric_mean_particle_size);
        assert_eq!(a.geometric_standard_deviation, b.geometric_standard_deviation);
        assert_close(a.specific_surface_area / b.specific_surface_area, 2.0, 1e-12);
        assert_close(a.particles_per_gram / b.particles_per_gram, 2.0, 1e-12);
    }

    #[test]
    fn round_display_clears_negative_zero() {
        let v = round_display(-1.4e-14);
        assert_eq!(v, 0.0);
        assert!(v.is_sign_positive());
        assert_eq!(round_display(99.87926), 99.879);
    }
}
