use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::loader::{DIAMETER_COLUMN, EMPTY_MASS_COLUMN, LOADED_MASS_COLUMN};
use crate::analysis::{AnalyzedRecord, SieveAnalysis};

/// Derived columns appended after the input columns.
pub const DERIVED_COLUMNS: [&str; 4] = [
    "retained mass",
    "retained pct",
    "cumul retained pct",
    "passing pct",
];

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// Where an output cell takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Label(usize),
    Diameter,
    EmptyMass,
    LoadedMass,
}

/// Output columns: the input columns in source order, any measured column
/// the input lacked, then [`DERIVED_COLUMNS`].
#[derive(Debug, Clone)]
pub struct ResultLayout {
    input: Vec<(String, Source)>,
}

impl ResultLayout {
    pub fn new(input_columns: &[String]) -> Self {
        let mut input = Vec::with_capacity(input_columns.len() + 3);
        let mut labels = 0;
        for name in input_columns {
            let source = match name.as_str() {
                DIAMETER_COLUMN => Source::Diameter,
                EMPTY_MASS_COLUMN => Source::EmptyMass,
                LOADED_MASS_COLUMN => Source::LoadedMass,
                _ => {
                    labels += 1;
                    Source::Label(labels - 1)
                }
            };
            if !input.iter().any(|(_, s)| *s == source) {
                input.push((name.clone(), source));
            }
        }
        for (name, source) in [
            (DIAMETER_COLUMN, Source::Diameter),
            (EMPTY_MASS_COLUMN, Source::EmptyMass),
            (LOADED_MASS_COLUMN, Source::LoadedMass),
        ] {
            if !input.iter().any(|(_, s)| *s == source) {
                input.push((name.to_string(), source));
            }
        }
        Self { input }
    }

    pub fn header(&self) -> Vec<&str> {
        self.input
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(DERIVED_COLUMNS)
            .collect()
    }

    /// Cells of one row; `rec` is printed as given, so round it first.
    pub fn row(&self, rec: &AnalyzedRecord) -> Vec<String> {
        let measured = self.input.iter().map(|(_, source)| match *source {
            // Records built in code carry no labels.
            Source::Label(i) => rec.labels.get(i).cloned().unwrap_or_default(),
            Source::Diameter => rec.particle_diameter.to_string(),
            Source::EmptyMass => rec.empty_sieve_mass.to_string(),
            Source::LoadedMass => rec.loaded_sieve_mass.to_string(),
        });
        let derived = [
            rec.retained_mass,
            rec.retained_pct,
            rec.cumulative_retained_pct,
            rec.passing_pct,
        ]
        .into_iter()
        .map(|v| v.to_string());
        measured.chain(derived).collect()
    }
}

// ---------------------------------------------------------------------------
// CSV output
// ---------------------------------------------------------------------------

/// Write the results table to `path` (see [`write_results`]).
pub fn write_results_csv(
    path: &Path,
    analysis: &SieveAnalysis,
    input_columns: &[String],
) -> Result<()> {
    let writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_results(writer, analysis, input_columns)?;
    log::info!("Wrote {} result rows to {}", analysis.records.len(), path.display());
    Ok(())
}

/// One row per included sieve, in input order, laid out by [`ResultLayout`]
/// with every number rounded to three decimals.
pub fn write_results<W: Write>(
    mut writer: csv::Writer<W>,
    analysis: &SieveAnalysis,
    input_columns: &[String],
) -> Result<()> {
    let layout = ResultLayout::new(input_columns);
    writer
        .write_record(layout.header())
        .context("writing CSV header")?;

    for rec in analysis.rounded().records {
        writer
            .write_record(layout.row(&rec))
            .with_context(|| format!("writing result row {}", rec.row))?;
    }

    writer.flush().context("flushing CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::data::model::SieveRecord;

    #[test]
    fn rows_are_rounded_and_ordered() {
        let mut a = SieveRecord::new(0, 841.0, Some(208.0), Some(416.0));
        a.labels = vec!["20".into()];
        let mut b = SieveRecord::new(2, 420.0, Some(191.4), Some(382.8));
        b.labels = vec!["40".into()];
        let analysis = analyze(&[a, b], 1.32).unwrap();

        let mut buf = Vec::new();
        write_results(
            csv::Writer::from_writer(&mut buf),
            &analysis,
            &["std sieve".to_string()],
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "std sieve,particle diameter,sieve mass,sieve soil mass,\
             retained mass,retained pct,cumul retained pct,passing pct"
        );
        assert_eq!(lines[1], "20,841,208,416,208,52.078,52.078,47.922");
        assert_eq!(lines[2], "40,420,191.4,382.8,191.4,47.922,100,0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn source_column_order_is_kept() {
        let mut a = SieveRecord::new(0, 841.0, Some(208.0), Some(416.0));
        a.labels = vec!["20".into()];
        let mut b = SieveRecord::new(1, 420.0, Some(191.4), Some(382.8));
        b.labels = vec!["40".into()];
        let analysis = analyze(&[a, b], 1.32).unwrap();

        let columns: Vec<String> = ["particle diameter", "std sieve", "sieve soil mass", "sieve mass"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let mut buf = Vec::new();
        write_results(csv::Writer::from_writer(&mut buf), &analysis, &columns).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "particle diameter,std sieve,sieve soil mass,sieve mass,\
             retained mass,retained pct,cumul retained pct,passing pct"
        );
        assert_eq!(lines[1], "841,20,416,208,208,52.078,52.078,47.922");
    }
}
