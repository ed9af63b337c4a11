use std::path::PathBuf;

use sieve_panda::{DEFAULT_DENSITY, SieveAnalysis, SieveTable, analyze};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded sieve table (None until user loads a file).
    pub table: Option<SieveTable>,

    /// File the table was read from.
    pub source: Option<PathBuf>,

    /// Material density (g/cm³) fed to the analysis.
    pub density: f64,

    /// Result of the last successful analysis; None after a failure.
    pub analysis: Option<SieveAnalysis>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            source: None,
            density: DEFAULT_DENSITY,
            analysis: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table and analyse it.
    pub fn set_table(&mut self, table: SieveTable, source: PathBuf) {
        self.table = Some(table);
        self.source = Some(source);
        self.reanalyze();
    }

    /// Change the density and recompute the statistics.
    pub fn set_density(&mut self, density: f64) {
        if density != self.density {
            self.density = density;
            self.reanalyze();
        }
    }

    /// Re-run the analysis on the current table. A failure clears the
    /// previous result so nothing stale is plotted.
    pub fn reanalyze(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        match analyze(&table.records, self.density) {
            Ok(analysis) => {
                self.analysis = Some(analysis);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Analysis failed: {e}");
                self.analysis = None;
                self.status_message = Some(format!("Analysis failed: {e}"));
            }
        }
    }

    /// Source column names of the loaded table, in file order.
    pub fn columns(&self) -> &[String] {
        self.table
            .as_ref()
            .map(|t| t.columns.as_slice())
            .unwrap_or(&[])
    }
}
