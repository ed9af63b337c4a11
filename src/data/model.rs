use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// SieveRecord – one row of the sieve table
// ---------------------------------------------------------------------------

/// One physical sieve: its opening size and the masses weighed for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SieveRecord {
    /// Position of the row in the source table (0-based, header excluded).
    pub row: usize,
    /// Designation cells (standard sieve, Tyler sieve, …) in source column order.
    pub labels: Vec<String>,
    /// Nominal mesh opening in micrometers.
    pub particle_diameter: f64,
    /// Mass of the empty sieve in grams, `None` when the cell is blank.
    pub empty_sieve_mass: Option<f64>,
    /// Mass of sieve plus retained material; `None` means the sieve was not used.
    pub loaded_sieve_mass: Option<f64>,
}

impl SieveRecord {
    /// A record built in code rather than read from a table.
    pub fn new(
        row: usize,
        particle_diameter: f64,
        empty_sieve_mass: Option<f64>,
        loaded_sieve_mass: Option<f64>,
    ) -> Self {
        Self {
            row,
            labels: Vec::new(),
            particle_diameter,
            empty_sieve_mass,
            loaded_sieve_mass,
        }
    }

    /// Whether both masses were weighed for this sieve.
    pub fn is_used(&self) -> bool {
        self.empty_sieve_mass.is_some() && self.loaded_sieve_mass.is_some()
    }
}

impl fmt::Display for SieveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} ({} µm)", self.row, self.particle_diameter)
    }
}

// ---------------------------------------------------------------------------
// SieveTable – the complete loaded table
// ---------------------------------------------------------------------------

/// A parsed sieve table: column names plus the records in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SieveTable {
    /// Every source column, normalized, in file order.
    pub columns: Vec<String>,
    /// Names of the non-numeric columns kept as labels.
    pub label_columns: Vec<String>,
    /// All rows, including sieves that were not used.
    pub records: Vec<SieveRecord>,
}

impl SieveTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows with both masses present.
    pub fn used_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_used()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_when_either_mass_is_blank() {
        assert!(SieveRecord::new(0, 841.0, Some(208.0), Some(416.0)).is_used());
        assert!(!SieveRecord::new(1, 841.0, Some(208.0), None).is_used());
        assert!(!SieveRecord::new(2, 841.0, None, Some(416.0)).is_used());
    }

    #[test]
    fn used_count_skips_blank_rows() {
        let table = SieveTable {
            columns: Vec::new(),
            label_columns: vec!["std sieve".into()],
            records: vec![
                SieveRecord::new(0, 4760.0, Some(1.0), Some(1.6)),
                SieveRecord::new(1, 3360.0, None, None),
                SieveRecord::new(2, 2000.0, Some(1.0), Some(1.6)),
            ],
        };
        assert_eq!(table.len(), 3);
        assert_eq!(table.used_count(), 2);
    }

    #[test]
    fn display_names_row_and_opening() {
        let rec = SieveRecord::new(4, 841.0, None, None);
        assert_eq!(rec.to_string(), "row 4 (841 µm)");
    }
}
