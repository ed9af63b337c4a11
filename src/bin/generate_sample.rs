use anyhow::{Context, Result};

/// U.S. standard sieve, Tyler equivalent, opening in micrometers.
const SIEVE_SERIES: [(&str, &str, f64); 28] = [
    ("4", "4", 4760.0),
    ("6", "6", 3360.0),
    ("8", "8", 2380.0),
    ("10", "9", 2000.0),
    ("12", "10", 1680.0),
    ("14", "12", 1410.0),
    ("16", "14", 1190.0),
    ("18", "16", 1000.0),
    ("20", "20", 841.0),
    ("25", "24", 707.0),
    ("30", "28", 595.0),
    ("35", "32", 500.0),
    ("40", "35", 420.0),
    ("45", "42", 354.0),
    ("50", "48", 297.0),
    ("60", "60", 250.0),
    ("70", "65", 210.0),
    ("80", "80", 177.0),
    ("100", "100", 149.0),
    ("120", "115", 125.0),
    ("140", "150", 105.0),
    ("170", "170", 88.0),
    ("200", "200", 74.0),
    ("230", "250", 63.0),
    ("270", "270", 53.0),
    ("325", "325", 44.0),
    ("400", "400", 37.0),
    ("pan", "pan", 10.0),
];

/// Sieves used in the sample run: (opening, empty mass, loaded mass).
const WEIGHINGS: [(f64, f64, f64); 7] = [
    (4760.0, 1.0, 1.6),
    (2000.0, 1.0, 1.6),
    (841.0, 208.0, 416.0),
    (420.0, 191.4, 382.8),
    (250.0, 72.3, 144.6),
    (74.0, 23.1, 46.2),
    (10.0, 0.9, 1.8),
];

fn main() -> Result<()> {
    let output_path = "sieve_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer.write_record([
        "std sieve",
        "tyler sieve",
        "particle diameter",
        "sieve mass",
        "sieve soil mass",
    ])?;

    for (std_sieve, tyler_sieve, diameter) in SIEVE_SERIES {
        let (empty, loaded) = WEIGHINGS
            .iter()
            .find(|(d, _, _)| *d == diameter)
            .map(|&(_, e, l)| (e.to_string(), l.to_string()))
            .unwrap_or_default();
        writer.write_record([
            std_sieve.to_string(),
            tyler_sieve.to_string(),
            diameter.to_string(),
            empty,
            loaded,
        ])?;
    }
    writer.flush()?;

    println!(
        "Wrote {} sieves ({} weighed) to {output_path}",
        SIEVE_SERIES.len(),
        WEIGHINGS.len()
    );
    Ok(())
}
