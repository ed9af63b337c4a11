use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{SieveRecord, SieveTable};

/// Column holding the mesh opening (µm).
pub const DIAMETER_COLUMN: &str = "particle diameter";
/// Column holding the empty sieve mass (g).
pub const EMPTY_MASS_COLUMN: &str = "sieve mass";
/// Column holding the sieve plus soil mass (g).
pub const LOADED_MASS_COLUMN: &str = "sieve soil mass";

const NUMERIC_COLUMNS: [&str; 3] = [DIAMETER_COLUMN, EMPTY_MASS_COLUMN, LOADED_MASS_COLUMN];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sieve table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one row per sieve (blank mass cells = unused sieve)
/// * `.json`    – `[{ "particle diameter": 841, "sieve mass": 208.0, ... }, ...]`
/// * `.parquet` – numeric mass/diameter columns, nulls mark unused sieves
///
/// Header names are matched case-insensitively and `_` counts as a space.
/// Columns other than the three numeric ones are kept as labels.
pub fn load_file(path: &Path) -> Result<SieveTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} sieves ({} used) from {}",
        table.len(),
        table.used_count(),
        path.display()
    );
    Ok(table)
}

/// Lower-case, trim and treat `_` as a space so `Sieve_Soil_Mass` matches.
fn normalize_header(h: &str) -> String {
    h.trim().to_ascii_lowercase().replace('_', " ")
}

fn is_numeric_column(name: &str) -> bool {
    NUMERIC_COLUMNS.contains(&name)
}

/// Parse a numeric cell; blank means absent.
fn parse_cell(s: &str, row: usize, col: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .with_context(|| format!("Row {row}, '{col}': '{s}' is not a number"))
}

/// Build the record for one row. The diameter is required only for a sieve
/// that was weighed; an unweighed row without one is dropped.
fn sieve_row(
    row: usize,
    labels: Vec<String>,
    particle_diameter: Option<f64>,
    empty_sieve_mass: Option<f64>,
    loaded_sieve_mass: Option<f64>,
) -> Result<Option<SieveRecord>> {
    let Some(particle_diameter) = particle_diameter else {
        if empty_sieve_mass.is_some() && loaded_sieve_mass.is_some() {
            bail!("Row {row}: missing '{DIAMETER_COLUMN}'");
        }
        log::debug!("Row {row}: no '{DIAMETER_COLUMN}' and not weighed, skipped");
        return Ok(None);
    };
    Ok(Some(SieveRecord {
        row,
        labels,
        particle_diameter,
        empty_sieve_mass,
        loaded_sieve_mass,
    }))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: the notebook's `sieve_data.csv`
///
/// ```text
/// std sieve,tyler sieve,particle diameter,sieve mass,sieve soil mass
/// 4,4,4760,1,1.6
/// 6,6,3360,,
/// ```
fn load_csv(path: &Path) -> Result<SieveTable> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// Parse a sieve table from any CSV reader.
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<SieveTable> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(normalize_header)
        .collect();

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let d_idx = position(DIAMETER_COLUMN)?;
    let e_idx = position(EMPTY_MASS_COLUMN)?;
    let l_idx = position(LOADED_MASS_COLUMN)?;

    let label_idx: Vec<usize> = (0..headers.len())
        .filter(|i| !is_numeric_column(&headers[*i]))
        .collect();
    let label_columns = label_idx.iter().map(|&i| headers[i].clone()).collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        // Completely blank lines carry nothing.
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let parsed = sieve_row(
            row_no,
            label_idx.iter().map(|&i| cell(i).trim().to_string()).collect(),
            parse_cell(cell(d_idx), row_no, DIAMETER_COLUMN)?,
            parse_cell(cell(e_idx), row_no, EMPTY_MASS_COLUMN)?,
            parse_cell(cell(l_idx), row_no, LOADED_MASS_COLUMN)?,
        )?;
        records.extend(parsed);
    }

    Ok(SieveTable {
        columns: headers,
        label_columns,
        records,
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "std sieve": "4", "particle diameter": 4760, "sieve mass": 1.0, "sieve soil mass": 1.6 },
///   { "std sieve": "6", "particle diameter": 3360, "sieve mass": null, "sieve soil mass": null }
/// ]
/// ```
fn load_json(path: &Path) -> Result<SieveTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<SieveTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(rows.len());

    for (i, rec) in rows.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let normalized: Vec<(String, &JsonValue)> =
            obj.iter().map(|(k, v)| (normalize_header(k), v)).collect();
        for (key, _) in &normalized {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(normalized);
    }

    let label_columns: Vec<String> = columns
        .iter()
        .filter(|c| !is_numeric_column(c))
        .cloned()
        .collect();
    let mut records = Vec::with_capacity(objects.len());

    for (i, obj) in objects.iter().enumerate() {
        let get = |name: &str| obj.iter().find(|(k, _)| k == name).map(|(_, v)| *v);

        let labels = label_columns
            .iter()
            .map(|col| match get(col.as_str()) {
                None | Some(JsonValue::Null) => String::new(),
                Some(JsonValue::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();

        let parsed = sieve_row(
            i,
            labels,
            json_number(get(DIAMETER_COLUMN), i, DIAMETER_COLUMN)?,
            json_number(get(EMPTY_MASS_COLUMN), i, EMPTY_MASS_COLUMN)?,
            json_number(get(LOADED_MASS_COLUMN), i, LOADED_MASS_COLUMN)?,
        )?;
        records.extend(parsed);
    }

    Ok(SieveTable {
        columns,
        label_columns,
        records,
    })
}

fn json_number(val: Option<&JsonValue>, row: usize, col: &str) -> Result<Option<f64>> {
    match val {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => Ok(n.as_f64()),
        Some(JsonValue::String(s)) => parse_cell(s, row, col),
        Some(other) => bail!("Row {row}, '{col}': expected a number, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing a sieve table.
///
/// Expected schema:
/// - `particle diameter`: any integer or float column, non-null
/// - `sieve mass`, `sieve soil mass`: integer or float columns, null = unused
/// - Any other columns are labels, rendered with Arrow's display formatter
fn load_parquet(path: &Path) -> Result<SieveTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut table = SieveTable::default();
    let mut row_base = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        if log::log_enabled!(log::Level::Debug) {
            if let Ok(text) = pretty_format_batches(std::slice::from_ref(&batch)) {
                log::debug!("parquet batch:\n{text}");
            }
        }
        let schema = batch.schema();
        let names: Vec<String> = schema
            .fields()
            .iter()
            .map(|f| normalize_header(f.name()))
            .collect();

        let position = |name: &str| {
            names
                .iter()
                .position(|h| h == name)
                .with_context(|| format!("Parquet file missing '{name}' column"))
        };
        let d_col = batch.column(position(DIAMETER_COLUMN)?);
        let e_col = batch.column(position(EMPTY_MASS_COLUMN)?);
        let l_col = batch.column(position(LOADED_MASS_COLUMN)?);

        let label_cols: Vec<(usize, String)> = names
            .iter()
            .enumerate()
            .filter(|(_, n)| !is_numeric_column(n))
            .map(|(i, n)| (i, n.clone()))
            .collect();
        if table.columns.is_empty() {
            table.label_columns = label_cols.iter().map(|(_, n)| n.clone()).collect();
            table.columns = names.clone();
        }

        for i in 0..batch.num_rows() {
            let row = row_base + i;

            let labels = label_cols
                .iter()
                .map(|(idx, _)| {
                    let col = batch.column(*idx);
                    if col.is_null(i) {
                        Ok(String::new())
                    } else {
                        array_value_to_string(col, i)
                            .with_context(|| format!("Row {row}: formatting label"))
                    }
                })
                .collect::<Result<Vec<_>>>()?;

            let parsed = sieve_row(
                row,
                labels,
                extract_f64(d_col, i, row, DIAMETER_COLUMN)?,
                extract_f64(e_col, i, row, EMPTY_MASS_COLUMN)?,
                extract_f64(l_col, i, row, LOADED_MASS_COLUMN)?,
            )?;
            table.records.extend(parsed);
        }
        row_base += batch.num_rows();
    }

    Ok(table)
}

// -- Parquet / Arrow helpers --

/// Extract an optional `f64` from a numeric (or numeric-string) column.
fn extract_f64(col: &Arc<dyn Array>, i: usize, row: usize, name: &str) -> Result<Option<f64>> {
    if col.is_null(i) {
        return Ok(None);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(i)),
        DataType::Float32 => any.downcast_ref::<Float32Array>().map(|a| a.value(i) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(i) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(i) as f64),
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = array_value_to_string(col, i)
                .with_context(|| format!("Row {row}: reading '{name}'"))?;
            return parse_cell(&text, row, name);
        }
        other => bail!("Row {row}: '{name}' has unsupported type {other:?}"),
    };
    value
        .map(Some)
        .with_context(|| format!("Row {row}: unexpected array layout for '{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
std sieve,tyler sieve,particle diameter,sieve mass,sieve soil mass
4,4,4760,1,1.6
6,6,3360,,
10,9,2000,1,1.6
";

    fn from_str(text: &str) -> Result<SieveTable> {
        read_csv(csv::Reader::from_reader(text.as_bytes()))
    }

    #[test]
    fn csv_keeps_labels_and_blank_masses() {
        let table = from_str(SAMPLE).unwrap();
        assert_eq!(table.label_columns, vec!["std sieve", "tyler sieve"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.used_count(), 2);

        let blank = &table.records[1];
        assert_eq!(blank.row, 1);
        assert_eq!(blank.labels, vec!["6", "6"]);
        assert_eq!(blank.particle_diameter, 3360.0);
        assert_eq!(blank.empty_sieve_mass, None);
        assert_eq!(blank.loaded_sieve_mass, None);
    }

    #[test]
    fn csv_unweighed_row_without_diameter_is_dropped() {
        let table = from_str(
            "std sieve,tyler sieve,particle diameter,sieve mass,sieve soil mass\n\
             20,20,841,208,416\n\
             x,x,,,\n\
             40,35,420,191.4,382.8\n",
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.used_count(), 2);
        let rows: Vec<usize> = table.records.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![0, 2]);
    }

    #[test]
    fn csv_weighed_row_without_diameter_is_an_error() {
        let err = from_str(
            "particle diameter,sieve mass,sieve soil mass\n841,208,416\n,191.4,382.8\n",
        )
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Row 1: missing 'particle diameter'"), "{msg}");
    }

    #[test]
    fn csv_keeps_source_column_order() {
        let table =
            from_str("particle diameter,std sieve,sieve mass,sieve soil mass\n841,20,208,416\n")
                .unwrap();
        assert_eq!(
            table.columns,
            vec!["particle diameter", "std sieve", "sieve mass", "sieve soil mass"]
        );
        assert_eq!(table.label_columns, vec!["std sieve"]);
    }

    #[test]
    fn csv_headers_are_normalized() {
        let table = from_str("Particle_Diameter,Sieve Mass,SIEVE_SOIL_MASS\n841,208,416\n").unwrap();
        assert!(table.label_columns.is_empty());
        assert_eq!(table.records[0].loaded_sieve_mass, Some(416.0));
    }

    #[test]
    fn csv_missing_column_is_an_error() {
        let err = from_str("particle diameter,sieve mass\n841,208\n").unwrap_err();
        assert!(format!("{err:#}").contains("sieve soil mass"));
    }

    #[test]
    fn csv_bad_number_names_row() {
        let err = from_str("particle diameter,sieve mass,sieve soil mass\n841,abc,416\n").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Row 0"), "{msg}");
        assert!(msg.contains("abc"), "{msg}");
    }

    #[test]
    fn json_records_with_nulls() {
        let table = parse_json(
            r#"[
                {"std sieve": "4", "particle diameter": 4760, "sieve mass": 1, "sieve soil mass": 1.6},
                {"std sieve": "6", "particle diameter": 3360, "sieve mass": null, "sieve soil mass": ""}
            ]"#,
        )
        .unwrap();
        assert_eq!(table.label_columns, vec!["std sieve"]);
        assert_eq!(table.records[0].empty_sieve_mass, Some(1.0));
        assert_eq!(table.records[1].labels, vec!["6"]);
        assert!(!table.records[1].is_used());
    }

    #[test]
    fn json_requires_diameter() {
        let err = parse_json(r#"[{"sieve mass": 1, "sieve soil mass": 2}]"#).unwrap_err();
        assert!(format!("{err:#}").contains("particle diameter"));
    }

    #[test]
    fn json_unweighed_row_without_diameter_is_dropped() {
        let table = parse_json(
            r#"[
                {"particle diameter": 841, "sieve mass": 208, "sieve soil mass": 416},
                {"particle diameter": null, "sieve mass": null, "sieve soil mass": null},
                {"particle diameter": 420, "sieve mass": 191.4, "sieve soil mass": 382.8}
            ]"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[1].row, 2);
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("sieves.xlsx")).unwrap_err();
        assert!(format!("{err:#}").contains(".xlsx"));
    }
}
