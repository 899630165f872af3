use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{CellValue, FacultyRecord, FacultyTable, Rank, RawRows};

/// Columns every faculty source must carry.
pub const FACULTY_COLUMNS: [&str; 8] = [
    "first",
    "last",
    "university",
    "citations",
    "h-index",
    "t10",
    "rank",
    MARKER_COLUMN,
];

/// Column flagging the latest snapshot of a professor.
pub const MARKER_COLUMN: &str = "trim";

/// Exact cell content of the marker column on current rows.
pub const CURRENT_MARKER: &str = "*";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the faculty table: current rows only, fixed projection, normalized
/// text and defaults for missing values.
pub fn load_faculty(path: &Path) -> Result<FacultyTable, LoadError> {
    let raw = read_rows(path)?;
    let table = project_faculty(&raw)?;
    log::info!(
        "Loaded {} current faculty records ({} source rows) from {}",
        table.len(),
        raw.len(),
        path.display()
    );
    Ok(table)
}

/// Load a reference list of university names. Uses the `university` column
/// when present, otherwise the first column.
pub fn load_universities(path: &Path) -> Result<Vec<String>, LoadError> {
    let raw = read_rows(path)?;
    let column = if raw.has_column("university") {
        "university".to_string()
    } else {
        raw.columns
            .first()
            .cloned()
            .ok_or_else(|| LoadError::MissingColumn("university".to_string()))?
    };

    let names: BTreeSet<String> = raw
        .rows
        .iter()
        .filter_map(|row| row.get(&column))
        .map(CellValue::as_text)
        .filter(|s| !s.is_empty())
        .collect();
    Ok(names.into_iter().collect())
}

/// Read any supported file into untyped rows. Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-delimited text with a header row
/// * `.tsv`          – tab-delimited text with a header row
/// * `.json`         – `[{ "first": "...", "citations": 12, ... }, ...]`
/// * `.parquet`      – flat columns (strings, ints, floats, bools)
pub fn read_rows(path: &Path) -> Result<RawRows, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => read_delimited(path, b','),
        "tsv" => read_delimited(path, b'\t'),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Apply the faculty schema to raw rows.
pub fn project_faculty(raw: &RawRows) -> Result<FacultyTable, LoadError> {
    require_columns(raw, &FACULTY_COLUMNS)?;

    let mut records = Vec::new();
    for (row_no, row) in raw.rows.iter().enumerate() {
        if !is_current(row) {
            continue;
        }

        let text = |col: &str| row.get(col).map(CellValue::as_text).unwrap_or_default();

        records.push(FacultyRecord {
            first: text("first"),
            last: text("last"),
            university: text("university"),
            citations: count(row, row_no, "citations")?,
            h_index: whole_count(row, row_no, "h-index")?,
            t10: whole_count(row, row_no, "t10")?,
            rank: Rank::parse(&text("rank")),
        });
    }

    let table = FacultyTable::from_records(records);
    let anomalies = table.anomalies();
    if !anomalies.is_empty() {
        log::warn!("{} faculty records report a t10 above their citations", anomalies.len());
        for (idx, issue) in &anomalies {
            let r = &table.records[*idx];
            log::debug!("{} {} ({}): {issue}", r.first, r.last, r.university);
        }
    }
    Ok(table)
}

pub(crate) fn require_columns(raw: &RawRows, columns: &[&str]) -> Result<(), LoadError> {
    match columns.iter().find(|c| !raw.has_column(c)) {
        Some(missing) => Err(LoadError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

fn is_current(row: &BTreeMap<String, CellValue>) -> bool {
    matches!(row.get(MARKER_COLUMN), Some(CellValue::Text(s)) if s == CURRENT_MARKER)
}

/// A numeric cell, `0` when missing.
pub(crate) fn number(
    row: &BTreeMap<String, CellValue>,
    row_no: usize,
    column: &str,
) -> Result<f64, LoadError> {
    let invalid = |value: String| LoadError::InvalidNumber {
        row: row_no,
        column: column.to_string(),
        value,
    };

    match row.get(column) {
        None => Ok(0.0),
        Some(cell) if cell.is_missing() => Ok(0.0),
        Some(CellValue::Integer(i)) => Ok(*i as f64),
        Some(CellValue::Float(v)) => Ok(*v),
        Some(CellValue::Text(s)) => s.trim().parse::<f64>().map_err(|_| invalid(s.clone())),
        Some(other) => Err(invalid(other.to_string())),
    }
}

/// A non-negative numeric cell.
fn count(row: &BTreeMap<String, CellValue>, row_no: usize, column: &str) -> Result<f64, LoadError> {
    let value = number(row, row_no, column)?;
    if value < 0.0 {
        return Err(LoadError::NegativeValue {
            row: row_no,
            column: column.to_string(),
            value,
        });
    }
    Ok(value)
}

/// A non-negative integer cell; a fractional value is invalid.
fn whole_count(row: &BTreeMap<String, CellValue>, row_no: usize, column: &str) -> Result<i64, LoadError> {
    let value = count(row, row_no, column)?;
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(LoadError::InvalidNumber {
            row: row_no,
            column: column.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value as i64)
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

fn read_delimited(path: &Path, delimiter: u8) -> Result<RawRows, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(open(path)?);

    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row = columns
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), CellValue::from_field(value)))
            .collect();
        rows.push(row);
    }

    Ok(RawRows { columns, rows })
}

// ---------------------------------------------------------------------------
// JSON records
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')` layout.
fn read_json(path: &Path) -> Result<RawRows, LoadError> {
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(open(path)?))?;
    let records = root.as_array().ok_or(LoadError::NotRecords)?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for rec in records {
        let obj = rec.as_object().ok_or(LoadError::NotRecords)?;
        let mut row = BTreeMap::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(RawRows { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Flat Parquet table, as written by both Pandas (`df.to_parquet()`) and
/// Polars (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawRows, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let mut cells = BTreeMap::new();
            for (col_idx, col_name) in columns.iter().enumerate() {
                cells.insert(col_name.clone(), extract_cell(batch.column(col_idx), row)?);
            }
            rows.push(cells);
        }
    }

    Ok(RawRows { columns, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<CellValue, LoadError> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let any = col.as_any();
    let typed = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };

    match typed {
        Some(cell) => Ok(cell),
        None => Ok(CellValue::from_field(&array_value_to_string(col, row)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    const HEADER: &str = "first,last,university,citations,h-index,t10,rank,trim";

    fn write_file(ext: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn keeps_only_current_rows() {
        let file = write_file(
            "csv",
            &format!(
                "{HEADER}\n\
                 Ada,Lovelace,Temple University,120,5,30,Full,*\n\
                 Ada,Lovelace,Temple University,90,4,20,Full,\n\
                 Alan,Turing,Carnegie Mellon University,300,9,40,Associate, *\n\
                 Grace,Hopper,University of Pennsylvania,50,3,10,Assistant,*\n"
            ),
        );
        let table = load_faculty(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].citations, 120.0);
        assert_eq!(table.records[1].last, "Hopper");
    }

    #[test]
    fn normalizes_text_and_fills_missing() {
        let file = write_file(
            "csv",
            &format!(
                "{HEADER},extra\n\
                 Ada ,  Lovelace,  Temple   University ,,,,full,*,ignored\n"
            ),
        );
        let table = load_faculty(file.path()).unwrap();
        let r = &table.records[0];
        assert_eq!(r.first, "Ada");
        assert_eq!(r.university, "Temple University");
        assert_eq!(r.university_key(), "TempleUniversity");
        assert_eq!((r.citations, r.h_index, r.t10), (0.0, 0, 0));
        assert_eq!(r.rank, Rank::Full);
        assert!(table.universities.contains("Temple University"));
    }

    #[test]
    fn missing_marker_column_is_a_schema_error() {
        let file = write_file(
            "csv",
            "first,last,university,citations,h-index,t10,rank\nA,B,C,1,1,1,Full\n",
        );
        match load_faculty(file.path()) {
            Err(LoadError::MissingColumn(col)) => assert_eq!(col, "trim"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_metric_is_rejected() {
        let file = write_file("csv", &format!("{HEADER}\nA,B,C,lots,1,1,Full,*\n"));
        assert!(matches!(
            load_faculty(file.path()),
            Err(LoadError::InvalidNumber { row: 0, .. })
        ));
    }

    #[test]
    fn fractional_counts_are_rejected() {
        let file = write_file("csv", &format!("{HEADER}\nA,B,C,10.5,2.5,1,Full,*\n"));
        match load_faculty(file.path()) {
            Err(LoadError::InvalidNumber { column, value, .. }) => {
                assert_eq!(column, "h-index");
                assert_eq!(value, "2.5");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let whole = write_file("csv", &format!("{HEADER}\nA,B,C,10.5,2.0,1,Full,*\n"));
        assert_eq!(load_faculty(whole.path()).unwrap().records[0].h_index, 2);
    }

    #[test]
    fn negative_citations_are_rejected() {
        let file = write_file("csv", &format!("{HEADER}\nA,B,C,-4,1,1,Full,*\n"));
        assert!(matches!(
            load_faculty(file.path()),
            Err(LoadError::NegativeValue { .. })
        ));
    }

    #[test]
    fn bad_values_on_stale_rows_are_ignored() {
        let file = write_file("csv", &format!("{HEADER}\nA,B,C,lots,1,1,Full,\nA,B,C,5,1,1,Full,*\n"));
        assert_eq!(load_faculty(file.path()).unwrap().len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_faculty(Path::new("/nonexistent/faculty.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = write_file("xls", "whatever");
        assert!(matches!(
            load_faculty(file.path()),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xls"
        ));
    }

    #[test]
    fn reads_tab_delimited() {
        let file = write_file(
            "tsv",
            "first\tlast\tuniversity\tcitations\th-index\tt10\trank\ttrim\n\
             Ada\tLovelace\tTemple University\t12.5\t2\t3\tAssistant\t*\n",
        );
        let table = load_faculty(file.path()).unwrap();
        assert_eq!(table.records[0].citations, 12.5);
        assert_eq!(table.records[0].rank, Rank::Assistant);
    }

    #[test]
    fn reads_json_records() {
        let file = write_file(
            "json",
            r#"[
                {"first": "Ada", "last": "Lovelace", "university": "Temple University",
                 "citations": 10, "h-index": 2, "t10": 1, "rank": "Full", "trim": "*"},
                {"first": "Alan", "last": "Turing", "university": "Temple University",
                 "citations": null, "h-index": 2.0, "t10": 1, "rank": "Full", "trim": null}
            ]"#,
        );
        let table = load_faculty(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].first, "Ada");
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        let file = write_file("json", r#"{"first": "Ada"}"#);
        assert!(matches!(load_faculty(file.path()), Err(LoadError::NotRecords)));
    }

    #[test]
    fn reads_parquet() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("first", DataType::Utf8, false),
            Field::new("last", DataType::Utf8, false),
            Field::new("university", DataType::Utf8, false),
            Field::new("citations", DataType::Float64, true),
            Field::new("h-index", DataType::Int64, false),
            Field::new("t10", DataType::Int32, false),
            Field::new("rank", DataType::Utf8, false),
            Field::new("trim", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Ada", "Alan"])),
                Arc::new(StringArray::from(vec!["Lovelace", "Turing"])),
                Arc::new(StringArray::from(vec!["Temple University", "Temple University"])),
                Arc::new(Float64Array::from(vec![Some(120.0), None])),
                Arc::new(Int64Array::from(vec![5, 6])),
                Arc::new(Int32Array::from(vec![30, 31])),
                Arc::new(StringArray::from(vec!["Full", "Associate"])),
                Arc::new(StringArray::from(vec![Some("*"), Some("*")])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.as_file().try_clone().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_faculty(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].h_index, 5);
        assert_eq!(table.records[1].citations, 0.0);
        assert_eq!(table.records[1].rank, Rank::Associate);
    }

    #[test]
    fn university_reference_is_deduplicated() {
        let file = write_file(
            "csv",
            "university\nTemple University\n Temple  University\n\nCarnegie Mellon University\n",
        );
        let names = load_universities(file.path()).unwrap();
        assert_eq!(names, vec!["Carnegie Mellon University", "Temple University"]);
    }

    #[test]
    fn university_reference_falls_back_to_first_column() {
        let file = write_file(
            "csv",
            "name,state\nTemple University,PA\n Drexel   University ,PA\n,NJ\n",
        );
        let names = load_universities(file.path()).unwrap();
        assert_eq!(names, vec!["Drexel University", "Temple University"]);
    }
}
