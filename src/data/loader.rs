use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type, UInt32Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, HotelDataset, HotelRecord};

pub const REQUIRED_COLUMNS: [&str; 4] = ["name", "prefecture", "city", "price_per_person"];
pub const RATING_COLUMN: &str = "rating";
pub const WALK_TIME_COLUMN: &str = "station_walk_time";
/// Columns whose CSV text is parsed as a number; every other column is kept verbatim.
const NUMERIC_COLUMNS: [&str; 3] = ["price_per_person", RATING_COLUMN, WALK_TIME_COLUMN];

/// Schema and row problems that make a file unusable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a hotel dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, UTF-8 with or without a byte-order mark
/// * `.json`    – `[{ "name": ..., "price_per_person": ..., ... }, ...]`
/// * `.parquet` – flat columns (strings, ints, floats)
pub fn load_file(path: &Path) -> Result<HotelDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    };

    let dataset = table
        .into_dataset()
        .with_context(|| format!("building dataset from {}", path.display()))?;

    log::info!(
        "Loaded {} hotels from {} (rating: {}, walk time: {})",
        dataset.len(),
        path.display(),
        dataset.schema.has_rating,
        dataset.schema.has_walk_time
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// RawTable – format-independent intermediate
// ---------------------------------------------------------------------------

/// Column names plus rows of cells, one cell per column.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    fn require(&self, column: &'static str) -> Result<usize, LoadError> {
        self.position(column).ok_or(LoadError::MissingColumn(column))
    }

    /// Validate the schema once, then convert every row to a [`HotelRecord`].
    pub fn into_dataset(self) -> Result<HotelDataset, LoadError> {
        let [name_idx, pref_idx, city_idx, price_idx] = [
            self.require(REQUIRED_COLUMNS[0])?,
            self.require(REQUIRED_COLUMNS[1])?,
            self.require(REQUIRED_COLUMNS[2])?,
            self.require(REQUIRED_COLUMNS[3])?,
        ];
        let rating_idx = self.position(RATING_COLUMN);
        let walk_idx = self.position(WALK_TIME_COLUMN);

        if rating_idx.is_none() {
            log::warn!("No '{RATING_COLUMN}' column; rating filter and rankings disabled");
        }
        if walk_idx.is_none() {
            log::debug!("No '{WALK_TIME_COLUMN}' column");
        }

        let mut records = Vec::with_capacity(self.rows.len());
        for (row_no, mut row) in self.rows.into_iter().enumerate() {
            let mut take = |idx: usize| {
                row.get_mut(idx)
                    .map(|c| std::mem::replace(c, CellValue::Null))
                    .unwrap_or(CellValue::Null)
            };

            let price_per_person = parse_price(take(price_idx), row_no)?;
            let rating = match rating_idx {
                Some(idx) => parse_rating(take(idx), row_no)?,
                None => None,
            };
            let station_walk_time = match walk_idx {
                Some(idx) => parse_walk_time(take(idx), row_no)?,
                None => None,
            };

            records.push(HotelRecord {
                name: take(name_idx).into_text().unwrap_or_default(),
                prefecture: take(pref_idx).into_text().filter(|p| !p.is_empty()),
                city: take(city_idx).into_text().unwrap_or_default(),
                price_per_person,
                rating,
                station_walk_time,
            });
        }

        Ok(HotelDataset::from_records(records, rating_idx.is_some()))
    }
}

fn invalid(row: usize, column: &'static str, cell: &CellValue) -> LoadError {
    LoadError::InvalidValue {
        row,
        column,
        value: cell.to_string(),
    }
}

fn parse_price(cell: CellValue, row: usize) -> Result<f64, LoadError> {
    match cell.as_f64() {
        // `abs` folds `-0.0` into `0.0` so free listings sort and print alike.
        Some(p) if p.is_finite() && p >= 0.0 => Ok(p.abs()),
        _ => Err(invalid(row, "price_per_person", &cell)),
    }
}

fn parse_rating(cell: CellValue, row: usize) -> Result<Option<f64>, LoadError> {
    if cell.is_null() {
        return Ok(None);
    }
    match cell.as_f64() {
        Some(r) if r.is_finite() => Ok(Some(r)),
        _ => Err(invalid(row, RATING_COLUMN, &cell)),
    }
}

/// Whole minutes; pandas writes nullable integer columns as `5.0`.
fn parse_walk_time(cell: CellValue, row: usize) -> Result<Option<u32>, LoadError> {
    match &cell {
        CellValue::Null => Ok(None),
        CellValue::Integer(i) => u32::try_from(*i)
            .map(Some)
            .map_err(|_| invalid(row, WALK_TIME_COLUMN, &cell)),
        CellValue::Float(f) if f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64 => {
            Ok(Some(*f as u32))
        }
        _ => Err(invalid(row, WALK_TIME_COLUMN, &cell)),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading CSV file")?;
    parse_csv(&text)
}

/// Parse CSV text with a header row. Empty cells become [`CellValue::Null`].
///
/// Only the numeric columns are type-guessed; names, regions and cities such
/// as `007` or `nan` stay exactly as written.
pub fn parse_csv(text: &str) -> Result<RawTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let numeric: Vec<bool> = columns
        .iter()
        .map(|c| NUMERIC_COLUMNS.contains(&c.as_str()))
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = record
            .iter()
            .zip(&numeric)
            .map(|(s, &is_numeric)| {
                if is_numeric {
                    guess_cell_type(s)
                } else {
                    text_cell(s)
                }
            })
            .collect();
        rows.push(cells);
    }

    Ok(RawTable { columns, rows })
}

fn text_cell(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "name": "Hotel A", "prefecture": "Osaka", "city": "Namba",
///     "price_per_person": 6500, "rating": 4.1, "station_walk_time": 3 },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<RawTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    // Column order follows first appearance across all objects.
    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table as written by pandas (`df.to_parquet()`) or
/// polars (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .zip(&columns)
                .map(|(col, name)| {
                    extract_cell(col, row).with_context(|| format!("Row {row}, column '{name}'"))
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(cells);
        }
    }

    Ok(RawTable { columns, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::String(col.as_boolean().value(row).to_string()),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::filter::{ConstraintSet, filter};
    use crate::data::rank::{Column, Rankings};

    fn write_temp(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("create temp file");
        file.write_all(bytes).expect("write temp file");
        file
    }

    #[test]
    fn csv_with_bom_and_optional_columns() {
        let text = "\u{feff}name,prefecture,city,price_per_person,rating,station_walk_time\n\
                    Sakura Inn,Kyoto,Higashiyama,6500,4.3,5.0\n\
                    Bay Hotel,,Minato,8000,,\n";
        let file = write_temp(".csv", text.as_bytes());
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert!(ds.schema.has_rating);
        assert!(ds.schema.has_walk_time);
        let first = &ds.records[0];
        assert_eq!(first.name, "Sakura Inn");
        assert_eq!(first.prefecture.as_deref(), Some("Kyoto"));
        assert_eq!(first.price_per_person, 6500.0);
        assert_eq!(first.rating, Some(4.3));
        assert_eq!(first.station_walk_time, Some(5));
        let second = &ds.records[1];
        assert_eq!(second.prefecture, None);
        assert_eq!(second.rating, None);
        assert_eq!(second.station_walk_time, None);
        assert_eq!(ds.regions, vec!["Kyoto".to_string()]);
    }

    #[test]
    fn csv_without_rating_disables_capability() {
        let table = parse_csv("name,prefecture,city,price_per_person\nA,X,x,1000\n").unwrap();
        let ds = table.into_dataset().unwrap();
        assert!(!ds.schema.has_rating);
        assert!(!ds.schema.has_walk_time);
        assert_eq!(ds.bounds.rating, None);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let table = parse_csv("name,prefecture,price_per_person\nA,X,1000\n").unwrap();
        assert_eq!(
            table.into_dataset().unwrap_err(),
            LoadError::MissingColumn("city")
        );
    }

    #[test]
    fn negative_or_missing_price_is_rejected() {
        let table = parse_csv("name,prefecture,city,price_per_person\nA,X,x,-5\n").unwrap();
        assert!(matches!(
            table.into_dataset(),
            Err(LoadError::InvalidValue {
                row: 0,
                column: "price_per_person",
                ..
            })
        ));

        let table = parse_csv("name,prefecture,city,price_per_person\nA,X,x,1\nB,X,x,\n").unwrap();
        assert!(matches!(
            table.into_dataset(),
            Err(LoadError::InvalidValue { row: 1, .. })
        ));
    }

    #[test]
    fn numeric_looking_text_columns_are_kept_verbatim() {
        let table = parse_csv(
            "name,prefecture,city,price_per_person\n\
             007,01,0123,1000\n\
             1e3,01,nan,1000\n\
             Plain,nan,x,1000\n",
        )
        .unwrap();
        let ds = table.into_dataset().unwrap();

        let texts: Vec<_> = ds
            .records
            .iter()
            .map(|r| (r.name.as_str(), r.prefecture.as_deref(), r.city.as_str()))
            .collect();
        assert_eq!(
            texts,
            [
                ("007", Some("01"), "0123"),
                ("1e3", Some("01"), "nan"),
                ("Plain", Some("nan"), "x"),
            ]
        );
        assert_eq!(ds.regions, vec!["01".to_string(), "nan".to_string()]);
    }

    #[test]
    fn negative_zero_price_is_normalised() {
        let table = parse_csv("name,prefecture,city,price_per_person\nA,X,x,-0.0\nB,X,x,0\n").unwrap();
        let ds = table.into_dataset().unwrap();
        assert!(ds.records[0].price_per_person.is_sign_positive());

        let filtered = filter(&ds, &ConstraintSet::unconstrained(&ds));
        let cheapest = Rankings::compute(&filtered).cheapest;
        let names: Vec<_> = cheapest.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(Column::PricePerPerson.format(&CellValue::Float(ds.records[0].price_per_person)), "¥0");
    }

    #[test]
    fn fractional_walk_time_is_rejected() {
        let table = parse_csv(
            "name,prefecture,city,price_per_person,station_walk_time\nA,X,x,1000,2.5\n",
        )
        .unwrap();
        assert!(matches!(
            table.into_dataset(),
            Err(LoadError::InvalidValue {
                column: WALK_TIME_COLUMN,
                ..
            })
        ));
    }

    #[test]
    fn json_records_with_sparse_keys() {
        let text = r#"[
            {"name": "A", "prefecture": "X", "city": "a", "price_per_person": 1200.5},
            {"name": "B", "prefecture": "Y", "city": "b", "price_per_person": 900, "station_walk_time": 12}
        ]"#;
        let ds = parse_json(text).unwrap().into_dataset().unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.schema.has_walk_time);
        assert_eq!(ds.records[0].station_walk_time, None);
        assert_eq!(ds.records[1].station_walk_time, Some(12));
        assert_eq!(ds.records[0].price_per_person, 1200.5);
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(parse_json(r#"{"name": "A"}"#).is_err());
    }

    #[test]
    fn unsupported_extension() {
        let file = write_temp(".xlsx", b"");
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::UnsupportedExtension("xlsx".to_string()))
        );
    }

    #[test]
    fn parquet_round_trip_through_file() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("name", DataType::Utf8, false),
            Field::new("prefecture", DataType::Utf8, true),
            Field::new("city", DataType::Utf8, false),
            Field::new("price_per_person", DataType::Float64, false),
            Field::new("rating", DataType::Float64, true),
            Field::new("station_walk_time", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A", "B"])),
                Arc::new(StringArray::from(vec![Some("Osaka"), None])),
                Arc::new(StringArray::from(vec!["Kita", "Naka"])),
                Arc::new(Float64Array::from(vec![5000.0, 7000.0])),
                Arc::new(Float64Array::from(vec![Some(3.9), None])),
                Arc::new(Int64Array::from(vec![None, Some(4)])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.as_file().try_clone().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].rating, Some(3.9));
        assert_eq!(ds.records[1].prefecture, None);
        assert_eq!(ds.records[1].station_walk_time, Some(4));
        assert!(ds.schema.has_rating && ds.schema.has_walk_time);
    }
}
