//! CSV Data Loader Module
//! Parses comma-separated appointment data into a typed DataFrame using Polars.

use polars::prelude::*;
use std::io::{Cursor, Read};
use std::path::Path;
use thiserror::Error;

/// Markers read as missing in every column, in addition to empty fields.
const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source contains no data")]
    Empty,
    #[error("Source is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("Line {line}: expected {expected} fields, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Loads delimited appointment data. Holds no state between calls.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file from disk.
    pub fn load_path(path: impl AsRef<Path>) -> Result<DataFrame, LoadError> {
        let path = path.as_ref();
        log::info!("Reading {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::load_bytes(bytes)
    }

    /// Load CSV data from any byte stream (an uploaded file, stdin, ...).
    pub fn load_reader<R: Read>(mut reader: R) -> Result<DataFrame, LoadError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::load_bytes(bytes)
    }

    /// Load CSV data already held in memory.
    ///
    /// Numeric columns are inferred as `Int64`/`Float64`; date-like text is
    /// left as `String` for the preprocessor to resolve.
    pub fn load_bytes(bytes: Vec<u8>) -> Result<DataFrame, LoadError> {
        let text = std::str::from_utf8(&bytes)?;
        let body = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        if body.trim().is_empty() {
            return Err(LoadError::Empty);
        }
        let records = collect_records(body)?;

        let null_values =
            NullValues::AllColumns(NULL_MARKERS.iter().map(|m| (*m).into()).collect());
        // Types are inferred over every row; the whole input is in memory anyway.
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(CsvParseOptions::default().with_null_values(Some(null_values)))
            .into_reader_with_file_handle(Cursor::new(records.into_bytes()))
            .finish()?;

        log::info!(
            "Loaded dataset with {} records and {} columns",
            df.height(),
            df.width()
        );
        Ok(df)
    }
}

/// Tracks the header width and keeps the non-blank records.
#[derive(Default)]
struct Records {
    expected: Option<usize>,
    kept: String,
}

impl Records {
    fn close(
        &mut self,
        record: &str,
        line: usize,
        fields: usize,
        blank: bool,
    ) -> Result<(), LoadError> {
        if blank {
            return Ok(());
        }
        match self.expected {
            None => self.expected = Some(fields),
            Some(expected) if expected != fields => {
                return Err(LoadError::Ragged {
                    line,
                    expected,
                    found: fields,
                })
            }
            Some(_) => {}
        }
        self.kept.push_str(record.strip_suffix('\r').unwrap_or(record));
        self.kept.push('\n');
        Ok(())
    }
}

/// Quote-aware pass over the raw text. Rejects records whose field count
/// differs from the header and drops blank lines; the CSV reader would
/// otherwise pad short records and turn blank lines into all-null rows.
fn collect_records(text: &str) -> Result<String, LoadError> {
    let mut records = Records::default();
    let mut chars = text.char_indices().peekable();
    let mut in_quotes = false;
    let mut fields = 1;
    let mut blank = true;
    let mut line = 1;
    let mut record_line = 1;
    let mut record_start = 0;

    while let Some((i, c)) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek().map(|&(_, next)| next) == Some('"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => {
                in_quotes = true;
                blank = false;
            }
            '\n' if in_quotes => line += 1,
            '\n' => {
                records.close(&text[record_start..i], record_line, fields, blank)?;
                line += 1;
                record_line = line;
                record_start = i + 1;
                fields = 1;
                blank = true;
            }
            ',' if !in_quotes => {
                fields += 1;
                blank = false;
            }
            '\r' if !in_quotes => {}
            _ => blank = false,
        }
    }
    records.close(&text[record_start..], record_line, fields, blank)?;
    Ok(records.kept)
}
