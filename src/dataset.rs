//! In-memory tabular dataset parsed from a CSV file.
//!
//! The header row supplies the ordered column names; every data row carries
//! exactly one string cell per column. The dataset is immutable once parsed
//! and is rebuilt from scratch on every invocation — there is no history.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use encoding_rs::Encoding;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("opening input file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reading CSV row {row}: {source}")]
    Parse {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("row {row} is not valid {encoding}")]
    Decode { row: usize, encoding: &'static str },
    #[error("reading CSV header: {source}")]
    Header {
        #[source]
        source: csv::Error,
    },
}

/// Ordered view of a single row: column name paired with its raw cell value.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    cells: &'a [String],
}

impl<'a> Record<'a> {
    /// Raw value for a named column; missing columns read as empty.
    pub fn get(&self, name: &str) -> &'a str {
        self.columns
            .iter()
            .position(|column| column == name)
            .and_then(|idx| self.cells.get(idx))
            .map(|cell| cell.as_str())
            .unwrap_or("")
    }

    pub fn values(self) -> impl Iterator<Item = &'a str> {
        self.cells.iter().map(|cell| cell.as_str())
    }

    pub fn iter(self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.columns
            .iter()
            .map(|column| column.as_str())
            .zip(self.values())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TabularDataset {
    /// Builds a dataset from already-split rows. Short rows are padded with
    /// empty cells so every record spans the full column set.
    pub fn from_rows(columns: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        for row in &mut rows {
            row.resize(columns.len(), String::new());
        }
        Self { columns, rows }
    }

    /// Parses a CSV file. The first row is the header, empty lines are
    /// skipped, and a row whose field count disagrees with the header is a
    /// parse error. `limit` caps the number of data rows read.
    pub fn load(
        path: &Path,
        delimiter: u8,
        encoding: &'static Encoding,
        limit: Option<usize>,
    ) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .double_quote(true)
            .flexible(false)
            .from_reader(BufReader::new(file));

        let header_record = reader
            .byte_headers()
            .map_err(|source| DatasetError::Header { source })?
            .clone();
        let columns = decode_record(&header_record, encoding, 1)?;

        let mut rows = Vec::new();
        for (row_idx, record) in reader.byte_records().enumerate() {
            if let Some(limit) = limit
                && row_idx >= limit
            {
                break;
            }
            // Header is row 1, so data rows start at 2.
            let line = row_idx + 2;
            let record = record.map_err(|source| DatasetError::Parse { row: line, source })?;
            rows.push(decode_record(&record, encoding, line)?);
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Raw cell at `(row, column)`; out-of-range reads as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(|cell| cell.as_str())
            .unwrap_or("")
    }

    pub fn row_cells(&self, row: usize) -> &[String] {
        self.rows.get(row).map(|cells| cells.as_slice()).unwrap_or(&[])
    }

    pub fn record(&self, row: usize) -> Option<Record<'_>> {
        self.rows.get(row).map(|cells| Record {
            columns: &self.columns,
            cells,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|cells| Record {
            columns: &self.columns,
            cells,
        })
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |cells| cells.get(column).map(|cell| cell.as_str()).unwrap_or(""))
    }
}

fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
    row: usize,
) -> Result<Vec<String>, DatasetError> {
    record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = encoding.decode(field);
            if had_errors {
                Err(DatasetError::Decode {
                    row,
                    encoding: encoding.name(),
                })
            } else {
                Ok(text.into_owned())
            }
        })
        .collect()
}
