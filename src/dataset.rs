//! In-memory tabular data and the multi-file union.
//!
//! A [`Dataset`] holds decoded header names and rows of optional cells. `None`
//! marks a cell that is missing because its column does not exist in the file
//! the row came from. [`combine_files`] loads every export in order, tags each
//! row with its provenance, and concatenates them.

use std::{io, path::Path, path::PathBuf};

use encoding_rs::Encoding;
use itertools::Itertools;
use log::{debug, info, warn};
use thiserror::Error;

use crate::io_utils;

/// Column holding the originating file name of each combined row.
pub const SOURCE_COLUMN: &str = "Source File";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Opening input file {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Reading {path:?} as delimited text")]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("File {path:?} has no header row")]
    MissingHeader { path: PathBuf },
    #[error("Row {row} in {path:?} is not valid {encoding}")]
    Decode {
        path: PathBuf,
        row: usize,
        encoding: &'static str,
    },
    #[error("No input files could be loaded")]
    NoInputs,
}

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub skip_invalid: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: encoding_rs::UTF_8,
            skip_invalid: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Dataset {
    /// Builds a dataset from headers and fully populated rows.
    pub fn from_rows<H, R, C>(columns: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect::<Vec<_>>();
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells = row
                    .into_iter()
                    .map(|cell| Some(cell.into()))
                    .collect::<Vec<Option<String>>>();
                cells.resize(width, None);
                cells
            })
            .collect();
        Self { columns, rows }
    }

    pub fn from_path(path: &Path, options: &LoadOptions) -> Result<Self, DatasetError> {
        let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
        let mut reader =
            io_utils::open_csv_reader_from_path(path, delimiter).map_err(|source| {
                DatasetError::Open {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        let malformed = |source| DatasetError::Malformed {
            path: path.to_path_buf(),
            source,
        };
        let header_record = reader.byte_headers().map_err(malformed)?.clone();
        let columns = io_utils::decode_record(&header_record, options.encoding).ok_or_else(|| {
            DatasetError::Decode {
                path: path.to_path_buf(),
                row: 1,
                encoding: options.encoding.name(),
            }
        })?;
        if columns.is_empty() || columns.iter().all(|c| c.trim().is_empty()) {
            return Err(DatasetError::MissingHeader {
                path: path.to_path_buf(),
            });
        }

        let mut rows = Vec::new();
        for (idx, record) in reader.byte_records().enumerate() {
            let record = record.map_err(malformed)?;
            let decoded = io_utils::decode_record(&record, options.encoding).ok_or_else(|| {
                DatasetError::Decode {
                    path: path.to_path_buf(),
                    row: idx + 2,
                    encoding: options.encoding.name(),
                }
            })?;
            rows.push(decoded.into_iter().map(Some).collect());
        }
        debug!("Loaded {} row(s) from {:?}", rows.len(), path);
        Ok(Self { columns, rows })
    }

    /// Stacks `parts` row-wise. The column set is the union in order of first
    /// appearance; cells for columns a part lacks are `None`.
    pub fn concat(parts: Vec<Dataset>) -> Self {
        let columns = parts
            .iter()
            .flat_map(|part| part.columns.iter().cloned())
            .unique()
            .collect::<Vec<_>>();
        let total = parts.iter().map(Dataset::row_count).sum();
        let mut rows = Vec::with_capacity(total);
        for part in parts {
            let mapping = columns
                .iter()
                .map(|name| part.column_index(name))
                .collect::<Vec<_>>();
            for mut row in part.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|idx| idx.and_then(|i| row.get_mut(i).and_then(Option::take)))
                        .collect(),
                );
            }
        }
        Self { columns, rows }
    }

    /// Sets `name` to `value` on every row, appending the column if absent.
    pub fn with_constant_column(mut self, name: &str, value: &str) -> Self {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = Some(value.to_string());
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(Some(value.to_string()));
                }
            }
        }
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterates the cells of column `name`; yields nothing if it does not exist.
    pub fn column_values<'a>(&'a self, name: &str) -> impl Iterator<Item = Option<&'a str>> + 'a {
        let idx = self.column_index(name);
        self.rows.iter().filter_map(move |row| {
            idx.map(|i| row.get(i).and_then(|cell| cell.as_deref()))
        })
    }
}

/// Result of loading a batch of exports.
#[derive(Debug)]
pub struct Combined {
    pub dataset: Dataset,
    pub loaded: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Loads `inputs` in order and unions them with a [`SOURCE_COLUMN`] tag.
///
/// The first malformed file aborts the batch unless `skip_invalid` is set, in
/// which case it is logged and left out.
pub fn combine_files(inputs: &[PathBuf], options: &LoadOptions) -> Result<Combined, DatasetError> {
    let mut parts = Vec::with_capacity(inputs.len());
    let mut loaded = Vec::new();
    let mut skipped = Vec::new();
    for path in inputs {
        match Dataset::from_path(path, options) {
            Ok(part) => {
                let label = io_utils::source_label(path);
                parts.push(part.with_constant_column(SOURCE_COLUMN, &label));
                loaded.push(path.clone());
            }
            Err(err) if options.skip_invalid => {
                warn!("Skipping {:?}: {}", path, error_chain(&err));
                skipped.push(path.clone());
            }
            Err(err) => return Err(err),
        }
    }
    if parts.is_empty() {
        return Err(DatasetError::NoInputs);
    }
    let dataset = Dataset::concat(parts);
    info!(
        "Combined {} file(s) into {} row(s) across {} column(s)",
        loaded.len(),
        dataset.row_count(),
        dataset.columns().len()
    );
    Ok(Combined {
        dataset,
        loaded,
        skipped,
    })
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
