//! Loading the track dataset from CSV into memory.
//!
//! The dataset may be split across several CSV files sharing one schema (the
//! published dumps ship as halves); they are concatenated in the order given.

use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;

/// Default name of the column holding the embeddable track identifier.
pub const TRACK_ID_COLUMN: &str = "track_uri";

/// How a column participates in filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Substring-searchable text.
    Text,
    /// Range-filterable numbers.
    Numeric,
    /// Anything else; not offered for filtering.
    Unsupported,
}

impl ColumnKind {
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::String => ColumnKind::Text,
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => ColumnKind::Numeric,
            _ => ColumnKind::Unsupported,
        }
    }
}

#[derive(Default, Clone)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    pub id_column: Option<String>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = Some(has_header);
        self
    }

    pub fn with_id_column(mut self, id_column: impl Into<String>) -> Self {
        self.id_column = Some(id_column.into());
        self
    }
}

/// The loaded dataset: an eager frame plus its schema and the name of the
/// track id column. Everything downstream derives new frames from `df`.
pub struct TrackTable {
    df: DataFrame,
    schema: Arc<Schema>,
    id_column: String,
}

impl TrackTable {
    pub fn from_csv(path: &Path, options: &LoadOptions) -> Result<Self> {
        Self::from_csv_paths(&[path], options)
    }

    /// Load one or more CSV files and concatenate them into one dataset.
    pub fn from_csv_paths(paths: &[impl AsRef<Path>], options: &LoadOptions) -> Result<Self> {
        if paths.is_empty() {
            return Err(eyre!("No paths provided"));
        }
        let mut lazy_frames = Vec::with_capacity(paths.len());
        for p in paths {
            let pl_path = PlPath::Local(Arc::from(p.as_ref()));
            let mut reader = LazyCsvReader::new(pl_path);
            if let Some(delimiter) = options.delimiter {
                reader = reader.with_separator(delimiter);
            }
            if let Some(has_header) = options.has_header {
                reader = reader.with_has_header(has_header);
            }
            lazy_frames.push(reader.finish()?);
        }
        let lf = if lazy_frames.len() == 1 {
            lazy_frames.remove(0)
        } else {
            concat(lazy_frames.as_slice(), Default::default())?
        };
        let id_column = options
            .id_column
            .clone()
            .unwrap_or_else(|| TRACK_ID_COLUMN.to_string());
        Self::new(lf, id_column)
    }

    fn new(lf: LazyFrame, id_column: String) -> Result<Self> {
        let schema = lf.clone().collect_schema()?;
        if schema.get(id_column.as_str()).is_none() {
            return Err(eyre!(
                "Track id column '{}' not found in dataset",
                id_column
            ));
        }
        let df = lf.collect()?;
        Ok(Self {
            df,
            schema,
            id_column,
        })
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn num_rows(&self) -> usize {
        self.df.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.get(name).is_some()
    }

    /// Columns offered for filtering, in schema order.
    pub fn filter_columns(&self) -> Vec<(String, ColumnKind)> {
        self.schema
            .iter()
            .filter_map(|(name, dtype)| match ColumnKind::of(dtype) {
                ColumnKind::Unsupported => None,
                kind => Some((name.to_string(), kind)),
            })
            .collect()
    }
}
