//! Random-sample pagination over the filtered dataset.
//!
//! Each call removes rows already shown this session, shuffles the remainder
//! with fresh entropy, and hands back the next page together with the updated
//! shown-set. The shown-set is owned by the caller; nothing is retained here.

use std::collections::HashSet;

use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::thread_rng;

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    /// The track id column does not exist in the frame.
    #[error("track id column not found: {column}")]
    MissingIdColumn { column: String },
    /// The track id column does not hold text values.
    #[error("track id column must hold text values: {column}")]
    IdColumnKind { column: String },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

#[derive(Debug)]
pub enum PageResult {
    /// The next page of unseen rows, in shuffled order, and the input
    /// shown-set unioned with the ids of those rows.
    Page {
        rows: DataFrame,
        shown: HashSet<String>,
    },
    /// No unseen rows remain. Terminal and informational, not an error.
    Exhausted,
}

/// Produce the next page of at most `page_size` unseen rows.
///
/// `page_size == 0` is the "reveal one more" request and returns exactly one
/// row when any unseen row exists. Row order within a page is random and not
/// reproducible; callers must treat only membership and counts as stable.
pub fn next_page(
    df: &DataFrame,
    id_column: &str,
    shown: &HashSet<String>,
    page_size: usize,
) -> Result<PageResult, SampleError> {
    let column = df
        .column(id_column)
        .map_err(|_| SampleError::MissingIdColumn {
            column: id_column.to_string(),
        })?;
    let ids = column
        .as_materialized_series()
        .str()
        .map_err(|_| SampleError::IdColumnKind {
            column: id_column.to_string(),
        })?;

    // Rows with a null id cannot be tracked across pages and are never shown.
    let mut unseen: Vec<u32> = Vec::with_capacity(df.height());
    for (row, id) in ids.into_iter().enumerate() {
        match id {
            Some(id) if !shown.contains(id) => unseen.push(row as u32),
            _ => {}
        }
    }

    if unseen.is_empty() {
        return Ok(PageResult::Exhausted);
    }

    unseen.shuffle(&mut thread_rng());
    let take = if page_size == 0 {
        1
    } else {
        page_size.min(unseen.len())
    };
    unseen.truncate(take);

    let indices = UInt32Chunked::new("indices".into(), unseen);
    let rows = df.take(&indices)?;

    let mut updated = shown.clone();
    {
        let taken = rows.column(id_column)?.as_materialized_series().str()?;
        for id in taken.into_iter().flatten() {
            updated.insert(id.to_string());
        }
    }

    Ok(PageResult::Page {
        rows,
        shown: updated,
    })
}
