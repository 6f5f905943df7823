//! Column-wise narrowing of the track dataset.
//!
//! Filters compose as a left-to-right intersection: each selection is applied
//! to the frame as narrowed by the selections before it, and default numeric
//! ranges are derived from that progressively narrowed frame, not the
//! original dataset.

use polars::prelude::*;

use crate::dataset::ColumnKind;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A selected column does not exist in the dataset schema.
    #[error("column not found in dataset: {column}")]
    Schema { column: String },
    /// A numeric column has no values to compute a range from.
    #[error("no values to compute a range for column: {column}")]
    EmptyColumn { column: String },
    /// The filter value does not match the column's type.
    #[error("filter value does not match the type of column: {column}")]
    TypeMismatch { column: String },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Case-insensitive substring query against a text column.
    Text(String),
    /// Inclusive range against a numeric column.
    Range { low: f64, high: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub column: String,
    pub value: FilterValue,
}

impl FilterSelection {
    pub fn text(column: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: FilterValue::Text(query.into()),
        }
    }

    pub fn range(column: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            column: column.into(),
            value: FilterValue::Range { low, high },
        }
    }
}

/// Apply `selections` to `df` in order, producing a new frame that is a
/// row-subset of the input in the original row order.
///
/// An empty selection list returns the dataset unchanged. Any failure leaves
/// the caller's frame untouched; there is no half-filtered result.
pub fn build_filtered_view(
    df: &DataFrame,
    selections: &[FilterSelection],
) -> Result<DataFrame, FilterError> {
    let mut current = df.clone();
    for selection in selections {
        current = apply_selection(current, selection)?;
    }
    Ok(current)
}

fn apply_selection(df: DataFrame, selection: &FilterSelection) -> Result<DataFrame, FilterError> {
    let kind = column_kind(&df, &selection.column)?;
    let expr = match (&selection.value, kind) {
        (FilterValue::Text(query), ColumnKind::Text) => {
            // An empty query leaves the column unfiltered. A non-empty query
            // drops null values, since null cannot contain anything.
            if query.is_empty() {
                return Ok(df);
            }
            col(selection.column.as_str())
                .str()
                .to_lowercase()
                .str()
                .contains_literal(lit(query.to_lowercase()))
        }
        (FilterValue::Range { low, high }, ColumnKind::Numeric) => {
            // Confirms the column still has computable bounds under the
            // current narrowing; an all-null column is reported, not skipped.
            numeric_bounds(&df, &selection.column)?;
            col(selection.column.as_str())
                .gt_eq(lit(*low))
                .and(col(selection.column.as_str()).lt_eq(lit(*high)))
        }
        _ => {
            return Err(FilterError::TypeMismatch {
                column: selection.column.clone(),
            })
        }
    };
    Ok(df.lazy().filter(expr).collect()?)
}

fn column_kind(df: &DataFrame, name: &str) -> Result<ColumnKind, FilterError> {
    let column = df.column(name).map_err(|_| FilterError::Schema {
        column: name.to_string(),
    })?;
    Ok(ColumnKind::of(column.dtype()))
}

/// The `[min, max]` of a numeric column over the given frame. This is the
/// default range offered for the column and must be recomputed whenever the
/// frame it was derived from changes.
pub fn numeric_bounds(df: &DataFrame, column: &str) -> Result<(f64, f64), FilterError> {
    let col = df.column(column).map_err(|_| FilterError::Schema {
        column: column.to_string(),
    })?;
    if ColumnKind::of(col.dtype()) != ColumnKind::Numeric {
        return Err(FilterError::TypeMismatch {
            column: column.to_string(),
        });
    }
    let series = col.as_materialized_series().cast(&DataType::Float64)?;
    let low = series.min::<f64>()?;
    let high = series.max::<f64>()?;
    match (low, high) {
        (Some(low), Some(high)) => Ok((low, high)),
        _ => Err(FilterError::EmptyColumn {
            column: column.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks() -> DataFrame {
        df!(
            "track_uri" => ["t1", "t2", "t3", "t4"],
            "artist" => ["Daft Punk", "MF DOOM", "Daphni", "Four Tet"],
            "tempo" => [120.0, 90.0, 124.0, 132.0]
        )
        .unwrap()
    }

    #[test]
    fn test_empty_selection_is_identity() {
        let df = tracks();
        let out = build_filtered_view(&df, &[]).unwrap();
        assert_eq!(out, df);
    }

    #[test]
    fn test_text_filter_is_case_insensitive() {
        let df = tracks();
        let out = build_filtered_view(&df, &[FilterSelection::text("artist", "dAf")]).unwrap();
        assert_eq!(out.height(), 2); // Daft Punk, Daphni
    }

    #[test]
    fn test_empty_query_is_passthrough() {
        let df = tracks();
        let out = build_filtered_view(&df, &[FilterSelection::text("artist", "")]).unwrap();
        assert_eq!(out.height(), 4);
    }

    #[test]
    fn test_text_filter_excludes_nulls() {
        let df = DataFrame::new(vec![
            Series::new("artist".into(), [Some("Daft Punk"), None, Some("Daphni")]).into_column(),
        ])
        .unwrap();
        let out = build_filtered_view(&df, &[FilterSelection::text("artist", "da")]).unwrap();
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn test_numeric_range_is_inclusive() {
        let df = tracks();
        let out =
            build_filtered_view(&df, &[FilterSelection::range("tempo", 90.0, 124.0)]).unwrap();
        assert_eq!(out.height(), 3); // both endpoints retained
    }

    #[test]
    fn test_result_preserves_row_order() {
        let df = tracks();
        let out = build_filtered_view(&df, &[FilterSelection::range("tempo", 100.0, 140.0)])
            .unwrap();
        let uris: Vec<String> = out
            .column("track_uri")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect();
        assert_eq!(uris, vec!["t1", "t3", "t4"]);
    }

    #[test]
    fn test_unknown_column_is_schema_error() {
        let df = tracks();
        let err = build_filtered_view(&df, &[FilterSelection::text("label", "x")]).unwrap_err();
        assert!(matches!(err, FilterError::Schema { .. }));
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let df = tracks();
        let err = build_filtered_view(&df, &[FilterSelection::text("tempo", "120")]).unwrap_err();
        assert!(matches!(err, FilterError::TypeMismatch { .. }));
    }

    #[test]
    fn test_bounds_over_all_null_column() {
        let df = DataFrame::new(vec![
            Series::new("energy".into(), vec![None::<f64>, None, None]).into_column(),
        ])
        .unwrap();
        let err = numeric_bounds(&df, "energy").unwrap_err();
        assert!(matches!(err, FilterError::EmptyColumn { .. }));
    }

    #[test]
    fn test_sequential_narrowing_rebounds_defaults() {
        // Filtering by a first means b's default range comes from the
        // post-a-filter subset, not the original dataset.
        let df = df!(
            "a" => [1i64, 2, 1],
            "b" => [10i64, 20, 5]
        )
        .unwrap();
        let narrowed = build_filtered_view(&df, &[FilterSelection::range("a", 1.0, 1.0)]).unwrap();
        assert_eq!(narrowed.height(), 2);
        let bounds = numeric_bounds(&narrowed, "b").unwrap();
        assert_eq!(bounds, (5.0, 10.0));
    }

    #[test]
    fn test_intersection_of_selections() {
        let df = tracks();
        let out = build_filtered_view(
            &df,
            &[
                FilterSelection::text("artist", "da"),
                FilterSelection::range("tempo", 121.0, 200.0),
            ],
        )
        .unwrap();
        assert_eq!(out.height(), 1); // Daphni at 124
    }
}
