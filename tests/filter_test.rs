use polars::prelude::*;
use tracksift::filter::{build_filtered_view, numeric_bounds, FilterError, FilterSelection};

mod common;

#[test]
fn test_no_selection_returns_dataset_unchanged() {
    let df = common::tracks_df();
    let out = build_filtered_view(&df, &[]).unwrap();
    assert_eq!(out, df);
}

#[test]
fn test_text_match_is_case_insensitive_substring() {
    let df = common::tracks_df();
    let out = build_filtered_view(&df, &[FilterSelection::text("artist", "GRIMES")]).unwrap();
    assert_eq!(out.height(), 2);
    let artists = out.column("artist").unwrap();
    for i in 0..out.height() {
        assert_eq!(artists.get(i).unwrap(), AnyValue::String("Grimes"));
    }
}

#[test]
fn test_text_match_drops_nulls_for_nonempty_query() {
    let df = DataFrame::new(vec![
        Series::new(
            "track_uri".into(),
            ["a", "b", "c"].iter().map(|s| s.to_string()).collect::<Vec<String>>(),
        )
        .into_column(),
        Series::new("genre".into(), [Some("idm"), None, Some("house")]).into_column(),
    ])
    .unwrap();

    let out = build_filtered_view(&df, &[FilterSelection::text("genre", "o")]).unwrap();
    assert_eq!(out.height(), 1);

    // With an empty query the column is a pass-through, nulls included.
    let out = build_filtered_view(&df, &[FilterSelection::text("genre", "")]).unwrap();
    assert_eq!(out.height(), 3);
}

#[test]
fn test_numeric_range_keeps_inclusive_endpoints() {
    let df = common::tracks_df();
    let out = build_filtered_view(&df, &[FilterSelection::range("tempo", 89.0, 124.0)]).unwrap();
    let tempos = out.column("tempo").unwrap();
    assert_eq!(out.height(), 8);
    for i in 0..out.height() {
        let v: f64 = tempos.get(i).unwrap().try_extract().unwrap();
        assert!((89.0..=124.0).contains(&v));
    }
}

#[test]
fn test_filters_intersect_left_to_right() {
    let df = common::tracks_df();
    let out = build_filtered_view(
        &df,
        &[
            FilterSelection::text("type", "album"),
            FilterSelection::range("tempo", 100.0, 160.0),
        ],
    )
    .unwrap();
    // Albums at tempo 100..160: Daft Punk, M.I.A., M83, Grimes x2.
    assert_eq!(out.height(), 5);
}

#[test]
fn test_sequential_narrowing_rebounds_later_columns() {
    let df = df!(
        "a" => [1i64, 2, 1],
        "b" => [10i64, 20, 5]
    )
    .unwrap();

    // Before any filtering, b spans the whole dataset.
    assert_eq!(numeric_bounds(&df, "b").unwrap(), (5.0, 20.0));

    // After narrowing to a = 1, b's default bounds come from the remaining
    // rows only.
    let narrowed = build_filtered_view(&df, &[FilterSelection::range("a", 1.0, 1.0)]).unwrap();
    assert_eq!(numeric_bounds(&narrowed, "b").unwrap(), (5.0, 10.0));
}

#[test]
fn test_selected_column_must_exist() {
    let df = common::tracks_df();
    let err = build_filtered_view(&df, &[FilterSelection::text("label", "warp")]).unwrap_err();
    assert!(matches!(err, FilterError::Schema { ref column } if column == "label"));
}

#[test]
fn test_unfilterable_numeric_column_is_reported() {
    let df = DataFrame::new(vec![
        Series::new("track_uri".into(), vec!["a".to_string(), "b".to_string()]).into_column(),
        Series::new("loudness".into(), vec![None::<f64>, None]).into_column(),
    ])
    .unwrap();

    let err = numeric_bounds(&df, "loudness").unwrap_err();
    assert!(matches!(err, FilterError::EmptyColumn { .. }));

    let err =
        build_filtered_view(&df, &[FilterSelection::range("loudness", 0.0, 1.0)]).unwrap_err();
    assert!(matches!(err, FilterError::EmptyColumn { .. }));
}

#[test]
fn test_filtered_view_preserves_row_order() {
    let df = common::tracks_df();
    let out = build_filtered_view(&df, &[FilterSelection::range("tempo", 100.0, 160.0)]).unwrap();
    let uris: Vec<String> = out
        .column("track_uri")
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap().to_string())
        .collect();
    let mut sorted = uris.clone();
    sorted.sort();
    assert_eq!(uris, sorted); // uri_NN values are generated in row order
}
