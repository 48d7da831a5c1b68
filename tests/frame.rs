#![allow(clippy::pedantic)]
mod common;

use common::{NAN, assert_same};
use gapfill::{
    CancellationToken, Column, CsvReadOptions, DataFrame, Error, InterpolateOptions, Method, Value,
    read_csv,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const SENSORS: &str = "\
ts,site,temp,humidity,count
2024-03-01T00:00:00Z,north,10.0,,1
2024-03-01T01:00:00Z,north,,40,
2024-03-01T02:00:00Z,NA,,NA,3
2024-03-01T03:00:00Z,south,16.0,55,4
";

fn sensors() -> DataFrame {
    let options = CsvReadOptions::new()
        .with_text_columns(["site"])
        .with_int_columns(["count"])
        .with_timestamp_columns(["ts"]);
    read_csv(SENSORS.as_bytes(), &options).expect("read csv")
}

#[test]
fn csv_columns_follow_declared_types() {
    let frame = sensors();
    let kinds: Vec<_> = frame.columns().iter().map(Column::type_name).collect();
    assert_eq!(kinds, ["timestamp", "utf8", "float64", "float64", "int64"]);
    let first = OffsetDateTime::parse("2024-03-01T00:00:00Z", &Rfc3339).unwrap();
    assert_eq!(frame.value(0, 0), Value::Timestamp(first));
    assert_eq!(frame.value(3, 1), Value::Str("south".into()));
    assert!(frame.value(2, 1).is_missing());
    assert_eq!(frame.value(1, 4), Value::Missing);
    assert_eq!(frame.column("temp").map(Column::missing_count), Some(2));
}

#[test]
fn numeric_columns_fill_in_parallel() {
    let mut frame = sensors();
    let token = CancellationToken::new();
    let fills = frame
        .interpolate_numeric(&token, &InterpolateOptions::new().in_place(true))
        .expect("fill");

    let mut names: Vec<_> = fills.iter().map(|fill| fill.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["humidity", "temp"]);
    assert!(fills.iter().all(|fill| fill.overlay.is_none()));

    assert_same(frame.series("temp").unwrap().values(), &[10.0, 12.0, 14.0, 16.0]);
    assert_same(frame.series("humidity").unwrap().values(), &[NAN, 40.0, 47.5, 55.0]);
    // Filled rows no longer read as missing; other columns are untouched.
    assert_eq!(frame.value(1, 2), Value::Float(12.0));
    assert!(frame.value(1, 4).is_missing());
}

#[test]
fn overlay_fills_can_be_applied_later() {
    let mut frame = sensors();
    let token = CancellationToken::new();
    let options = InterpolateOptions::new().with_method(Method::ForwardFill);
    let fills = frame
        .interpolate_columns(&token, &["temp"], &options)
        .expect("fill");

    assert_eq!(fills.len(), 1);
    assert!(frame.value(1, 2).is_missing());
    frame.apply(&fills).expect("apply");
    assert_same(frame.series("temp").unwrap().values(), &[10.0, 10.0, 10.0, 16.0]);
    assert_eq!(frame.series("humidity").unwrap().missing_count(), 2);
}

#[test]
fn cancelled_frame_fill_reports_cancellation() {
    let mut frame = sensors();
    let token = CancellationToken::new();
    token.cancel();
    let err = frame
        .interpolate_numeric(&token, &InterpolateOptions::new().in_place(true))
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert_eq!(frame.series("temp").unwrap().missing_count(), 2);
}

#[test]
fn column_lookup_errors() {
    let mut frame = sensors();
    let token = CancellationToken::new();
    let options = InterpolateOptions::new();
    assert!(matches!(
        frame.interpolate_column(&token, "site", &options),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        frame.interpolate_column(&token, "pressure", &options),
        Err(Error::UnknownColumn { .. })
    ));
}

#[test]
fn row_accessor_returns_cells_in_column_order() {
    let frame = DataFrame::new(vec![
        Column::float64("x", vec![1.0, NAN]),
        Column::utf8("tag", vec![Some("a".into()), None]),
    ])
    .expect("frame");
    assert_eq!(frame.row(0), vec![Value::Float(1.0), Value::Str("a".into())]);
    assert_eq!(frame.row(1), vec![Value::Missing, Value::Missing]);
}
