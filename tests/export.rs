#![allow(clippy::pedantic)]
mod common;

use std::fs::File;

use gapfill::{
    CancellationToken, Column, CsvReadOptions, CsvSink, DataFrame, Error, InterpolateOptions,
    ParquetSink, RowRange, export, read_csv,
};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;

const READINGS: &str = "\
ts,site,level,count
2024-03-01T00:00:00Z,north,1.0,7
2024-03-01T00:00:01.250Z,,,
2024-03-01T00:00:02Z,south,3.0,9
2024-03-01T00:00:03Z,south,,10
";

fn readings() -> DataFrame {
    let options = CsvReadOptions::new()
        .with_text_columns(["site"])
        .with_int_columns(["count"])
        .with_timestamp_columns(["ts"]);
    read_csv(READINGS.as_bytes(), &options).expect("read csv")
}

fn filled_readings() -> DataFrame {
    let mut frame = readings();
    frame
        .interpolate_numeric(&CancellationToken::new(), &InterpolateOptions::new().in_place(true))
        .expect("fill");
    frame
}

fn read_parquet(path: &std::path::Path) -> (SerializedFileReader<File>, Vec<Vec<Field>>) {
    let reader = SerializedFileReader::new(File::open(path).expect("open parquet"))
        .expect("parquet reader");
    let rows = reader
        .get_row_iter(None)
        .expect("row iterator")
        .map(|row| {
            row.expect("row")
                .get_column_iter()
                .map(|(_, field)| field.clone())
                .collect()
        })
        .collect();
    (reader, rows)
}

#[test]
fn parquet_round_trip_keeps_fills_and_nulls() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = common::temp_path(&dir, "readings.parquet");
    let frame = filled_readings();

    let mut sink = ParquetSink::new(File::create(&path).expect("create")).with_row_group_size(3);
    let written = export(&CancellationToken::new(), &frame, &mut sink, None).expect("export");
    assert_eq!(written, 4);
    sink.into_inner().expect("writer");

    let (reader, rows) = read_parquet(&path);
    assert_eq!(reader.metadata().file_metadata().num_rows(), 4);
    assert_eq!(reader.metadata().num_row_groups(), 2);

    assert_eq!(
        rows[0],
        vec![
            Field::TimestampMillis(1_709_251_200_000),
            Field::Str("north".into()),
            Field::Double(1.0),
            Field::Long(7),
        ]
    );
    assert_eq!(
        rows[1],
        vec![
            Field::TimestampMillis(1_709_251_201_250),
            Field::Null,
            Field::Double(2.0),
            Field::Null,
        ]
    );
    // Trailing gap stays missing and comes back as null.
    assert_eq!(rows[3][2], Field::Null);
}

#[test]
fn parquet_export_of_empty_frame_is_a_valid_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = common::temp_path(&dir, "empty.parquet");
    let frame = DataFrame::new(vec![
        Column::float64("x", Vec::new()),
        Column::utf8("label", Vec::new()),
    ])
    .expect("frame");

    let mut sink = ParquetSink::new(File::create(&path).expect("create"));
    let written = export(&CancellationToken::new(), &frame, &mut sink, None).expect("export");
    assert_eq!(written, 0);
    sink.into_inner().expect("writer");

    let (reader, rows) = read_parquet(&path);
    assert_eq!(reader.metadata().file_metadata().num_rows(), 0);
    assert_eq!(reader.metadata().file_metadata().schema_descr().num_columns(), 2);
    assert!(rows.is_empty());
}

#[test]
fn csv_export_writes_filled_rows() {
    let frame = filled_readings();
    let mut sink = CsvSink::new(Vec::new());
    export(&CancellationToken::new(), &frame, &mut sink, None).expect("export");
    let text = String::from_utf8(sink.into_inner().expect("writer")).expect("utf8");
    assert_eq!(
        text,
        "ts,site,level,count\n\
         2024-03-01T00:00:00Z,north,1.0,7\n\
         2024-03-01T00:00:01.25Z,,2.0,\n\
         2024-03-01T00:00:02Z,south,3.0,9\n\
         2024-03-01T00:00:03Z,south,,10\n"
    );
}

#[test]
fn export_honours_row_range() {
    let frame = readings();
    let mut sink = CsvSink::new(Vec::new()).with_headers(false).with_delimiter(b'\t');
    let written = export(
        &CancellationToken::new(),
        &frame,
        &mut sink,
        Some(RowRange::rows(-2, -1)),
    )
    .expect("export");
    assert_eq!(written, 2);
    let text = String::from_utf8(sink.into_inner().expect("writer")).expect("utf8");
    assert_eq!(
        text,
        "2024-03-01T00:00:02Z\tsouth\t3.0\t9\n2024-03-01T00:00:03Z\tsouth\t\t10\n"
    );
}

#[test]
fn export_stops_when_cancelled() {
    let frame = readings();
    let token = CancellationToken::new();
    token.cancel();
    let mut sink = CsvSink::new(Vec::new());
    let err = export(&token, &frame, &mut sink, None).unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn export_rejects_bad_range_before_touching_sink() {
    let frame = readings();
    let mut sink = CsvSink::new(Vec::new());
    let err = export(
        &CancellationToken::new(),
        &frame,
        &mut sink,
        Some(RowRange::rows(0, 9)),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidRange { len: 4, .. }));
    assert!(sink.into_inner().expect("untouched").is_empty());
}
