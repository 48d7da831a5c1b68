use gapfill::{CancellationToken, InterpolateOptions, Series};

#[allow(dead_code)]
pub const NAN: f64 = f64::NAN;

#[allow(dead_code)]
/// Element-wise equality that treats two NaNs as equal.
pub fn assert_same(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch: {actual:?}");
    for (row, (a, e)) in actual.iter().zip(expected).enumerate() {
        let ok = (a.is_nan() && e.is_nan()) || (a - e).abs() < 1e-9;
        assert!(ok, "row {row}: got {a}, expected {e} in {actual:?}");
    }
}

#[allow(dead_code)]
/// Fills a copy of `values` in place and returns the result.
pub fn filled(values: &[f64], options: InterpolateOptions) -> Vec<f64> {
    let mut series = Series::new("v", values.to_vec());
    let token = CancellationToken::new();
    let overlay = gapfill::interpolate(&token, &mut series, &options.in_place(true))
        .expect("interpolate");
    assert!(overlay.is_none());
    series.into_values()
}

#[allow(dead_code)]
pub fn temp_path(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
    dir.path().join(name)
}
