//! Gap filling for ordered `f64` sequences where NaN marks a missing value.
//!
//! A call resolves its row range, walks the range with a [`GapScanner`], and
//! for every eligible gap builds a [`FillStrategy`] from the gap's anchors,
//! narrows the rows with a [`FillWindow`], and commits the values to a
//! [`FillSink`]. Outer gaps (missing an anchor on one side) are reported by
//! the scanner but never filled.

mod limit;
mod options;
mod scanner;
mod sink;
mod strategy;


use tracing::{debug, trace};

use crate::cancel::CancellationToken;
use crate::error::Result;

pub use limit::FillWindow;
pub use options::{InterpolateOptions, LimitArea, LimitDirection, Method, ParseOptionError};
pub use scanner::{Anchor, Gap, GapKind, GapScanner, Gaps};
pub use sink::{FillSink, InPlace, Overlay, OverlayBuilder};
pub use strategy::FillStrategy;

pub(crate) use scanner::is_missing;

/// Counters describing what a fill pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillSummary {
    /// Inner gaps that received at least one value.
    pub gaps_filled: usize,
    pub cells_filled: usize,
    /// Gaps excluded by the limit area.
    pub gaps_excluded: usize,
    /// Eligible gaps left alone because they lack an anchor.
    pub outer_untouched: usize,
}

/// Fills the gaps visible through `sink` according to `options`.
///
/// `options.in_place` is not consulted here; the sink decides where values go.
/// Cancellation is checked before each scan step, so once per gap and once more
/// while unscanned rows remain after the last gap. Values committed for earlier
/// gaps stay committed when cancellation is observed.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidOptions`] or [`crate::Error::InvalidRange`]
/// before any work starts, and [`crate::Error::Cancelled`] when the token fires
/// between scan steps.
#[cfg_attr(feature = "hotpath", hotpath::measure)]
pub fn fill_gaps<S: FillSink>(
    token: &CancellationToken,
    sink: &mut S,
    options: &InterpolateOptions,
) -> Result<FillSummary> {
    options.validate()?;
    let mut summary = FillSummary::default();
    let range = options.range.unwrap_or_default();
    let Some((start, end)) = range.limits(sink.values().len())? else {
        return Ok(summary);
    };

    let mut scanner = GapScanner::new(start, end);
    while !scanner.is_finished() {
        token.check()?;
        let Some(gap) = scanner.next_gap(sink.values()) else {
            break;
        };

        let kind = gap.kind();
        if !options.admits(kind) {
            trace!(first = gap.first, last = gap.last, ?kind, "gap excluded by limit area");
            summary.gaps_excluded += 1;
            continue;
        }
        let Some(strategy) = FillStrategy::for_gap(options.method, &gap) else {
            trace!(first = gap.first, last = gap.last, ?kind, "outer gap left untouched");
            summary.outer_untouched += 1;
            continue;
        };

        let window = FillWindow::new(gap.row_count(), options.limit, options.limit_direction);
        let mut committed = 0;
        for offset in window.offsets() {
            let row = gap.first + offset;
            let value = strategy.value(row);
            // Infinite anchors can yield NaN; that would read back as still missing.
            if is_missing(value) {
                continue;
            }
            sink.commit(row, value);
            committed += 1;
        }
        if committed > 0 {
            summary.gaps_filled += 1;
            summary.cells_filled += committed;
        }
    }

    debug!(
        start,
        end,
        method = ?options.method,
        gaps_filled = summary.gaps_filled,
        cells_filled = summary.cells_filled,
        gaps_excluded = summary.gaps_excluded,
        outer_untouched = summary.outer_untouched,
        "interpolation pass finished"
    );
    Ok(summary)
}

/// Fills `values` in place when `options.in_place` is set, otherwise returns an
/// overlay and leaves `values` untouched.
///
/// # Errors
///
/// See [`fill_gaps`]. A cancelled overlay-mode call returns the error and
/// discards the partial overlay.
pub fn interpolate_slice(
    token: &CancellationToken,
    values: &mut [f64],
    options: &InterpolateOptions,
) -> Result<Option<Overlay>> {
    if options.in_place {
        fill_gaps(token, &mut InPlace::new(values), options)?;
        Ok(None)
    } else {
        overlay_values(token, values, options).map(Some)
    }
}

/// Computes the fills for `values` without modifying it.
///
/// # Errors
///
/// See [`fill_gaps`].
pub fn overlay_values(
    token: &CancellationToken,
    values: &[f64],
    options: &InterpolateOptions,
) -> Result<Overlay> {
    let mut builder = OverlayBuilder::new(values);
    fill_gaps(token, &mut builder, options)?;
    Ok(builder.finish())
}

/// Iterates the gaps of `values` inside `range` without filling anything.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidRange`] if the range does not resolve.
pub fn gaps(values: &[f64], range: Option<crate::RowRange>) -> Result<Gaps<'_>> {
    let limits = range.unwrap_or_default().limits(values.len())?;
    Ok(limits.map_or_else(
        || Gaps::empty(values),
        |(start, end)| Gaps::new(values, start, end),
    ))
}
