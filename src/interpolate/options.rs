use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::range::RowRange;

use super::scanner::GapKind;

/// Value-producing strategy applied to each eligible gap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Repeat the left anchor.
    ForwardFill,
    /// Repeat the right anchor.
    BackwardFill,
    /// Straight line between the two anchors.
    #[default]
    Linear,
}

/// Gap shapes eligible for filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitArea {
    /// Gaps with an anchor on both sides.
    Inner,
    /// Leading and trailing runs at the edge of the range.
    Outer,
}

impl LimitArea {
    #[must_use]
    pub const fn admits(self, kind: GapKind) -> bool {
        match self {
            Self::Inner => kind.is_inner(),
            Self::Outer => !kind.is_inner(),
        }
    }
}

/// End of a gap from which a `limit` is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitDirection {
    #[default]
    Forward,
    Backward,
    /// Budget split between both ends, odd remainder to the forward side.
    Both,
}

/// Configuration for a single interpolation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolateOptions {
    /// Mutate the sequence instead of returning an overlay.
    pub in_place: bool,
    /// Caller has already arranged exclusive access to the sequence.
    pub skip_locking: bool,
    pub method: Method,
    /// `None` admits every gap shape.
    pub limit_area: Option<LimitArea>,
    pub limit_direction: LimitDirection,
    /// Maximum number of cells filled per gap.
    pub limit: Option<usize>,
    /// Restrict scanning to a row range.
    pub range: Option<RowRange>,
}

impl InterpolateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub const fn in_place(mut self, enabled: bool) -> Self {
        self.in_place = enabled;
        self
    }

    #[must_use]
    pub const fn skip_locking(mut self, enabled: bool) -> Self {
        self.skip_locking = enabled;
        self
    }

    #[must_use]
    pub const fn with_limit_area(mut self, area: LimitArea) -> Self {
        self.limit_area = Some(area);
        self
    }

    #[must_use]
    pub const fn with_limit_direction(mut self, direction: LimitDirection) -> Self {
        self.limit_direction = direction;
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn with_range(mut self, range: RowRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Checks option combinations that cannot be expressed in the types.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] when `limit` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.limit == Some(0) {
            return Err(Error::InvalidOptions {
                details: "limit must be a positive number of cells".into(),
            });
        }
        Ok(())
    }

    pub(crate) fn admits(&self, kind: GapKind) -> bool {
        self.limit_area.is_none_or(|area| area.admits(kind))
    }
}

/// Parse failure for the textual forms of the option enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptionError {
    kind: &'static str,
    input: String,
}

impl fmt::Display for ParseOptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.input)
    }
}

impl std::error::Error for ParseOptionError {}

macro_rules! impl_from_str {
    ($ty:ty, $kind:literal, { $($($text:literal)|+ => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ParseOptionError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                    $($($text)|+ => Ok($variant),)+
                    _ => Err(ParseOptionError {
                        kind: $kind,
                        input: s.to_owned(),
                    }),
                }
            }
        }
    };
}

impl_from_str!(Method, "method", {
    "forward_fill" | "ffill" | "pad" => Method::ForwardFill,
    "backward_fill" | "bfill" | "backfill" => Method::BackwardFill,
    "linear" => Method::Linear,
});

impl_from_str!(LimitArea, "limit area", {
    "inner" | "inside" => LimitArea::Inner,
    "outer" | "outside" => LimitArea::Outer,
});

impl_from_str!(LimitDirection, "limit direction", {
    "forward" => LimitDirection::Forward,
    "backward" => LimitDirection::Backward,
    "both" => LimitDirection::Both,
});
