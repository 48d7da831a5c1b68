use super::options::Method;
use super::scanner::{Anchor, Gap};

/// Pure value function for the rows of one inner gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillStrategy {
    /// Every row receives the same value.
    Constant(f64),
    /// Straight line through both anchors, exact at each of them.
    Linear { left: Anchor, right: Anchor },
}

impl FillStrategy {
    /// Builds the value function for `gap`, or `None` when the gap lacks an
    /// anchor on either side.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_gap(method: Method, gap: &Gap) -> Option<Self> {
        let (left, right) = (gap.left?, gap.right?);
        let strategy = match method {
            Method::ForwardFill => Self::Constant(left.value),
            Method::BackwardFill => Self::Constant(right.value),
            Method::Linear => Self::Linear { left, right },
        };
        Some(strategy)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self, row: usize) -> f64 {
        match *self {
            Self::Constant(value) => value,
            Self::Linear { left, right } => {
                let span = (right.index - left.index) as f64;
                let distance = row as f64 - left.index as f64;
                let rise = right.value - left.value;
                if rise.is_finite() {
                    (rise / span).mul_add(distance, left.value)
                } else {
                    // Anchors too far apart to subtract; blend them instead.
                    let t = distance / span;
                    right.value.mul_add(t, left.value * (1.0 - t))
                }
            }
        }
    }
}
