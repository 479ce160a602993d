//! Two-sample crossing detection.
//!
//! Each argument is a `(previous, current)` pair. A crossing needs a strict
//! inequality on both bars; equality on either side never triggers.

/// `a` was below `b` on the previous bar and is above it now.
pub fn crosses_above(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 < b.0 && a.1 > b.1
}

/// `a` was above `b` on the previous bar and is below it now.
pub fn crosses_below(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 > b.0 && a.1 < b.1
}

/// A series crossing a fixed level.
pub fn crosses_above_level(a: (f64, f64), level: f64) -> bool {
    crosses_above(a, (level, level))
}
