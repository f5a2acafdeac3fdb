use crate::solver::utils::atomic::{AtomicF64, Ordering};
use crate::solver::_INFINITY_DEFAULT;
use lazy_static::lazy_static;
//
lazy_static! {
    static ref INFINITY: AtomicF64 = AtomicF64::new(_INFINITY_DEFAULT);
}

/// Revert the unbounded sentinel to its default value.
pub fn default_infinity() {
    INFINITY.store(_INFINITY_DEFAULT, Ordering::Relaxed);
}
/// Set the unbounded sentinel to a new value.
///
/// Bounds and right-hand sides with magnitude at or above this
/// value are treated as infinite by every backend and file writer.
pub fn set_infinity(v: f64) {
    INFINITY.store(v, Ordering::Relaxed);
}
/// Current value of the unbounded sentinel.
pub fn get_infinity() -> f64 {
    INFINITY.load(Ordering::Relaxed)
}

/// true if `v` is at or beyond the sentinel in the positive direction
pub fn is_pos_infinite(v: f64) -> bool {
    v >= get_infinity()
}

/// true if `v` is at or beyond the sentinel in the negative direction
pub fn is_neg_infinite(v: f64) -> bool {
    v <= -get_infinity()
}
