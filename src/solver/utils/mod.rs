//! Internal utility functions and helpers.

pub(crate) mod atomic;
pub(crate) mod infbounds;

// -------------
// testing

#[test]
fn test_infinity_sentinel() {
    use infbounds::*;

    // other tests rely on the default, so restore it before asserting
    default_infinity();
    assert_eq!(get_infinity(), 1e20);
    assert!(is_pos_infinite(1e20));
    assert!(is_pos_infinite(f64::INFINITY));
    assert!(!is_pos_infinite(1e19));
    assert!(is_neg_infinite(-1e21));
    assert!(!is_neg_infinite(1e21));
}
