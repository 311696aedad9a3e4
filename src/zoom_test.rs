#![allow(clippy::float_cmp)]

use super::*;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn default_is_one() {
    assert_eq!(ZoomLevel::default().value(), 1.0);
    assert!(ZoomLevel::default().is_default());
}

#[test]
fn clamps_to_bounds() {
    assert_eq!(ZoomLevel::new(0.1).value(), MIN_ZOOM);
    assert_eq!(ZoomLevel::new(-4.0).value(), MIN_ZOOM);
    assert_eq!(ZoomLevel::new(9.0).value(), MAX_ZOOM);
}

#[test]
fn snaps_to_step() {
    assert!(approx_eq(ZoomLevel::new(1.23).value(), 1.25));
    assert!(approx_eq(ZoomLevel::new(1.01).value(), 1.0));
    assert!(approx_eq(ZoomLevel::new(0.74).value(), 0.75));
}

#[test]
fn non_finite_resets() {
    assert_eq!(ZoomLevel::new(f64::NAN), ZoomLevel::default());
    assert_eq!(ZoomLevel::new(f64::INFINITY), ZoomLevel::default());
}

#[test]
fn is_default_only_near_one() {
    assert!(ZoomLevel::new(1.0).is_default());
    assert!(!ZoomLevel::new(1.05).is_default());
    assert!(!ZoomLevel::new(0.95).is_default());
}
