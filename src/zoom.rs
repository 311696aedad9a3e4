#[cfg(test)]
#[path = "zoom_test.rs"]
mod zoom_test;

use yew::UseStateHandle;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.05;

/// User zoom preference, always within `MIN_ZOOM..=MAX_ZOOM` and on a
/// `ZOOM_STEP` grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLevel(f64);

impl ZoomLevel {
    #[must_use]
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        let snapped = (value / ZOOM_STEP).round() * ZOOM_STEP;
        Self(snapped.clamp(MIN_ZOOM, MAX_ZOOM))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_default(self) -> bool {
        (self.0 - 1.0).abs() < ZOOM_STEP / 2.0
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Shared zoom store; the stage reads it, the settings panel writes it.
pub type ZoomContext = UseStateHandle<ZoomLevel>;
