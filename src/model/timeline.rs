use crate::schedule::time::MINUTES_PER_DAY;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.0;
/// Narrowest a flight bar may render, in pixels.
pub const MIN_BAR_WIDTH: f32 = 18.0;

/// Manages the horizontal time axis of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineViewport {
    /// Width of one calendar day at 1× zoom.
    pub base_day_width: f32,
    /// User zoom multiplier, clamped to `MIN_ZOOM..=MAX_ZOOM`.
    pub zoom: f32,
}

impl Default for TimelineViewport {
    fn default() -> Self {
        Self::new(480.0)
    }
}

impl TimelineViewport {
    pub fn new(base_day_width: f32) -> Self {
        Self {
            base_day_width,
            zoom: 1.0,
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self
    }

    pub fn day_width(&self) -> f32 {
        self.base_day_width * self.zoom
    }

    pub fn hour_width(&self) -> f32 {
        self.day_width() / 24.0
    }

    /// Convert minutes since midnight to an x offset within a day column.
    pub fn minutes_to_x(&self, minutes: i32) -> f32 {
        minutes as f32 / MINUTES_PER_DAY as f32 * self.day_width()
    }

    /// Convert a horizontal pointer movement back into whole minutes.
    pub fn x_to_minutes(&self, delta_x: f32) -> i32 {
        let pixels_per_minute = self.hour_width() / 60.0;
        (delta_x / pixels_per_minute).round() as i32
    }

    /// Rendered width of a bar, never narrower than `MIN_BAR_WIDTH`.
    pub fn bar_width(&self, duration_minutes: i32) -> f32 {
        (duration_minutes as f32 * self.day_width() / MINUTES_PER_DAY as f32).max(MIN_BAR_WIDTH)
    }

    /// Total width in pixels for `days` day columns.
    pub fn total_width(&self, days: usize) -> f32 {
        days as f32 * self.day_width()
    }

    /// Zoom in (widen the day columns).
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.2).min(MAX_ZOOM);
    }

    /// Zoom out (narrow the day columns).
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.2).max(MIN_ZOOM);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    pub fn zoom_percent(&self) -> f32 {
        self.zoom * 100.0
    }
}
