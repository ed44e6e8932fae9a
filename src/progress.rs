use serde::{Deserialize, Serialize};

/// Normalized scroll position within a pinned container, always in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize)]
pub struct ScrollProgress(f32);

impl ScrollProgress {
    pub const START: ScrollProgress = ScrollProgress(0.0);
    pub const END: ScrollProgress = ScrollProgress(1.0);

    /// Clamps into [0, 1]; NaN becomes 0.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::START;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl From<f32> for ScrollProgress {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

// browser scroll offsets arrive as f64
impl From<f64> for ScrollProgress {
    fn from(value: f64) -> Self {
        Self::new(value as f32)
    }
}

/// Window-level scroll reading, published once per scroll event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_y: f64, viewport_height: f64) -> Self {
        Self {
            scroll_y,
            viewport_height,
        }
    }
}

/// Document-space geometry of a tall container holding a pinned viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub top: f64,
    pub height: f64,
}

impl Region {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Distance the page scrolls while the viewport stays pinned.
    pub fn travel(&self, viewport_height: f64) -> f64 {
        (self.height - viewport_height).max(0.0)
    }

    /// 0 when the container's top meets the viewport's top, 1 when its bottom
    /// meets the viewport's bottom.
    pub fn progress(&self, metrics: ScrollMetrics) -> ScrollProgress {
        let scrolled = metrics.scroll_y - self.top;
        let travel = self.travel(metrics.viewport_height);

        if travel <= 0.0 {
            return if scrolled > 0.0 {
                ScrollProgress::END
            } else {
                ScrollProgress::START
            };
        }

        ScrollProgress::from(scrolled / travel)
    }

    /// Document scroll offset at which this region reports `progress`.
    pub fn offset_for(&self, progress: impl Into<ScrollProgress>, viewport_height: f64) -> f64 {
        let progress = progress.into().value() as f64;
        self.top + progress * self.travel(viewport_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_into_unit_range() {
        assert_eq!(ScrollProgress::new(-0.5).value(), 0.0);
        assert_eq!(ScrollProgress::new(1.7).value(), 1.0);
        assert_eq!(ScrollProgress::new(f32::NAN).value(), 0.0);
        assert_eq!(ScrollProgress::from(0.25f64).value(), 0.25);
    }

    #[test]
    fn maps_scroll_offset_through_pinned_travel() {
        // 500vh container with a 1000px viewport travels 4000px
        let region = Region::new(2000.0, 5000.0);

        assert_eq!(region.progress(ScrollMetrics::new(0.0, 1000.0)).value(), 0.0);
        assert_eq!(region.progress(ScrollMetrics::new(2000.0, 1000.0)).value(), 0.0);
        assert_eq!(region.progress(ScrollMetrics::new(4000.0, 1000.0)).value(), 0.5);
        assert_eq!(region.progress(ScrollMetrics::new(6000.0, 1000.0)).value(), 1.0);
        assert_eq!(region.progress(ScrollMetrics::new(9000.0, 1000.0)).value(), 1.0);
    }

    #[test]
    fn short_container_snaps_to_ends() {
        let region = Region::new(300.0, 600.0);

        assert_eq!(region.progress(ScrollMetrics::new(100.0, 800.0)), ScrollProgress::START);
        assert_eq!(region.progress(ScrollMetrics::new(301.0, 800.0)), ScrollProgress::END);
    }

    #[test]
    fn offset_is_inverse_of_progress() {
        let region = Region::new(1200.0, 4800.0);
        let offset = region.offset_for(0.75, 800.0);

        assert_eq!(offset, 1200.0 + 0.75 * 4000.0);
        assert_eq!(region.progress(ScrollMetrics::new(offset, 800.0)).value(), 0.75);
    }
}
