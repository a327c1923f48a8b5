//! Container measurement and resize detection.

use backdrop_engine::coords::{Rect, Viewport};

/// Logical size and pixel ratio of the host container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub logical: Viewport,
    pub scale_factor: f32,
}

impl ViewportMetrics {
    pub fn new(logical: Viewport, scale_factor: f32) -> Self {
        let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        Self {
            logical,
            scale_factor,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.logical.is_valid()
    }

    /// Backing-buffer size in physical pixels. Zero for an invalid viewport.
    pub fn physical_size(&self) -> (u32, u32) {
        if !self.is_valid() {
            return (0, 0);
        }
        (
            (self.logical.width * self.scale_factor).round() as u32,
            (self.logical.height * self.scale_factor).round() as u32,
        )
    }

    /// The container box in window coordinates, `None` when it has no area.
    pub fn container(&self) -> Option<Rect> {
        self.is_valid().then(|| self.logical.rect())
    }

    pub fn aspect(&self) -> Option<f32> {
        self.is_valid().then(|| self.logical.width / self.logical.height)
    }
}

/// How a size change reached the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeSource {
    /// The platform delivered a resize event.
    Notification,
    /// Detected by comparing against the live window size once per frame.
    Polling,
}

/// Tracks the container's last measured size.
///
/// Platform resize notifications are the primary signal. Until the first one
/// arrives the manager relies on per-frame polling, which also catches any
/// change a platform fails to report.
#[derive(Debug, Default)]
pub struct ViewportManager {
    current: Option<ViewportMetrics>,
    notified: bool,
}

impl ViewportManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> Option<ViewportMetrics> {
        self.current
    }

    #[inline]
    pub fn container(&self) -> Option<Rect> {
        self.current.and_then(|m| m.container())
    }

    /// `true` while no resize notification has ever been received.
    #[inline]
    pub fn uses_polling(&self) -> bool {
        !self.notified
    }

    /// Records a measurement. Returns the new metrics when they differ from
    /// the previous ones.
    pub fn observe(
        &mut self,
        logical: Viewport,
        scale_factor: f32,
        source: ResizeSource,
    ) -> Option<ViewportMetrics> {
        if source == ResizeSource::Notification {
            self.notified = true;
        }

        let metrics = ViewportMetrics::new(logical, scale_factor);
        if self.current == Some(metrics) {
            return None;
        }

        if source == ResizeSource::Polling && self.current.is_some() {
            log::debug!(
                "resize detected by polling: {}x{} @{}",
                metrics.logical.width,
                metrics.logical.height,
                metrics.scale_factor
            );
        }
        self.current = Some(metrics);
        Some(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── metrics ───────────────────────────────────────────────────────────

    #[test]
    fn physical_size_scales_and_rounds() {
        let m = ViewportMetrics::new(Viewport::new(800.0, 600.0), 1.5);
        assert_eq!(m.physical_size(), (1200, 900));
        let m = ViewportMetrics::new(Viewport::new(101.0, 33.0), 1.25);
        assert_eq!(m.physical_size(), (126, 41));
    }

    #[test]
    fn invalid_viewport_has_no_container() {
        let m = ViewportMetrics::new(Viewport::new(0.0, 600.0), 1.0);
        assert_eq!(m.physical_size(), (0, 0));
        assert!(m.container().is_none());
        assert!(m.aspect().is_none());
    }

    #[test]
    fn bogus_scale_factor_falls_back_to_one() {
        let m = ViewportMetrics::new(Viewport::new(10.0, 10.0), f32::NAN);
        assert_eq!(m.scale_factor, 1.0);
    }

    // ── change detection ──────────────────────────────────────────────────

    #[test]
    fn reports_only_changes() {
        let mut vm = ViewportManager::new();
        let vp = Viewport::new(800.0, 600.0);
        assert!(vm.observe(vp, 1.0, ResizeSource::Notification).is_some());
        assert!(vm.observe(vp, 1.0, ResizeSource::Polling).is_none());
        assert!(vm.observe(vp, 2.0, ResizeSource::Polling).is_some());
    }

    #[test]
    fn polling_until_first_notification() {
        let mut vm = ViewportManager::new();
        assert!(vm.uses_polling());
        vm.observe(Viewport::new(10.0, 10.0), 1.0, ResizeSource::Polling);
        assert!(vm.uses_polling());
        vm.observe(Viewport::new(10.0, 10.0), 1.0, ResizeSource::Notification);
        assert!(!vm.uses_polling());
    }
}
